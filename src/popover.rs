//! Filter and summary popovers.
//!
//! Popovers live in the host's DOM layer, not on the canvas. Opening one is
//! two-phase: the trigger populates the popover and hands out a
//! [`MeasureTicket`]; after the host has laid the hidden element out it
//! reports the measured size with that ticket and only then is the popover
//! positioned and shown. A newer trigger invalidates older tickets, so a
//! slow measurement can never overwrite the latest popover.

use serde::Serialize;

use crate::filter::Commit;
use crate::types::SummaryRule;

/// Top-left corner of a placed popover, in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
}

/// Place a `width`×`height` popover near a click point, inside the viewport.
///
/// The popover opens below and to the right of the click, `margin` away from
/// it. When that would overflow, it is pulled back to the nearest position
/// that keeps `margin` clear of the viewport edge. It never flips above or
/// to the left of the click, so a click in the bottom-right corner of a
/// 1280×720 viewport puts a 180×42 popover at (1095, 673). A popover too
/// large for the viewport is pinned to the leading margin.
pub fn place(
    client_x: f32,
    client_y: f32,
    width: f32,
    height: f32,
    viewport_width: f32,
    viewport_height: f32,
    margin: f32,
) -> Placement {
    Placement {
        x: place_axis(client_x, width, viewport_width, margin),
        y: place_axis(client_y, height, viewport_height, margin),
    }
}

fn place_axis(click: f32, size: f32, extent: f32, margin: f32) -> f32 {
    let click = if click.is_finite() { click } else { 0.0 };
    let preferred = click + margin;
    let max = extent - size - margin;
    if preferred <= max {
        preferred.max(margin)
    } else if max >= margin {
        max
    } else {
        margin
    }
}

/// Which popover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PopoverKind {
    Filter,
    Summary,
}

/// What the user is selecting in an open popover
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PopoverSelection {
    /// Filter: checked values
    Values(Vec<String>),
    /// Summary: chosen aggregate
    Rule(SummaryRule),
}

/// Observable state of one popover
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopoverState {
    pub kind: PopoverKind,
    pub visible: bool,
    pub x: f32,
    pub y: f32,
    pub column_key: Option<String>,
    pub options: Vec<String>,
    pub selection: PopoverSelection,
}

impl PopoverState {
    fn hidden(kind: PopoverKind) -> Self {
        Self {
            kind,
            visible: false,
            x: 0.0,
            y: 0.0,
            column_key: None,
            options: Vec::new(),
            selection: match kind {
                PopoverKind::Filter => PopoverSelection::Values(Vec::new()),
                PopoverKind::Summary => PopoverSelection::Rule(SummaryRule::None),
            },
        }
    }

    /// Populated, or waiting for measurement.
    pub fn is_active(&self) -> bool {
        self.column_key.is_some()
    }
}

/// Proof that a measurement belongs to a particular trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureTicket {
    pub kind: PopoverKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingMeasure {
    ticket: MeasureTicket,
    client_x: f32,
    client_y: f32,
}

/// Where a document click landed relative to the popovers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    InsidePopover,
    /// Inside a selector owned by a popover (e.g. a dropdown rendered
    /// outside the popover's own element)
    InsideNestedSelector,
    Outside,
}

/// Owns both popovers and their measurement lifecycle
#[derive(Debug, Clone)]
pub struct PopoverController {
    filter: PopoverState,
    summary: PopoverState,
    generation: u64,
    pending: Option<PendingMeasure>,
    margin: f32,
}

impl PopoverController {
    pub fn new(margin: f32) -> Self {
        Self {
            filter: PopoverState::hidden(PopoverKind::Filter),
            summary: PopoverState::hidden(PopoverKind::Summary),
            generation: 0,
            pending: None,
            margin,
        }
    }

    pub fn set_margin(&mut self, margin: f32) {
        self.margin = margin;
    }

    pub fn state(&self, kind: PopoverKind) -> &PopoverState {
        match kind {
            PopoverKind::Filter => &self.filter,
            PopoverKind::Summary => &self.summary,
        }
    }

    fn state_mut(&mut self, kind: PopoverKind) -> &mut PopoverState {
        match kind {
            PopoverKind::Filter => &mut self.filter,
            PopoverKind::Summary => &mut self.summary,
        }
    }

    /// Any popover shown or waiting for measurement.
    pub fn is_open(&self) -> bool {
        self.filter.is_active() || self.summary.is_active()
    }

    /// Ticket of the measurement currently awaited.
    pub fn pending_ticket(&self) -> Option<MeasureTicket> {
        self.pending.map(|p| p.ticket)
    }

    /// Populate a popover (still hidden) and start a measurement pass.
    /// The other popover is closed.
    pub fn open(
        &mut self,
        kind: PopoverKind,
        column_key: &str,
        options: Vec<String>,
        selection: PopoverSelection,
        client_x: f32,
        client_y: f32,
    ) -> MeasureTicket {
        self.generation += 1;
        self.filter = PopoverState::hidden(PopoverKind::Filter);
        self.summary = PopoverState::hidden(PopoverKind::Summary);
        let state = self.state_mut(kind);
        state.column_key = Some(column_key.to_string());
        state.options = options;
        state.selection = selection;
        let ticket = MeasureTicket {
            kind,
            generation: self.generation,
        };
        self.pending = Some(PendingMeasure {
            ticket,
            client_x,
            client_y,
        });
        tracing::debug!(?kind, column = column_key, generation = self.generation, "popover opened");
        ticket
    }

    /// Finish a measurement pass. Stale tickets are ignored and return `None`.
    pub fn complete_measurement(
        &mut self,
        ticket: MeasureTicket,
        width: f32,
        height: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Option<Placement> {
        let pending = match self.pending {
            Some(p) if p.ticket == ticket => p,
            _ => {
                tracing::warn!(
                    generation = ticket.generation,
                    current = self.generation,
                    "dropping stale popover measurement"
                );
                return None;
            }
        };
        self.pending = None;
        let placement = place(
            pending.client_x,
            pending.client_y,
            width,
            height,
            viewport_width,
            viewport_height,
            self.margin,
        );
        let state = self.state_mut(ticket.kind);
        state.x = placement.x;
        state.y = placement.y;
        state.visible = true;
        Some(placement)
    }

    /// Check or uncheck a value in the open filter popover.
    pub fn toggle_value(&mut self, value: &str) -> bool {
        if !self.filter.is_active() {
            return false;
        }
        let PopoverSelection::Values(values) = &mut self.filter.selection else {
            return false;
        };
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
        true
    }

    /// Choose a rule in the open summary popover.
    pub fn set_rule(&mut self, rule: SummaryRule) -> bool {
        if !self.summary.is_active() {
            return false;
        }
        self.summary.selection = PopoverSelection::Rule(rule);
        true
    }

    /// Close a popover and turn its selection into a commit.
    pub fn commit(&mut self, kind: PopoverKind) -> Option<Commit> {
        let state = std::mem::replace(self.state_mut(kind), PopoverState::hidden(kind));
        if self.pending.is_some_and(|p| p.ticket.kind == kind) {
            self.pending = None;
        }
        let column_key = state.column_key?;
        Some(match state.selection {
            PopoverSelection::Values(selected_values) => Commit::Filter {
                column_key,
                selected_values,
            },
            PopoverSelection::Rule(rule) => Commit::Summary { column_key, rule },
        })
    }

    /// Close both popovers without side effects. Returns true when anything
    /// was open.
    pub fn dismiss(&mut self) -> bool {
        let was_open = self.is_open();
        self.filter = PopoverState::hidden(PopoverKind::Filter);
        self.summary = PopoverState::hidden(PopoverKind::Summary);
        self.pending = None;
        // In-flight measurements must not resurrect a dismissed popover
        self.generation += 1;
        if was_open {
            tracing::debug!("popovers dismissed");
        }
        was_open
    }

    /// Handle a document-level click. Only clicks outside every popover and
    /// nested selector dismiss.
    pub fn handle_click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Outside => self.dismiss(),
            ClickTarget::InsidePopover | ClickTarget::InsideNestedSelector => false,
        }
    }
}
