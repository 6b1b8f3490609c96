//! Grid controller - the constructed-once owner of every grid component.
//!
//! `Grid` ties the column layout, viewport, render pipeline, highlight
//! engine, scrollbars, popovers and filter state together behind a single
//! event-driven API. It never touches the DOM: input arrives as plain
//! coordinates and timestamps, frames are requested through a
//! [`FrameHost`], and painting goes through a [`RenderBackend`]. The wasm32
//! [`GridView`] binding feeds it browser events.

mod events;

#[cfg(target_arch = "wasm32")]
mod binding;

use std::collections::VecDeque;
use std::time::Duration;

pub use events::{hit_test, HitTarget, FILTER_TRIGGER_WIDTH};

#[cfg(target_arch = "wasm32")]
pub use binding::GridView;

use crate::debounce::{debounce, Debounced};
use crate::error::{GridError, Result};
use crate::filter::FilterSummaryState;
use crate::highlight::HighlightEngine;
use crate::layout::{split_columns, ColumnLayout, GridMetrics, ScrollChange, Viewport};
use crate::popover::{
    ClickTarget, MeasureTicket, Placement, PopoverController, PopoverKind, PopoverSelection,
    PopoverState,
};
use crate::render::{
    FrameHost, FrameScheduler, FrameToken, LayerSet, ManualFrameHost, RenderBackend,
    RenderPipeline, ShapeSnapshot, SyncContext,
};
use crate::scrollbar::{
    wheel_to_scroll, ScrollAxis, ScrollbarController, ScrollbarGeometry, ScrollbarHit,
    WheelAccumulator,
};
use crate::types::{
    Dataset, DragPayload, DragSource, GridConfig, GridEvent, Modifiers, SortDirection,
    SummaryRule,
};

type ResizeFn = fn((f32, f32)) -> (f32, f32);

fn pass_through(size: (f32, f32)) -> (f32, f32) {
    size
}

fn delay_from_ms(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}

/// What a click on the stage did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    None,
    /// A sortable header was clicked; the column now has this direction
    Sorted(SortDirection),
    /// A popover is waiting for its measurement pass
    PopoverOpened(MeasureTicket),
}

/// The grid controller
pub struct Grid<H: FrameHost = ManualFrameHost> {
    config: GridConfig,
    dataset: Dataset,
    columns: ColumnLayout,
    viewport: Viewport,
    pipeline: RenderPipeline,
    scheduler: FrameScheduler,
    host: H,
    highlight: HighlightEngine,
    scrollbars: ScrollbarGeometry,
    scrollbar_ctl: ScrollbarController,
    wheel: WheelAccumulator,
    popovers: PopoverController,
    filters: FilterSummaryState,
    /// Sorted column key and direction
    sort: Option<(String, SortDirection)>,
    events: VecDeque<GridEvent>,
    resize: Debounced<(f32, f32), ResizeFn>,
    /// Last pointer position over the stage
    pointer: Option<(f32, f32)>,
    torn_down: bool,
}

impl<H: FrameHost> Grid<H> {
    /// Build a grid for `dataset` on a `width` x `height` stage.
    ///
    /// The first full sync runs immediately and requests one frame from
    /// `host`.
    pub fn new(dataset: Dataset, config: GridConfig, width: f32, height: f32, host: H) -> Result<Self> {
        let mut config = config;
        config.validate()?;
        config.normalize_colors();

        let columns = split_columns(&dataset.columns, config.min_column_width);
        let metrics = GridMetrics::new(&config, &columns, dataset.row_count());
        let viewport = Viewport::new(metrics, width, height);
        let mut filters = FilterSummaryState::new();
        filters.rebuild(&dataset);

        let mut grid = Self {
            wheel: WheelAccumulator::new(config.wheel_threshold, config.wheel_interval_ms),
            popovers: PopoverController::new(config.popover_margin),
            resize: debounce(delay_from_ms(config.resize_debounce_ms), pass_through as ResizeFn),
            config,
            dataset,
            columns,
            viewport,
            pipeline: RenderPipeline::new(),
            scheduler: FrameScheduler::new(),
            host,
            highlight: HighlightEngine::new(),
            scrollbars: ScrollbarGeometry::default(),
            scrollbar_ctl: ScrollbarController::new(),
            filters,
            sort: None,
            events: VecDeque::new(),
            pointer: None,
            torn_down: false,
        };
        tracing::debug!(
            rows = grid.dataset.row_count(),
            columns = grid.columns.column_count(),
            width,
            height,
            "grid created"
        );
        grid.sync(true);
        Ok(grid)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.torn_down {
            Err(GridError::TornDown)
        } else {
            Ok(())
        }
    }

    fn sort_index(&self) -> Option<(usize, SortDirection)> {
        let (key, direction) = self.sort.as_ref()?;
        self.dataset.column_index(key).map(|col| (col, *direction))
    }

    /// Bring every layer up to date with the current state and request a
    /// frame for whatever changed. `full` also re-arranges layer clips and
    /// repaints header and summary bands.
    fn sync(&mut self, full: bool) {
        let mut dirty = self.highlight.suspend(&mut self.pipeline);
        let frame = self.viewport.frame();
        if full {
            dirty |= self.pipeline.arrange(&frame, &self.config, &self.columns);
        }
        dirty |= self
            .pipeline
            .apply_scroll(self.viewport.scroll_x, self.viewport.scroll_y);

        let sort = self.sort_index();
        let ctx = SyncContext {
            config: &self.config,
            dataset: &self.dataset,
            columns: &self.columns,
            viewport: &self.viewport,
            sort,
            filters: &self.filters,
        };
        dirty |= self.pipeline.sync_body(&ctx);
        if full {
            dirty |= self.pipeline.sync_header(&ctx);
            dirty |= self.pipeline.sync_summary(&ctx);
        }

        self.scrollbars = ScrollbarGeometry::compute(
            &frame,
            self.viewport.metrics(),
            self.viewport.scroll_x,
            self.viewport.scroll_y,
            self.config.min_thumb_size,
        );
        dirty |= self.pipeline.sync_scrollbars(&self.scrollbars, &self.config);
        dirty |= self.highlight.reapply(&mut self.pipeline, &self.config);
        self.mark_dirty(dirty);
    }

    fn mark_dirty(&mut self, dirty: LayerSet) {
        self.scheduler.mark_dirty(dirty, &mut self.host);
    }

    fn emit(&mut self, event: GridEvent) {
        tracing::debug!(?event, "grid event");
        self.events.push_back(event);
    }

    // ------------------------------------------------------------------
    // Data and configuration
    // ------------------------------------------------------------------

    /// Replace the dataset. Every pooled shape is destroyed and rebuilt;
    /// scroll, highlight and popovers reset. Filter and summary selections
    /// are kept and their groupings recomputed against the new rows.
    pub fn set_dataset(&mut self, dataset: Dataset) -> Result<()> {
        self.ensure_alive()?;
        self.dataset = dataset;
        self.columns = split_columns(&self.dataset.columns, self.config.min_column_width);
        self.viewport.set_metrics(GridMetrics::new(
            &self.config,
            &self.columns,
            self.dataset.row_count(),
        ));
        self.viewport.reset_scroll();
        let dirty = self.pipeline.reset();
        self.highlight.forget();
        self.popovers.dismiss();
        self.scrollbar_ctl.end_drag();
        self.wheel.reset();
        self.filters.rebuild(&self.dataset);
        if self.sort_index().is_none() {
            self.sort = None;
        }
        tracing::info!(
            rows = self.dataset.row_count(),
            columns = self.columns.column_count(),
            "dataset replaced"
        );
        self.mark_dirty(dirty);
        self.sync(true);
        Ok(())
    }

    /// Hot-swap the style/behavior config. Layout and scroll limits are
    /// recomputed and every layer is redrawn; nothing is remounted.
    pub fn set_config(&mut self, config: GridConfig) -> Result<()> {
        self.ensure_alive()?;
        let mut config = config;
        config.validate()?;
        config.normalize_colors();
        self.config = config;

        self.columns = split_columns(&self.dataset.columns, self.config.min_column_width);
        self.viewport.set_metrics(GridMetrics::new(
            &self.config,
            &self.columns,
            self.dataset.row_count(),
        ));
        self.wheel
            .configure(self.config.wheel_threshold, self.config.wheel_interval_ms);
        self.popovers.set_margin(self.config.popover_margin);
        self.resize
            .set_delay(delay_from_ms(self.config.resize_debounce_ms));
        self.pipeline.invalidate_content();
        tracing::debug!("config replaced");
        self.sync(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Resize
    // ------------------------------------------------------------------

    /// Queue a stage resize. Bursts collapse into one resize once the
    /// debounce interval has passed without another call.
    pub fn resize(&mut self, width: f32, height: f32, now_ms: f64) -> Result<()> {
        self.ensure_alive()?;
        self.resize.schedule(now_ms, (width, height));
        Ok(())
    }

    /// Deadline of the queued resize, if any.
    pub fn resize_deadline(&self) -> Option<f64> {
        self.resize.deadline_ms()
    }

    /// Apply the queued resize if it is due. Returns true when it ran.
    pub fn poll_resize(&mut self, now_ms: f64) -> Result<bool> {
        self.ensure_alive()?;
        match self.resize.fire_if_due(now_ms) {
            Some((width, height)) => {
                self.resize_now(width, height)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resize the stage immediately, bypassing the debounce.
    pub fn resize_now(&mut self, width: f32, height: f32) -> Result<()> {
        self.ensure_alive()?;
        self.resize.cancel();
        self.viewport.resize(width, height);
        tracing::debug!(width, height, "stage resized");
        self.sync(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    fn after_scroll(&mut self, change: ScrollChange) -> bool {
        if !change.moved {
            return false;
        }
        tracing::trace!(
            scroll_x = self.viewport.scroll_x,
            scroll_y = self.viewport.scroll_y,
            window_changed = change.window_changed,
            "scrolled"
        );
        self.sync(false);
        self.refresh_hover();
        true
    }

    /// Scroll by a delta on both axes. Returns true when anything moved.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> Result<bool> {
        self.ensure_alive()?;
        let horizontal = self.viewport.update_horizontal_scroll(dx);
        let vertical = self.viewport.update_vertical_scroll(dy);
        Ok(self.after_scroll(ScrollChange {
            moved: horizontal.moved || vertical.moved,
            window_changed: vertical.window_changed,
        }))
    }

    /// Jump to absolute offsets (clamped).
    pub fn set_scroll(&mut self, x: f32, y: f32) -> Result<bool> {
        self.ensure_alive()?;
        let horizontal = self.viewport.set_scroll_x(x);
        let vertical = self.viewport.set_scroll_y(y);
        Ok(self.after_scroll(ScrollChange {
            moved: horizontal.moved || vertical.moved,
            window_changed: vertical.window_changed,
        }))
    }

    fn scroll_axis_to(&mut self, axis: ScrollAxis, target: f32) -> bool {
        let change = match axis {
            ScrollAxis::Vertical => self.viewport.set_scroll_y(target),
            ScrollAxis::Horizontal => self.viewport.set_scroll_x(target),
        };
        self.after_scroll(change)
    }

    /// Feed a wheel event (deltas already in pixels). Small deltas are
    /// accumulated; whatever is left over is released on a later frame.
    pub fn on_wheel(&mut self, dx: f32, dy: f32, modifiers: Modifiers, now_ms: f64) -> Result<bool> {
        self.ensure_alive()?;
        let (dx, dy) = wheel_to_scroll(dx, dy, modifiers, self.config.horizontal_wheel_modifier);
        match self.wheel.push(dx, dy, now_ms) {
            Some((ax, ay)) => self.scroll_by(ax, ay),
            None => {
                self.scheduler.request_tick(&mut self.host);
                Ok(false)
            }
        }
    }

    /// Release accumulated wheel deltas whose interval has passed.
    pub fn flush_wheel(&mut self, now_ms: f64) -> Result<bool> {
        self.ensure_alive()?;
        match self.wheel.flush(now_ms) {
            Some((dx, dy)) => self.scroll_by(dx, dy),
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    /// What lies under a stage point.
    pub fn hit(&self, x: f32, y: f32) -> HitTarget {
        hit_test(
            &self.viewport,
            &self.columns,
            &self.scrollbars,
            &self.dataset.columns,
            &self.config,
            x,
            y,
        )
    }

    fn hover_at(&mut self, x: f32, y: f32) {
        if self.popovers.is_open() || self.scrollbar_ctl.is_dragging() {
            return;
        }
        let (row, col) = self.hit(x, y).hover_axes();
        let dirty = self
            .highlight
            .set_hover(row, col, &mut self.pipeline, &self.config);
        self.mark_dirty(dirty);
    }

    fn refresh_hover(&mut self) {
        if let Some((x, y)) = self.pointer {
            self.hover_at(x, y);
        }
    }

    /// Pointer pressed. Starts a thumb drag or pages along a track.
    /// Returns true when a scrollbar consumed the press.
    pub fn on_pointer_down(&mut self, x: f32, y: f32) -> Result<bool> {
        self.ensure_alive()?;
        let Some((axis, hit)) = self.scrollbars.hit(x, y) else {
            return Ok(false);
        };
        let Some(geometry) = self.scrollbars.get(axis).copied() else {
            return Ok(false);
        };
        let scroll = match axis {
            ScrollAxis::Vertical => self.viewport.scroll_y,
            ScrollAxis::Horizontal => self.viewport.scroll_x,
        };
        match hit {
            ScrollbarHit::Thumb => {
                self.scrollbar_ctl.begin_drag(axis, geometry.along(x, y), scroll);
                // A drag owns the pointer; hover resumes when it ends
                let dirty = self.highlight.deactivate(&mut self.pipeline);
                self.mark_dirty(dirty);
            }
            ScrollbarHit::TrackBefore => {
                self.scroll_axis_to(axis, scroll - geometry.track_length());
            }
            ScrollbarHit::TrackAfter => {
                self.scroll_axis_to(axis, scroll + geometry.track_length());
            }
        }
        Ok(true)
    }

    /// Pointer moved: continue a thumb drag or update the hover highlight.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> Result<()> {
        self.ensure_alive()?;
        self.pointer = Some((x, y));
        if let Some(axis) = self.scrollbar_ctl.drag_axis() {
            let Some(geometry) = self.scrollbars.get(axis).copied() else {
                return Ok(());
            };
            if let Some((axis, target)) = self
                .scrollbar_ctl
                .drag_to(geometry.along(x, y), &geometry)
            {
                self.scroll_axis_to(axis, target);
            }
            return Ok(());
        }
        self.hover_at(x, y);
        Ok(())
    }

    /// Pointer released.
    pub fn on_pointer_up(&mut self, x: f32, y: f32) -> Result<()> {
        self.ensure_alive()?;
        if self.scrollbar_ctl.end_drag() {
            self.hover_at(x, y);
        }
        Ok(())
    }

    /// Pointer left the stage: drop the highlight.
    pub fn on_pointer_leave(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.pointer = None;
        if !self.scrollbar_ctl.is_dragging() {
            let dirty = self.highlight.deactivate(&mut self.pipeline);
            self.mark_dirty(dirty);
        }
        Ok(())
    }

    /// Click on the stage. `client_x`/`client_y` are page coordinates used
    /// to anchor popovers.
    pub fn on_click(&mut self, x: f32, y: f32, client_x: f32, client_y: f32) -> Result<ClickOutcome> {
        self.ensure_alive()?;
        if self.scrollbar_ctl.is_dragging() {
            return Ok(ClickOutcome::None);
        }
        match self.hit(x, y) {
            HitTarget::HeaderCell(col) => Ok(self
                .cycle_sort(col)?
                .map_or(ClickOutcome::None, ClickOutcome::Sorted)),
            HitTarget::FilterTrigger(col) => Ok(ClickOutcome::PopoverOpened(
                self.open_filter_popover(col, client_x, client_y)?,
            )),
            HitTarget::SummaryTrigger(col) => Ok(ClickOutcome::PopoverOpened(
                self.open_summary_popover(col, client_x, client_y)?,
            )),
            HitTarget::Cell { .. } | HitTarget::Scrollbar(..) | HitTarget::None => {
                Ok(ClickOutcome::None)
            }
        }
    }

    /// Advance the sort direction of a sortable column. Other columns lose
    /// their sort. Returns `None` for columns that are not sortable.
    pub fn cycle_sort(&mut self, col: usize) -> Result<Option<SortDirection>> {
        self.ensure_alive()?;
        let column = self
            .dataset
            .columns
            .get(col)
            .ok_or_else(|| GridError::UnknownColumn(format!("#{col}")))?;
        if !column.sortable {
            return Ok(None);
        }
        let key = column.key.clone();
        let current = match &self.sort {
            Some((sorted, direction)) if *sorted == key => *direction,
            _ => SortDirection::None,
        };
        let next = current.cycle();
        self.sort = if next == SortDirection::None {
            None
        } else {
            Some((key.clone(), next))
        };
        self.emit(GridEvent::SortChange {
            column_key: key,
            direction: next,
        });
        self.pipeline.invalidate_header();
        self.sync(true);
        Ok(Some(next))
    }

    // ------------------------------------------------------------------
    // Popovers
    // ------------------------------------------------------------------

    fn column_key(&self, col: usize) -> Result<String> {
        self.dataset
            .columns
            .get(col)
            .map(|c| c.key.clone())
            .ok_or_else(|| GridError::UnknownColumn(format!("#{col}")))
    }

    fn open_popover(
        &mut self,
        kind: PopoverKind,
        key: &str,
        options: Vec<String>,
        selection: PopoverSelection,
        client_x: f32,
        client_y: f32,
    ) -> MeasureTicket {
        let dirty = self.highlight.deactivate(&mut self.pipeline);
        self.mark_dirty(dirty);
        self.popovers
            .open(kind, key, options, selection, client_x, client_y)
    }

    /// Open the filter popover for a column, pre-checked with the current
    /// selection. Placement waits for [`complete_popover_measurement`].
    ///
    /// [`complete_popover_measurement`]: Self::complete_popover_measurement
    pub fn open_filter_popover(&mut self, col: usize, client_x: f32, client_y: f32) -> Result<MeasureTicket> {
        self.ensure_alive()?;
        let key = self.column_key(col)?;
        let options = self.dataset.distinct_values(col);
        let selection = PopoverSelection::Values(self.filters.selected_values(&key).to_vec());
        Ok(self.open_popover(PopoverKind::Filter, &key, options, selection, client_x, client_y))
    }

    /// Open the summary popover for a column with its current rule chosen.
    pub fn open_summary_popover(&mut self, col: usize, client_x: f32, client_y: f32) -> Result<MeasureTicket> {
        self.ensure_alive()?;
        let key = self.column_key(col)?;
        let options = SummaryRule::ALL
            .iter()
            .map(|rule| rule.label().to_string())
            .collect();
        let selection = PopoverSelection::Rule(self.filters.rule(&key));
        Ok(self.open_popover(PopoverKind::Summary, &key, options, selection, client_x, client_y))
    }

    /// Measured size of the rendered popover arrived. Stale tickets return
    /// `None` and change nothing.
    pub fn complete_popover_measurement(
        &mut self,
        ticket: MeasureTicket,
        width: f32,
        height: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Result<Option<Placement>> {
        self.ensure_alive()?;
        Ok(self
            .popovers
            .complete_measurement(ticket, width, height, viewport_width, viewport_height))
    }

    /// Check or uncheck a value in the open filter popover.
    pub fn toggle_filter_value(&mut self, value: &str) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self.popovers.toggle_value(value))
    }

    /// Choose a rule in the open summary popover.
    pub fn set_summary_rule(&mut self, rule: SummaryRule) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self.popovers.set_rule(rule))
    }

    /// Close a popover and commit its selection. Groupings are rebuilt and
    /// the outbound event is queued and returned.
    pub fn commit_popover(&mut self, kind: PopoverKind) -> Result<Option<GridEvent>> {
        self.ensure_alive()?;
        let Some(commit) = self.popovers.commit(kind) else {
            return Ok(None);
        };
        let event = self.filters.apply(commit, &self.dataset)?;
        self.emit(event.clone());
        self.pipeline.invalidate_summary();
        self.sync(true);
        Ok(Some(event))
    }

    /// Close both popovers without committing.
    pub fn dismiss_popovers(&mut self) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self.popovers.dismiss())
    }

    /// A click somewhere in the document. Only clicks outside every popover
    /// and nested selector dismiss.
    pub fn handle_document_click(&mut self, target: ClickTarget) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self.popovers.handle_click(target))
    }

    /// Keyboard input. Returns true when the key was handled.
    pub fn on_key(&mut self, key: &str) -> Result<bool> {
        self.ensure_alive()?;
        match key {
            "Escape" => Ok(self.popovers.dismiss()),
            _ => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    /// Text payload dropped on the grid.
    pub fn on_drop(&mut self, text: &str) -> Result<()> {
        self.ensure_alive()?;
        let payload = DragPayload::parse(text)?;
        let shelf = match payload.source {
            DragSource::Dimension => "dimensions",
            DragSource::Filter => "filters",
            DragSource::Order => "order",
            DragSource::Group => "groups",
            DragSource::Column => "columns",
        };
        tracing::debug!(shelf, index = payload.index, value = %payload.value, "field dropped");
        self.emit(GridEvent::FieldDropped { payload });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Frame callback fired. Releases leftover wheel deltas, then paints
    /// every layer dirtied since the last frame. Returns layers painted.
    pub fn on_frame(&mut self, token: FrameToken, now_ms: f64, backend: &mut dyn RenderBackend) -> Result<usize> {
        self.ensure_alive()?;
        self.flush_wheel(now_ms)?;
        let dirty = self.scheduler.take_frame(token);
        let painted = self.pipeline.flush(dirty, backend)?;
        if self.wheel.pending().is_some() {
            self.scheduler.request_tick(&mut self.host);
        }
        Ok(painted)
    }

    /// Repaint every layer on the next frame (the surface was cleared, or a
    /// frame request was declined earlier).
    pub fn invalidate(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.mark_dirty(LayerSet::all());
        Ok(())
    }

    /// Outbound events in emission order.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    /// Cancel the in-flight frame and pending resize. Every later call
    /// returns [`GridError::TornDown`].
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel(&mut self.host);
        self.resize.cancel();
        self.wheel.reset();
        self.scrollbar_ctl.end_drag();
        self.popovers.dismiss();
        self.highlight.forget();
        self.torn_down = true;
        tracing::debug!("grid torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Visible shapes of every layer in stage coordinates.
    pub fn scene_snapshot(&self) -> Vec<ShapeSnapshot> {
        self.pipeline.snapshot()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn highlight(&self) -> &HighlightEngine {
        &self.highlight
    }

    pub fn scrollbars(&self) -> &ScrollbarGeometry {
        &self.scrollbars
    }

    pub fn filters(&self) -> &FilterSummaryState {
        &self.filters
    }

    pub fn popover(&self, kind: PopoverKind) -> &PopoverState {
        self.popovers.state(kind)
    }

    pub fn pending_popover(&self) -> Option<MeasureTicket> {
        self.popovers.pending_ticket()
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(key, dir)| (key.as_str(), *dir))
    }

    /// Layers waiting for the next frame.
    pub fn dirty_layers(&self) -> LayerSet {
        self.scheduler.dirty()
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.scheduler.pending()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;
    use crate::types::{CellValue, ColumnDescriptor, Fixed, Row};

    fn dataset(rows: usize) -> Dataset {
        let columns = vec![
            ColumnDescriptor::new("id").with_width(60.0).with_fixed(Fixed::Left),
            ColumnDescriptor::new("city").with_width(160.0).sortable().filterable(),
            ColumnDescriptor::new("amount").with_width(120.0).sortable(),
        ];
        let rows = (0..rows)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let n = i as f64;
                Row::new(vec![
                    CellValue::Number(n),
                    CellValue::Text(["Oslo", "Lima", "Pune"][i % 3].to_string()),
                    CellValue::Number(n * 10.0),
                ])
            })
            .collect();
        Dataset::new(columns, rows)
    }

    fn grid(rows: usize) -> Grid {
        Grid::new(dataset(rows), GridConfig::default(), 800.0, 400.0, ManualFrameHost::new()).unwrap()
    }

    #[test]
    fn test_creation_requests_one_frame() {
        let mut g = grid(100);
        assert_eq!(g.host().requested, 1);
        let token = g.host_mut().fire().unwrap();
        let mut backend = RecordingBackend::new(800, 400);
        let painted = g.on_frame(token, 0.0, &mut backend).unwrap();
        assert!(painted > 0);
        assert!(g.dirty_layers().is_empty());
    }

    #[test]
    fn test_header_click_cycles_sort() {
        let mut g = grid(10);
        // "city" header spans x 80..240 (id is widened to the minimum)
        assert_eq!(
            g.on_click(100.0, 10.0, 100.0, 10.0).unwrap(),
            ClickOutcome::Sorted(SortDirection::Ascending)
        );
        assert_eq!(g.sort(), Some(("city", SortDirection::Ascending)));
        g.on_click(100.0, 10.0, 100.0, 10.0).unwrap();
        g.on_click(100.0, 10.0, 100.0, 10.0).unwrap();
        assert_eq!(g.sort(), None);
        let events = g.drain_events();
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_teardown_cancels_frame_and_rejects_calls() {
        let mut g = grid(10);
        assert!(g.pending_frame().is_some());
        g.teardown();
        assert_eq!(g.host().cancelled, 1);
        assert!(matches!(g.scroll_by(0.0, 10.0), Err(GridError::TornDown)));
    }

    #[test]
    fn test_escape_dismisses_popover() {
        let mut g = grid(10);
        g.open_summary_popover(2, 300.0, 300.0).unwrap();
        assert!(g.on_key("Escape").unwrap());
        assert!(!g.on_key("Escape").unwrap());
    }
}
