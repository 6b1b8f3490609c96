//! Browser binding for the grid.
//!
//! `GridView` owns a [`Grid`] driven by `requestAnimationFrame`, paints it
//! with a [`CanvasPainter`], and wires mouse, wheel, keyboard and drop
//! listeners on the canvas. Everything registered here is removed again in
//! [`GridView::destroy`].
//!
//! JS callbacks are always invoked after the shared state borrow has been
//! released, so a callback may call straight back into the view.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, DragEvent, Event, EventTarget, HtmlCanvasElement, KeyboardEvent,
    MouseEvent, WheelEvent,
};

use super::{ClickOutcome, Grid};
use crate::error::GridError;
use crate::popover::{ClickTarget, MeasureTicket, PopoverKind, PopoverState};
use crate::render::{CanvasPainter, FrameHost, FrameToken, RenderBackend};
use crate::scrollbar::WheelDeltaMode;
use crate::types::{Dataset, GridConfig, Modifiers, SummaryRule};

/// Pixels per line for `deltaMode == DOM_DELTA_LINE`
const WHEEL_LINE_HEIGHT: f32 = 16.0;

// Timing helper
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// `requestAnimationFrame` as a frame host. The callback slot is filled in
/// once the frame closure exists; until then requests are declined.
struct RafHost {
    callback: Rc<RefCell<Option<Function>>>,
}

impl FrameHost for RafHost {
    fn request_frame(&mut self) -> Option<FrameToken> {
        let window = web_sys::window()?;
        let slot = self.callback.try_borrow().ok()?;
        let callback = slot.as_ref()?;
        window.request_animation_frame(callback).ok().map(FrameToken)
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(token.0);
        }
    }
}

/// State shared between the exported handle and its event listeners
struct Shared {
    grid: Grid<RafHost>,
    painter: CanvasPainter,
    dpr: f32,
    event_callback: Option<Function>,
    popover_callback: Option<Function>,
    resize_callback: Option<Function>,
    resize_timer: Option<i32>,
}

/// A registered DOM listener, kept so it can be removed on destroy
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, kind: &'static str, passive: Option<bool>, handler: F) -> Self
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let callback = closure.as_ref().unchecked_ref();
        let attached = match passive {
            Some(passive) => {
                let options = AddEventListenerOptions::new();
                options.set_passive(passive);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    kind, callback, &options,
                )
            }
            None => target.add_event_listener_with_callback(kind, callback),
        };
        if attached.is_err() {
            tracing::warn!(kind, "failed to attach listener");
        }
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopoverRequest<'a> {
    kind: PopoverKind,
    generation: u64,
    state: &'a PopoverState,
}

/// Stage coordinates of a mouse event relative to the canvas.
// Client coordinates are small; f64 -> f32 keeps every representable pixel.
#[allow(clippy::cast_possible_truncation)]
fn local_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        (f64::from(event.client_x()) - rect.left()) as f32,
        (f64::from(event.client_y()) - rect.top()) as f32,
    )
}

#[allow(clippy::cast_precision_loss)]
fn client_point(event: &MouseEvent) -> (f32, f32) {
    (event.client_x() as f32, event.client_y() as f32)
}

fn modifiers(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        alt: event.alt_key(),
        ctrl: event.ctrl_key() || event.meta_key(),
    }
}

fn parse_kind(kind: &str) -> Result<PopoverKind, JsValue> {
    match kind {
        "filter" => Ok(PopoverKind::Filter),
        "summary" => Ok(PopoverKind::Summary),
        other => Err(JsValue::from_str(&format!("unknown popover kind: {other}"))),
    }
}

fn config_from_js(config: &JsValue) -> Result<GridConfig, GridError> {
    if config.is_undefined() || config.is_null() {
        return Ok(GridConfig::default());
    }
    serde_wasm_bindgen::from_value(config.clone())
        .map_err(|e| GridError::InvalidConfig(e.to_string()))
}

fn window_size() -> (f32, f32) {
    let Some(window) = web_sys::window() else {
        return (0.0, 0.0);
    };
    // Window dimensions fit comfortably in f32
    #[allow(clippy::cast_possible_truncation)]
    let read = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    (read(window.inner_width()), read(window.inner_height()))
}

/// Forward queued grid events to the registered JS callback.
fn dispatch_events(state: &Rc<RefCell<Shared>>) {
    let (events, callback) = {
        let Ok(mut s) = state.try_borrow_mut() else {
            return;
        };
        (s.grid.drain_events(), s.event_callback.clone())
    };
    let Some(callback) = callback else {
        return;
    };
    for event in events {
        match serde_wasm_bindgen::to_value(&event) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    web_sys::console::error_2(&"grid event callback failed".into(), &e);
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize grid event"),
        }
    }
}

/// Ask the host to render a popover so it can be measured. Without a
/// popover host there is nothing to measure into, so the open is abandoned.
fn request_popover(state: &Rc<RefCell<Shared>>, ticket: MeasureTicket) {
    let (payload, callback) = {
        let Ok(mut s) = state.try_borrow_mut() else {
            return;
        };
        let Some(callback) = s.popover_callback.clone() else {
            tracing::debug!("no popover host registered; skipping popover");
            let _ = s.grid.dismiss_popovers();
            return;
        };
        let request = PopoverRequest {
            kind: ticket.kind,
            generation: ticket.generation,
            state: s.grid.popover(ticket.kind),
        };
        (serde_wasm_bindgen::to_value(&request), callback)
    };
    match payload {
        Ok(value) => {
            if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                web_sys::console::error_2(&"popover callback failed".into(), &e);
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to serialize popover request"),
    }
}

/// (Re)arm the resize timer for the grid's pending resize.
fn arm_resize_timer(s: &mut Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(timer) = s.resize_timer.take() {
        window.clear_timeout_with_handle(timer);
    }
    let (Some(deadline), Some(callback)) = (s.grid.resize_deadline(), s.resize_callback.as_ref())
    else {
        return;
    };
    // Bounded by the configured debounce interval
    #[allow(clippy::cast_possible_truncation)]
    let delay = (deadline - now_ms()).max(0.0).ceil().min(f64::from(i32::MAX)) as i32;
    s.resize_timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay)
        .ok();
}

/// Run the pending resize if due, resizing the canvas to match.
fn apply_resize(s: &mut Shared) {
    s.resize_timer = None;
    match s.grid.poll_resize(now_ms()) {
        Ok(true) => {
            let viewport = s.grid.viewport();
            // Physical canvas sizes are non-negative and far below u32::MAX
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (width, height) = (
                (viewport.stage_width * s.dpr).round() as u32,
                (viewport.stage_height * s.dpr).round() as u32,
            );
            s.painter.resize(width, height, s.dpr);
            // Resizing the canvas clears it
            let _ = s.grid.invalidate();
        }
        Ok(false) => arm_resize_timer(s),
        Err(e) => tracing::warn!(error = %e, "resize failed"),
    }
}

/// The grid handle exported to JavaScript
#[wasm_bindgen]
pub struct GridView {
    state: Rc<RefCell<Shared>>,
    listeners: Vec<Listener>,
    #[allow(dead_code)]
    frame_closure: Closure<dyn FnMut(f64)>,
    #[allow(dead_code)]
    resize_closure: Closure<dyn FnMut()>,
    destroyed: bool,
}

#[wasm_bindgen]
impl GridView {
    /// Create a grid on `canvas` from a dataset JSON document
    /// (`{"columns": [...], "rows": [...]}`) and an optional config object.
    ///
    /// The canvas buffer is expected at physical size already; `dpr` maps
    /// it back to CSS pixels.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        dataset_json: &str,
        config: JsValue,
        dpr: f32,
    ) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let dataset = Dataset::from_json(dataset_json)?;
        let config = config_from_js(&config)?;

        let physical_width = canvas.width().max(1);
        let physical_height = canvas.height().max(1);
        let mut painter = CanvasPainter::new(canvas.clone())?;
        painter.resize(physical_width, physical_height, dpr);

        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (physical_width as f32 / dpr, physical_height as f32 / dpr);
        let frame_slot = Rc::new(RefCell::new(None));
        let host = RafHost {
            callback: Rc::clone(&frame_slot),
        };
        let grid = Grid::new(dataset, config, width, height, host)?;

        let state = Rc::new(RefCell::new(Shared {
            grid,
            painter,
            dpr,
            event_callback: None,
            popover_callback: None,
            resize_callback: None,
            resize_timer: None,
        }));

        // Frame callback: paint whatever the scheduler collected
        let frame_closure = {
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move |_timestamp: f64| {
                {
                    let Ok(mut s) = state.try_borrow_mut() else {
                        return;
                    };
                    let Shared { grid, painter, .. } = &mut *s;
                    let Some(token) = grid.pending_frame() else {
                        return;
                    };
                    if let Err(e) = grid.on_frame(token, now_ms(), painter) {
                        tracing::warn!(error = %e, "frame failed");
                    }
                }
                dispatch_events(&state);
            }) as Box<dyn FnMut(f64)>)
        };
        if let Ok(mut slot) = frame_slot.try_borrow_mut() {
            *slot = Some(frame_closure.as_ref().unchecked_ref::<Function>().clone());
        }

        let resize_closure = {
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move || {
                if let Ok(mut s) = state.try_borrow_mut() {
                    apply_resize(&mut s);
                }
            }) as Box<dyn FnMut()>)
        };

        if let Ok(mut s) = state.try_borrow_mut() {
            s.resize_callback = Some(resize_closure.as_ref().unchecked_ref::<Function>().clone());
            // The first sync ran before the frame callback existed
            s.grid.invalidate()?;
        }

        let listeners = Self::attach_listeners(&canvas, &state);

        Ok(GridView {
            state,
            listeners,
            frame_closure,
            resize_closure,
            destroyed: false,
        })
    }

    fn attach_listeners(canvas: &HtmlCanvasElement, state: &Rc<RefCell<Shared>>) -> Vec<Listener> {
        let target: &EventTarget = canvas.as_ref();
        let mut listeners = Vec::new();

        // Mouse down: scrollbar thumb drags and track paging
        {
            let state = Rc::clone(state);
            let canvas = canvas.clone();
            listeners.push(Listener::attach(target, "mousedown", None, move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let (x, y) = local_point(&canvas, event);
                if let Ok(mut s) = state.try_borrow_mut() {
                    if matches!(s.grid.on_pointer_down(x, y), Ok(true)) {
                        event.prevent_default();
                    }
                }
            }));
        }

        // Mouse move: hover highlight or thumb drag
        {
            let state = Rc::clone(state);
            let canvas = canvas.clone();
            listeners.push(Listener::attach(target, "mousemove", None, move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let (x, y) = local_point(&canvas, event);
                if let Ok(mut s) = state.try_borrow_mut() {
                    let _ = s.grid.on_pointer_move(x, y);
                }
            }));
        }

        // Mouse up
        {
            let state = Rc::clone(state);
            let canvas = canvas.clone();
            listeners.push(Listener::attach(target, "mouseup", None, move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let (x, y) = local_point(&canvas, event);
                if let Ok(mut s) = state.try_borrow_mut() {
                    let _ = s.grid.on_pointer_up(x, y);
                }
            }));
        }

        // Mouse leave
        {
            let state = Rc::clone(state);
            listeners.push(Listener::attach(target, "mouseleave", None, move |_event| {
                if let Ok(mut s) = state.try_borrow_mut() {
                    let _ = s.grid.on_pointer_leave();
                }
            }));
        }

        // Click: sorting and popover triggers
        {
            let state = Rc::clone(state);
            let canvas = canvas.clone();
            listeners.push(Listener::attach(target, "click", None, move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let (x, y) = local_point(&canvas, event);
                let (client_x, client_y) = client_point(event);
                let outcome = match state.try_borrow_mut() {
                    Ok(mut s) => s.grid.on_click(x, y, client_x, client_y),
                    Err(_) => return,
                };
                match outcome {
                    Ok(ClickOutcome::PopoverOpened(ticket)) => request_popover(&state, ticket),
                    Ok(ClickOutcome::Sorted(_)) => dispatch_events(&state),
                    Ok(ClickOutcome::None) => {}
                    Err(e) => tracing::warn!(error = %e, "click failed"),
                }
            }));
        }

        // Wheel: non-passive so the page does not scroll underneath
        {
            let state = Rc::clone(state);
            listeners.push(Listener::attach(target, "wheel", Some(false), move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                let Ok(mut s) = state.try_borrow_mut() else {
                    return;
                };
                let mode = WheelDeltaMode::from_dom(event.delta_mode());
                let page = s.grid.viewport().frame().body_height;
                // Wheel deltas are small; f64 -> f32 is lossless in practice
                #[allow(clippy::cast_possible_truncation)]
                let (dx, dy) = (
                    mode.to_pixels(event.delta_x() as f32, WHEEL_LINE_HEIGHT, page),
                    mode.to_pixels(event.delta_y() as f32, WHEEL_LINE_HEIGHT, page),
                );
                let _ = s.grid.on_wheel(dx, dy, modifiers(event), now_ms());
            }));
        }

        // Drops: accept text payloads from the field shelves
        listeners.push(Listener::attach(target, "dragover", None, |event| {
            event.prevent_default();
        }));
        {
            let state = Rc::clone(state);
            listeners.push(Listener::attach(target, "drop", None, move |event| {
                let Some(event) = event.dyn_ref::<DragEvent>() else {
                    return;
                };
                event.prevent_default();
                let Some(text) = event
                    .data_transfer()
                    .and_then(|data| data.get_data("text/plain").ok())
                else {
                    return;
                };
                let result = match state.try_borrow_mut() {
                    Ok(mut s) => s.grid.on_drop(&text),
                    Err(_) => return,
                };
                match result {
                    Ok(()) => dispatch_events(&state),
                    Err(e) => tracing::warn!(error = %e, "ignoring drop"),
                }
            }));
        }

        // Escape closes popovers
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let state = Rc::clone(state);
            listeners.push(Listener::attach(document.as_ref(), "keydown", None, move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Ok(mut s) = state.try_borrow_mut() {
                    if matches!(s.grid.on_key(&event.key()), Ok(true)) {
                        event.prevent_default();
                    }
                }
            }));
        }

        listeners
    }

    fn with_grid<T>(
        &self,
        f: impl FnOnce(&mut Shared) -> crate::error::Result<T>,
    ) -> Result<T, JsValue> {
        let mut s = self
            .state
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("grid is busy"))?;
        Ok(f(&mut *s)?)
    }

    /// Replace the dataset with a new JSON document.
    #[wasm_bindgen(js_name = "setDataset")]
    pub fn set_dataset(&self, dataset_json: &str) -> Result<(), JsValue> {
        let dataset = Dataset::from_json(dataset_json)?;
        self.with_grid(|s| s.grid.set_dataset(dataset))
    }

    /// Hot-swap the config.
    #[wasm_bindgen(js_name = "setConfig")]
    pub fn set_config(&self, config: JsValue) -> Result<(), JsValue> {
        let config = config_from_js(&config)?;
        self.with_grid(|s| s.grid.set_config(config))
    }

    /// Resize the canvas (physical pixels). Applied after the debounce
    /// interval.
    pub fn resize(&self, physical_width: u32, physical_height: u32, dpr: f32) -> Result<(), JsValue> {
        self.with_grid(|s| {
            s.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
            #[allow(clippy::cast_precision_loss)]
            let (width, height) = (
                physical_width as f32 / s.dpr,
                physical_height as f32 / s.dpr,
            );
            s.grid.resize(width, height, now_ms())?;
            arm_resize_timer(s);
            Ok(())
        })
    }

    /// Scroll to absolute offsets (clamped).
    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.with_grid(|s| s.grid.set_scroll(x, y))
    }

    #[wasm_bindgen(js_name = "scrollX")]
    pub fn scroll_x(&self) -> f32 {
        self.state
            .try_borrow()
            .map_or(0.0, |s| s.grid.viewport().scroll_x)
    }

    #[wasm_bindgen(js_name = "scrollY")]
    pub fn scroll_y(&self) -> f32 {
        self.state
            .try_borrow()
            .map_or(0.0, |s| s.grid.viewport().scroll_y)
    }

    /// Register the outbound event callback (`sort-change`, `filter-change`,
    /// `summary-change`, `field-dropped`).
    #[wasm_bindgen(js_name = "onEvent")]
    pub fn on_event(&self, callback: Option<Function>) -> Result<(), JsValue> {
        self.with_grid(|s| {
            s.event_callback = callback;
            Ok(())
        })
    }

    /// Register the popover host. It receives `{kind, generation, state}`,
    /// renders the popover hidden, and reports its size through
    /// `placePopover` after layout.
    #[wasm_bindgen(js_name = "onPopover")]
    pub fn on_popover(&self, callback: Option<Function>) -> Result<(), JsValue> {
        self.with_grid(|s| {
            s.popover_callback = callback;
            Ok(())
        })
    }

    /// Report a measured popover size. Returns `{x, y}`, or `null` when the
    /// measurement is stale.
    #[wasm_bindgen(js_name = "placePopover")]
    pub fn place_popover(&self, kind: &str, generation: f64, width: f32, height: f32) -> Result<JsValue, JsValue> {
        let kind = parse_kind(kind)?;
        // Generations are small positive counters
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ticket = MeasureTicket {
            kind,
            generation: generation.max(0.0) as u64,
        };
        let (vw, vh) = window_size();
        let placement =
            self.with_grid(|s| s.grid.complete_popover_measurement(ticket, width, height, vw, vh))?;
        match placement {
            Some(p) => Ok(serde_wasm_bindgen::to_value(&p)?),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = "toggleFilterValue")]
    pub fn toggle_filter_value(&self, value: &str) -> Result<bool, JsValue> {
        self.with_grid(|s| s.grid.toggle_filter_value(value))
    }

    #[wasm_bindgen(js_name = "setSummaryRule")]
    pub fn set_summary_rule(&self, label: &str) -> Result<bool, JsValue> {
        let rule = SummaryRule::from_label(label)
            .ok_or_else(|| JsValue::from_str(&format!("unknown summary rule: {label}")))?;
        self.with_grid(|s| s.grid.set_summary_rule(rule))
    }

    /// Commit the open popover of `kind` ("filter" or "summary").
    #[wasm_bindgen(js_name = "commitPopover")]
    pub fn commit_popover(&self, kind: &str) -> Result<bool, JsValue> {
        let kind = parse_kind(kind)?;
        let committed = self.with_grid(|s| s.grid.commit_popover(kind))?;
        dispatch_events(&self.state);
        Ok(committed.is_some())
    }

    #[wasm_bindgen(js_name = "dismissPopovers")]
    pub fn dismiss_popovers(&self) -> Result<bool, JsValue> {
        self.with_grid(|s| s.grid.dismiss_popovers())
    }

    /// A document click, classified by the popover host.
    #[wasm_bindgen(js_name = "documentClick")]
    pub fn document_click(&self, inside_popover: bool, inside_nested_selector: bool) -> Result<bool, JsValue> {
        let target = if inside_nested_selector {
            ClickTarget::InsideNestedSelector
        } else if inside_popover {
            ClickTarget::InsidePopover
        } else {
            ClickTarget::Outside
        };
        self.with_grid(|s| s.grid.handle_document_click(target))
    }

    /// Visible shapes per layer, for debugging and tests.
    #[wasm_bindgen(js_name = "sceneSnapshot")]
    pub fn scene_snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.with_grid(|s| Ok(s.grid.scene_snapshot()))?;
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }

    /// Remove every listener, cancel the pending frame and resize timer.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for listener in &self.listeners {
            listener.detach();
        }
        self.listeners.clear();
        if let Ok(mut s) = self.state.try_borrow_mut() {
            if let (Some(window), Some(timer)) = (web_sys::window(), s.resize_timer.take()) {
                window.clear_timeout_with_handle(timer);
            }
            s.grid.teardown();
            s.event_callback = None;
            s.popover_callback = None;
            s.resize_callback = None;
        }
        self.destroyed = true;
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        self.destroy();
    }
}
