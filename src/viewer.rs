//! # Kiosk Session
//!
//! Wires the pure controllers to the page: builds the slides wrapper and the
//! indicator dots, renders the document, and installs keyboard, wheel,
//! touch, button and scroll listeners.
//!
//! ## Ownership
//!
//! All mutable navigation state lives in one `RefCell` inside [`Shared`].
//! Event listeners hold an `Rc<Shared>` and are owned by [`KioskSession`];
//! timers are stored inside `Shared` and therefore only hold a `Weak`.
//! Borrows are released before any DOM call that could dispatch events.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::timers::callback::Timeout;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, HtmlButtonElement, HtmlElement, KeyboardEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, TouchEvent, TransitionEvent, WheelEvent,
};

use crate::dom::{self, dom_error};
use crate::indicator::IndicatorRow;
use crate::input::{
    drag_offset_vw, key_command, DragUpdate, NavCommand, ScrollDrag, SwipeThresholds,
    SwipeTracker, WheelBurst,
};
use crate::loader::{self, LoadedDocument};
use crate::navigation::{NavigationController, Transition};
use crate::pdfjs_bindings::PdfDocumentHandle;
use crate::renderer::{render_all, PdfJsPages, RenderedPage};
use crate::schema::{KioskError, KioskOptions, NavigationMode};

/// Delay before the vacated dot loses `active`, so its collapse starts from
/// the origin set in the same frame.
const DOT_RELEASE_DELAY_MS: u32 = 10;

const ACTIVE_CLASS: &str = "active";
const FILL_FROM_RIGHT_CLASS: &str = "fill-from-right";

struct Elements {
    wrapper: HtmlElement,
    dots: Vec<HtmlElement>,
    prev: Option<HtmlButtonElement>,
    next: Option<HtmlButtonElement>,
}

struct SessionState {
    controller: NavigationController,
    indicators: IndicatorRow,
    swipe: SwipeTracker,
    scroll_drag: Option<ScrollDrag>,
    wheel: WheelBurst,
    // Replacing a pending timer drops it, which cancels it.
    wheel_timer: Option<Timeout>,
    scroll_timer: Option<Timeout>,
    completion_timer: Option<Timeout>,
    dot_release_timer: Option<Timeout>,
}

struct Shared {
    options: KioskOptions,
    // kept alive for the session
    _document: PdfDocumentHandle,
    pages: Vec<RenderedPage<HtmlElement>>,
    elements: Elements,
    state: RefCell<SessionState>,
}

/// A running slideshow. Dropping it removes every listener.
pub struct KioskSession {
    shared: Rc<Shared>,
    _listeners: Vec<EventListener>,
}

impl KioskSession {
    /// Loads, renders and wires up the slideshow inside `container`.
    ///
    /// # Errors
    ///
    /// Any [`KioskError`] from discovery, loading or rendering. The caller
    /// is expected to show it in `container`.
    pub async fn start(
        options: KioskOptions,
        document: &Document,
        container: &HtmlElement,
    ) -> Result<Self, KioskError> {
        let LoadedDocument {
            handle,
            page_count,
            url,
        } = loader::load(&options).await?;

        dom::clear(container);
        let wrapper: HtmlElement = dom::create_element(document, "div")?;
        wrapper.set_class_name("pdf-slides-wrapper");
        wrapper.set_id("slidesWrapper");
        if options.navigation == NavigationMode::Scroll {
            container
                .class_list()
                .add_1("scroll-mode")
                .map_err(dom_error)?;
        }
        container.append_child(&wrapper).map_err(dom_error)?;

        let pages = render_all(
            &PdfJsPages::new(&handle, page_count, &wrapper, document),
            options.scale,
        )
        .await?;
        info!("{}: {} pages ready", url, pages.len());
        let dots = build_dots(document, &options, page_count)?;

        let elements = Elements {
            wrapper,
            dots,
            prev: dom::optional_element(document, &options.prev_button_id),
            next: dom::optional_element(document, &options.next_button_id),
        };
        let state = SessionState {
            controller: NavigationController::new(page_count, options.navigation),
            indicators: IndicatorRow::new(page_count),
            swipe: SwipeTracker::new(SwipeThresholds::from(&options)),
            scroll_drag: None,
            wheel: WheelBurst::default(),
            wheel_timer: None,
            scroll_timer: None,
            completion_timer: None,
            dot_release_timer: None,
        };
        let shared = Rc::new(Shared {
            options,
            _document: handle,
            pages,
            elements,
            state: RefCell::new(state),
        });

        if shared.options.navigation == NavigationMode::Paging {
            shared.set_offset(0.0);
        }
        shared.paint_dots(None);
        shared.refresh_buttons();

        let listeners = install_listeners(&shared, document, container);
        Ok(Self {
            shared,
            _listeners: listeners,
        })
    }

    pub fn page_count(&self) -> usize {
        self.shared.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.shared.state.borrow().controller.current()
    }

    /// Programmatic navigation; same rules as user input.
    pub fn go_to(&self, index: usize) -> bool {
        self.shared.navigate(NavCommand::Page(index))
    }
}

fn build_dots(
    document: &Document,
    options: &KioskOptions,
    page_count: usize,
) -> Result<Vec<HtmlElement>, KioskError> {
    let Some(container) = dom::optional_element::<HtmlElement>(document, &options.dots_id) else {
        warn!("#{} not found; running without indicator dots", options.dots_id);
        return Ok(Vec::new());
    };
    dom::clear(&container);
    let mut dots = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let dot: HtmlElement = dom::create_element(document, "div")?;
        dot.set_class_name("page-dot");
        container.append_child(&dot).map_err(dom_error)?;
        dots.push(dot);
    }
    Ok(dots)
}

/// Interactive DOM updates fail quietly.
fn log_dom_failure<T>(what: &str, result: Result<T, wasm_bindgen::JsValue>) {
    if let Err(e) = result {
        debug!("{} failed: {}", what, dom_error(e));
    }
}

fn blocking_options() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    }
}

fn touch_point(event: &Event, changed: bool) -> Option<(f64, f64)> {
    let event = event.dyn_ref::<TouchEvent>()?;
    let touches = if changed {
        event.changed_touches()
    } else {
        event.touches()
    };
    if !changed && touches.length() != 1 {
        return None;
    }
    let touch = touches.get(0)?;
    Some((touch.client_x() as f64, touch.client_y() as f64))
}

fn install_listeners(
    shared: &Rc<Shared>,
    document: &Document,
    container: &HtmlElement,
) -> Vec<EventListener> {
    let mut listeners = Vec::new();

    let view = Rc::clone(shared);
    listeners.push(EventListener::new_with_options(
        document,
        "keydown",
        blocking_options(),
        move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let Some(command) = key_command(&event.key()) else {
                return;
            };
            event.prevent_default();
            view.navigate(command);
        },
    ));

    let view = Rc::clone(shared);
    listeners.push(EventListener::new(document, "wheel", move |event: &Event| {
        if let Some(event) = event.dyn_ref::<WheelEvent>() {
            view.debounce_wheel(event.delta_y());
        }
    }));

    let view = Rc::clone(shared);
    listeners.push(EventListener::new(
        container,
        "touchstart",
        move |event: &Event| {
            if let Some((x, y)) = touch_point(event, false) {
                view.touch_start(x, y);
            }
        },
    ));

    let view = Rc::clone(shared);
    listeners.push(EventListener::new_with_options(
        container,
        "touchmove",
        blocking_options(),
        move |event: &Event| {
            if let Some((x, y)) = touch_point(event, false) {
                if view.touch_move(x, y) {
                    event.prevent_default();
                }
            }
        },
    ));

    let view = Rc::clone(shared);
    listeners.push(EventListener::new(container, "touchend", move |event: &Event| {
        view.touch_end(touch_point(event, true));
    }));

    let view = Rc::clone(shared);
    listeners.push(EventListener::new(
        container,
        "touchcancel",
        move |_event: &Event| {
            view.touch_end(None);
        },
    ));

    match shared.options.navigation {
        NavigationMode::Paging => {
            let view = Rc::clone(shared);
            listeners.push(EventListener::new(
                &shared.elements.wrapper,
                "transitionend",
                move |event: &Event| {
                    let Some(event) = event.dyn_ref::<TransitionEvent>() else {
                        return;
                    };
                    let on_wrapper = event
                        .target()
                        .is_some_and(|t| t.dyn_ref::<HtmlElement>() == Some(&view.elements.wrapper));
                    if on_wrapper && event.property_name() == "transform" {
                        view.finish_transition();
                    }
                },
            ));
        }
        NavigationMode::Scroll => {
            let view = Rc::clone(shared);
            listeners.push(EventListener::new(
                &shared.elements.wrapper,
                "scroll",
                move |_event: &Event| view.debounce_scroll(),
            ));
        }
    }

    for (index, dot) in shared.elements.dots.iter().enumerate() {
        let view = Rc::clone(shared);
        listeners.push(EventListener::new(dot, "click", move |_event: &Event| {
            view.navigate(NavCommand::Page(index));
        }));
    }

    for (button, command) in [
        (&shared.elements.prev, NavCommand::Previous),
        (&shared.elements.next, NavCommand::Next),
    ] {
        if let Some(button) = button {
            let view = Rc::clone(shared);
            listeners.push(EventListener::new(button, "click", move |_event: &Event| {
                view.navigate(command);
            }));
        }
    }

    listeners
}

impl Shared {
    /// Runs a command through the controller and presents the result.
    /// Returns whether the controller accepted it.
    fn navigate(self: &Rc<Self>, command: NavCommand) -> bool {
        let transition = self.state.borrow_mut().controller.apply(command);
        match transition {
            Some(transition) => {
                self.present(transition);
                true
            }
            None => {
                debug!("ignored {:?}", command);
                false
            }
        }
    }

    fn present(self: &Rc<Self>, transition: Transition) {
        match self.options.navigation {
            NavigationMode::Paging => {
                self.set_offset(transition.offset_vw());
                self.arm_completion();
            }
            NavigationMode::Scroll => self.scroll_to_page(transition.to),
        }
        self.state.borrow_mut().indicators.apply(&transition);
        self.paint_dots(Some(transition.from));
        self.refresh_buttons();
    }

    fn set_offset(&self, offset_vw: f64) {
        log_dom_failure(
            "setting wrapper offset",
            self.elements
                .wrapper
                .style()
                .set_property("transform", &format!("translateX({}vw)", offset_vw)),
        );
    }

    fn set_drag_mode(&self, dragging: bool) {
        let style = self.elements.wrapper.style();
        let result = if dragging {
            style.set_property("transition", "none")
        } else {
            style.remove_property("transition").map(|_| ())
        };
        log_dom_failure("toggling drag mode", result);
    }

    fn snap_back(&self) {
        let resting = self.state.borrow().controller.resting_offset_vw();
        self.set_offset(resting);
    }

    /// Fallback for a missing `transitionend` (e.g. the transform did not
    /// change visually or transitions are disabled in CSS).
    fn arm_completion(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let timer = Timeout::new(self.options.transition_ms, move || {
            // The timer is not dropped from inside its own callback.
            if let Some(shared) = weak.upgrade() {
                shared.state.borrow_mut().controller.finish_transition();
            }
        });
        self.state.borrow_mut().completion_timer = Some(timer);
    }

    fn finish_transition(&self) {
        let mut state = self.state.borrow_mut();
        if state.controller.finish_transition() {
            state.completion_timer = None;
        }
    }

    fn paint_dots(self: &Rc<Self>, vacated: Option<usize>) {
        let states = self.state.borrow().indicators.dots().to_vec();
        for (index, (dot, dot_state)) in self.elements.dots.iter().zip(states).enumerate() {
            let classes = dot.class_list();
            log_dom_failure(
                "setting dot origin",
                classes.toggle_with_force(FILL_FROM_RIGHT_CLASS, dot_state.fill_from_right),
            );
            if vacated == Some(index) && !dot_state.active {
                self.release_dot_later(index);
            } else {
                log_dom_failure(
                    "setting dot state",
                    classes.toggle_with_force(ACTIVE_CLASS, dot_state.active),
                );
            }
        }
    }

    /// Replaces any pending release. The dot it was waiting on is already
    /// settled by the repaint that triggered this call.
    fn release_dot_later(self: &Rc<Self>, index: usize) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let timer = Timeout::new(DOT_RELEASE_DELAY_MS, move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let still_inactive = shared
                .state
                .borrow()
                .indicators
                .dots()
                .get(index)
                .is_some_and(|d| !d.active);
            if let (true, Some(dot)) = (still_inactive, shared.elements.dots.get(index)) {
                log_dom_failure("releasing dot", dot.class_list().remove_1(ACTIVE_CLASS));
            }
        });
        self.state.borrow_mut().dot_release_timer = Some(timer);
    }

    fn refresh_buttons(&self) {
        let (back, forward) = {
            let state = self.state.borrow();
            (state.controller.can_go_back(), state.controller.can_go_forward())
        };
        if let Some(prev) = &self.elements.prev {
            prev.set_disabled(!back);
        }
        if let Some(next) = &self.elements.next {
            next.set_disabled(!forward);
        }
    }

    fn debounce_wheel(self: &Rc<Self>, delta_y: f64) {
        let weak = Rc::downgrade(self);
        let timer = Timeout::new(self.options.wheel_debounce_ms, move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let command = shared.state.borrow_mut().wheel.flush();
            if let Some(command) = command {
                shared.navigate(command);
            }
        });
        let mut state = self.state.borrow_mut();
        state.wheel.record(delta_y);
        state.wheel_timer = Some(timer);
    }

    fn touch_start(&self, x: f64, y: f64) {
        match self.options.navigation {
            NavigationMode::Paging => {
                let tracking = {
                    let mut state = self.state.borrow_mut();
                    let idle = !state.controller.is_transitioning();
                    state.swipe.begin_if(idle, x, y)
                };
                if tracking {
                    self.set_drag_mode(true);
                }
            }
            NavigationMode::Scroll => {
                let scroll = self.elements.wrapper.scroll_left() as f64;
                self.state.borrow_mut().scroll_drag = Some(ScrollDrag::new(x, scroll));
            }
        }
    }

    /// Returns `true` when the move was consumed and native scrolling
    /// should be suppressed.
    fn touch_move(&self, x: f64, y: f64) -> bool {
        match self.options.navigation {
            NavigationMode::Paging => {
                let (update, resting) = {
                    let state = self.state.borrow();
                    (state.swipe.track(x, y), state.controller.resting_offset_vw())
                };
                match update {
                    Some(DragUpdate::Follow { dx }) => {
                        self.set_offset(drag_offset_vw(resting, dx, dom::viewport_width()));
                        true
                    }
                    Some(DragUpdate::Ignore) | None => false,
                }
            }
            NavigationMode::Scroll => {
                let drag = self.state.borrow().scroll_drag;
                match drag {
                    Some(drag) => {
                        self.elements
                            .wrapper
                            .scroll_to_with_x_and_y(drag.scroll_for(x), 0.0);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn touch_end(self: &Rc<Self>, end: Option<(f64, f64)>) {
        match self.options.navigation {
            NavigationMode::Paging => {
                let transition = {
                    let mut state = self.state.borrow_mut();
                    let Some(outcome) = state.swipe.release(end) else {
                        return;
                    };
                    state.controller.resolve_swipe(outcome)
                };
                self.set_drag_mode(false);
                match transition {
                    Some(transition) => self.present(transition),
                    None => self.snap_back(),
                }
            }
            NavigationMode::Scroll => {
                self.state.borrow_mut().scroll_drag = None;
            }
        }
    }

    fn scroll_to_page(&self, index: usize) {
        let Some(page) = self.pages.iter().find(|p| p.index == index) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Nearest);
        options.set_inline(ScrollLogicalPosition::Center);
        page.surface
            .scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn debounce_scroll(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let timer = Timeout::new(self.options.scroll_debounce_ms, move || {
            if let Some(shared) = weak.upgrade() {
                shared.sync_from_scroll();
            }
        });
        self.state.borrow_mut().scroll_timer = Some(timer);
    }

    /// Adopts the page nearest the viewport centre as current.
    fn sync_from_scroll(self: &Rc<Self>) {
        let centers: Vec<f64> = self
            .pages
            .iter()
            .map(|page| {
                let rect = page.surface.get_bounding_client_rect();
                rect.left() + rect.width() / 2.0
            })
            .collect();
        let transition = self
            .state
            .borrow_mut()
            .controller
            .settle_scroll(&centers, dom::viewport_width() / 2.0);
        if let Some(transition) = transition {
            self.state.borrow_mut().indicators.apply(&transition);
            self.paint_dots(Some(transition.from));
            self.refresh_buttons();
        }
    }
}
