//! DOM event listeners feeding the runner's input queue.

use std::cell::RefCell;
use std::rc::Rc;

use folio_engine::{Game, InputEvent, Key};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, TouchEvent};

use crate::canvas::CanvasSurface;
use crate::runner::GameRunner;

type Handler = Closure<dyn FnMut(Event)>;

/// Registered listeners. Dropping without `detach` leaves them attached.
pub struct Listeners {
    attached: Vec<(EventTarget, &'static str, Handler)>,
}

impl Listeners {
    fn new() -> Self {
        Self { attached: Vec::new() }
    }

    fn add(&mut self, target: &EventTarget, name: &'static str, handler: Handler) {
        if let Err(e) = target.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref()) {
            log::warn!("dom: cannot listen for '{}': {:?}", name, e);
            return;
        }
        self.attached.push((target.clone(), name, handler));
    }

    /// Remove every listener.
    pub fn detach(&mut self) {
        for (target, name, handler) in self.attached.drain(..) {
            let _ = target.remove_event_listener_with_callback(name, handler.as_ref().unchecked_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

/// Keyboard, touch, blur and resize listeners.
pub fn attach<G: Game + 'static>(
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
    runner: Rc<RefCell<GameRunner<G>>>,
    surface: Rc<RefCell<CanvasSurface>>,
) -> Listeners {
    let mut listeners = Listeners::new();
    let window_target: &EventTarget = window.as_ref();
    let canvas_target: &EventTarget = canvas.as_ref();

    // Keyboard
    for (name, down) in [("keydown", true), ("keyup", false)] {
        let runner = runner.clone();
        let handler = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let Some(key) = Key::from_code(&event.code()) else {
                return;
            };
            // Keep arrows and space from scrolling the page
            event.prevent_default();
            let input = if down {
                InputEvent::KeyDown { key }
            } else {
                InputEvent::KeyUp { key }
            };
            if let Ok(mut r) = runner.try_borrow_mut() {
                r.push_input(input);
            }
        });
        listeners.add(window_target, name, handler);
    }

    // Touch
    for name in ["touchstart", "touchmove", "touchend", "touchcancel"] {
        let runner = runner.clone();
        let canvas = canvas.clone();
        let handler = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            event.prevent_default();
            let rect = canvas.get_bounding_client_rect();
            let touches = event.changed_touches();
            let Ok(mut r) = runner.try_borrow_mut() else {
                return;
            };
            for i in 0..touches.length() {
                let Some(touch) = touches.get(i) else {
                    continue;
                };
                let id = touch.identifier();
                let x = touch.client_x() as f32 - rect.left() as f32;
                let y = touch.client_y() as f32 - rect.top() as f32;
                r.push_input(match name {
                    "touchstart" => InputEvent::TouchStart { id, x, y },
                    "touchmove" => InputEvent::TouchMove { id, x, y },
                    _ => InputEvent::TouchEnd { id },
                });
            }
        });
        listeners.add(canvas_target, name, handler);
    }

    // Focus loss releases everything
    {
        let runner = runner.clone();
        let handler = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
            if let Ok(mut r) = runner.try_borrow_mut() {
                r.push_input(InputEvent::Blur);
            }
        });
        listeners.add(window_target, "blur", handler);
    }

    // Resize
    {
        let window = window.clone();
        let handler = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
            let (w, h) = viewport_size(&window);
            surface.borrow().resize(w as u32, h as u32);
            if let Ok(mut r) = runner.try_borrow_mut() {
                r.resize(w, h);
            }
        });
        listeners.add(window_target, "resize", handler);
    }

    listeners
}

/// Inner size of the browser window in CSS pixels.
pub fn viewport_size(window: &web_sys::Window) -> (f32, f32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (dim(window.inner_width()), dim(window.inner_height()))
}
