//! Browser bootstrap: canvas lookup, listeners and the animation loop.

use std::cell::RefCell;
use std::rc::Rc;

use folio_engine::{EngineError, Game};
use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::canvas::CanvasSurface;
use crate::dom::{self, Listeners};
use crate::host::{self, LocalStore};
use crate::runner::GameRunner;

/// A running game and everything attached to the page on its behalf.
pub struct App<G: Game + 'static> {
    runner: Rc<RefCell<GameRunner<G>>>,
    listeners: Listeners,
}

impl<G: Game + 'static> App<G> {
    pub fn runner(&self) -> &Rc<RefCell<GameRunner<G>>> {
        &self.runner
    }

    /// Stop the loop and detach listeners. The pending frame sees the
    /// destroyed flag and does not reschedule.
    pub fn destroy(&mut self) {
        self.listeners.detach();
        let events = match self.runner.try_borrow_mut() {
            Ok(mut r) => r.destroy(),
            Err(_) => return,
        };
        host::dispatch(&events);
    }
}

/// Find `canvas_id`, size it to the window, initialize `game` and start the
/// animation loop. An error leaves nothing scheduled.
pub fn start<G: Game + 'static>(game: G, canvas_id: &str) -> Result<App<G>, EngineError> {
    let window = web_sys::window().ok_or_else(|| EngineError::SurfaceUnavailable("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| EngineError::SurfaceUnavailable("no document".into()))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| EngineError::SurfaceUnavailable(format!("no element #{}", canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| EngineError::SurfaceUnavailable(format!("#{} is not a canvas", canvas_id)))?;

    let mut surface = CanvasSurface::new(canvas.clone()).map_err(EngineError::SurfaceUnavailable)?;
    let (w, h) = dom::viewport_size(&window);
    surface.resize(w as u32, h as u32);

    let mut runner = GameRunner::new(game, Box::new(LocalStore::new()));
    for (key, url) in runner.sprite_sources() {
        surface.load_image(&key, &url);
    }
    runner.init(Vec2::new(w, h))?;
    host::apply_dev_flag();

    let runner = Rc::new(RefCell::new(runner));
    let surface = Rc::new(RefCell::new(surface));
    let listeners = dom::attach(&window, &canvas, runner.clone(), surface.clone());

    request_animation_frame(runner.clone(), surface);

    Ok(App { runner, listeners })
}

fn request_animation_frame<G: Game + 'static>(
    runner: Rc<RefCell<GameRunner<G>>>,
    surface: Rc<RefCell<CanvasSurface>>,
) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        frame(runner, surface, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn frame<G: Game + 'static>(runner: Rc<RefCell<GameRunner<G>>>, surface: Rc<RefCell<CanvasSurface>>, time: f64) {
    let events = {
        let mut r = runner.borrow_mut();
        if r.is_destroyed() {
            log::info!("loop stopped");
            return;
        }
        r.tick(time, &mut *surface.borrow_mut())
    };
    // Host callbacks may call back into the exports, so no borrow is held here.
    host::dispatch(&events);
    request_animation_frame(runner, surface);
}
