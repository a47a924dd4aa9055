pub mod app;
pub mod canvas;
pub mod dom;
pub mod host;
pub mod runner;

pub use app::App;
pub use canvas::CanvasSurface;
pub use host::LocalStore;
pub use runner::GameRunner;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the running `App`
/// - `with_runner()` helper function
/// - the lifecycle exports the page calls: `game_start`, `game_pause`,
///   `game_resume`, `game_reset`, `game_overlay_closed`, `game_destroy`
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod game;
/// use game::MyGame;
///
/// folio_web::export_game!(MyGame, "my-game");
/// ```
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `folio_engine::Game`
///   and has a `new()` constructor
/// - `$game_name`: A string literal used in log messages
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static APP: RefCell<Option<$crate::App<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            APP.with(|cell| {
                let borrow = cell.borrow();
                let Some(app) = borrow.as_ref() else {
                    log::warn!("{}: not started, call game_start() first", $game_name);
                    return None;
                };
                let mut runner = app.runner().try_borrow_mut().ok()?;
                Some(f(&mut runner))
            })
        }

        #[wasm_bindgen]
        pub fn game_start(canvas_id: &str) -> Result<(), JsValue> {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            APP.with(|cell| {
                if let Some(mut old) = cell.borrow_mut().take() {
                    old.destroy();
                }
            });

            let app = $crate::app::start(<$game_type>::new(), canvas_id)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            APP.with(|cell| {
                *cell.borrow_mut() = Some(app);
            });
            log::info!("{}: initialized", $game_name);
            Ok(())
        }

        #[wasm_bindgen]
        pub fn game_pause() {
            with_runner(|r| r.pause());
        }

        #[wasm_bindgen]
        pub fn game_resume() {
            with_runner(|r| r.resume());
        }

        #[wasm_bindgen]
        pub fn game_reset() {
            let events = with_runner(|r| r.reset()).unwrap_or_default();
            $crate::host::dispatch(&events);
        }

        #[wasm_bindgen]
        pub fn game_overlay_closed() {
            with_runner(|r| r.overlay_closed());
        }

        #[wasm_bindgen]
        pub fn game_is_paused() -> bool {
            with_runner(|r| r.is_paused()).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn game_destroy() {
            APP.with(|cell| {
                if let Some(mut app) = cell.borrow_mut().take() {
                    app.destroy();
                    log::info!("{}: destroyed", $game_name);
                }
            });
        }
    };
}
