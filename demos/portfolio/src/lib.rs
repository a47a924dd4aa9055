use wasm_bindgen::prelude::*;

pub mod collectible;
pub mod entity;
pub mod events;
pub mod game;
pub mod level;
pub mod mystery_box;
pub mod persistence;
pub mod player;
pub mod respawn;
pub mod tuning;

pub use game::PortfolioGame;

folio_web::export_game!(PortfolioGame, "portfolio");
