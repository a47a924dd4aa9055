pub mod game;
pub mod store;
pub mod types;
