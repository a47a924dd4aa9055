pub mod actions;
pub mod queue;
pub mod state;
pub mod touch;
