// extensions/mod.rs
//
// Optional animation helpers. Decoupled from the game world: owners hold
// the records and advance them.

pub mod easing;
pub mod tween;

pub use easing::{ease, lerp, Easing};
pub use tween::{Tween, TweenShape};
