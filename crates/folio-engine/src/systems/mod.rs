pub mod particles;
pub mod rng;
#[cfg(feature = "physics")]
pub mod debug;
