pub mod camera;
pub mod surface;

pub use camera::{Bounds, Camera, CameraConfig, ShakePreset};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
