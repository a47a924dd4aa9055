use std::fmt;

/// Audio mixer controls forwarded to the host sound sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioControl {
    ToggleMute,
    VolumeUp,
    VolumeDown,
}

impl AudioControl {
    /// Method name on the host audio object.
    pub fn method(self) -> &'static str {
        match self {
            AudioControl::ToggleMute => "toggleMute",
            AudioControl::VolumeUp => "volumeUp",
            AudioControl::VolumeDown => "volumeDown",
        }
    }
}

/// An event the game emits for an external collaborator (audio, overlay, haptics).
/// The web bridge translates these into calls on the page's host object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// One-shot sound effect, identified by its host-side name.
    PlaySound(&'static str),
    /// Open the details panel for a project.
    OpenProject(String),
    /// Close the details panel.
    CloseOverlay,
    Audio(AudioControl),
    /// Vibration pulse in milliseconds.
    Haptic(u32),
}

/// Errors surfaced while bringing a game up. Per-frame code never fails.
#[derive(Debug)]
pub enum EngineError {
    /// The drawing surface could not be found or created.
    SurfaceUnavailable(String),
    /// The game could not build its world.
    Init(String),
    /// Engine configuration could not be parsed.
    Config(serde_json::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::SurfaceUnavailable(e) => write!(f, "Drawing surface unavailable: {}", e),
            EngineError::Init(e) => write!(f, "Initialization failed: {}", e),
            EngineError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}
