use folio_engine::HostEvent;

/// One-shot sounds the host audio sink knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Jump,
    DoubleJump,
    Land,
    Death,
    Respawn,
    MysteryBoxHit,
    MysteryBoxComplete,
}

impl SoundKind {
    pub fn name(self) -> &'static str {
        match self {
            SoundKind::Jump => "jump",
            SoundKind::DoubleJump => "doubleJump",
            SoundKind::Land => "land",
            SoundKind::Death => "death",
            SoundKind::Respawn => "respawn",
            SoundKind::MysteryBoxHit => "mysteryBoxHit",
            SoundKind::MysteryBoxComplete => "mysteryBoxComplete",
        }
    }
}

impl From<SoundKind> for HostEvent {
    fn from(kind: SoundKind) -> Self {
        HostEvent::PlaySound(kind.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sounds_map_to_host_names() {
        assert_eq!(HostEvent::from(SoundKind::DoubleJump), HostEvent::PlaySound("doubleJump"));
        assert_eq!(SoundKind::MysteryBoxComplete.name(), "mysteryBoxComplete");
    }
}
