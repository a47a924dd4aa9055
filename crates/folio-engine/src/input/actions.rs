use std::collections::HashMap;

/// Physical keys the engine listens for, named after DOM `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    KeyA,
    KeyD,
    KeyW,
    KeyM,
    Space,
    F1,
    Equal,
    Minus,
    NumpadAdd,
    NumpadSubtract,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` string. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Key> {
        let key = match code {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "KeyA" => Key::KeyA,
            "KeyD" => Key::KeyD,
            "KeyW" => Key::KeyW,
            "KeyM" => Key::KeyM,
            "Space" => Key::Space,
            "F1" => Key::F1,
            "Equal" => Key::Equal,
            "Minus" => Key::Minus,
            "NumpadAdd" => Key::NumpadAdd,
            "NumpadSubtract" => Key::NumpadSubtract,
            _ => return None,
        };
        Some(key)
    }
}

/// Logical actions a game reads. Physical keys and touch widgets map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Jump,
    Debug,
    Mute,
    VolumeUp,
    VolumeDown,
}

impl Action {
    pub const COUNT: usize = 8;

    pub const ALL: [Action; Action::COUNT] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Jump,
        Action::Debug,
        Action::Mute,
        Action::VolumeUp,
        Action::VolumeDown,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Key → action table.
#[derive(Debug, Clone)]
pub struct Bindings {
    map: HashMap<Key, Action>,
}

impl Bindings {
    pub fn empty() -> Self {
        Self { map: HashMap::new() }
    }

    /// Bind each key to `action`, replacing any previous binding of those keys.
    pub fn bind(mut self, action: Action, keys: &[Key]) -> Self {
        for key in keys {
            self.map.insert(*key, action);
        }
        self
    }

    pub fn action_for(&self, key: Key) -> Option<Action> {
        self.map.get(&key).copied()
    }

    /// Keys currently bound to `action`.
    pub fn keys_for(&self, action: Action) -> Vec<Key> {
        self.map
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings::empty()
            .bind(Action::Left, &[Key::ArrowLeft, Key::KeyA])
            .bind(Action::Right, &[Key::ArrowRight, Key::KeyD])
            .bind(Action::Jump, &[Key::Space])
            .bind(Action::Up, &[Key::ArrowUp, Key::KeyW])
            .bind(Action::Debug, &[Key::F1])
            .bind(Action::Mute, &[Key::KeyM])
            .bind(Action::VolumeUp, &[Key::Equal, Key::NumpadAdd])
            .bind(Action::VolumeDown, &[Key::Minus, Key::NumpadSubtract])
    }
}
