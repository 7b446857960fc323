use crate::dom::NodeHandle;

/// Keys the picker and the player react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a host key name (`KeyboardEvent.key` style) to a [`Key`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Input delivered by the host, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PointerMove { target: NodeHandle },
    Click { target: NodeHandle },
    KeyDown { key: Key },
}

impl InputEvent {
    pub fn pointer_move(target: NodeHandle) -> Self {
        InputEvent::PointerMove { target }
    }

    pub fn click(target: NodeHandle) -> Self {
        InputEvent::Click { target }
    }

    pub fn key(name: &str) -> Self {
        InputEvent::KeyDown { key: Key::from_name(name) }
    }
}
