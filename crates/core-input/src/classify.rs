//! Event to [`KeyAction`] classification.
//!
//! The control table holds only the bare keys that drive the
//! application loop. Everything else is a literal carrying its original bytes.

use core_events::{InputEvent, KeyAction};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

static CONTROL_TABLE: LazyLock<HashMap<&'static [u8], KeyAction>> = LazyLock::new(|| {
    HashMap::from([
        (b"\x1b".as_slice(), KeyAction::Escape),
        (b"\r".as_slice(), KeyAction::Enter),
        (b"\x1b[A".as_slice(), KeyAction::MoveUp),
        (b"\x1b[B".as_slice(), KeyAction::MoveDown),
        (b"\x1b[D".as_slice(), KeyAction::MoveLeft),
        (b"\x1b[C".as_slice(), KeyAction::MoveRight),
    ])
});

/// Classify one decoded event.
pub fn classify(event: &InputEvent) -> KeyAction {
    let action = match event {
        InputEvent::Control(_) | InputEvent::EscapeSequence(_) => {
            CONTROL_TABLE.get(event.as_bytes()).cloned()
        }
        InputEvent::CodePoint { .. } => None,
    }
    .unwrap_or_else(|| KeyAction::literal(event.as_bytes()));
    trace!(
        target: "input.classify",
        kind = event.kind(),
        action = action_name(&action),
        "classified"
    );
    action
}

/// Classify the result of a non-blocking poll; no event means [`KeyAction::None`].
pub fn classify_polled(event: Option<&InputEvent>) -> KeyAction {
    event.map(classify).unwrap_or_default()
}

fn action_name(action: &KeyAction) -> &'static str {
    match action {
        KeyAction::None => "none",
        KeyAction::Escape => "escape",
        KeyAction::Enter => "enter",
        KeyAction::MoveUp => "move_up",
        KeyAction::MoveDown => "move_down",
        KeyAction::MoveLeft => "move_left",
        KeyAction::MoveRight => "move_right",
        KeyAction::Literal(_) => "literal",
    }
}
