//! Suggestion box slice.

mod render;
mod state;
mod update;

pub use render::{INPUT_HEIGHT, render_input};
pub use state::InputState;
pub use update::{InputAction, handle_key, handle_paste};
