//! Activity feed slice: scroll state and card rendering.

mod render;
mod state;

pub use render::{card_lines, feed_line_count, render_feed};
pub use state::{ScrollMode, ScrollState};
