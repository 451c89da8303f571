//! Feature slices for the dashboard (state/update/render per slice).

pub mod feed;
pub mod header;
pub mod input;
