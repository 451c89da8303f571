//! Dashboard domain: events in, session state out.

pub mod card;
pub mod events;
pub mod relative_time;
pub mod session;
pub mod status;
