//! Market State Bounded Context
//!
//! Ephemeral per-cycle views of the book, the venue's position and the
//! configured trading sessions.

mod book_state;
mod position;
mod session;

pub use book_state::{BookState, Quote};
pub use position::PositionState;
pub use session::{SessionCalendar, SessionWindow};
