mod accounting;
mod engine;

pub use accounting::BorrowEvent;
pub use engine::{Timer, TimerStatus, TransitionError};
