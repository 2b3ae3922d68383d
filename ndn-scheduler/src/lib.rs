//! A deadline-ordered event scheduler coalesced onto a single timer.

pub mod reactor;
pub mod scheduler;

pub use reactor::{ManualReactor, Reactor, SystemReactor};
pub use scheduler::{EventId, Scheduler};
