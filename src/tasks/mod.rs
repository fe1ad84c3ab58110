//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Page cache sweep: removes expired entries
//! - Rate limiter sweep: drops identifiers with no admissions left in the window

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweep, SweeperHandle};
