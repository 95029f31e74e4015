//! Rebuild-on-change protocol.
//!
//! Every trigger runs a full rebuild: snapshot the store, build, cancel every
//! pending notification, schedule the new ones. Nothing is ever diffed.
//!
//! - [`Rescheduler`]: Runs rebuilds, the most recent one wins
//! - [`SchedulerState`]: Decides from the date and the settings whether a rebuild is due

mod protocol;
mod state;

use thiserror::Error;

use crate::{dispatch::DispatchError, schedule::ScheduleError};

pub use crate::rescheduler::protocol::{RebuildOutcome, Rescheduler};
pub use crate::rescheduler::state::{SchedulerState, Trigger, fingerprint};

/// Errors aborting a rebuild.
#[derive(Debug, Error)]
pub enum RescheduleError {
    /// Neither the store nor the configuration has a location.
    #[error("no location configured")]
    MissingLocation,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
