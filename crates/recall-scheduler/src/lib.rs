//! `recall-scheduler` — escalating reminder chains on Tokio timers.
//!
//! # Overview
//!
//! Every `(owner, subject)` pair owns at most one live timer. When it fires
//! the [`engine::ReminderScheduler`] re-checks the entry in the store,
//! notifies the [`sink::NotificationSink`], and either arms the next step or
//! removes the entry once the [`policy::IntervalPolicy`] is exhausted.
//!
//! # Default intervals
//!
//! | Step | Production | Staging |
//! |------|------------|---------|
//! | 1    | 1 hour     | 10 s    |
//! | 2    | 1 day      | 11 s    |
//! | 3    | 3 days     | 13 s    |
//! | 4    | 1 week     | 14 s    |
//! | 5    | 2 weeks    | 20 s    |
//! | 6    | 4 weeks    | 24 s    |
//!
//! Step 7 is terminal: the sixth firing is the last one.

pub mod engine;
pub mod error;
pub mod policy;
pub mod sink;
pub mod types;

pub use engine::ReminderScheduler;
pub use error::{Result, SchedulerError};
pub use policy::IntervalPolicy;
pub use sink::{DeliveryError, NotificationSink};
pub use types::{Firing, TimerInfo};
