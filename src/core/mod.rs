//! Engine internals: effect computation, atomic mutation batches, schedule
//! math, and the service layer built on top of them.

pub mod coordinator;
pub mod effects;
pub mod schedule;
pub mod services;

pub use coordinator::MutationBatch;
pub use effects::{transaction_effects, AggregateRef, Delta};
pub use schedule::{next_due_date, MAX_SCHEDULE_STEPS};
