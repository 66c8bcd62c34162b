//! Stream resolution
//!
//! - State: explicit lookup/submit/reconcile/ready state machine
//! - Resolver: drives the state machine against Torbox for each source
//! - Locks: serializes submissions of the same info-hash

pub mod locks;
pub mod resolver;
pub mod state;

pub use locks::SubmissionLocks;
pub use resolver::StreamResolver;
pub use state::{Outcome, Resolution, RetryPolicy};
