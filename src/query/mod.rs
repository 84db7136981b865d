//! Guarded Query Executor: the single capability exposed to the agent.
//!
//! [`guard`] holds the text-level read-only policy; [`executor`] runs accepted
//! queries on a read-only connection and renders the outcome as text.

pub mod executor;
pub mod guard;

pub use executor::{GuardedExecutor, QueryExecutor, QueryOutcome, NO_RESULTS};
pub use guard::{Refusal, READ_ONLY_ERROR};
