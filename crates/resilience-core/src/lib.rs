//! Shared infrastructure for the data source resilience workspace: the event
//! system every component uses for observability, the facade-level error
//! envelope, wall-clock helpers for UTC-aligned windows, and the
//! deadline/cancellation primitives threaded through every outbound call.

pub mod clock;
pub mod deadline;
pub mod error;
pub mod events;

pub use deadline::{cancel_pair, CancelHandle, CancelToken, Deadline, RunOutcome};
pub use error::{PerSourceError, ResilienceCoreError};
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
