//! Bidder-notification fan-out: debounce gate, recipient resolution, and concurrent delivery
//! with per-recipient failure isolation.
//!
//! A dispatch moves from pending to exactly one terminal state:
//!
//! - [`DispatchOutcome::Debounced`] when the auction was notified within the window,
//! - [`DispatchOutcome::Skipped`] when no recipient is eligible (or a lookup backend is down),
//! - [`DispatchOutcome::Completed`] once every delivery attempt has settled.
//!
//! There is no retry state; the next auction event triggers the next attempt.

pub mod debounce;
pub mod delivery;
pub mod dispatcher;
pub mod job;
pub mod preference;

pub use debounce::*;
pub use delivery::*;
pub use dispatcher::*;
pub use job::*;
pub use preference::*;
