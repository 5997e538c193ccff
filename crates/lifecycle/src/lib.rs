//! Conviction Lifecycle Manager
//!
//! Owns the Signal and Position state machines. Every mutation follows the
//! same shape:
//!
//! 1. Validate preconditions against current state
//! 2. Compute the after-state snapshot
//! 3. Append the audit event to the ledger
//! 4. Commit in-memory state only after the append succeeds
//!
//! so no state change is ever visible without its audit event, and a ledger
//! failure rolls the whole operation back.
//!
//! ## State machines
//!
//! ```text
//! Signal:    ACTIVE ──(position open)──► CONSUMED
//!                   └─(past expires_at)─► EXPIRED
//!
//! Position:  OPEN ──(boundary + policy)──► EXTENDED ──┐
//!              │                              │       │ (more extensions,
//!              │                              │       │  up to the cap)
//!              └──────────(exit)──────────────┴──► CLOSED / RETIRED
//! ```
//!
//! Overrides may push a transition through outside its policy window; they
//! are recorded as discipline violations, never blocked.

pub mod config;
pub mod error;
pub mod manager;
pub mod replay;
pub mod requests;
pub mod review;

pub use config::LifecycleConfig;
pub use error::{Error, Result};
pub use manager::{LifecycleManager, RoundOutcome, SweepReport};
pub use replay::{ReplayError, ReplayState, replay};
pub use requests::{FillNotice, OpenRequest, SignalSubmission};
pub use review::{OutcomeGrade, RoundReview};
