//! # uniflow
//!
//! A minimal unidirectional state container: a single state value, mutated
//! only by dispatching actions through a composable middleware chain into a
//! pure reducer.
//!
//! ## Architecture
//!
//! ```text
//! dispatch(action)
//!     │
//!     ▼
//! Middleware m0 ── next ──► Middleware m1 ── next ──► … ── next ──┐
//!                                                                 ▼
//!                                                       Reducer → State
//!                                                                 │
//!                                                                 ▼
//!                                                       on_change stream
//! ```
//!
//! The chain is assembled once at construction, back to front, so each
//! middleware's `next` continuation is bound to exactly its successor. A
//! middleware may forward the action unchanged, rewrite it, forward it
//! several times, swallow it, or re-enter the store with a fresh dispatch;
//! the whole traversal is synchronous and single-threaded.
//!
//! ## Usage
//!
//! ```
//! use uniflow::Store;
//!
//! fn counter(state: &i32, action: &&'static str) -> i32 {
//!     match *action {
//!         "INCREMENT" => state + 1,
//!         "DECREMENT" => state - 1,
//!         _ => *state,
//!     }
//! }
//!
//! let store = Store::new(counter, 0);
//!
//! store.dispatch("INCREMENT");
//! assert_eq!(store.state(), 1);
//! ```
//!
//! ## Design principles
//!
//! - **State is replaced, never mutated in place.** The reducer returns the
//!   next state; the store commits it and publishes it on the change stream.
//! - **Cross-cutting behavior lives in middleware**, not in the reducer.
//!   Logging, action rewriting, and side effects compose as chain stages;
//!   none ship with the core.
//! - **Fail fast.** A panicking reducer or middleware unwinds straight out
//!   of `dispatch`; the store keeps whatever state was last committed.

pub mod middleware;
pub mod reducer;
pub mod store;
pub mod subject;

// Re-export the public surface
pub use middleware::{Middleware, NextDispatcher};
pub use reducer::Reducer;
pub use store::{Store, StoreBuilder};
pub use subject::{Observable, Subject, SubjectClosed, Subscription};
