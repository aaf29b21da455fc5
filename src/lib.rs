//! # contextwire
//!
//! Hierarchical dependency injection and event dispatch for long-lived
//! process composition.
//!
//! Applications model their structure as a tree of [`Context`] nodes. Each
//! context holds a set of typed members, distributes events among members
//! that implement matching listener capabilities, and manages the lifecycle
//! of runnables declared inside it. Declarative [`Autowired`] fields are
//! satisfied by the first type-compatible member reachable upward in the
//! tree, possibly deferred until such a member appears.
//!
//! ## Features
//!
//! - **Context tree**: parent/child/peer relationships, a per-thread
//!   current context, and an initiate → run → shutdown state machine with
//!   graceful and immediate modes
//! - **Type-indexed membership**: one member per type per context, with
//!   duplicate and ambiguity detection at `add` time
//! - **Deferred autowiring**: unsatisfied fields are satisfied in bulk,
//!   before `add` returns, when a matching member is added anywhere above
//! - **Junction boxes**: per-event-type listener sets that propagate upward
//!   through the tree, with inline `fire` and queue-backed `defer` dispatch
//! - **Exception filters**: member-provided chains that intercept panics
//!   from event receivers and user calls
//! - **Outstanding counting**: a subtree's in-flight work is visible at
//!   every ancestor, so shutdown can wait for the whole tree
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use contextwire::{Autowired, Context, CoreObject};
//!
//! struct Database {
//!     url: String,
//! }
//! impl CoreObject for Database {}
//!
//! let root = Context::new_root();
//!
//! // Declare the dependency first: the field defers.
//! let db: Autowired<Database> = root.autowire();
//! assert!(!db.is_satisfied());
//!
//! // Adding a matching member satisfies every deferred field before
//! // `add` returns.
//! let added = root.add(Database {
//!     url: "postgres://localhost".to_string(),
//! })
//! .unwrap();
//!
//! let resolved = db.get().unwrap();
//! assert_eq!(resolved.url, "postgres://localhost");
//! assert!(Arc::ptr_eq(&added, &resolved));
//! ```
//!
//! ## Events
//!
//! An event capability is an ordinary object-safe trait. Receivers declare
//! it in their capability record; senders obtain a typed handle and name
//! their dispatch intent: `fire` runs inline, `defer` enqueues onto the
//! receiver's own [`DispatchQueue`]. Operations marked with the
//! [`Deferred`] return type cannot be fired, and vice versa; the mismatch
//! is a compile error.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use contextwire::{Context, CoreObject, MemberTraits};
//!
//! trait Tick: Send + Sync {
//!     fn tick(&self);
//! }
//!
//! #[derive(Default)]
//! struct TickCounter(AtomicUsize);
//!
//! impl Tick for TickCounter {
//!     fn tick(&self) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! impl CoreObject for TickCounter {
//!     fn member_traits(this: &Arc<Self>) -> MemberTraits {
//!         MemberTraits::new(this.clone()).receives::<dyn Tick>(this.clone())
//!     }
//! }
//!
//! let root = Context::new_root();
//! let counter = root.add(TickCounter::default()).unwrap();
//! root.initiate();
//!
//! // A sender anywhere in the subtree reaches receivers installed above.
//! let worker = root.create_anonymous();
//! worker.initiate();
//! worker.event_sender::<dyn Tick>().fire(|r| r.tick());
//!
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//! ```

// Module declarations
pub mod autowired;
pub mod context;
pub mod deferred;
pub mod error;
pub mod events;
pub mod key;
pub mod member;
pub mod observer;
pub mod outstanding;
pub mod traits;

// Internal modules
mod internal;
mod registry;

// Re-export core types
pub use autowired::Autowired;
pub use context::{
    global_context, Context, CurrentContextGuard, GlobalSigil, LifecycleState, ShutdownMode,
    WeakContext,
};
pub use deferred::{AutowiringStrategy, DeferrableAutowiring};
pub use error::{WireError, WireResult};
pub use events::{Deferred, DispatchQueue, EventSender, FiredReturn, InvokeRelay, JunctionBox, JunctionBoxManager};
pub use key::{key_of, Key};
pub use member::{AnyArc, MemberTraits, ObjectId};
pub use observer::{AutowiringEvents, TracingAutowiringListener};
pub use outstanding::Outstanding;
pub use traits::{
    Bolt, CaughtException, ContextMember, CoreObject, ExceptionFilter, PacketSubscriber, Runnable,
};
