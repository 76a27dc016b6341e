//! # Tagged GC
//!
//! Stop-the-world mark/sweep collector for a small tagged-value heap driven
//! by an explicit root stack.
//!
//! ## Design
//!
//! - **Objects**: scalar leaves and two-child pairs; pair edges may form cycles
//! - **Roots**: a bounded LIFO stack is the only entry point into the live graph
//! - **Registry**: arena slots with stable handles, threaded into a linked list
//! - **Mark**: iterative worklist traversal, each reachable object visited once
//! - **Sweep**: one registry pass, unmarked slots go to a free list
//! - **Threshold**: next collection at `live * growth_factor`, checked before
//!   every allocation

#![warn(clippy::all)]
#![warn(missing_docs)]

mod allocator;
pub mod collector;
pub mod context;
pub mod error;
pub mod heap;
pub mod object;
pub mod roots;

pub use collector::{GcReport, GcStats};
pub use context::GcContext;
pub use error::{GcError, GcResult};
pub use heap::{GcConfig, RegistryIter};
pub use object::{ObjectKind, ObjectRef, Trace, Value};
pub use roots::{DEFAULT_STACK_MAX, RootStack};
