//! Bounded root stack

use crate::error::{GcError, GcResult};
use crate::object::ObjectRef;

/// Default root stack depth
pub const DEFAULT_STACK_MAX: usize = 256;

/// LIFO stack of in-scope references.
///
/// Every entry is a root: it keeps its object, and everything reachable from
/// it, alive across collections. The stack borrows its entries; popping a
/// reference does not free anything until the next collection.
#[derive(Debug, Clone)]
pub struct RootStack {
    slots: Vec<ObjectRef>,
    capacity: usize,
}

impl RootStack {
    /// Create an empty stack holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a root. Fails with `StackOverflow` at capacity.
    pub fn push(&mut self, value: ObjectRef) -> GcResult<()> {
        if self.is_full() {
            return Err(GcError::StackOverflow);
        }
        self.slots.push(value);
        Ok(())
    }

    /// Remove and return the top root. Fails with `StackUnderflow` when empty.
    pub fn pop(&mut self) -> GcResult<ObjectRef> {
        self.slots.pop().ok_or(GcError::StackUnderflow)
    }

    /// Read the entry `depth` positions below the top (0 is the top)
    pub fn peek(&self, depth: usize) -> GcResult<ObjectRef> {
        let len = self.slots.len();
        if depth >= len {
            return Err(GcError::StackUnderflow);
        }
        Ok(self.slots[len - 1 - depth])
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no roots are held
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when the next push would overflow
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Maximum depth
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from bottom to top
    pub fn as_slice(&self) -> &[ObjectRef] {
        &self.slots
    }

    /// Iterate entries from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.slots.iter().copied()
    }
}

impl Default for RootStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_MAX)
    }
}
