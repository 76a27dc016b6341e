//! GC object layout

use std::fmt;

/// Handle to an object allocated in a [`GcContext`](crate::GcContext).
///
/// A handle names an arena slot plus the slot's generation at allocation
/// time. Reclaiming a slot bumps its generation, so handles that outlive
/// their object are detected instead of aliasing whatever reuses the slot.
/// A slot whose generation reaches `u32::MAX` is retired when it is next
/// reclaimed, so a generation value is never issued twice for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    pub(crate) const fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Object type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Numeric leaf
    Scalar,
    /// Two-child composite
    Pair,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Scalar => f.write_str("scalar"),
            ObjectKind::Pair => f.write_str("pair"),
        }
    }
}

/// Payload of a heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Numeric leaf
    Scalar(i64),
    /// Composite referencing two other objects. Edges may form cycles.
    Pair {
        /// Child taken from the top of the root stack at construction
        first: ObjectRef,
        /// Child taken from just below the top
        second: ObjectRef,
    },
}

impl Value {
    /// Object type tag of this payload
    pub fn kind(&self) -> ObjectKind {
        match self {
            Value::Scalar(_) => ObjectKind::Scalar,
            Value::Pair { .. } => ObjectKind::Pair,
        }
    }

    /// Scalar payload, if any
    pub fn as_scalar(&self) -> Option<i64> {
        match *self {
            Value::Scalar(value) => Some(value),
            Value::Pair { .. } => None,
        }
    }

    /// `(first, second)` children, if this is a pair
    pub fn as_pair(&self) -> Option<(ObjectRef, ObjectRef)> {
        match *self {
            Value::Pair { first, second } => Some((first, second)),
            Value::Scalar(_) => None,
        }
    }
}

/// Types that hold references the collector must follow
pub trait Trace {
    /// Report every outgoing reference to `tracer`
    fn trace(&self, tracer: &mut dyn FnMut(ObjectRef));
}

impl Trace for Value {
    fn trace(&self, tracer: &mut dyn FnMut(ObjectRef)) {
        if let Value::Pair { first, second } = *self {
            tracer(first);
            tracer(second);
        }
    }
}

/// Collector bookkeeping stored alongside every value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GcHeader {
    /// Set only while a collection is marking
    pub(crate) marked: bool,
    /// Next object in the heap registry
    pub(crate) next: Option<u32>,
}

impl GcHeader {
    pub(crate) const fn new(next: Option<u32>) -> Self {
        Self {
            marked: false,
            next,
        }
    }
}

/// A registered heap object
#[derive(Debug, Clone)]
pub(crate) struct HeapObject {
    pub(crate) header: GcHeader,
    pub(crate) value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        let a = ObjectRef::from_parts(0, 0);
        let b = ObjectRef::from_parts(1, 0);

        assert_eq!(Value::Scalar(7).kind(), ObjectKind::Scalar);
        assert_eq!(Value::Pair { first: a, second: b }.kind(), ObjectKind::Pair);
        assert_eq!(Value::Scalar(7).as_scalar(), Some(7));
        assert_eq!(Value::Pair { first: a, second: b }.as_pair(), Some((a, b)));
    }

    #[test]
    fn test_pair_traces_both_children() {
        let a = ObjectRef::from_parts(4, 2);
        let b = ObjectRef::from_parts(9, 0);
        let mut seen = Vec::new();

        Value::Pair { first: a, second: b }.trace(&mut |child| seen.push(child));
        assert_eq!(seen, vec![a, b]);

        seen.clear();
        Value::Scalar(1).trace(&mut |child| seen.push(child));
        assert!(seen.is_empty());
    }

    #[test]
    fn test_header_starts_unmarked() {
        let header = GcHeader::new(Some(3));
        assert!(!header.marked);
        assert_eq!(header.next, Some(3));
    }
}
