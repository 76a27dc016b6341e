//! Object allocation into the heap registry

use crate::collector::GcPhase;
use crate::error::{GcError, GcResult};
use crate::heap::{Heap, Slot};
use crate::object::{GcHeader, HeapObject, ObjectRef, Value};

impl Heap {
    /// Register a new unmarked object at the head of the registry.
    ///
    /// Reuses a reclaimed slot when one is available. Fails with
    /// `OutOfMemory` when `max_objects` is reached, the slot index space is
    /// exhausted, or the arena cannot grow. Never collects.
    pub(crate) fn allocate(&mut self, value: Value) -> GcResult<ObjectRef> {
        debug_assert_eq!(self.phase, GcPhase::Idle, "allocation during collection");

        if let Some(max) = self.max_objects {
            if self.live_count >= max {
                return Err(GcError::OutOfMemory);
            }
        }

        let index = match self.free_list.pop() {
            Some(index) => index,
            None => self.grow()?,
        };

        let next = self.first_object;
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.object.is_none(), "free list returned an occupied slot");
        slot.object = Some(HeapObject {
            header: GcHeader::new(next),
            value,
        });
        let id = ObjectRef::from_parts(index, slot.generation);

        self.first_object = Some(index);
        self.live_count += 1;

        #[cfg(feature = "gc_logging")]
        tracing::trace!(
            target: "tagged_gc::gc",
            object = %id,
            kind = %value.kind(),
            live_objects = self.live_count,
            "allocated"
        );

        Ok(id)
    }

    /// Append a fresh slot to the arena
    fn grow(&mut self) -> GcResult<u32> {
        let index = u32::try_from(self.slots.len()).map_err(|_| GcError::OutOfMemory)?;
        self.slots
            .try_reserve(1)
            .map_err(|_| GcError::OutOfMemory)?;
        self.slots.push(Slot::new());
        Ok(index)
    }
}
