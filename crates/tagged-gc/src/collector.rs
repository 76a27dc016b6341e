//! Mark-sweep garbage collector
//!
//! ## Design
//!
//! - **Mark**: iterative traversal from the root stack using an explicit
//!   worklist, so graph depth never turns into native recursion depth.
//!   The mark bit doubles as the visited set, which is what makes cycles
//!   terminate.
//! - **Sweep**: one pass over the heap registry list. Unmarked objects are
//!   unlinked and their slots freed; survivors have their mark cleared.
//! - **Threshold**: after each cycle the next trigger point is the surviving
//!   live count times the growth factor.

use std::time::Duration;

use crate::heap::Heap;
use crate::object::{ObjectRef, Trace};

/// GC phase of the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GcPhase {
    /// No collection in progress
    Idle,
    /// Tracing from roots
    Marking,
    /// Reclaiming unmarked objects
    Sweeping,
}

/// Outcome of a single collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcReport {
    /// Objects found reachable
    pub marked: usize,
    /// Objects reclaimed
    pub freed: usize,
    /// Objects still registered after the sweep
    pub live: usize,
    /// Live count that will trigger the next collection
    pub threshold: usize,
}

/// GC statistics
#[derive(Debug, Default, Clone)]
pub struct GcStats {
    /// Number of collections
    pub collections: u64,
    /// Collections started by the allocation threshold rather than the caller
    pub triggered_collections: u64,
    /// Objects allocated over the context's lifetime
    pub objects_allocated: u64,
    /// Objects reclaimed over the context's lifetime
    pub objects_freed: u64,
    /// Objects marked in last collection
    pub last_marked: usize,
    /// Objects freed in last collection
    pub last_freed: usize,
    /// Live objects after last collection
    pub last_live: usize,
    /// Total time spent collecting
    pub total_pause: Duration,
    /// Duration of the last collection
    pub last_pause: Duration,
}

/// Threshold for the next collection given the surviving live set
pub fn next_threshold(live_count: usize, growth_factor: usize) -> usize {
    live_count.saturating_mul(growth_factor)
}

impl Heap {
    /// Mark phase - flag everything reachable from `roots`.
    ///
    /// Returns the number of objects marked. Each reachable object is
    /// counted exactly once no matter how many paths lead to it.
    pub(crate) fn mark_from(&mut self, roots: &[ObjectRef]) -> usize {
        self.phase = GcPhase::Marking;

        let mut worklist = std::mem::take(&mut self.worklist);
        worklist.clear();

        for &root in roots {
            match self.resolve(root) {
                Some(index) => worklist.push(index as u32),
                None => debug_assert!(false, "root {root} names a reclaimed object"),
            }
        }

        let mut marked = 0;
        while let Some(index) = worklist.pop() {
            let Some(object) = self.slots[index as usize].object.as_mut() else {
                continue;
            };
            if object.header.marked {
                continue;
            }
            object.header.marked = true;
            marked += 1;

            let value = object.value;
            value.trace(&mut |child| match self.resolve(child) {
                Some(child_index) => {
                    let already = self.slots[child_index]
                        .object
                        .as_ref()
                        .is_some_and(|object| object.header.marked);
                    if !already {
                        worklist.push(child_index as u32);
                    }
                }
                None => debug_assert!(false, "edge to reclaimed object {child}"),
            });
        }

        self.worklist = worklist;
        marked
    }

    /// Sweep phase - reclaim unmarked objects, clear marks on survivors.
    ///
    /// Returns the number of objects freed.
    pub(crate) fn sweep(&mut self) -> usize {
        self.phase = GcPhase::Sweeping;

        let mut freed = 0;
        let mut prev: Option<u32> = None;
        let mut cursor = self.first_object;

        while let Some(index) = cursor {
            let slot = &mut self.slots[index as usize];
            let Some(object) = slot.object.as_mut() else {
                debug_assert!(false, "registry links free slot {index}");
                break;
            };
            let next = object.header.next;

            if object.header.marked {
                object.header.marked = false;
                prev = Some(index);
            } else {
                slot.object = None;
                // A slot whose generation is exhausted is retired, never reused.
                if let Some(generation) = slot.generation.checked_add(1) {
                    slot.generation = generation;
                    self.free_list.push(index);
                }
                self.live_count -= 1;
                freed += 1;

                match prev {
                    Some(prev) => {
                        if let Some(prev_object) = self.slots[prev as usize].object.as_mut() {
                            prev_object.header.next = next;
                        }
                    }
                    None => self.first_object = next,
                }
            }

            cursor = next;
        }

        self.phase = GcPhase::Idle;
        freed
    }
}
