//! GC Heap management
//!
//! The heap registry is an arena of slots. Occupied slots are threaded into a
//! singly linked list through each object's header (`next`), newest first, so
//! sweep can enumerate every allocation once in O(heap) without touching
//! free slots. Reclaimed slots go on a free list and are reused by the
//! allocator; their generation is bumped so stale handles stay detectable.

use rustc_hash::FxHashSet;

use crate::collector::GcPhase;
use crate::error::{GcError, GcResult};
use crate::object::{HeapObject, ObjectRef, Trace, Value};
use crate::roots::DEFAULT_STACK_MAX;

/// GC configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcConfig {
    /// Root stack depth (default: 256)
    pub stack_max: usize,
    /// Live object count that triggers the first collection (default: 8)
    pub initial_threshold: usize,
    /// Threshold multiplier applied to the live set after each collection (default: 2)
    pub growth_factor: usize,
    /// Hard cap on registered objects; `None` means bounded only by memory
    pub max_objects: Option<usize>,
    /// Collect before an allocation once the threshold is reached (default: true).
    /// When false, objects are reclaimed only by explicit `collect` calls.
    pub auto_collect: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            stack_max: DEFAULT_STACK_MAX,
            initial_threshold: 8,
            growth_factor: 2,
            max_objects: None,
            auto_collect: true,
        }
    }
}

impl GcConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root stack depth
    pub fn with_stack_max(mut self, stack_max: usize) -> Self {
        self.stack_max = stack_max;
        self
    }

    /// Set the threshold for the first collection
    pub fn with_initial_threshold(mut self, threshold: usize) -> Self {
        self.initial_threshold = threshold;
        self
    }

    /// Set the post-collection threshold multiplier
    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Cap the number of registered objects
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = Some(max_objects);
        self
    }

    /// Enable or disable the allocation-side collection trigger
    pub fn with_auto_collect(mut self, auto_collect: bool) -> Self {
        self.auto_collect = auto_collect;
        self
    }

    pub(crate) fn validate(&self) -> GcResult<()> {
        if self.stack_max == 0 {
            return Err(GcError::InvalidConfig("stack_max must be non-zero"));
        }
        if self.growth_factor == 0 {
            return Err(GcError::InvalidConfig("growth_factor must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) object: Option<HeapObject>,
}

impl Slot {
    pub(crate) fn new() -> Self {
        Self {
            generation: 0,
            object: None,
        }
    }
}

/// Heap registry plus allocator state
#[derive(Debug)]
pub(crate) struct Heap {
    pub(crate) slots: Vec<Slot>,
    pub(crate) free_list: Vec<u32>,
    /// Head of the registry list
    pub(crate) first_object: Option<u32>,
    pub(crate) live_count: usize,
    pub(crate) max_objects: Option<usize>,
    /// Mark worklist, kept across cycles so marking reuses its buffer
    pub(crate) worklist: Vec<u32>,
    pub(crate) phase: GcPhase,
}

impl Heap {
    pub(crate) fn new(max_objects: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            first_object: None,
            live_count: 0,
            max_objects,
            worklist: Vec::new(),
            phase: GcPhase::Idle,
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live_count
    }

    /// Map a handle to its slot index if it still names a registered object
    pub(crate) fn resolve(&self, id: ObjectRef) -> Option<usize> {
        let index = id.index() as usize;
        let slot = self.slots.get(index)?;
        if slot.generation != id.generation() || slot.object.is_none() {
            return None;
        }
        Some(index)
    }

    pub(crate) fn get(&self, id: ObjectRef) -> GcResult<&HeapObject> {
        let index = self.resolve(id).ok_or(GcError::InvalidRef(id))?;
        self.slots[index].object.as_ref().ok_or(GcError::InvalidRef(id))
    }

    pub(crate) fn get_mut(&mut self, id: ObjectRef) -> GcResult<&mut HeapObject> {
        let index = self.resolve(id).ok_or(GcError::InvalidRef(id))?;
        self.slots[index].object.as_mut().ok_or(GcError::InvalidRef(id))
    }

    /// Walk the registry, newest allocation first
    pub(crate) fn registry(&self) -> RegistryIter<'_> {
        RegistryIter {
            heap: self,
            cursor: self.first_object,
        }
    }

    /// Release every object regardless of reachability
    pub(crate) fn release_all(&mut self) -> usize {
        let freed = self.live_count;
        self.slots.clear();
        self.free_list.clear();
        self.worklist.clear();
        self.first_object = None;
        self.live_count = 0;
        freed
    }

    /// Check registry structure, live count, mark bits and edge validity
    pub(crate) fn verify(&self) -> GcResult<()> {
        let mut seen = FxHashSet::default();
        let mut cursor = self.first_object;

        while let Some(index) = cursor {
            if !seen.insert(index) {
                return Err(corrupted(format!("registry revisits slot {index}")));
            }
            let object = self
                .slots
                .get(index as usize)
                .and_then(|slot| slot.object.as_ref())
                .ok_or_else(|| corrupted(format!("registry links free slot {index}")))?;
            if object.header.marked {
                return Err(corrupted(format!("slot {index} marked outside a collection")));
            }

            let mut dangling = None;
            object.value.trace(&mut |child| {
                if dangling.is_none() && self.resolve(child).is_none() {
                    dangling = Some(child);
                }
            });
            if let Some(child) = dangling {
                return Err(corrupted(format!(
                    "slot {index} references reclaimed object {child}"
                )));
            }

            cursor = object.header.next;
        }

        if seen.len() != self.live_count {
            return Err(corrupted(format!(
                "registry holds {} objects but live count is {}",
                seen.len(),
                self.live_count
            )));
        }
        let occupied = self.slots.iter().filter(|slot| slot.object.is_some()).count();
        if occupied != self.live_count {
            return Err(corrupted(format!(
                "{occupied} occupied slots but live count is {}",
                self.live_count
            )));
        }
        for &index in &self.free_list {
            match self.slots.get(index as usize) {
                None => {
                    return Err(corrupted(format!(
                        "free list names slot {index} outside the arena"
                    )));
                }
                Some(slot) if slot.object.is_some() => {
                    return Err(corrupted(format!("free list holds occupied slot {index}")));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

fn corrupted(message: String) -> GcError {
    GcError::HeapCorrupted(message)
}

/// Iterator over registered objects, newest first
pub struct RegistryIter<'a> {
    heap: &'a Heap,
    cursor: Option<u32>,
}

impl Iterator for RegistryIter<'_> {
    type Item = (ObjectRef, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = &self.heap.slots[index as usize];
        let object = slot.object.as_ref()?;
        self.cursor = object.header.next;
        Some((ObjectRef::from_parts(index, slot.generation), object.value))
    }
}
