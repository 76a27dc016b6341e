//! Collector context: the owning unit an interpreter embeds
//!
//! A [`GcContext`] owns the root stack, the heap registry, the live count and
//! the collection threshold. Every operation takes it by reference; there is
//! no global collector state.

use std::time::Instant;

use crate::collector::{GcReport, GcStats, next_threshold};
use crate::error::{GcError, GcResult};
use crate::heap::{GcConfig, Heap, RegistryIter};
use crate::object::{ObjectKind, ObjectRef, Value};
use crate::roots::RootStack;

#[derive(Clone, Copy)]
enum Child {
    First,
    Second,
}

/// Owning collector context
#[derive(Debug)]
pub struct GcContext {
    config: GcConfig,
    roots: RootStack,
    heap: Heap,
    threshold: usize,
    stats: GcStats,
}

impl GcContext {
    /// Create a context with default config
    pub fn new() -> Self {
        let config = GcConfig::default();
        Self::build(config)
    }

    /// Create a context with custom config
    pub fn with_config(config: GcConfig) -> GcResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GcConfig) -> Self {
        Self {
            roots: RootStack::new(config.stack_max),
            heap: Heap::new(config.max_objects),
            threshold: config.initial_threshold,
            stats: GcStats::default(),
            config,
        }
    }

    /// Allocate a scalar and push it as a root
    pub fn push_scalar(&mut self, value: i64) -> GcResult<ObjectRef> {
        if self.roots.is_full() {
            return Err(GcError::StackOverflow);
        }
        let id = self.allocate(Value::Scalar(value))?;
        self.roots.push(id)?;
        Ok(id)
    }

    /// Pop two operands, build a pair from them and push the pair.
    ///
    /// The top operand becomes `first`, the one below it `second`. The
    /// operands stay rooted until the pair exists, so a collection triggered
    /// by this allocation cannot reclaim them. On error the stack is left
    /// untouched.
    pub fn push_pair(&mut self) -> GcResult<ObjectRef> {
        let first = self.roots.peek(0)?;
        let second = self.roots.peek(1)?;

        let id = self.allocate(Value::Pair { first, second })?;

        self.roots.pop()?;
        self.roots.pop()?;
        self.roots.push(id)?;
        Ok(id)
    }

    /// Remove and return the top root
    pub fn pop(&mut self) -> GcResult<ObjectRef> {
        self.roots.pop()
    }

    /// Read a root without removing it (0 is the top)
    pub fn peek(&self, depth: usize) -> GcResult<ObjectRef> {
        self.roots.peek(depth)
    }

    /// Current root stack
    pub fn roots(&self) -> &RootStack {
        &self.roots
    }

    /// Run a full mark/sweep cycle and adapt the threshold
    pub fn collect(&mut self) -> GcReport {
        let start = Instant::now();

        #[cfg(feature = "gc_logging")]
        tracing::debug!(
            target: "tagged_gc::gc",
            roots = self.roots.len(),
            objects = self.heap.live_count(),
            threshold = self.threshold,
            "GC cycle starting"
        );

        let marked = self.heap.mark_from(self.roots.as_slice());
        let freed = self.heap.sweep();
        let live = self.heap.live_count();
        self.threshold = next_threshold(live, self.config.growth_factor);

        let elapsed = start.elapsed();
        self.stats.collections += 1;
        self.stats.objects_freed += freed as u64;
        self.stats.last_marked = marked;
        self.stats.last_freed = freed;
        self.stats.last_live = live;
        self.stats.total_pause += elapsed;
        self.stats.last_pause = elapsed;

        #[cfg(feature = "gc_logging")]
        tracing::info!(
            target: "tagged_gc::gc",
            collection = self.stats.collections,
            marked,
            freed,
            live_objects = live,
            next_threshold = self.threshold,
            pause_us = elapsed.as_micros() as u64,
            "GC cycle complete"
        );

        GcReport {
            marked,
            freed,
            live,
            threshold: self.threshold,
        }
    }

    /// Number of registered objects
    pub fn live_count(&self) -> usize {
        self.heap.live_count()
    }

    /// Live count at which the next allocation collects first
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Cumulative statistics
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Payload of a live object
    pub fn get(&self, id: ObjectRef) -> GcResult<Value> {
        Ok(self.heap.get(id)?.value)
    }

    /// Type tag of a live object
    pub fn kind(&self, id: ObjectRef) -> GcResult<ObjectKind> {
        Ok(self.heap.get(id)?.value.kind())
    }

    /// Whether `id` still names a registered object
    pub fn is_live(&self, id: ObjectRef) -> bool {
        self.heap.resolve(id).is_some()
    }

    /// Re-point a pair's `first` child
    pub fn set_first(&mut self, pair: ObjectRef, target: ObjectRef) -> GcResult<()> {
        self.set_child(pair, target, Child::First)
    }

    /// Re-point a pair's `second` child
    pub fn set_second(&mut self, pair: ObjectRef, target: ObjectRef) -> GcResult<()> {
        self.set_child(pair, target, Child::Second)
    }

    fn set_child(
        &mut self,
        pair: ObjectRef,
        target: ObjectRef,
        child: Child,
    ) -> GcResult<()> {
        if !self.is_live(target) {
            return Err(GcError::InvalidRef(target));
        }
        match &mut self.heap.get_mut(pair)?.value {
            Value::Pair { first, second } => {
                match child {
                    Child::First => *first = target,
                    Child::Second => *second = target,
                }
                Ok(())
            }
            Value::Scalar(_) => Err(GcError::NotAPair(pair)),
        }
    }

    /// Iterate registered objects, newest first
    pub fn objects(&self) -> RegistryIter<'_> {
        self.heap.registry()
    }

    /// Check heap invariants: registry shape, live count, clear marks,
    /// no edges or roots to reclaimed objects
    pub fn verify(&self) -> GcResult<()> {
        let result = self.heap.verify().and_then(|()| {
            match self.roots.iter().find(|&root| !self.is_live(root)) {
                Some(root) => Err(GcError::HeapCorrupted(format!(
                    "root {root} names a reclaimed object"
                ))),
                None => Ok(()),
            }
        });

        #[cfg(feature = "gc_logging")]
        if let Err(err) = &result {
            tracing::warn!(target: "tagged_gc::gc", error = %err, "heap verification failed");
        }

        result
    }

    /// Tear the context down, releasing every object. Returns the count released.
    pub fn destroy(mut self) -> usize {
        let released = self.heap.release_all();

        #[cfg(feature = "gc_logging")]
        tracing::debug!(target: "tagged_gc::gc", released, "context destroyed");

        released
    }

    /// Allocate, collecting first if the live count has reached the threshold
    fn allocate(&mut self, value: Value) -> GcResult<ObjectRef> {
        if self.config.auto_collect && self.heap.live_count() >= self.threshold {
            #[cfg(feature = "gc_logging")]
            tracing::trace!(
                target: "tagged_gc::gc",
                live_objects = self.heap.live_count(),
                threshold = self.threshold,
                "allocation threshold reached"
            );

            self.stats.triggered_collections += 1;
            self.collect();
        }

        let id = self.heap.allocate(value)?;
        self.stats.objects_allocated += 1;
        Ok(id)
    }
}

impl Default for GcContext {
    fn default() -> Self {
        Self::new()
    }
}
