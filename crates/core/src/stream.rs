//! Stream module - the hierarchical per-frame update tree
//!
//! A [`StreamTree`] is an arena of nodes. Each node carries an optional task
//! value, an active flag, a deleted flag and an ordered child list. Calling a
//! node runs its task, then calls its children depth-first in attach order.
//!
//! Structural edits made while a traversal is running (attaching or
//! destroying nodes) are queued and applied, in the order they were issued,
//! once the outermost [`StreamTree::call`] returns. A node attached during a
//! pass is therefore first visited on the next pass.
//!
//! # Timing helpers
//!
//! | Type | Role |
//! |------|------|
//! | [`FrameClock`] | Splits wall-clock frame time into bounded ticks |
//! | [`Delay`] | Fires once after a fixed amount of tick time |
//! | [`TimedTransition`] | Produces a 0..=1 progress value over a duration |

use tracing::warn;

/// Generation-checked handle to a node of a [`StreamTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Node<T> {
    task: Option<T>,
    parent: Option<StreamId>,
    children: Vec<StreamId>,
    active: bool,
    deleted: bool,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Attach { parent: StreamId, child: StreamId },
    Detach(StreamId),
}

/// Arena-backed update tree with deferred structural mutation.
#[derive(Debug)]
pub struct StreamTree<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    deferred: Vec<Deferred>,
    processing: bool,
    live: usize,
}

impl<T> Default for StreamTree<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            deferred: Vec::new(),
            processing: false,
            live: 0,
        }
    }
}

impl<T> StreamTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node. `start = false` creates it stopped.
    pub fn insert(&mut self, task: Option<T>, start: bool) -> StreamId {
        let node = Node {
            task,
            parent: None,
            children: Vec::new(),
            active: start,
            deleted: false,
        };
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return StreamId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        StreamId {
            index,
            generation: 0,
        }
    }

    /// Create a running node with `task` and attach it under `parent`.
    pub fn spawn(&mut self, parent: StreamId, task: T) -> StreamId {
        let id = self.insert(Some(task), true);
        self.child(parent, id);
        id
    }

    fn node(&self, id: StreamId) -> Option<&Node<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: StreamId) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// True while `id` refers to a node that has not been freed.
    pub fn contains(&self, id: StreamId) -> bool {
        self.node(id).is_some()
    }

    pub fn is_active(&self, id: StreamId) -> bool {
        self.node(id).is_some_and(|n| n.active)
    }

    /// True once `destroy` was requested, or the node is already gone.
    pub fn is_deleted(&self, id: StreamId) -> bool {
        self.node(id).map_or(true, |n| n.deleted)
    }

    /// True while a traversal is running.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Number of nodes not yet freed.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn parent(&self, id: StreamId) -> Option<StreamId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Attached children in visit order.
    pub fn children(&self, id: StreamId) -> &[StreamId] {
        self.node(id).map_or(&[], |n| &n.children[..])
    }

    /// The node's task. `None` for container nodes, and for the node whose
    /// task is currently running.
    pub fn task(&self, id: StreamId) -> Option<&T> {
        self.node(id).and_then(|n| n.task.as_ref())
    }

    /// Attach `child` as the last child of `parent`.
    pub fn child(&mut self, parent: StreamId, child: StreamId) {
        if !self.contains(parent) {
            warn!(?parent, "attach to unknown stream");
            return;
        }
        let Some(node) = self.node_mut(child) else {
            warn!(?child, "attach of unknown stream");
            return;
        };
        node.parent = Some(parent);

        if self.processing {
            self.deferred.push(Deferred::Attach { parent, child });
        } else {
            self.attach_now(parent, child);
        }
    }

    /// Mark `id` deleted and request its removal from the tree.
    ///
    /// The subtree is freed immediately, or after the running traversal.
    /// A task that destroys its own node still finishes its current body.
    pub fn destroy(&mut self, id: StreamId) {
        let Some(node) = self.node_mut(id) else {
            warn!(?id, "destroy of unknown stream");
            return;
        };
        if node.deleted {
            return;
        }
        node.deleted = true;

        if self.processing {
            self.deferred.push(Deferred::Detach(id));
        } else {
            self.detach_now(id);
        }
    }

    pub fn stop(&mut self, id: StreamId) {
        match self.node_mut(id) {
            Some(node) => node.active = false,
            None => warn!(?id, "stop of unknown stream"),
        }
    }

    /// Re-activate a stopped node.
    pub fn resume(&mut self, id: StreamId) {
        match self.node_mut(id) {
            Some(node) => node.active = true,
            None => warn!(?id, "resume of unknown stream"),
        }
    }

    fn runnable(&self, id: StreamId) -> bool {
        self.node(id).is_some_and(|n| n.active && !n.deleted)
    }

    /// Run `id`'s task and then its children, depth-first.
    ///
    /// `f` receives the tree, the node being run and its task. Structural
    /// edits made from inside `f` are applied after the outermost call.
    pub fn call<F>(&mut self, id: StreamId, f: &mut F)
    where
        F: FnMut(&mut StreamTree<T>, StreamId, &mut T),
    {
        let outermost = !self.processing;
        self.processing = true;
        self.visit(id, f);
        if outermost {
            self.processing = false;
            self.flush();
        }
    }

    fn visit<F>(&mut self, id: StreamId, f: &mut F)
    where
        F: FnMut(&mut StreamTree<T>, StreamId, &mut T),
    {
        if !self.runnable(id) {
            return;
        }

        if let Some(mut task) = self.node_mut(id).and_then(|n| n.task.take()) {
            f(self, id, &mut task);
            // Frees are deferred while processing, so the slot is still ours.
            if let Some(node) = self.node_mut(id) {
                node.task = Some(task);
            }
        }

        if !self.runnable(id) {
            return;
        }

        let mut i = 0;
        while let Some(child) = self.node(id).and_then(|n| n.children.get(i).copied()) {
            self.visit(child, f);
            i += 1;
        }
    }

    fn flush(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        for op in deferred {
            match op {
                Deferred::Attach { parent, child } => {
                    if !self.contains(child) {
                        continue;
                    }
                    if self.contains(parent) {
                        self.attach_now(parent, child);
                    } else {
                        warn!(?parent, ?child, "parent vanished before attach");
                        self.free_subtree(child);
                    }
                }
                Deferred::Detach(id) => self.detach_now(id),
            }
        }
    }

    fn attach_now(&mut self, parent: StreamId, child: StreamId) {
        if let Some(node) = self.node_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    fn detach_now(&mut self, id: StreamId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&c| c != id);
            }
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, root: StreamId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(id.index as usize)
                .filter(|slot| slot.generation == id.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.live -= 1;
            }
        }
    }
}

/// Converts wall-clock frame time into bounded simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub tick_ms: f64,
    pub max_frame_ms: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            tick_ms: crate::types::TICK_MS,
            max_frame_ms: crate::types::MAX_FRAME_MS,
        }
    }
}

impl FrameClock {
    /// Tick sizes for a frame that took `elapsed_ms`.
    ///
    /// Elapsed time is capped at `max_frame_ms`, then split into full ticks
    /// with the remainder carried by the last one.
    pub fn ticks(&self, elapsed_ms: f64) -> Ticks {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 || self.tick_ms <= 0.0 {
            return Ticks {
                remaining: 0,
                tick: 0.0,
                last: 0.0,
            };
        }
        let dt = elapsed_ms.min(self.max_frame_ms);
        let count = (dt / self.tick_ms).ceil() as u32;
        Ticks {
            remaining: count,
            tick: self.tick_ms,
            last: dt - self.tick_ms * (count - 1) as f64,
        }
    }
}

/// Iterator over the tick sizes of one frame.
#[derive(Debug, Clone)]
pub struct Ticks {
    remaining: u32,
    tick: f64,
    last: f64,
}

impl Iterator for Ticks {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(if self.remaining == 0 {
            self.last
        } else {
            self.tick
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ticks {}

/// One-shot timer: `step` returns true once accumulated time reaches `delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delay {
    pub elapsed: f64,
    pub delay: f64,
}

impl Delay {
    pub fn new(delay: f64) -> Self {
        Self {
            elapsed: 0.0,
            delay,
        }
    }

    pub fn step(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.delay
    }
}

/// Accumulates tick time and maps it to a progress value in `0..=1`.
///
/// Progress stays 0 for the first `delay` ms and then grows linearly over
/// `duration`. Each step reports the progress for the time accumulated
/// *before* that step's `dt`, so the first step always reports the start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedTransition {
    pub elapsed: f64,
    pub delay: f64,
    pub duration: f64,
}

impl TimedTransition {
    pub fn new(duration: f64) -> Self {
        Self::delayed(0.0, duration)
    }

    pub fn delayed(delay: f64, duration: f64) -> Self {
        Self {
            elapsed: 0.0,
            delay,
            duration,
        }
    }

    pub fn progress(&self) -> f64 {
        let t = self.elapsed - self.delay;
        if self.duration <= 0.0 {
            return if t >= 0.0 { 1.0 } else { 0.0 };
        }
        (t / self.duration).clamp(0.0, 1.0)
    }

    pub fn step(&mut self, dt: f64) -> f64 {
        let progress = self.progress();
        self.elapsed += dt;
        progress
    }
}
