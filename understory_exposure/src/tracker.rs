// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracker implementation: registry, signal processing, waiters, and subscriptions.
//!
//! ## Overview
//!
//! Every signal is folded into the element's stored knowledge and the state is
//! recomputed from scratch. When the recomputed state differs from the stored
//! one, exactly one [`ExposureChangeEvent`] is produced, pending waiters whose
//! target is now satisfied are resolved, and subscribers are notified before the
//! call returns.
//!
//! Subscriber callbacks run after the internal lock has been released, so a
//! callback may call back into the tracker.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use understory_tool_id::ToolId;

use crate::types::{
    ExposureChangeEvent, ExposureError, ExposureState, Knowledge, NodeHandle, Signal,
};

type Callback = Arc<dyn Fn(&ExposureChangeEvent) + Send + Sync>;

/// Registry of tracked elements and their exposure states.
///
/// ## Usage
///
/// - The host calls [`register`](Self::register) when a tool's node mounts and
///   feeds environment observations through [`apply`](Self::apply).
/// - Controllers read with [`state`](Self::state), suspend with
///   [`wait_for_state`](Self::wait_for_state), or listen with
///   [`subscribe`](Self::subscribe).
///
/// The tracker is a cheap handle: clones share the same registry, so one
/// instance can be constructed per session and handed to every consumer.
pub struct ExposureTracker<H> {
    inner: Arc<Mutex<Registry<H>>>,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl<H> Clone for ExposureTracker<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<H> Default for ExposureTracker<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> core::fmt::Debug for ExposureTracker<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (tracked, waiters) = {
            let inner = self.inner.lock();
            let waiters: usize = inner.elements.values().map(|e| e.waiters.len()).sum();
            (inner.elements.len(), waiters)
        };
        let subscribers = self.subscribers.lock().entries.len();
        f.debug_struct("ExposureTracker")
            .field("tracked", &tracked)
            .field("pending_waiters", &waiters)
            .field("subscribers", &subscribers)
            .finish_non_exhaustive()
    }
}

struct Registry<H> {
    elements: HashMap<ToolId, Element<H>>,
    next_waiter: u64,
}

struct Element<H> {
    handle: H,
    knowledge: Knowledge,
    state: ExposureState,
    changed_at: Instant,
    waiters: Vec<Waiter>,
}

struct Waiter {
    id: u64,
    target: ExposureState,
    // `None` when the timeout is too large to represent.
    deadline: Option<tokio::time::Instant>,
    tx: oneshot::Sender<bool>,
}

#[derive(Default)]
struct Subscribers {
    // Kept in registration order; ids increase monotonically.
    entries: Vec<Subscriber>,
    next_id: u64,
}

struct Subscriber {
    id: u64,
    filter: Option<ToolId>,
    callback: Callback,
}

impl<H> Element<H> {
    fn new(handle: H, now: Instant) -> Self {
        Self {
            handle,
            knowledge: Knowledge::registered(),
            state: ExposureState::NotPresent,
            changed_at: now,
            waiters: Vec::new(),
        }
    }

    /// Resolve waiters satisfied by the current state; keep the rest pending.
    ///
    /// Waiters past their deadline are failed even if the state now satisfies
    /// them: a transition after the deadline does not count.
    fn settle_waiters(&mut self) {
        let state = self.state;
        let now = tokio::time::Instant::now();
        let waiters = core::mem::take(&mut self.waiters);
        for w in waiters {
            if w.deadline.is_some_and(|d| now >= d) {
                let _ = w.tx.send(false);
            } else if state.satisfies(w.target) {
                // The receiver may already be gone if its timeout fired.
                let _ = w.tx.send(true);
            } else {
                self.waiters.push(w);
            }
        }
    }
}

impl<H> Registry<H> {
    /// Recompute the stored state of `tool` and report the transition, if any.
    fn refresh(&mut self, tool: &ToolId) -> Option<ExposureChangeEvent> {
        let element = self.elements.get_mut(tool)?;
        let next = element.knowledge.resolve();
        if next == element.state {
            return None;
        }
        let at = Instant::now();
        let previous = core::mem::replace(&mut element.state, next);
        element.changed_at = at;
        element.settle_waiters();
        tracing::debug!(tool = %tool, ?previous, current = ?next, "exposure transition");
        Some(ExposureChangeEvent {
            tool: tool.clone(),
            previous,
            current: next,
            at,
        })
    }

    /// Drop `tool` from the registry, failing its waiters.
    fn evict(&mut self, tool: &str) -> Option<ExposureChangeEvent> {
        let (tool, element) = self.elements.remove_entry(tool)?;
        for w in element.waiters {
            let _ = w.tx.send(false);
        }
        if element.state == ExposureState::NotPresent {
            return None;
        }
        tracing::debug!(tool = %tool, previous = ?element.state, "exposure transition on eviction");
        Some(ExposureChangeEvent {
            tool,
            previous: element.state,
            current: ExposureState::NotPresent,
            at: Instant::now(),
        })
    }
}

impl Subscribers {
    fn matching(&self, tool: &ToolId) -> Vec<Callback> {
        self.entries
            .iter()
            .filter(|s| s.filter.as_ref().is_none_or(|f| f == tool))
            .map(|s| Arc::clone(&s.callback))
            .collect()
    }
}

impl<H> ExposureTracker<H> {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                elements: HashMap::new(),
                next_waiter: 0,
            })),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        }
    }

    /// Stop tracking `tool`.
    ///
    /// Idempotent; unknown ids are ignored. Emits a final transition to
    /// [`ExposureState::NotPresent`] unless the element was already there, and
    /// resolves every pending waiter on it with `false`.
    ///
    /// Returns true if `tool` was tracked.
    pub fn unregister(&self, tool: &str) -> bool {
        let (known, event) = {
            let mut inner = self.inner.lock();
            let known = inner.elements.contains_key(tool);
            (known, inner.evict(tool))
        };
        if known {
            tracing::debug!(tool, "unregistered");
        }
        self.deliver(event);
        known
    }

    /// Last computed state of `tool`.
    ///
    /// This is a pure read; it never triggers a new measurement.
    pub fn state(&self, tool: &str) -> Result<ExposureState, ExposureError> {
        self.inner
            .lock()
            .elements
            .get(tool)
            .map(|e| e.state)
            .ok_or_else(|| ExposureError::UnknownTool(ToolId::from(tool)))
    }

    /// When `tool` last changed state.
    pub fn last_transition(&self, tool: &str) -> Result<Instant, ExposureError> {
        self.inner
            .lock()
            .elements
            .get(tool)
            .map(|e| e.changed_at)
            .ok_or_else(|| ExposureError::UnknownTool(ToolId::from(tool)))
    }

    /// Returns true if `tool` is currently tracked.
    pub fn contains(&self, tool: &str) -> bool {
        self.inner.lock().elements.contains_key(tool)
    }

    /// Number of tracked elements.
    pub fn len(&self) -> usize {
        self.inner.lock().elements.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().elements.is_empty()
    }

    /// Snapshot of every tracked element and its state, sorted by id.
    pub fn tracked(&self) -> Vec<(ToolId, ExposureState)> {
        let mut out: Vec<_> = self
            .inner
            .lock()
            .elements
            .iter()
            .map(|(id, e)| (id.clone(), e.state))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Unregister every element, in id order.
    pub fn clear(&self) {
        let events: Vec<_> = {
            let mut inner = self.inner.lock();
            let mut ids: Vec<ToolId> = inner.elements.keys().cloned().collect();
            ids.sort();
            ids.iter().filter_map(|id| inner.evict(id)).collect()
        };
        for event in events {
            self.deliver(Some(event));
        }
    }

    /// Listen for exposure change events.
    ///
    /// With `filter` set, only events for that tool are delivered; with `None`,
    /// every event is. Listeners receiving the same event are called in
    /// registration order. Dropping the returned [`Subscription`] does not stop
    /// delivery; call [`Subscription::unsubscribe`].
    pub fn subscribe<F>(&self, filter: Option<ToolId>, callback: F) -> Subscription
    where
        F: Fn(&ExposureChangeEvent) + Send + Sync + 'static,
    {
        let mut subs = self.subscribers.lock();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.entries.push(Subscriber {
            id,
            filter,
            callback: Arc::new(callback),
        });
        Subscription {
            registry: Arc::downgrade(&self.subscribers),
            id,
        }
    }

    fn deliver(&self, event: Option<ExposureChangeEvent>) {
        let Some(event) = event else {
            return;
        };
        // Snapshot the listeners so callbacks may (un)subscribe freely.
        let callbacks = self.subscribers.lock().matching(&event.tool);
        for cb in callbacks {
            cb(&event);
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_waiters(&self, tool: &str) -> usize {
        self.inner
            .lock()
            .elements
            .get(tool)
            .map(|e| e.waiters.len())
            .unwrap_or(0)
    }
}

impl<H: NodeHandle> ExposureTracker<H> {
    /// Start tracking `tool`, bound to the host node `handle`.
    ///
    /// Fails with [`ExposureError::DuplicateRegistration`] if the id is already
    /// tracked and its node is still live. If the previous node is gone, the new
    /// handle replaces it and the element restarts at
    /// [`ExposureState::Present`] pending fresh signals.
    pub fn register(&self, tool: impl Into<ToolId>, handle: H) -> Result<(), ExposureError> {
        let tool = tool.into();
        let event = {
            let mut inner = self.inner.lock();
            match inner.elements.entry(tool.clone()) {
                Entry::Occupied(mut slot) => {
                    if slot.get().handle.is_live() {
                        tracing::warn!(tool = %tool, "duplicate registration rejected");
                        return Err(ExposureError::DuplicateRegistration(tool));
                    }
                    let element = slot.get_mut();
                    element.handle = handle;
                    element.knowledge = Knowledge::registered();
                    tracing::debug!(tool = %tool, "re-registered over a dead node");
                }
                Entry::Vacant(slot) => {
                    slot.insert(Element::new(handle, Instant::now()));
                    tracing::debug!(tool = %tool, "registered");
                }
            }
            inner.refresh(&tool)
        };
        self.deliver(event);
        Ok(())
    }

    /// Feed an environment signal for `tool`.
    ///
    /// Signals for unknown tools are ignored. A [`Signal::Removed`] arriving
    /// while the node handle is no longer live destroys the entry as if it had
    /// been unregistered. This never fails outwardly; contradictory input only
    /// lowers the state.
    pub fn apply(&self, tool: &str, signal: Signal) {
        let event = {
            let mut inner = self.inner.lock();
            let Some((id, element)) = inner.elements.get_key_value_mut(tool) else {
                tracing::trace!(tool, ?signal, "signal for untracked tool ignored");
                return;
            };
            element.knowledge.absorb(signal);
            let destroyed = signal == Signal::Removed && !element.handle.is_live();
            let id = id.clone();
            if destroyed {
                tracing::debug!(tool, "node destroyed");
                inner.evict(&id)
            } else {
                inner.refresh(&id)
            }
        };
        self.deliver(event);
    }
}

impl<H: Send + 'static> ExposureTracker<H> {
    /// Wait until `tool` reaches `target` or stronger.
    ///
    /// The waiter is registered before this returns; the error case
    /// ([`ExposureError::UnknownTool`]) is reported synchronously. The returned
    /// future resolves to:
    /// - `true` as soon as the state satisfies `target` (immediately if it
    ///   already does),
    /// - `false` if `timeout` elapses first or the element is unregistered.
    ///
    /// The deadline is fixed when this is called, not when the future is first
    /// polled. Dropping the future before it completes withdraws the waiter. Must be
    /// awaited inside a Tokio runtime with the time driver enabled.
    pub fn wait_for_state(
        &self,
        tool: &str,
        target: ExposureState,
        timeout: Duration,
    ) -> Result<impl Future<Output = bool> + Send + 'static, ExposureError> {
        let deadline = tokio::time::Instant::now().checked_add(timeout);
        let pending = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let Some((id, element)) = inner.elements.get_key_value_mut(tool) else {
                return Err(ExposureError::UnknownTool(ToolId::from(tool)));
            };
            if element.state.satisfies(target) {
                None
            } else {
                let waiter = inner.next_waiter;
                inner.next_waiter += 1;
                let (tx, rx) = oneshot::channel();
                element.waiters.push(Waiter {
                    id: waiter,
                    target,
                    deadline,
                    tx,
                });
                Some((
                    rx,
                    WaiterGuard {
                        registry: Arc::downgrade(&self.inner),
                        tool: id.clone(),
                        id: waiter,
                    },
                ))
            }
        };

        Ok(async move {
            let Some((rx, guard)) = pending else {
                return true;
            };
            let resolved = match deadline {
                Some(deadline) => {
                    matches!(tokio::time::timeout_at(deadline, rx).await, Ok(Ok(true)))
                }
                None => matches!(rx.await, Ok(true)),
            };
            if !resolved {
                tracing::trace!(tool = %guard.tool, ?target, "wait ended unsatisfied");
            }
            drop(guard);
            resolved
        })
    }
}

/// Withdraws a waiter when its future completes or is dropped.
struct WaiterGuard<H> {
    registry: Weak<Mutex<Registry<H>>>,
    tool: ToolId,
    id: u64,
}

impl<H> Drop for WaiterGuard<H> {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut inner = registry.lock();
        if let Some(element) = inner.elements.get_mut(&self.tool) {
            element.waiters.retain(|w| w.id != self.id);
        }
    }
}

/// Handle returned by [`ExposureTracker::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Mutex<Subscribers>>,
    id: u64,
}

impl Subscription {
    /// Stop delivery to this listener. Idempotent.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().entries.retain(|s| s.id != self.id);
        }
    }

    /// Returns true while the listener still receives events.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.lock().entries.iter().any(|s| s.id == self.id))
    }
}
