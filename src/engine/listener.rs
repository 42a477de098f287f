//! Callback tables with cancellation tokens.
//!
//! Listeners are owned by the engine and addressed through a
//! [`ListenerToken`]. Removing a token drops the listener, so nothing can be
//! invoked for it afterwards. Removal is idempotent and stale tokens are
//! ignored, which makes teardown paths safe to run more than once.

use crate::data_structures::arena::{Arena, Handle};

/// Token returned on registration; pass it back to remove the listener.
pub type ListenerToken<T> = Handle<T>;

/// Ordered table of listeners. Dispatch happens in registration order.
pub struct ListenerTable<T> {
    entries: Arena<T>,
    order: Vec<Handle<T>>,
}

impl<T> Default for ListenerTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListenerTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Arena::new(),
            order: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: T) -> ListenerToken<T> {
        let token = self.entries.insert(listener);
        self.order.push(token);
        token
    }

    /// Returns the listener if the token was still registered.
    pub fn remove(&mut self, token: ListenerToken<T>) -> Option<T> {
        let removed = self.entries.remove(token)?;
        self.order.retain(|t| *t != token);
        Some(removed)
    }

    pub fn contains(&self, token: ListenerToken<T>) -> bool {
        self.entries.contains(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every listener for which `pred` is true.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let doomed: Vec<_> = self
            .order
            .iter()
            .copied()
            .filter(|token| self.entries.get(*token).is_some_and(&mut pred))
            .collect();
        doomed.iter().for_each(|token| {
            self.remove(*token);
        });
        doomed.len()
    }

    /// Call `f` on each listener in registration order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for token in &self.order {
            if let Some(listener) = self.entries.get_mut(*token) {
                f(listener);
            }
        }
    }

    /// Call `f` on each listener in registration order until it returns `Some`.
    pub fn find_map_mut<R>(&mut self, mut f: impl FnMut(&mut T) -> Option<R>) -> Option<R> {
        for token in &self.order {
            if let Some(listener) = self.entries.get_mut(*token) {
                if let Some(result) = f(listener) {
                    return Some(result);
                }
            }
        }
        None
    }
}
