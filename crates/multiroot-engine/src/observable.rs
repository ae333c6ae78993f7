//! Single-threaded change notification.
//!
//! `Emitter<T>` is a plain listener list; `Observable<T>` pairs a value with
//! an emitter that fires only when the value actually changes. Both are meant
//! for one logical thread of control and use interior mutability so they can
//! live behind shared `Rc`s.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

/// An ordered list of listeners.
///
/// Listeners are called in subscription order. `emit` snapshots the list
/// first, so a listener may subscribe or unsubscribe (itself included)
/// without affecting the emission in progress.
pub struct Emitter<T: ?Sized> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener<T>)>>,
}

impl<T: ?Sized> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl<T: ?Sized> Emitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Call every listener with `value`.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

/// A value with change notification.
pub struct Observable<T> {
    value: Cell<T>,
    changed: Emitter<T>,
}

impl<T: Copy + PartialEq + fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable").field(&self.value.get()).finish()
    }
}

impl<T: Copy + PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Copy + PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Cell::new(value),
            changed: Emitter::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Store `value`, notifying listeners if it differs from the current one.
    ///
    /// Returns true if the value changed.
    pub fn set(&self, value: T) -> bool {
        if self.value.get() == value {
            return false;
        }
        self.value.set(value);
        self.changed.emit(&value);
        true
    }

    /// Listen for changes. The listener receives the new value.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> SubscriptionId {
        self.changed.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }

    pub fn clear_listeners(&self) {
        self.changed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_calls_in_order() {
        let emitter = Emitter::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        emitter.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = seen.clone();
        emitter.subscribe(move |v| b.borrow_mut().push(("b", *v)));

        emitter.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_emitter_unsubscribe() {
        let emitter = Emitter::<()>::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = emitter.subscribe(move |_| c.set(c.get() + 1));

        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());

        assert_eq!(count.get(), 1);
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_emitter_reentrant_subscribe() {
        let emitter = Rc::new(Emitter::<()>::new());
        let inner = emitter.clone();
        emitter.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        emitter.emit(&());
        assert_eq!(emitter.len(), 2);
    }

    #[test]
    fn test_observable_only_emits_on_change() {
        let value = Observable::new(false);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        value.subscribe(move |_| c.set(c.get() + 1));

        assert!(!value.set(false));
        assert!(value.set(true));
        assert!(!value.set(true));
        assert!(value.set(false));

        assert_eq!(count.get(), 2);
    }
}
