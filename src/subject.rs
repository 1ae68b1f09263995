//! Subject - a synchronous broadcast channel with cancellable subscriptions
//!
//! The store publishes state changes through a [`Subject`]. Consumers get a
//! read-only [`Observable`] view, subscribe with a callback, and receive a
//! [`Subscription`] token to cancel with. Emission is synchronous and
//! single-threaded: every live subscriber runs on the emitting call stack,
//! in subscription order, before `emit` returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use thiserror::Error;

/// Error returned when emitting on a subject that has been closed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("subject is closed")]
pub struct SubjectClosed;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
    closed: bool,
}

impl<T> Registry<T> {
    fn contains(&self, id: u64) -> bool {
        self.subscribers.iter().any(|(entry, _)| *entry == id)
    }
}

/// The owning side of a broadcast channel. Values pushed with [`emit`]
/// reach every live subscriber; [`close`] permanently stops emission.
///
/// [`emit`]: Subject::emit
/// [`close`]: Subject::close
pub struct Subject<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                subscribers: Vec::new(),
                next_id: 0,
                closed: false,
            })),
        }
    }

    /// A read-only view of this subject for subscribing.
    pub fn observe(&self) -> Observable<T> {
        Observable {
            registry: Rc::clone(&self.registry),
        }
    }

    /// Push a value to every live subscriber, synchronously and in
    /// subscription order.
    ///
    /// Callbacks may subscribe, cancel, or close re-entrantly. A subscriber
    /// cancelled by an earlier callback of the same emission is skipped; a
    /// subscriber added during an emission first hears the next one.
    pub fn emit(&self, value: &T) -> Result<(), SubjectClosed> {
        if self.registry.borrow().closed {
            return Err(SubjectClosed);
        }
        let snapshot = self.registry.borrow().subscribers.clone();
        for (id, callback) in snapshot {
            // Re-check liveness: an earlier callback may have cancelled
            // this subscriber or closed the subject.
            if self.registry.borrow().contains(id) {
                callback(value);
            }
        }
        Ok(())
    }

    /// Close the subject. All subscribers are dropped, later [`emit`] calls
    /// return [`SubjectClosed`], and later subscriptions are inert.
    /// Closing an already-closed subject is a no-op.
    ///
    /// [`emit`]: Subject::emit
    pub fn close(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.closed = true;
        registry.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.registry.borrow().closed
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The subscribing side of a [`Subject`]. Cheap to clone; every clone
/// observes the same channel.
pub struct Observable<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Observable<T> {
    /// Register a callback for every value emitted from now on.
    ///
    /// Returns a [`Subscription`] used to cancel. Subscribing to a closed
    /// subject returns an inert subscription that never fires.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription<T> {
        let mut registry = self.registry.borrow_mut();
        if registry.closed {
            return Subscription {
                registry: Weak::new(),
                id: 0,
            };
        }
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, Rc::new(callback)));
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

/// Cancellation token for one subscriber.
///
/// Dropping the token does NOT cancel; the callback stays attached until
/// [`cancel`] is called or the subject closes.
///
/// [`cancel`]: Subscription::cancel
pub struct Subscription<T> {
    registry: Weak<RefCell<Registry<T>>>,
    id: u64,
}

impl<T> Subscription<T> {
    /// Detach the subscriber. It receives nothing emitted after this call.
    pub fn cancel(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .subscribers
                .retain(|(entry, _)| *entry != self.id);
        }
    }

    /// Whether the subscriber is still attached.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }
}
