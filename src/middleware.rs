//! Middleware - interceptors between `dispatch` and the reducer
//!
//! Middleware sits between action dispatch and reducer execution, allowing
//! side effects, logging, action rewriting, and other cross-cutting concerns
//! to be handled in a composable way.
//!
//! ## Design
//!
//! ```text
//! dispatch(action) → Middleware Chain → Reducer → State → onChange
//! ```
//!
//! Each middleware receives the action and a [`NextDispatcher`] bound to the
//! next stage of the chain. It can:
//! - Inspect the action and the store
//! - Forward the action unchanged, or forward a different one
//! - Call `next` more than once, running the rest of the chain each time
//! - Not call `next` at all, swallowing the action
//! - Dispatch new actions through the store, restarting the whole chain
//!
//! ## Example
//!
//! ```
//! use uniflow::{Middleware, NextDispatcher, Store};
//!
//! struct ActionLogger;
//!
//! impl<S, A: std::fmt::Debug> Middleware<S, A> for ActionLogger {
//!     fn handle(&self, _store: &Store<S, A>, action: A, next: &NextDispatcher<A>) {
//!         log::debug!("action: {action:?}");
//!         next(action);
//!     }
//! }
//!
//! let store = Store::builder(|state: &i32, action: &i32| state + action, 0)
//!     .middleware(ActionLogger)
//!     .build();
//! store.dispatch(3);
//! assert_eq!(store.state(), 3);
//! ```

use crate::store::Store;

/// The continuation a middleware calls to forward an action to the next
/// stage of the dispatch chain.
///
/// A middleware may pass the original action, a modified one, call the
/// continuation several times, or never call it at all. Each call runs the
/// remainder of the chain to completion before returning.
///
/// Carries a lifetime because the continuations handed to middleware borrow
/// the store and their successor stage for the duration of one dispatch.
pub type NextDispatcher<'a, A> = dyn Fn(A) + 'a;

/// An interceptor placed before the reducer in the dispatch chain.
///
/// Middleware are called in the order they were given to the
/// [`StoreBuilder`](crate::store::StoreBuilder). Re-entrant dispatch is
/// supported: a middleware may call [`Store::dispatch`] while handling an
/// action, which runs the entire chain for the new action before control
/// returns. Because of that re-entrancy, `handle` takes `&self`; middleware
/// that carry per-instance state (counters, one-shot flags) use `Cell` or
/// `RefCell` fields.
///
/// A blanket impl covers plain functions and closures of the shape
/// `Fn(&Store<S, A>, A, &NextDispatcher<A>)`.
pub trait Middleware<S, A> {
    /// Handle an action before it reaches the reducer.
    ///
    /// Call `next(action)` to forward to the next middleware (or, for the
    /// last middleware, to the reducer). Not calling `next` stops the
    /// action here.
    fn handle(&self, store: &Store<S, A>, action: A, next: &NextDispatcher<A>);
}

impl<S, A, F> Middleware<S, A> for F
where
    F: Fn(&Store<S, A>, A, &NextDispatcher<A>),
{
    fn handle(&self, store: &Store<S, A>, action: A, next: &NextDispatcher<A>) {
        self(store, action, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type OrderLog = Rc<RefCell<Vec<&'static str>>>;

    fn string_reducer(_state: &String, action: &String) -> String {
        action.clone()
    }

    /// Counts its invocations and appends its label to a shared order log
    /// before forwarding the action unchanged.
    struct CountingMiddleware {
        label: &'static str,
        order: OrderLog,
        counter: Rc<Cell<usize>>,
    }

    impl CountingMiddleware {
        fn new(label: &'static str, order: &OrderLog) -> (Self, Rc<Cell<usize>>) {
            let counter = Rc::new(Cell::new(0));
            let middleware = Self {
                label,
                order: Rc::clone(order),
                counter: Rc::clone(&counter),
            };
            (middleware, counter)
        }

        fn record(&self) {
            self.order.borrow_mut().push(self.label);
            self.counter.set(self.counter.get() + 1);
        }
    }

    impl Middleware<String, String> for CountingMiddleware {
        fn handle(
            &self,
            _store: &Store<String, String>,
            action: String,
            next: &NextDispatcher<String>,
        ) {
            self.record();
            next(action);
        }
    }

    /// Forwards the incoming action, then pushes one extra action through
    /// its own `next`, driving the tail of the chain a second time.
    struct ExtraActionMiddleware {
        inner: CountingMiddleware,
    }

    impl Middleware<String, String> for ExtraActionMiddleware {
        fn handle(
            &self,
            _store: &Store<String, String>,
            action: String,
            next: &NextDispatcher<String>,
        ) {
            self.inner.record();
            next(action);
            next("another action".to_string());
        }
    }

    /// Forwards the incoming action, then re-enters the store with a new
    /// top-level dispatch. Guarded so it only re-dispatches once.
    struct RedispatchOnceMiddleware {
        inner: CountingMiddleware,
        has_dispatched: Cell<bool>,
    }

    impl Middleware<String, String> for RedispatchOnceMiddleware {
        fn handle(
            &self,
            store: &Store<String, String>,
            action: String,
            next: &NextDispatcher<String>,
        ) {
            self.inner.record();
            next(action);
            if !self.has_dispatched.get() {
                self.has_dispatched.set(true);
                store.dispatch("another action".to_string());
            }
        }
    }

    #[test]
    fn invoked_by_the_store() {
        let order: OrderLog = Rc::default();
        let (middleware, counter) = CountingMiddleware::new("first", &order);
        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(middleware)
            .build();

        store.dispatch("test".to_string());

        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn applied_in_declared_order() {
        let order: OrderLog = Rc::default();
        let (first, _) = CountingMiddleware::new("first", &order);
        let (second, _) = CountingMiddleware::new("second", &order);
        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(first)
            .middleware(second)
            .build();

        store.dispatch("test".to_string());

        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn next_can_drive_the_tail_multiple_times() {
        let order: OrderLog = Rc::default();
        let (inner, first_counter) = CountingMiddleware::new("first", &order);
        let (second, _) = CountingMiddleware::new("second", &order);
        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(ExtraActionMiddleware { inner })
            .middleware(second)
            .build();

        store.dispatch("test".to_string());

        // The first middleware ran once but pushed two actions through its
        // next, so the tail of the chain ran twice.
        assert_eq!(*order.borrow(), vec!["first", "second", "second"]);
        assert_eq!(first_counter.get(), 1);
        assert_eq!(store.state(), "another action");
    }

    #[test]
    fn redispatch_runs_the_entire_chain_again() {
        let order: OrderLog = Rc::default();
        let (inner, first_counter) = CountingMiddleware::new("first", &order);
        let (second, _) = CountingMiddleware::new("second", &order);
        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(RedispatchOnceMiddleware {
                inner,
                has_dispatched: Cell::new(false),
            })
            .middleware(second)
            .build();

        store.dispatch("test".to_string());

        // The nested dispatch restarts at the head of the chain and runs to
        // completion inside the original dispatch.
        assert_eq!(*order.borrow(), vec!["first", "second", "first", "second"]);
        assert_eq!(first_counter.get(), 2);
    }

    #[test]
    fn next_dispatcher_accepts_borrowing_continuations() {
        // The continuations the chain builder hands to middleware borrow the
        // store and their successor stage, so the alias must not demand a
        // 'static callee.
        let seen = RefCell::new(Vec::new());
        let forward = |action: String| seen.borrow_mut().push(action);
        let next: &NextDispatcher<String> = &forward;

        next("test".to_string());

        assert_eq!(*seen.borrow(), vec!["test"]);
    }

    #[test]
    fn middleware_can_swallow_an_action() {
        let swallow =
            |_store: &Store<String, String>, _action: String, _next: &NextDispatcher<String>| {};
        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(swallow)
            .build();

        store.dispatch("test".to_string());

        assert_eq!(store.state(), "hello");
    }

    #[test]
    fn panic_after_forward_keeps_committed_state() {
        struct ForwardThenPanic;

        impl Middleware<String, String> for ForwardThenPanic {
            fn handle(
                &self,
                _store: &Store<String, String>,
                action: String,
                next: &NextDispatcher<String>,
            ) {
                next(action);
                panic!("boom");
            }
        }

        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(ForwardThenPanic)
            .build();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.dispatch("test".to_string())
        }));

        // The forward completed and committed before the panic; no rollback.
        assert!(result.is_err());
        assert_eq!(store.state(), "test");
    }

    #[test]
    fn middleware_can_rewrite_an_action() {
        fn uppercase(
            _store: &Store<String, String>,
            action: String,
            next: &NextDispatcher<String>,
        ) {
            next(action.to_uppercase());
        }

        let store = Store::builder(string_reducer, "hello".to_string())
            .middleware(uppercase)
            .build();

        store.dispatch("test".to_string());

        assert_eq!(store.state(), "TEST");
    }
}
