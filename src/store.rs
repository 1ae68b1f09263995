//! Store - the state container and its dispatch chain

use std::cell::RefCell;
use std::rc::Rc;

use crate::middleware::Middleware;
use crate::reducer::Reducer;
use crate::subject::{Observable, Subject};

/// One stage of the dispatch chain.
///
/// Stages take the store as a call-time argument rather than closing over
/// it, so the chain can be assembled before the store exists and re-entrant
/// dispatch needs no extra bookkeeping.
type ChainStage<S, A> = Rc<dyn Fn(&Store<S, A>, A)>;

type StateEq<S> = Box<dyn Fn(&S, &S) -> bool>;

/// A unidirectional state container.
///
/// The only way to change the state held by the store is to [`dispatch`] an
/// action. The action runs through the middleware chain in declared order,
/// then through the [`Reducer`], which produces the next state. The store
/// commits that state and publishes it on [`on_change`].
///
/// - Centralized state, replaced (never mutated in place) on each action
/// - Pure reducers handle state transitions
/// - Middleware handle side effects, logging, and action rewriting
///
/// The store is single-threaded and synchronous: `dispatch` returns only
/// after the whole chain, including any nested dispatches it triggered, has
/// run to completion on the caller's stack.
///
/// # Example
///
/// ```
/// use uniflow::Store;
///
/// fn counter(state: &i32, action: &&'static str) -> i32 {
///     match *action {
///         "INCREMENT" => state + 1,
///         "DECREMENT" => state - 1,
///         _ => *state,
///     }
/// }
///
/// let store = Store::new(counter, 0);
/// assert_eq!(store.state(), 0);
///
/// store.dispatch("INCREMENT");
/// assert_eq!(store.state(), 1);
///
/// store.dispatch("DECREMENT");
/// assert_eq!(store.state(), 0);
/// ```
///
/// [`dispatch`]: Store::dispatch
/// [`on_change`]: Store::on_change
pub struct Store<S, A> {
    state: RefCell<S>,
    reducer: Box<dyn Reducer<S, A>>,
    chain: Vec<ChainStage<S, A>>,
    changes: Subject<S>,
    distinct: Option<StateEq<S>>,
}

impl<S, A> Store<S, A>
where
    S: Clone + 'static,
    A: 'static,
{
    /// Create a store with no middleware and distinct mode off.
    pub fn new(reducer: impl Reducer<S, A> + 'static, initial_state: S) -> Self {
        Store::builder(reducer, initial_state).build()
    }

    /// Start building a store with middleware and options. The dispatch
    /// chain is assembled once, in [`StoreBuilder::build`], and never
    /// changes afterwards.
    pub fn builder(reducer: impl Reducer<S, A> + 'static, initial_state: S) -> StoreBuilder<S, A> {
        StoreBuilder {
            reducer: Box::new(reducer),
            initial_state,
            middleware: Vec::new(),
            distinct: None,
        }
    }

    /// The current state of the store.
    ///
    /// Always the result of the most recently committed reduction; an
    /// action still in flight through the chain is not reflected.
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Run an action through the middleware chain, then apply it to the
    /// state with the reducer.
    ///
    /// Middleware can rewrite the action, forward it several times, swallow
    /// it, or dispatch new actions re-entrantly; see
    /// [`Middleware`](crate::middleware::Middleware). Synchronous: returns
    /// after everything this action set in motion has completed. A panic in
    /// a middleware or the reducer unwinds out of this call and leaves the
    /// last committed state in place.
    pub fn dispatch(&self, action: A) {
        log::trace!("dispatching through {} chain stage(s)", self.chain.len());
        (*self.chain[0])(self, action);
    }

    /// The stream of state changes.
    ///
    /// Emits the new state after every committed reduction, synchronously,
    /// before the dispatch that caused it returns. Subscriptions are
    /// independent: cancelling one never affects the others.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use uniflow::Store;
    ///
    /// let store = Store::new(|state: &i32, action: &i32| state + action, 0);
    ///
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&seen);
    /// let subscription = store
    ///     .on_change()
    ///     .subscribe(move |state: &i32| sink.borrow_mut().push(*state));
    ///
    /// store.dispatch(1);
    /// store.dispatch(2);
    /// subscription.cancel();
    /// store.dispatch(4);
    ///
    /// assert_eq!(*seen.borrow(), vec![1, 3]);
    /// assert_eq!(store.state(), 7);
    /// ```
    pub fn on_change(&self) -> Observable<S> {
        self.changes.observe()
    }

    /// Close the change stream. No further notifications are emitted and
    /// new subscriptions are inert. Dispatching still reduces and commits
    /// state; only the notification side goes quiet. Safe to call more
    /// than once.
    pub fn teardown(&self) {
        log::debug!("store teardown: closing the change stream");
        self.changes.close();
    }

    /// The terminal stage of the dispatch chain: reduce, compare when
    /// distinct mode is on, commit, notify.
    fn reduce_and_notify(&self, action: A) {
        let next_state = self.reducer.reduce(&self.state.borrow(), &action);

        if let Some(state_eq) = &self.distinct {
            if state_eq(&next_state, &self.state.borrow()) {
                log::trace!("distinct mode: state unchanged, notification suppressed");
                return;
            }
        }

        *self.state.borrow_mut() = next_state.clone();
        // Emitting on a closed stream is the teardown contract at work,
        // not a store error.
        let _ = self.changes.emit(&next_state);
    }
}

/// Builder for a [`Store`] with middleware and options.
///
/// # Example
///
/// ```
/// use uniflow::{NextDispatcher, Store};
///
/// fn shout(_store: &Store<String, String>, action: String, next: &NextDispatcher<String>) {
///     next(action.to_uppercase());
/// }
///
/// let store = Store::builder(|_: &String, action: &String| action.clone(), String::new())
///     .middleware(shout)
///     .build();
///
/// store.dispatch("quiet".to_string());
/// assert_eq!(store.state(), "QUIET");
/// ```
pub struct StoreBuilder<S, A> {
    reducer: Box<dyn Reducer<S, A>>,
    initial_state: S,
    middleware: Vec<Box<dyn Middleware<S, A>>>,
    distinct: Option<StateEq<S>>,
}

impl<S, A> StoreBuilder<S, A>
where
    S: Clone + 'static,
    A: 'static,
{
    /// Append one middleware. Middleware run in the order they were added.
    pub fn middleware(mut self, middleware: impl Middleware<S, A> + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Suppress change notifications when the reducer returns a state equal
    /// (`==`) to the previous one. The state is not recommitted either; the
    /// reduction is simply dropped.
    pub fn distinct(mut self) -> Self
    where
        S: PartialEq,
    {
        self.distinct = Some(Box::new(|a: &S, b: &S| a == b));
        self
    }

    /// Assemble the dispatch chain and open the change stream.
    pub fn build(self) -> Store<S, A> {
        Store {
            state: RefCell::new(self.initial_state),
            reducer: self.reducer,
            chain: build_chain(self.middleware),
            changes: Subject::new(),
            distinct: self.distinct,
        }
    }
}

/// Convert the middleware list into the dispatch chain.
///
/// Built back to front: the terminal reduce-and-notify stage comes first,
/// then each middleware (walking the list in reverse) is wrapped around the
/// stage built so far. Every middleware's `next` is thereby bound to exactly
/// its successor, and the terminal stage is reached only if every middleware
/// on the path forwards. The chain always has `middleware.len() + 1` stages,
/// terminal last.
fn build_chain<S, A>(middleware: Vec<Box<dyn Middleware<S, A>>>) -> Vec<ChainStage<S, A>>
where
    S: Clone + 'static,
    A: 'static,
{
    let terminal: ChainStage<S, A> =
        Rc::new(|store: &Store<S, A>, action: A| store.reduce_and_notify(action));

    let mut chain = Vec::with_capacity(middleware.len() + 1);
    chain.push(Rc::clone(&terminal));

    let mut next = terminal;
    for middleware in middleware.into_iter().rev() {
        let stage: ChainStage<S, A> = Rc::new(move |store: &Store<S, A>, action: A| {
            let forward = |action: A| (*next)(store, action);
            middleware.handle(store, action, &forward);
        });
        chain.push(Rc::clone(&stage));
        next = stage;
    }

    chain.reverse();
    chain
}
