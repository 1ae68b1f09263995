//! Reducer - pure state transition functions

/// A pure state transition: given the current state and an action, produce
/// the next state.
///
/// Reducers must not perform side effects. Side effects belong in
/// [`Middleware`](crate::middleware::Middleware), which runs before the
/// reducer and can observe every action.
///
/// A blanket impl covers plain functions and closures, so most reducers are
/// written as `Fn(&S, &A) -> S`. Implement the trait directly when the
/// reducer needs configuration of its own.
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
/// store.dispatch("INCREMENT");
/// assert_eq!(store.state(), 1);
/// ```
pub trait Reducer<S, A> {
    /// Compute the next state. Must not mutate anything reachable from
    /// `state`; the store commits the returned value.
    fn reduce(&self, state: &S, action: &A) -> S;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &A) -> S,
{
    fn reduce(&self, state: &S, action: &A) -> S {
        self(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SaturatingAdd {
        cap: u32,
    }

    impl Reducer<u32, u32> for SaturatingAdd {
        fn reduce(&self, state: &u32, action: &u32) -> u32 {
            (state + action).min(self.cap)
        }
    }

    #[test]
    fn closures_are_reducers() {
        let double_on_tick = |state: &i32, _action: &()| state * 2;
        assert_eq!(double_on_tick.reduce(&3, &()), 6);
    }

    #[test]
    fn structs_are_reducers() {
        let reducer = SaturatingAdd { cap: 10 };
        assert_eq!(reducer.reduce(&4, &3), 7);
        assert_eq!(reducer.reduce(&9, &5), 10);
    }
}
