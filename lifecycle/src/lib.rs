//! # Lifecycle
//!
//! Deferred results for the single coordination thread.
//!
//! ## Philosophy
//!
//! - **No async runtime required**: results settle when an event is handled,
//!   not when an executor polls
//! - **Settle once**: a [`Completer`] is consumed by settling, so a result can
//!   never be resolved twice
//! - **Continuations, not blocking**: callers either poll [`Pending::outcome`]
//!   or attach a continuation with [`Pending::on_settle`]
//!
//! ## Core Concepts
//!
//! - `Pending`: cloneable read side of a deferred result
//! - `Completer`: the single write side that settles it
//! - `deferred()`: creates a connected pair
//!
//! Everything here is `!Send`; it lives on the thread that created it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Listener<T, E> = Box<dyn FnOnce(&Result<T, E>)>;

/// Internal state of a deferred result
enum DeferredState<T, E> {
    Waiting(Vec<Listener<T, E>>),
    Settled(Result<T, E>),
}

/// Shared state between Pending and Completer
struct SharedDeferred<T, E> {
    state: Rc<RefCell<DeferredState<T, E>>>,
}

impl<T, E> Clone for SharedDeferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone, E: Clone> SharedDeferred<T, E> {
    fn waiting() -> Self {
        Self {
            state: Rc::new(RefCell::new(DeferredState::Waiting(Vec::new()))),
        }
    }

    fn settled(outcome: Result<T, E>) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeferredState::Settled(outcome))),
        }
    }

    fn outcome(&self) -> Option<Result<T, E>> {
        match &*self.state.borrow() {
            DeferredState::Waiting(_) => None,
            DeferredState::Settled(outcome) => Some(outcome.clone()),
        }
    }

    fn settle(&self, outcome: Result<T, E>) {
        // Listeners run after the borrow is released so they may query the
        // same result (or attach further listeners) without a re-borrow panic.
        let listeners = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut *state, DeferredState::Settled(outcome.clone())) {
                DeferredState::Waiting(listeners) => listeners,
                DeferredState::Settled(previous) => {
                    *state = DeferredState::Settled(previous);
                    Vec::new()
                }
            }
        };
        for listener in listeners {
            listener(&outcome);
        }
    }
}

/// Read side of a deferred result
///
/// ## Example
///
/// ```
/// use lifecycle::deferred;
///
/// let (completer, pending) = deferred::<u32, String>();
/// assert!(!pending.is_settled());
///
/// completer.resolve(7);
/// assert_eq!(pending.outcome(), Some(Ok(7)));
/// ```
pub struct Pending<T, E> {
    shared: SharedDeferred<T, E>,
}

impl<T, E> Clone for Pending<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone, E: Clone> Pending<T, E> {
    /// Creates a result that is already resolved
    pub fn resolved(value: T) -> Self {
        Self {
            shared: SharedDeferred::settled(Ok(value)),
        }
    }

    /// Creates a result that has already failed
    pub fn rejected(error: E) -> Self {
        Self {
            shared: SharedDeferred::settled(Err(error)),
        }
    }

    /// Checks whether the result is available
    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    /// Returns the result if it has settled
    pub fn outcome(&self) -> Option<Result<T, E>> {
        self.shared.outcome()
    }

    /// Returns the value if the result resolved successfully
    pub fn value(&self) -> Option<T> {
        self.outcome().and_then(Result::ok)
    }

    /// Returns the error if the result failed
    pub fn error(&self) -> Option<E> {
        self.outcome().and_then(Result::err)
    }

    /// Runs `f` once the result settles
    ///
    /// If the result has already settled, `f` runs immediately.
    ///
    /// ```
    /// use lifecycle::deferred;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let (completer, pending) = deferred::<(), &'static str>();
    /// let seen = Rc::new(Cell::new(false));
    /// let flag = Rc::clone(&seen);
    /// pending.on_settle(move |outcome| flag.set(outcome.is_err()));
    ///
    /// completer.reject("surface creation failed");
    /// assert!(seen.get());
    /// ```
    pub fn on_settle(&self, f: impl FnOnce(&Result<T, E>) + 'static)
    where
        T: 'static,
        E: 'static,
    {
        let settled = {
            let mut state = self.shared.state.borrow_mut();
            match &mut *state {
                DeferredState::Waiting(listeners) => {
                    listeners.push(Box::new(f));
                    return;
                }
                DeferredState::Settled(outcome) => outcome.clone(),
            }
        };
        f(&settled);
    }

    /// Checks whether two handles observe the same result
    pub fn same_as(&self, other: &Pending<T, E>) -> bool {
        Rc::ptr_eq(&self.shared.state, &other.shared.state)
    }
}

impl<T: Clone + fmt::Debug, E: Clone + fmt::Debug> fmt::Debug for Pending<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome() {
            None => write!(f, "Pending(waiting)"),
            Some(outcome) => write!(f, "Pending({:?})", outcome),
        }
    }
}

/// Write side of a deferred result
///
/// Settling consumes the completer. Dropping it unsettled leaves every
/// [`Pending`] waiting forever, so owners must settle on every path.
pub struct Completer<T, E> {
    shared: SharedDeferred<T, E>,
}

impl<T: Clone, E: Clone> Completer<T, E> {
    /// Returns a read handle for this result
    pub fn pending(&self) -> Pending<T, E> {
        Pending {
            shared: self.shared.clone(),
        }
    }

    /// Resolves the result successfully
    pub fn resolve(self, value: T) {
        self.shared.settle(Ok(value));
    }

    /// Fails the result
    pub fn reject(self, error: E) {
        self.shared.settle(Err(error));
    }

    /// Settles with an already-built outcome
    pub fn settle(self, outcome: Result<T, E>) {
        self.shared.settle(outcome);
    }
}

impl<T, E> fmt::Debug for Completer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Completer")
    }
}

/// Creates a connected completer/pending pair
pub fn deferred<T: Clone, E: Clone>() -> (Completer<T, E>, Pending<T, E>) {
    let shared = SharedDeferred::waiting();
    let pending = Pending {
        shared: shared.clone(),
    };
    (Completer { shared }, pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_new_deferred_is_waiting() {
        let (_completer, pending) = deferred::<u32, String>();
        assert!(!pending.is_settled());
        assert_eq!(pending.outcome(), None);
        assert_eq!(pending.value(), None);
    }

    #[test]
    fn test_resolve_visible_through_all_clones() {
        let (completer, pending) = deferred::<u32, String>();
        let other = pending.clone();
        let third = completer.pending();

        completer.resolve(42);

        assert_eq!(pending.value(), Some(42));
        assert_eq!(other.value(), Some(42));
        assert_eq!(third.value(), Some(42));
    }

    #[test]
    fn test_reject() {
        let (completer, pending) = deferred::<u32, String>();
        completer.reject("boom".to_string());
        assert_eq!(pending.error(), Some("boom".to_string()));
        assert_eq!(pending.value(), None);
    }

    #[test]
    fn test_pre_settled_constructors() {
        let ok = Pending::<u32, String>::resolved(1);
        let err = Pending::<u32, String>::rejected("no".to_string());
        assert_eq!(ok.outcome(), Some(Ok(1)));
        assert_eq!(err.outcome(), Some(Err("no".to_string())));
    }

    #[test]
    fn test_listeners_run_once_in_order() {
        let (completer, pending) = deferred::<u32, String>();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            pending.on_settle(move |outcome| {
                log.borrow_mut().push((tag, outcome.clone()));
            });
        }
        assert!(log.borrow().is_empty());

        completer.resolve(5);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], ("first", Ok(5)));
        assert_eq!(log[1], ("second", Ok(5)));
    }

    #[test]
    fn test_listener_on_settled_runs_immediately() {
        let pending = Pending::<u32, String>::resolved(3);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        pending.on_settle(move |_| counter.set(counter.get() + 1));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_listener_may_query_the_same_result() {
        let (completer, pending) = deferred::<u32, String>();
        let seen = Rc::new(Cell::new(None));
        let inner = pending.clone();
        let slot = Rc::clone(&seen);
        pending.on_settle(move |_| slot.set(inner.value()));

        completer.resolve(9);
        assert_eq!(seen.get(), Some(9));
    }

    #[test]
    fn test_same_as() {
        let (completer, pending) = deferred::<u32, String>();
        assert!(pending.same_as(&completer.pending()));
        assert!(!pending.same_as(&Pending::resolved(1)));
    }
}
