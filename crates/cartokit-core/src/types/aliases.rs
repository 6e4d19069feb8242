//! Type aliases for commonly used complex types.
//!
//! The editing core runs on a single thread: features, layers and legends are
//! shared between the UI, the history stack and pending renders through
//! `Rc<RefCell<T>>`.
//!
//! ## Usage
//!
//! ```rust
//! use cartokit_core::types::{shared, Shared};
//!
//! let counter: Shared<u32> = shared(0);
//! *counter.borrow_mut() += 1;
//! assert_eq!(*counter.borrow(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// SINGLE-THREADED SHARED TYPES (Rc<RefCell<T>>)
// =============================================================================

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// Features live in a layer and are also referenced by pending add/remove
/// operations, so both sides hold a `Shared<FeatureEntity>`.
pub type Shared<T> = Rc<RefCell<T>>;

// =============================================================================
// CALLBACK TYPES
// =============================================================================

/// A callback that fires at most once and receives a single parameter.
///
/// Used for "ready" notifications that must run exactly once.
pub type OnceCallback<T> = Box<dyn FnOnce(T)>;

/// A list of pending one-shot callbacks.
pub type OnceCallbackList<T> = Vec<OnceCallback<T>>;

// =============================================================================
// CONSTRUCTOR HELPERS
// =============================================================================

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Weak;

    #[test]
    fn test_shared_round_trip() {
        let value = shared(vec![1, 2]);
        value.borrow_mut().push(3);
        assert_eq!(value.borrow().len(), 3);
    }

    #[test]
    fn test_weak_handle_expires_with_owner() {
        let value = shared(5);
        let weak: Weak<RefCell<i32>> = Rc::downgrade(&value);
        assert!(weak.upgrade().is_some());
        drop(value);
        assert!(weak.upgrade().is_none());
    }
}
