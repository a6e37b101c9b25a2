//! Per-thread resolution chain.
//!
//! Tracks which producers the current thread is in the middle of running.
//! The chain serves two purposes:
//! - cycle detection: entering a producer that is already on the chain
//!   means the graph loops back on itself
//! - error context: a missing registration reports who asked for it
//!
//! Links are keyed by producer, not by abstraction. An older binding of `A`
//! may depend on `A` and get the newest binding; that is not a cycle.
//!
//! Resolution is synchronous and call-stack bound, so a thread-local stack
//! mirrors the recursion exactly. A singleton being built on another thread
//! never shows up here.

use std::cell::RefCell;
use std::marker::PhantomData;

use tracing::warn;

use crate::error::{CircularDependencyError, Result, TarkibError};
use crate::key::TypeKey;

#[derive(Clone, Copy)]
struct Link {
    producer: usize,
    abstraction: TypeKey,
}

thread_local! {
    static ACTIVE: RefCell<Vec<Link>> = const { RefCell::new(Vec::new()) };
}

/// Pops its link off the chain when dropped, including on unwind.
#[must_use = "the producer leaves the chain when the guard is dropped"]
pub(crate) struct ChainGuard {
    // Tied to the thread whose chain it modified.
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for ChainGuard {
    fn drop(&mut self) {
        ACTIVE.with_borrow_mut(|active| {
            active.pop();
        });
    }
}

/// Pushes `producer` (resolving `abstraction`) onto the current thread's
/// chain.
///
/// With `detect_cycles` set, fails when `producer` is already on the chain;
/// the reported chain starts at its first occurrence and ends with
/// `abstraction`.
pub(crate) fn enter(producer: usize, abstraction: TypeKey, detect_cycles: bool) -> Result<ChainGuard> {
    ACTIVE.with_borrow_mut(|active| {
        if detect_cycles {
            if let Some(start) = active.iter().position(|link| link.producer == producer) {
                let mut chain: Vec<TypeKey> = active[start..].iter().map(|link| link.abstraction).collect();
                chain.push(abstraction);
                warn!(cycle = ?chain, "Circular dependency detected");
                return Err(TarkibError::CircularDependency(CircularDependencyError { chain }));
            }
        }
        active.push(Link {
            producer,
            abstraction,
        });
        Ok(ChainGuard {
            _thread_bound: PhantomData,
        })
    })
}

/// The abstraction currently being resolved on this thread.
pub(crate) fn current() -> Option<TypeKey> {
    ACTIVE.with_borrow(|active| active.last().map(|link| link.abstraction))
}

#[cfg(test)]
pub(crate) fn depth() -> usize {
    ACTIVE.with_borrow(Vec::len)
}
