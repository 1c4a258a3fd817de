//! Memoized selectors.
//!
//! DESIGN
//! ======
//! A `Memoized` selector pairs a projection (the values the result depends
//! on) with a compute function. The projection runs on every call; compute
//! runs only when the projected value differs from the previous call.
//!
//! TRADE-OFFS
//! ==========
//! Dependencies are compared by value, so projections should be cheap to
//! clone and compare. A single-entry cache is enough: selectors are read
//! against the latest state snapshot.

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

type Projection<S, D> = Box<dyn Fn(&S) -> D + Send + Sync>;
type Compute<D, O> = Box<dyn Fn(&D) -> O + Send + Sync>;

pub struct Memoized<S, D, O> {
    project: Projection<S, D>,
    compute: Compute<D, O>,
    cache: Mutex<Option<(D, O)>>,
    computations: AtomicUsize,
}

impl<S, D, O> Memoized<S, D, O>
where
    D: PartialEq,
    O: Clone,
{
    pub fn new(
        project: impl Fn(&S) -> D + Send + Sync + 'static,
        compute: impl Fn(&D) -> O + Send + Sync + 'static,
    ) -> Self {
        Self {
            project: Box::new(project),
            compute: Box::new(compute),
            cache: Mutex::new(None),
            computations: AtomicUsize::new(0),
        }
    }

    pub fn select(&self, state: &S) -> O {
        let deps = (self.project)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_deps, output)) = cache.as_ref()
            && *cached_deps == deps
        {
            return output.clone();
        }
        let output = (self.compute)(&deps);
        self.computations.fetch_add(1, Ordering::Relaxed);
        *cache = Some((deps, output.clone()));
        output
    }

    /// Number of times `compute` has run.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Forget the cached value so the next `select` recomputes.
    pub fn reset(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
