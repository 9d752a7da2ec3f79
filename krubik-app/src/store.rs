//! The single shared holder of the cube being edited and the solver outcome.
//!
//! All mutation goes through the store's setters. Interested parties register
//! a callback for the parts of the state they display and are called after
//! every change touching those parts.
use std::convert::TryFrom;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bitflags::bitflags;
use krubik_model::{
    CubeState, Face, InvalidColor, OutOfRange, Slot, SolveResult, SolverStatus, Source, Sticker,
};
use log::{debug, trace};
use thiserror::Error;

bitflags! {
    /// Parts of the store state.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct Changes: u8 {
        const FACES = 1 << 0;
        /// Moves and their source.
        const SOLUTION = 1 << 1;
        const STATUS = 1 << 2;
        const ERROR = 1 << 3;
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum StoreError {
    #[error("invalid facelet index: {0}")]
    Index(OutOfRange<usize>),
    #[error(transparent)]
    Color(#[from] InvalidColor),
}

/// Copy of the store state at one point in time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StoreSnapshot {
    pub faces: CubeState,
    pub solution: Vec<String>,
    pub source: Option<Source>,
    pub status: SolverStatus,
    pub error: Option<String>,
}

type Callback = dyn Fn(&StoreSnapshot, Changes) + Send + Sync;

struct Listener {
    interest: Changes,
    callback: Box<Callback>,
}

type Listeners = Mutex<Vec<Arc<Listener>>>;

#[derive(Default)]
struct Inner {
    snapshot: StoreSnapshot,
    // Bumped on every new request and on reset; a response is only applied
    // while its generation is still current.
    generation: u64,
}

/// Holder of the cube state and solver status.
#[derive(Default)]
pub struct CubeStore {
    inner: Mutex<Inner>,
    listeners: Arc<Listeners>,
}

/// Keeps a callback registered. Dropping it unregisters the callback.
#[must_use = "the callback is unregistered when the subscription is dropped"]
pub struct Subscription {
    listener: Arc<Listener>,
    listeners: Weak<Listeners>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).retain(|item| !Arc::ptr_eq(item, &self.listener));
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CubeStore {
    /// Create a store holding a solved cube and no result.
    pub fn new() -> Self {
        Default::default()
    }

    /// Call `callback` after every change that touches `interest`.
    pub fn subscribe<F>(&self, interest: Changes, callback: F) -> Subscription
    where
        F: Fn(&StoreSnapshot, Changes) + Send + Sync + 'static,
    {
        let listener = Arc::new(Listener {
            interest,
            callback: Box::new(callback),
        });
        lock(&self.listeners).push(Arc::clone(&listener));
        Subscription {
            listener,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        lock(&self.inner).snapshot.clone()
    }

    pub fn faces(&self) -> CubeState {
        lock(&self.inner).snapshot.faces.clone()
    }

    pub fn status(&self) -> SolverStatus {
        lock(&self.inner).snapshot.status
    }

    pub fn solution(&self) -> Vec<String> {
        lock(&self.inner).snapshot.solution.clone()
    }

    pub fn source(&self) -> Option<Source> {
        lock(&self.inner).snapshot.source
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.inner).snapshot.error.clone()
    }

    /// Serialized form of the current faces.
    pub fn serialize(&self) -> String {
        lock(&self.inner).snapshot.faces.serialize()
    }

    /// Recolor one facelet. `color` is a face letter in either case. The cube
    /// is not checked for consistency.
    pub fn set_facelet(&self, face: Face, index: usize, color: char) -> Result<(), StoreError> {
        let slot = Slot::try_from(index).map_err(StoreError::Index)?;
        let color = Face::try_from(color)?;
        self.update(|inner| {
            inner.snapshot.faces.set(Sticker::new(face, slot), color);
            Changes::FACES
        });
        Ok(())
    }

    /// Replace all faces at once.
    pub fn set_faces(&self, faces: CubeState) {
        self.update(|inner| {
            inner.snapshot.faces = faces;
            Changes::FACES
        });
    }

    /// Back to a solved cube with no result, status or error. Any request in
    /// flight will have its response discarded.
    pub fn reset_faces(&self) {
        self.update(|inner| {
            inner.generation += 1;
            inner.snapshot = StoreSnapshot::default();
            Changes::all()
        });
    }

    pub fn set_solution(&self, moves: Vec<String>, source: Source) {
        self.update(|inner| {
            inner.snapshot.solution = moves;
            inner.snapshot.source = Some(source);
            inner.snapshot.status = SolverStatus::Success;
            Changes::SOLUTION | Changes::STATUS
        });
    }

    pub fn set_status(&self, status: SolverStatus) {
        self.update(|inner| {
            inner.snapshot.status = status;
            Changes::STATUS
        });
    }

    /// Record an error message; the status becomes `Error`.
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|inner| {
            inner.snapshot.error = Some(message);
            inner.snapshot.status = SolverStatus::Error;
            Changes::ERROR | Changes::STATUS
        });
    }

    pub fn clear_error(&self) {
        self.update(|inner| {
            inner.snapshot.error = None;
            Changes::ERROR
        });
    }

    /// Move to `Loading` and clear the error, unless a request is already in
    /// flight. Returns the generation the response must be applied under.
    pub fn begin_request(&self) -> Option<u64> {
        let mut generation = None;
        self.update(|inner| {
            if inner.snapshot.status.is_busy() {
                return Changes::empty();
            }
            inner.generation += 1;
            generation = Some(inner.generation);
            inner.snapshot.status = SolverStatus::Loading;
            inner.snapshot.error = None;
            Changes::STATUS | Changes::ERROR
        });
        generation
    }

    /// Apply the outcome of the request started under `generation`. Returns
    /// false, leaving the store untouched, if that request was superseded.
    pub fn finish_request(&self, generation: u64, outcome: Result<&SolveResult, String>) -> bool {
        let mut applied = false;
        self.update(|inner| {
            if inner.generation != generation {
                debug!(
                    "Dropping response for generation {}, current is {}",
                    generation, inner.generation
                );
                return Changes::empty();
            }
            applied = true;
            match outcome {
                Ok(result) => {
                    inner.snapshot.solution = result.moves.clone();
                    inner.snapshot.source = Some(result.source);
                    inner.snapshot.status = SolverStatus::Success;
                    Changes::SOLUTION | Changes::STATUS
                }
                Err(message) => {
                    inner.snapshot.error = Some(message);
                    inner.snapshot.status = SolverStatus::Error;
                    Changes::ERROR | Changes::STATUS
                }
            }
        });
        applied
    }

    /// Run a mutation under the lock, then notify listeners outside it.
    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Inner) -> Changes,
    {
        let (snapshot, changes) = {
            let mut inner = lock(&self.inner);
            let changes = mutate(&mut inner);
            if changes.is_empty() {
                return;
            }
            (inner.snapshot.clone(), changes)
        };
        trace!("Store changed: {:?}", changes);
        let listeners: Vec<_> = lock(&self.listeners)
            .iter()
            .filter(|l| l.interest.intersects(changes))
            .cloned()
            .collect();
        for listener in listeners {
            (listener.callback)(&snapshot, changes);
        }
    }
}
