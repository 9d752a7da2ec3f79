//! Submission of the edited cube to the solver.
use std::sync::Arc;

use krubik_model::{validate, InvalidState, SolveResult, SolverStatus};
use log::{debug, info};
use thiserror::Error;

use crate::api::{SolveClient, SolveError};
use crate::i18n::Language;
use crate::store::CubeStore;

/// Why a submission produced no solution.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The cube failed local validation; nothing was sent.
    #[error(transparent)]
    Invalid(InvalidState),
    /// Another submission is still waiting for its answer.
    #[error("a solve request is already in flight")]
    Busy,
    /// The store was reset or resubmitted before the answer arrived.
    #[error("the solve request was superseded")]
    Superseded,
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Drives the solver status in a store from submissions.
pub struct SolveSession {
    store: Arc<CubeStore>,
    client: SolveClient,
}

impl SolveSession {
    pub fn new(store: Arc<CubeStore>, client: SolveClient) -> Self {
        SolveSession { store, client }
    }

    pub fn store(&self) -> &Arc<CubeStore> {
        &self.store
    }

    /// Validate the current cube and, if valid, ask the solver for a
    /// solution. The outcome is written to the store unless superseded.
    pub async fn submit(&self, language: Language) -> Result<SolveResult, SubmitError> {
        if self.store.status() == SolverStatus::Loading {
            return Err(SubmitError::Busy);
        }

        let state = match validate(&self.store.serialize()).into_result() {
            Ok(state) => state,
            Err(invalid) => {
                let message = language.describe_all(invalid.errors());
                debug!("Not submitting invalid cube: {}", message);
                self.store.set_error(message);
                return Err(SubmitError::Invalid(invalid));
            }
        };

        let generation = self.store.begin_request().ok_or(SubmitError::Busy)?;
        let outcome = self.client.solve(&state, language).await;

        let applied = match &outcome {
            Ok(result) => self.store.finish_request(generation, Ok(result)),
            Err(err) => self.store.finish_request(generation, Err(err.to_string())),
        };
        if !applied {
            info!("Discarding solver answer for a cube that changed meanwhile");
            return Err(SubmitError::Superseded);
        }
        Ok(outcome?)
    }

    /// Back to a solved cube, discarding any answer still in flight.
    pub fn reset(&self) {
        self.store.reset_faces();
    }
}
