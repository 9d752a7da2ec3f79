use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which solver produced a result.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Source {
    /// The remote solving service.
    External,
    /// The solver service's built-in fallback.
    Local,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::External => "external",
            Source::Local => "local",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source tag other than `external` or `local`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown solver source {0:?}")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external" => Ok(Source::External),
            "local" => Ok(Source::Local),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

/// Moves returned by the solver, in the order they should be applied.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult {
    pub moves: Vec<String>,
    pub source: Source,
}

impl SolveResult {
    pub fn new(moves: Vec<String>, source: Source) -> Self {
        SolveResult { moves, source }
    }

    /// An empty move list means the submitted cube was already solved.
    pub fn is_already_solved(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Lifecycle of a solve request as seen by the user.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SolverStatus {
    /// Nothing submitted since the last reset.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request produced a solution.
    Success,
    /// The last submission failed.
    Error,
}

impl SolverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Idle => "idle",
            SolverStatus::Loading => "loading",
            SolverStatus::Success => "success",
            SolverStatus::Error => "error",
        }
    }

    /// True while a new submission must be refused.
    #[inline]
    pub fn is_busy(self) -> bool {
        self == SolverStatus::Loading
    }
}

impl Default for SolverStatus {
    fn default() -> Self {
        SolverStatus::Idle
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tags() {
        assert_eq!("external".parse::<Source>(), Ok(Source::External));
        assert_eq!("local".parse::<Source>(), Ok(Source::Local));
        assert_eq!(
            "remote".parse::<Source>(),
            Err(UnknownSource("remote".to_string()))
        );
        assert_eq!(Source::Local.to_string(), "local");
    }

    #[test]
    fn empty_result_means_solved() {
        assert!(SolveResult::new(Vec::new(), Source::Local).is_already_solved());
        assert!(!SolveResult::new(vec!["R".into()], Source::Local).is_already_solved());
    }

    #[test]
    fn only_loading_is_busy() {
        assert_eq!(SolverStatus::default(), SolverStatus::Idle);
        assert!(SolverStatus::Loading.is_busy());
        assert!(!SolverStatus::Error.is_busy());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn result_json_shape() {
        let parsed: SolveResult =
            serde_json::from_str(r#"{"moves":["R","U'"],"source":"external"}"#).unwrap();
        assert_eq!(
            parsed,
            SolveResult::new(vec!["R".into(), "U'".into()], Source::External)
        );
    }
}
