//! Stage failure reported by engine invocations.
//!
//! Carried inside `anyhow::Error` (directly or as context) so `main` can
//! downcast it and choose an exit code.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Build => f.write_str("building project container"),
            Stage::Run => f.write_str("running deploy container"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    /// Child exit code; `None` if it never started or was killed by a signal.
    pub code: Option<i32>,
}

impl StageFailure {
    pub fn new(stage: Stage, code: Option<i32>) -> Self {
        Self { stage, code }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} failed with exit code {}", self.stage, code),
            None => write!(f, "{} failed", self.stage),
        }
    }
}

impl std::error::Error for StageFailure {}

/// Find a [`StageFailure`] anywhere in an error chain.
pub fn stage_failure(err: &anyhow::Error) -> Option<&StageFailure> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StageFailure>())
        .or_else(|| err.downcast_ref::<StageFailure>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn display_includes_exit_code() {
        let failure = StageFailure::new(Stage::Build, Some(2));
        assert_eq!(
            failure.to_string(),
            "building project container failed with exit code 2"
        );
    }

    #[test]
    fn found_as_root_error() {
        let err = anyhow!(StageFailure::new(Stage::Run, Some(5))).context("deploy");
        assert_eq!(stage_failure(&err).map(|f| f.code), Some(Some(5)));
    }

    #[test]
    fn found_as_context() {
        let err = Err::<(), _>(anyhow!("No such file or directory"))
            .context(StageFailure::new(Stage::Build, None))
            .unwrap_err();
        assert_eq!(stage_failure(&err).map(|f| f.stage), Some(Stage::Build));
    }

    #[test]
    fn absent_for_other_errors() {
        assert!(stage_failure(&anyhow!("boom")).is_none());
    }
}
