use crate::error::ProbeError;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Exit code reported on any fatal classification
pub const FATAL_EXIT_CODE: i32 = -1;

/// One discrete exercising operation against the cluster.
///
/// `execute` performs exactly one operation and returns a human-readable
/// success detail; classification of failures is the runner's job.
#[async_trait]
pub trait Probe: Send {
    fn name(&self) -> &str;

    async fn execute(&mut self) -> Result<String, ProbeError>;
}

/// Tagged result of one probe iteration
#[derive(Debug)]
pub enum ProbeOutcome {
    Success(String),
    RecoverableFailure(ProbeError),
    FatalFailure(ProbeError),
}

/// What the loop does after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop(i32),
}

impl ProbeOutcome {
    pub fn from_result(result: Result<String, ProbeError>) -> Self {
        match result {
            Ok(detail) => Self::Success(detail),
            Err(e) if e.is_recoverable() => Self::RecoverableFailure(e),
            Err(e) => Self::FatalFailure(e),
        }
    }

    pub fn control(&self) -> LoopControl {
        match self {
            Self::Success(_) | Self::RecoverableFailure(_) => LoopControl::Continue,
            Self::FatalFailure(_) => LoopControl::Stop(FATAL_EXIT_CODE),
        }
    }
}

/// Configuration for the probe runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Pause between iterations (excluding the operation's own duration)
    pub interval: Duration,
}

/// Drives an unbounded sequence of probe operations on a fixed cadence.
///
/// The loop never terminates on its own: it runs until a fatal
/// classification fires (`Stop(-1)`) or the token is cancelled (exit 0).
pub struct ProbeRunner {
    config: RunnerConfig,
}

impl ProbeRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run the probe loop to completion and return the process exit code
    pub async fn run<P: Probe + ?Sized>(&self, probe: &mut P, token: CancellationToken) -> i32 {
        info!(
            "Starting {} probe loop (interval: {:?})",
            probe.name(),
            self.config.interval
        );

        loop {
            if token.is_cancelled() {
                info!("{} probe loop shutting down", probe.name());
                return 0;
            }

            let outcome = ProbeOutcome::from_result(probe.execute().await);
            match &outcome {
                ProbeOutcome::Success(detail) => {
                    info!(probe = probe.name(), "{}", detail);
                }
                ProbeOutcome::RecoverableFailure(e) => {
                    warn!(probe = probe.name(), "Probe failed: {} — continuing", e);
                }
                ProbeOutcome::FatalFailure(e) => {
                    error!(probe = probe.name(), "Fatal probe failure: {}", e);
                }
            }

            if let LoopControl::Stop(code) = outcome.control() {
                return code;
            }

            tokio::select! {
                _ = token.cancelled() => {
                    info!("{} probe loop shutting down", probe.name());
                    return 0;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soak_client::ClientError;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    /// Probe returning a canned script of results; cancels the token once the
    /// script is exhausted so the loop winds down like an external kill would.
    struct ScriptedProbe {
        script: VecDeque<Result<String, ProbeError>>,
        executions: Vec<Instant>,
        token: CancellationToken,
    }

    impl ScriptedProbe {
        fn new(
            script: Vec<Result<String, ProbeError>>,
            token: CancellationToken,
        ) -> Self {
            Self {
                script: script.into(),
                executions: Vec::new(),
                token,
            }
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn execute(&mut self) -> Result<String, ProbeError> {
            self.executions.push(Instant::now());
            let result = self.script.pop_front().unwrap_or_else(|| Ok("idle".into()));
            if self.script.is_empty() {
                self.token.cancel();
            }
            result
        }
    }

    fn not_serving() -> ProbeError {
        ProbeError::from(ClientError::not_serving("region-1"))
    }

    fn io_failure() -> ProbeError {
        ProbeError::from(ClientError::transport("connection reset by peer"))
    }

    #[test]
    fn test_outcome_classification() {
        let ok = ProbeOutcome::from_result(Ok("moved".into()));
        assert_eq!(ok.control(), LoopControl::Continue);

        let recoverable = ProbeOutcome::from_result(Err(not_serving()));
        assert!(matches!(recoverable, ProbeOutcome::RecoverableFailure(_)));
        assert_eq!(recoverable.control(), LoopControl::Continue);

        let fatal = ProbeOutcome::from_result(Err(io_failure()));
        assert!(matches!(fatal, ProbeOutcome::FatalFailure(_)));
        assert_eq!(fatal.control(), LoopControl::Stop(FATAL_EXIT_CODE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recoverable_failure_continues_after_normal_sleep() {
        let token = CancellationToken::new();
        let mut probe = ScriptedProbe::new(
            vec![Err(not_serving()), Ok("second iteration".into())],
            token.clone(),
        );

        let runner = ProbeRunner::new(RunnerConfig {
            interval: Duration::from_secs(5),
        });
        let code = runner.run(&mut probe, token).await;

        assert_eq!(code, 0);
        assert_eq!(probe.executions.len(), 2);
        // The next iteration still happened, and only after the normal sleep
        let gap = probe.executions[1] - probe.executions[0];
        assert!(gap >= Duration::from_secs(5), "gap was {:?}", gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_failure_stops_without_another_iteration() {
        let token = CancellationToken::new();
        let mut probe = ScriptedProbe::new(
            vec![
                Ok("first".into()),
                Err(io_failure()),
                Ok("never reached".into()),
            ],
            token.clone(),
        );

        let runner = ProbeRunner::new(RunnerConfig {
            interval: Duration::from_secs(1),
        });
        let code = runner.run(&mut probe, token).await;

        assert_eq!(code, FATAL_EXIT_CODE);
        assert_eq!(probe.executions.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iterations_are_separated_by_at_least_the_interval() {
        let token = CancellationToken::new();
        let mut probe = ScriptedProbe::new(
            vec![Ok("1".into()), Ok("2".into()), Ok("3".into())],
            token.clone(),
        );

        let runner = ProbeRunner::new(RunnerConfig {
            interval: Duration::from_secs(30),
        });
        let code = runner.run(&mut probe, token).await;

        assert_eq!(code, 0);
        assert_eq!(probe.executions.len(), 3);
        for pair in probe.executions.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(30));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_allowed() {
        let token = CancellationToken::new();
        let mut probe =
            ScriptedProbe::new(vec![Ok("1".into()), Ok("2".into())], token.clone());

        let runner = ProbeRunner::new(RunnerConfig {
            interval: Duration::from_secs(0),
        });
        let code = runner.run(&mut probe, token).await;

        assert_eq!(code, 0);
        assert_eq!(probe.executions.len(), 2);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_runs_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        let mut probe = ScriptedProbe::new(vec![Ok("never".into())], token.clone());
        let runner = ProbeRunner::new(RunnerConfig {
            interval: Duration::from_secs(1),
        });
        let code = runner.run(&mut probe, token).await;

        assert_eq!(code, 0);
        assert!(probe.executions.is_empty());
    }
}
