//! Strictly ordered, stop-on-first-failure execution of stages.

use std::{
    fmt,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use itertools::Itertools;
use thiserror::Error;
use tracing::Instrument;

use crate::success;

#[async_trait]
pub trait Stage: Send + Sync {
    type Context: Sync;

    /// Short kebab-case name used in logs and the failure report
    fn name(&self) -> String;

    async fn execute(&self, ctx: &Self::Context) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub name: String,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct ProcedureReport {
    pub procedure: &'static str,
    pub completed: Vec<StageOutcome>,
}

impl ProcedureReport {
    pub fn stage_names(&self) -> Vec<&str> {
        self.completed.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn summary(&self) -> String {
        let total: Duration = self.completed.iter().map(|s| s.elapsed).sum();

        format!(
            "{} completed {} stage(s) in {:.1}s: {}",
            self.procedure,
            self.completed.len(),
            total.as_secs_f32(),
            self.completed.iter().map(|s| &s.name).join(", ")
        )
    }
}

#[derive(Error, Debug)]
#[error("{procedure} failed at stage '{failed_stage}': {cause:#}")]
pub struct ProcedureFailure {
    pub procedure: &'static str,
    pub completed: Vec<String>,
    pub failed_stage: String,
    pub cause: anyhow::Error,
}

impl ProcedureFailure {
    /// A failure that happened before the first stage could start, e.g. bad input
    pub fn before_start(
        procedure: &'static str,
        step: impl Into<String>,
        cause: anyhow::Error,
    ) -> Self {
        Self {
            procedure,
            completed: Vec::new(),
            failed_stage: step.into(),
            cause,
        }
    }

    pub fn completed_summary(&self) -> CompletedStages<'_> {
        CompletedStages(&self.completed)
    }
}

pub struct CompletedStages<'a>(&'a [String]);

impl fmt::Display for CompletedStages<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "no stages completed")
        } else {
            write!(f, "completed stages: {}", self.0.iter().join(", "))
        }
    }
}

/// Run each stage in order. The first stage to fail ends the procedure; a failed run has to be
/// restarted from the beginning.
pub async fn run_stages<S>(
    procedure: &'static str,
    stages: &[S],
    ctx: &S::Context,
) -> Result<ProcedureReport, ProcedureFailure>
where
    S: Stage,
{
    let mut completed = Vec::with_capacity(stages.len());

    for stage in stages {
        let name = stage.name();
        let span = tracing::info_span!("stage", name = %name);

        let started = Instant::now();
        let result = async {
            tracing::info!("Starting stage");
            stage.execute(ctx).await
        }
        .instrument(span.clone())
        .await;

        match result {
            Ok(()) => {
                let elapsed = started.elapsed();
                span.in_scope(|| success!("Stage finished in {:.1}s", elapsed.as_secs_f32()));
                completed.push(StageOutcome { name, elapsed });
            }
            Err(cause) => {
                return Err(ProcedureFailure {
                    procedure,
                    completed: completed.into_iter().map(|s| s.name).collect(),
                    failed_stage: name,
                    cause,
                });
            }
        }
    }

    Ok(ProcedureReport {
        procedure,
        completed,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder {
        ran: Mutex<Vec<String>>,
    }

    enum TestStage {
        Ok(&'static str),
        Fail(&'static str),
    }

    #[async_trait]
    impl Stage for TestStage {
        type Context = Recorder;

        fn name(&self) -> String {
            match self {
                TestStage::Ok(name) | TestStage::Fail(name) => name.to_string(),
            }
        }

        async fn execute(&self, ctx: &Recorder) -> anyhow::Result<()> {
            ctx.ran.lock().unwrap().push(self.name());
            match self {
                TestStage::Ok(_) => Ok(()),
                TestStage::Fail(_) => anyhow::bail!("apt-get exploded"),
            }
        }
    }

    #[tokio::test]
    async fn runs_every_stage_in_order() {
        let ctx = Recorder {
            ran: Mutex::new(vec![]),
        };
        let stages = [TestStage::Ok("one"), TestStage::Ok("two"), TestStage::Ok("three")];

        let report = run_stages("test", &stages, &ctx).await.expect("Run stages");

        assert_eq!(report.stage_names(), vec!["one", "two", "three"]);
        assert_eq!(*ctx.ran.lock().unwrap(), vec!["one", "two", "three"]);
        assert!(report.summary().starts_with("test completed 3 stage(s)"));
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let ctx = Recorder {
            ran: Mutex::new(vec![]),
        };
        let stages = [
            TestStage::Ok("one"),
            TestStage::Fail("two"),
            TestStage::Ok("three"),
        ];

        let failure = run_stages("test", &stages, &ctx)
            .await
            .expect_err("Second stage fails");

        assert_eq!(failure.failed_stage, "two");
        assert_eq!(failure.completed, vec!["one"]);
        assert_eq!(*ctx.ran.lock().unwrap(), vec!["one", "two"]);
        assert_eq!(
            failure.to_string(),
            "test failed at stage 'two': apt-get exploded"
        );
        assert_eq!(
            failure.completed_summary().to_string(),
            "completed stages: one"
        );
    }

    #[test]
    fn failure_before_start_has_no_completed_stages() {
        let failure = ProcedureFailure::before_start(
            "jumpbox",
            "validate-input",
            anyhow::anyhow!("no username"),
        );

        assert_eq!(failure.failed_stage, "validate-input");
        assert_eq!(
            failure.completed_summary().to_string(),
            "no stages completed"
        );
    }
}
