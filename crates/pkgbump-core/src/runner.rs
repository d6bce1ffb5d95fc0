use crate::{
    action::ActionResult,
    config::RunConfig,
    error::RunError,
    host::Host,
    store::{load_manifest, save_manifest},
};

/// Name of the single output a successful run reports.
pub const RESULT_OUTPUT: &str = "result";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Runs the configured action and reports the outcome to `host`.
///
/// Every error ends up here as a failure report; nothing escapes to the caller.
pub async fn run<H: Host>(config: &RunConfig, host: &mut H) -> RunStatus {
    let outcome = match run_action(config).await {
        Ok(result) => host
            .set_output(RESULT_OUTPUT, result.as_output())
            .map_err(|source| RunError::Output {
                name: RESULT_OUTPUT.to_string(),
                source,
            }),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => {
            metrics::counter!("pkgbump_runs_total", "outcome" => "succeeded").increment(1);
            RunStatus::Succeeded
        }
        Err(err) => {
            metrics::counter!("pkgbump_runs_total", "outcome" => "failed").increment(1);
            tracing::error!(error = %err, "run failed");
            host.set_failed(&err.to_string());
            RunStatus::Failed
        }
    }
}

/// Resolve, load, apply, and (for setters) save. The write is awaited before returning.
pub async fn run_action(config: &RunConfig) -> Result<ActionResult, RunError> {
    let run = config.resolve()?;
    let mut manifest = load_manifest(&run.input).await?;

    tracing::info!(action = %run.action, "applying action");
    let result = run.action.apply(&mut manifest, run.argument.as_deref())?;

    if run.action.mutates() {
        save_manifest(&run.output, &manifest).await?;
    }
    tracing::info!(action = %run.action, result = ?result, "action complete");
    Ok(result)
}
