//! The assignment run: configuration, session, workflow and report.

use devgroup_connector_graph::GraphSession;
use devgroup_core::{Console, Coordinator, CoordinatorOptions, Outcome, RunReport};
use tracing::{debug, instrument};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::console::TerminalConsole;
use crate::error::{CliError, CliResult};
use crate::output::{print_completion, report_json};

/// Runs the tool with the process environment and terminal.
pub async fn execute(cli: Cli) -> CliResult<()> {
    let config = AppConfig::from_env()?;
    let mut console = TerminalConsole::new(cli.json);
    let report = run(config, cli.coordinator_options(), &mut console).await?;
    finish(report, cli.json)
}

/// Connects, runs the workflow and disconnects.
///
/// A connection failure is returned as an error before any query. The
/// session is closed whatever the outcome.
#[instrument(skip_all)]
pub async fn run(
    config: AppConfig,
    options: CoordinatorOptions,
    console: &mut dyn Console,
) -> CliResult<RunReport> {
    let session = GraphSession::connect(config.graph, config.credentials)
        .await
        .map_err(|e| CliError::Connection(e.to_string()))?;

    let report = Coordinator::new(session.directory(), console, options)
        .run()
        .await;
    debug!(path = ?report.path, "Run finished");

    session.disconnect().await;
    Ok(report)
}

/// Prints the report and turns a failed outcome into an error.
pub fn finish(report: RunReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", report_json(&report)?);
    }

    match report.outcome {
        Outcome::Done(completion) => {
            if !json {
                print_completion(&completion);
            }
            Ok(())
        }
        Outcome::Failed(failure) => Err(failure.into()),
    }
}
