//! Entrypoint for running CLI commands on a dedicated tokio runtime.

use std::future::Future;

use tracing::trace;

/// Execution context passed to every command.
///
/// Commands receive it by value; it currently carries no state but keeps the
/// `execute(self, ctx)` signature stable across commands.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct CliContext;

/// Runs commands to completion on a multi-threaded tokio runtime.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct CliRunner;

impl CliRunner {
    /// Executes a command until it finishes or ctrl-c is received.
    pub fn run_command_until_exit<F, E>(
        self,
        command: impl FnOnce(CliContext) -> F,
    ) -> Result<(), E>
    where
        F: Future<Output = Result<(), E>>,
        E: Send + Sync + From<std::io::Error> + 'static,
    {
        let tokio_runtime = tokio_runtime()?;
        let out = tokio_runtime.block_on(run_until_ctrl_c(command(CliContext::default())));

        // Drop the runtime on a separate thread so lingering background tasks
        // can't block the shutdown of the main thread.
        std::thread::spawn(move || drop(tokio_runtime));

        out
    }
}

/// Creates a multi-threaded tokio runtime with all features enabled.
pub fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

async fn run_until_ctrl_c<F, E>(fut: F) -> Result<(), E>
where
    F: Future<Output = Result<(), E>>,
    E: Send + Sync + From<std::io::Error> + 'static,
{
    tokio::select! {
        out = fut => out,
        res = tokio::signal::ctrl_c() => {
            res?;
            trace!(target: "valcon::cli", "received ctrl-c");
            Ok(())
        },
    }
}
