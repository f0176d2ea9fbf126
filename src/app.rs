use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;

use crate::{
    cli::Cli,
    domain,
    infra::{self, error::AppError, signals::Interrupts},
    ui::{
        self,
        console::{Console, TerminalConsole},
    },
    usecases::{
        self, bootstrap,
        session::{run_session, SessionEnd},
    },
};

const SESSION_ENDED: &str = "SESSION_ENDED";

pub fn run(cli: Cli) -> Result<()> {
    // Validate before touching the filesystem.
    let participant = cli.participant()?;
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        log_file = context.has_log_file(),
        "module boundaries loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("chatroom-delivery")
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    let console: Arc<dyn Console> = Arc::new(TerminalConsole::stdout(participant.prompt()));
    let outcome = runtime.block_on(async {
        let interrupts = Interrupts::install()?;
        let input = BufReader::new(tokio::io::stdin());
        run_session(
            &context.config,
            &participant,
            input,
            console,
            interrupts.recv(),
        )
        .await
    });

    // The stdin reader may still be parked on a blocking thread.
    runtime.shutdown_background();

    let end: SessionEnd = outcome?;
    tracing::info!(code = SESSION_ENDED, end = ?end, "session ended");

    Ok(())
}
