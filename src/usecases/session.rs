use std::{future::Future, sync::Arc};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    domain::room::Participant,
    infra::{
        config::{AppConfig, BroadcastConfig},
        error::AppError,
        mailbox::MailboxState,
        membership::RoomDirectory,
        signals::Interrupt,
    },
    ui::console::Console,
    usecases::{broadcast::broadcast, lifecycle::CleanupController, reader::ReaderTask},
};

const ROOM_JOINED: &str = "ROOM_JOINED";
const BROADCAST_OVER_CAPACITY: &str = "BROADCAST_OVER_CAPACITY";
const SESSION_INTERRUPTED: &str = "SESSION_INTERRUPTED";
const CLEANUP_TASK_FAILED: &str = "CLEANUP_TASK_FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    EndOfInput,
    Interrupted(Interrupt),
}

/// Runs one participant's chat session until input ends or `interrupt` fires.
///
/// An interrupt is only acted on while waiting for input, so a broadcast that
/// is already under way finishes first. The mailbox is removed on every exit
/// path, errors included.
pub async fn run_session<R, I>(
    config: &AppConfig,
    participant: &Participant,
    input: R,
    console: Arc<dyn Console>,
    interrupt: I,
) -> Result<SessionEnd, AppError>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = Interrupt>,
{
    let room = RoomDirectory::locate(&config.room, &participant.room);
    let (mailbox, state) = room.join(&participant.username)?;
    let cleanup = CleanupController::new(
        room.clone(),
        participant.username.clone(),
        config.reader.shutdown_grace(),
    );
    tracing::info!(
        code = ROOM_JOINED,
        room = %participant.room,
        username = %participant.username,
        stale_mailbox = state == MailboxState::Reused,
        "joined room"
    );

    let end = async {
        console
            .notice(&format!("Welcome to {}!", participant.room))
            .map_err(AppError::Console)?;
        let reader =
            ReaderTask::spawn(mailbox, Arc::clone(&console), config.reader.buffer_bytes)?;
        cleanup.attach_reader(reader);

        send_loop(
            &room,
            participant,
            &config.broadcast,
            input,
            console.as_ref(),
            interrupt,
        )
        .await
    }
    .await;

    leave(cleanup).await;
    end
}

/// Runs the cleanup off the async workers; stopping the reader may wait out
/// its grace period.
async fn leave(cleanup: CleanupController) {
    if let Err(error) = tokio::task::spawn_blocking(move || cleanup.shutdown()).await {
        tracing::warn!(code = CLEANUP_TASK_FAILED, error = %error, "cleanup task did not complete");
    }
}

async fn send_loop<R, I>(
    room: &RoomDirectory,
    participant: &Participant,
    config: &BroadcastConfig,
    mut input: R,
    console: &dyn Console,
    interrupt: I,
) -> Result<SessionEnd, AppError>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = Interrupt>,
{
    tokio::pin!(interrupt);
    let mut buf = Vec::new();

    loop {
        console.prompt().map_err(AppError::Console)?;

        buf.clear();
        let read = tokio::select! {
            biased;

            signal = &mut interrupt => {
                tracing::info!(code = SESSION_INTERRUPTED, signal = %signal, "interrupt received");
                return Ok(SessionEnd::Interrupted(signal));
            }
            read = input.read_until(b'\n', &mut buf) => read.map_err(AppError::Input)?,
        };
        if read == 0 {
            return Ok(SessionEnd::EndOfInput);
        }
        let line = String::from_utf8_lossy(strip_line_ending(&buf));

        // Not raced against the interrupt: delivery tasks are never cancelled.
        let Some(report) = broadcast(room, participant, &line, config).await? else {
            continue;
        };

        if report.skipped > 0 {
            let error = AppError::Capacity {
                limit: config.max_recipients,
                members: report.outcomes.len() + report.skipped,
            };
            tracing::warn!(code = BROADCAST_OVER_CAPACITY, error = %error, "recipient bound exceeded");
            console.notice(&error.to_string()).map_err(AppError::Console)?;
        }

        tracing::debug!(
            delivered = report.delivered(),
            dropped = report.dropped(),
            "broadcast finished"
        );
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
