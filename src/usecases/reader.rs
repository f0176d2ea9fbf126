//! Background task that renders everything written to this participant's mailbox.
//!
//! The task cycles `OPENING -> READING -> OPENING` and only ends once its
//! mailbox has been removed or it has been cancelled. A blocking open cannot
//! be interrupted from inside, so cancellation raises a stop flag and pokes
//! the pipe until the thread notices; a thread that still does not stop is
//! torn down with the process.

use std::{
    io::{self, Read},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    infra::{error::AppError, mailbox::Mailbox},
    ui::console::Console,
};

const READER_STARTED: &str = "READER_STARTED";
const READER_MAILBOX_REMOVED: &str = "READER_MAILBOX_REMOVED";
const READER_CANCELLED: &str = "READER_CANCELLED";
const READER_OPEN_FAILED: &str = "READER_OPEN_FAILED";
const READER_READ_FAILED: &str = "READER_READ_FAILED";
const READER_RENDER_FAILED: &str = "READER_RENDER_FAILED";

const POKE_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The mailbox no longer exists.
    MailboxRemoved,
    Cancelled,
    Failed,
}

#[derive(Debug)]
pub struct ReaderTask {
    mailbox: Mailbox,
    stop: Arc<AtomicBool>,
    done_rx: Receiver<ReaderExit>,
}

impl ReaderTask {
    pub fn spawn(
        mailbox: Mailbox,
        console: Arc<dyn Console>,
        buffer_bytes: usize,
    ) -> Result<Self, AppError> {
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel();

        let worker_mailbox = mailbox.clone();
        let worker_stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("chatroom-reader".to_owned())
            .spawn(move || {
                let exit =
                    run_reader(&worker_mailbox, &worker_stop, console.as_ref(), buffer_bytes);
                let _ = done_tx.send(exit);
            })
            .map_err(AppError::ReaderSpawn)?;

        tracing::debug!(
            code = READER_STARTED,
            path = %mailbox.path().display(),
            "reader task started"
        );

        Ok(Self {
            mailbox,
            stop,
            done_rx,
        })
    }

    /// Asks the reader to stop and waits up to `grace` for it.
    ///
    /// Returns how the reader ended, or `None` if it is still parked; the
    /// thread is detached in that case.
    pub fn cancel(self, grace: Duration) -> Option<ReaderExit> {
        self.stop.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + grace;

        loop {
            // ENXIO just means the reader is between two opens.
            let _ = self.mailbox.poke();

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.done_rx.recv_timeout(remaining.min(POKE_INTERVAL)) {
                Ok(exit) => return Some(exit),
                Err(RecvTimeoutError::Disconnected) => return Some(ReaderExit::Failed),
                Err(RecvTimeoutError::Timeout) if remaining.is_zero() => return None,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    /// Waits for the reader to end on its own.
    #[cfg(test)]
    pub fn wait(&self, timeout: Duration) -> Option<ReaderExit> {
        self.done_rx.recv_timeout(timeout).ok()
    }
}

fn run_reader(
    mailbox: &Mailbox,
    stop: &AtomicBool,
    console: &dyn Console,
    buffer_bytes: usize,
) -> ReaderExit {
    let mut buf = vec![0u8; buffer_bytes];

    loop {
        if stop.load(Ordering::SeqCst) {
            tracing::debug!(code = READER_CANCELLED, "reader task cancelled");
            return ReaderExit::Cancelled;
        }

        let mut session = match mailbox.open_for_read() {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(code = READER_MAILBOX_REMOVED, "mailbox removed; reader closed");
                return ReaderExit::MailboxRemoved;
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => {
                tracing::error!(code = READER_OPEN_FAILED, error = %error, "mailbox open failed");
                return ReaderExit::Failed;
            }
        };

        loop {
            match session.read(&mut buf) {
                // Writer closed; wait for the next one.
                Ok(0) => break,
                Ok(n) => {
                    if let Err(error) = console.incoming(&buf[..n]) {
                        tracing::warn!(
                            code = READER_RENDER_FAILED,
                            error = %error,
                            "failed to render incoming message"
                        );
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => {
                    tracing::warn!(code = READER_READ_FAILED, error = %error, "mailbox read failed");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::delivery::DeliveryOutcome,
        infra::mailbox::{deliver, MailboxState},
        test_support::{deliver_when_attached, sample_message},
        ui::console::TerminalConsole,
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn mailbox_in(dir: &tempfile::TempDir) -> Mailbox {
        let mailbox = Mailbox::at(dir.path().join("bob"));
        assert_eq!(mailbox.create().expect("create"), MailboxState::Created);
        mailbox
    }

    #[tokio::test]
    async fn renders_each_writer_session() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = mailbox_in(&dir);
        let console = Arc::new(TerminalConsole::buffered("[demo] bob > "));
        let reader = ReaderTask::spawn(mailbox.clone(), console.clone(), 64).expect("spawn");

        let first = deliver_when_attached(&mailbox, &sample_message("one"), WAIT).await;
        let second = deliver_when_attached(&mailbox, &sample_message("two"), WAIT).await;
        assert_eq!(first, DeliveryOutcome::Delivered);
        assert_eq!(second, DeliveryOutcome::Delivered);

        let exit = reader.cancel(WAIT);
        let shown = console.contents();
        let one = shown.find("[demo] alice: one\n").expect("first message shown");
        let two = shown.find("[demo] alice: two\n").expect("second message shown");
        assert!(one < two);
        assert_eq!(shown.matches("alice: one").count(), 1);
        assert_eq!(exit, Some(ReaderExit::Cancelled));
    }

    #[test]
    fn exits_cleanly_when_mailbox_is_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("gone"));
        let console = Arc::new(TerminalConsole::buffered("> "));

        let reader = ReaderTask::spawn(mailbox, console, 64).expect("spawn");

        assert_eq!(reader.wait(WAIT), Some(ReaderExit::MailboxRemoved));
    }

    #[test]
    fn cancel_releases_reader_parked_in_open() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = mailbox_in(&dir);
        let console = Arc::new(TerminalConsole::buffered("> "));
        let reader = ReaderTask::spawn(mailbox, console.clone(), 64).expect("spawn");

        assert_eq!(reader.cancel(WAIT), Some(ReaderExit::Cancelled));
        assert_eq!(console.contents(), "");
    }

    #[tokio::test]
    async fn cancelled_reader_stops_accepting_writers() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = mailbox_in(&dir);
        let console = Arc::new(TerminalConsole::buffered("> "));
        let reader = ReaderTask::spawn(mailbox.clone(), console, 64).expect("spawn");
        reader.cancel(WAIT).expect("reader should stop");

        let outcome = deliver(&mailbox, &sample_message("late"), WAIT).await;

        assert!(matches!(outcome, DeliveryOutcome::Dropped(_)));
    }
}
