//! Leaving the room: stop the reader, remove the mailbox, exactly once.

use std::{sync::Mutex, time::Duration};

use crate::{
    domain::room::Username,
    infra::membership::RoomDirectory,
    usecases::reader::{ReaderExit, ReaderTask},
};

const CLEANUP_COMPLETED: &str = "CLEANUP_COMPLETED";
const CLEANUP_READER_DETACHED: &str = "CLEANUP_READER_DETACHED";
const CLEANUP_LEAVE_FAILED: &str = "CLEANUP_LEAVE_FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// This call did the cleanup. `reader` is `None` when no reader was
    /// attached or it did not stop within the grace period.
    Performed { reader: Option<ReaderExit> },
    AlreadyDone,
}

#[derive(Debug)]
struct Registration {
    room: RoomDirectory,
    username: Username,
    reader: Option<ReaderTask>,
}

/// Owns this participant's presence in the room until shutdown.
///
/// Dropping the controller shuts down as well, so a panic still leaves the
/// room. `shutdown` can block for the reader grace period; async callers run
/// it on a blocking thread.
#[derive(Debug)]
pub struct CleanupController {
    registration: Mutex<Option<Registration>>,
    reader_grace: Duration,
}

impl CleanupController {
    pub fn new(room: RoomDirectory, username: Username, reader_grace: Duration) -> Self {
        Self {
            registration: Mutex::new(Some(Registration {
                room,
                username,
                reader: None,
            })),
            reader_grace,
        }
    }

    pub fn attach_reader(&self, reader: ReaderTask) {
        let mut slot = self.lock();
        if let Some(registration) = slot.as_mut() {
            registration.reader = Some(reader);
            return;
        }
        drop(slot);

        // Already shut down; the reader must not outlive the registration.
        let _ = reader.cancel(self.reader_grace);
    }

    pub fn shutdown(&self) -> CleanupOutcome {
        let Some(registration) = self.lock().take() else {
            return CleanupOutcome::AlreadyDone;
        };

        let reader = registration
            .reader
            .and_then(|reader| reader.cancel(self.reader_grace));
        if reader.is_none() {
            tracing::debug!(
                code = CLEANUP_READER_DETACHED,
                "reader still parked; leaving it to process exit"
            );
        }

        if let Err(error) = registration.room.leave(&registration.username) {
            tracing::error!(code = CLEANUP_LEAVE_FAILED, error = %error, "failed to leave room");
        }

        tracing::info!(
            code = CLEANUP_COMPLETED,
            username = %registration.username,
            room = %registration.room.path().display(),
            "left room"
        );

        CleanupOutcome::Performed { reader }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Registration>> {
        self.registration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for CleanupController {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
