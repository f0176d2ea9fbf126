//! Named-pipe mailboxes.
//!
//! The owning reader opens its pipe with a blocking open, which parks until
//! some writer shows up. Writers open non-blocking so an absent reader is
//! reported immediately as `ENXIO` instead of stalling the broadcast.

use std::{
    ffi::CString,
    fs::{self, File, OpenOptions},
    io,
    os::unix::{
        ffi::OsStrExt,
        fs::{FileTypeExt, OpenOptionsExt},
    },
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::{io::AsyncWriteExt, net::unix::pipe};

use crate::domain::{
    delivery::{DeliveryOutcome, DropReason},
    message::Message,
};

const MAILBOX_MODE: libc::mode_t = 0o666;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxState {
    Created,
    /// A pipe left behind by an earlier session under the same name.
    Reused,
}

/// A participant's pipe inside the room directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    path: PathBuf,
}

impl Mailbox {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the pipe, accepting an existing pipe at the same path.
    ///
    /// An existing entry that is not a pipe yields `AlreadyExists`.
    pub fn create(&self) -> io::Result<MailboxState> {
        let c_path = CString::new(self.path.as_os_str().as_bytes())
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

        // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
        let rc = unsafe { libc::mkfifo(c_path.as_ptr(), MAILBOX_MODE) };
        if rc == 0 {
            return Ok(MailboxState::Created);
        }

        let error = io::Error::last_os_error();
        if error.kind() != io::ErrorKind::AlreadyExists {
            return Err(error);
        }

        if fs::symlink_metadata(&self.path)?.file_type().is_fifo() {
            Ok(MailboxState::Reused)
        } else {
            Err(error)
        }
    }

    /// Removes the pipe. A missing pipe is not an error.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Blocks until a writer attaches.
    pub fn open_for_read(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    /// Opens and immediately closes a non-blocking write end.
    ///
    /// Releases a reader parked in [`Mailbox::open_for_read`]; that reader
    /// then sees end-of-stream. Fails with `ENXIO` when nobody is reading.
    pub fn poke(&self) -> io::Result<()> {
        OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .map(drop)
    }
}

/// Makes one best-effort attempt to hand `message` to `mailbox`.
///
/// Never blocks on an absent reader and never retries.
pub async fn deliver(mailbox: &Mailbox, message: &Message, timeout: Duration) -> DeliveryOutcome {
    let mut sender = match pipe::OpenOptions::new().open_sender(mailbox.path()) {
        Ok(sender) => sender,
        Err(error) => {
            let reason = classify_open_error(&error);
            if reason == DropReason::Unreachable {
                tracing::debug!(
                    path = %mailbox.path().display(),
                    error = %error,
                    "mailbox open failed"
                );
            }
            return DeliveryOutcome::Dropped(reason);
        }
    };

    let write = async {
        sender.write_all(message.as_bytes()).await?;
        sender.flush().await
    };

    match tokio::time::timeout(timeout, write).await {
        Ok(Ok(())) => DeliveryOutcome::Delivered,
        Ok(Err(error)) => {
            tracing::debug!(
                path = %mailbox.path().display(),
                error = %error,
                "mailbox write failed"
            );
            DeliveryOutcome::Dropped(DropReason::WriteFailed)
        }
        Err(_) => DeliveryOutcome::Dropped(DropReason::TimedOut),
    }
}

fn classify_open_error(error: &io::Error) -> DropReason {
    if error.kind() == io::ErrorKind::NotFound || error.raw_os_error() == Some(libc::ENXIO) {
        DropReason::NoReader
    } else {
        DropReason::Unreachable
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::test_support::{nonblocking_reader, sample_message};

    #[test]
    fn create_is_idempotent_for_pipes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("bob"));

        assert_eq!(mailbox.create().expect("first create"), MailboxState::Created);
        assert_eq!(mailbox.create().expect("second create"), MailboxState::Reused);
        assert!(fs::symlink_metadata(mailbox.path())
            .expect("metadata")
            .file_type()
            .is_fifo());
    }

    #[test]
    fn create_refuses_regular_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bob");
        fs::write(&path, b"not a pipe").expect("write file");

        let error = Mailbox::at(path).create().expect_err("must refuse");

        assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn remove_tolerates_missing_pipe() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("bob"));
        mailbox.create().expect("create");

        mailbox.remove().expect("first remove");
        mailbox.remove().expect("second remove");
        assert!(!mailbox.path().exists());
    }

    #[test]
    fn poke_without_reader_reports_enxio() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("bob"));
        mailbox.create().expect("create");

        let error = mailbox.poke().expect_err("no reader attached");

        assert_eq!(error.raw_os_error(), Some(libc::ENXIO));
    }

    #[tokio::test]
    async fn deliver_without_reader_drops_immediately() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("bob"));
        mailbox.create().expect("create");

        let outcome = deliver(&mailbox, &sample_message("hi"), Duration::from_secs(5)).await;

        assert_eq!(outcome, DeliveryOutcome::Dropped(DropReason::NoReader));
    }

    #[tokio::test]
    async fn deliver_to_vanished_mailbox_counts_as_no_reader() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("ghost"));

        let outcome = deliver(&mailbox, &sample_message("hi"), Duration::from_secs(5)).await;

        assert_eq!(outcome, DeliveryOutcome::Dropped(DropReason::NoReader));
    }

    #[tokio::test]
    async fn deliver_to_regular_file_is_unreachable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes");
        fs::write(&path, b"").expect("write file");

        let outcome = deliver(&Mailbox::at(path), &sample_message("hi"), Duration::from_secs(5)).await;

        assert_eq!(outcome, DeliveryOutcome::Dropped(DropReason::Unreachable));
    }

    #[tokio::test]
    async fn deliver_writes_whole_message_to_attached_reader() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mailbox = Mailbox::at(dir.path().join("bob"));
        mailbox.create().expect("create");
        let mut reader = nonblocking_reader(mailbox.path());

        let outcome = deliver(&mailbox, &sample_message("hi"), Duration::from_secs(5)).await;

        let mut received = Vec::new();
        reader.read_to_end(&mut received).expect("drain pipe");
        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(received, b"[demo] alice: hi\n");
    }
}
