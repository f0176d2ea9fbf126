//! The room directory: one entry per present participant.
//!
//! Every process only creates and removes its own entry, so no cross-process
//! locking is needed; scans simply tolerate entries coming and going.

use std::{
    fs::{self, DirBuilder},
    io,
    os::unix::fs::DirBuilderExt,
    path::{Path, PathBuf},
};

use crate::{
    domain::room::{RoomName, Username},
    infra::{
        config::RoomConfig,
        error::AppError,
        mailbox::{Mailbox, MailboxState},
    },
};

const ROOM_DIR_MODE: u32 = 0o777;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDirectory {
    path: PathBuf,
}

impl RoomDirectory {
    /// Resolves the directory for `room`; nothing is created until [`RoomDirectory::join`].
    pub fn locate(config: &RoomConfig, room: &RoomName) -> Self {
        Self {
            path: config
                .base_dir
                .join(format!("{}{}", config.prefix, room.as_str())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mailbox(&self, username: &Username) -> Mailbox {
        Mailbox::at(self.path.join(username.as_str()))
    }

    /// Creates the room (if absent) and this participant's mailbox (if absent).
    pub fn join(&self, username: &Username) -> Result<(Mailbox, MailboxState), AppError> {
        DirBuilder::new()
            .recursive(true)
            .mode(ROOM_DIR_MODE)
            .create(&self.path)
            .map_err(|source| AppError::RoomCreate {
                path: self.path.clone(),
                source,
            })?;

        let mailbox = self.mailbox(username);
        let state = mailbox.create().map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                AppError::MailboxOccupied {
                    path: mailbox.path().to_path_buf(),
                }
            } else {
                AppError::MailboxCreate {
                    path: mailbox.path().to_path_buf(),
                    source,
                }
            }
        })?;

        Ok((mailbox, state))
    }

    /// Current members, sorted by name.
    pub fn members(&self) -> Result<Vec<Username>, AppError> {
        let entries = fs::read_dir(&self.path).map_err(|source| AppError::DirectoryScan {
            path: self.path.clone(),
            source,
        })?;

        let mut members: Vec<Username> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                Username::parse(name.to_str()?).ok()
            })
            .collect();
        members.sort();

        Ok(members)
    }

    /// Removes this participant's mailbox; removing an absent one is fine.
    pub fn leave(&self, username: &Username) -> Result<(), AppError> {
        let mailbox = self.mailbox(username);
        mailbox.remove().map_err(|source| AppError::MailboxRemove {
            path: mailbox.path().to_path_buf(),
            source,
        })
    }
}
