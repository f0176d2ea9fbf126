use std::path::PathBuf;

use thiserror::Error;

use crate::domain::room::NameError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("usage: chatroom <roomname> <username>: {0}")]
    Usage(#[from] NameError),
    #[error("failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value `{key}`: {details}")]
    ConfigInvalid { key: &'static str, details: String },
    #[error(transparent)]
    ConfigLoad(anyhow::Error),
    #[error("failed to initialize logging: {0}")]
    LoggingInit(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("failed to create room directory {path}: {source}")]
    RoomCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create mailbox {path}: {source}")]
    MailboxCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mailbox path {path} is taken by something that is not a pipe")]
    MailboxOccupied { path: PathBuf },
    #[error("failed to remove mailbox {path}: {source}")]
    MailboxRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list room directory {path}: {source}")]
    DirectoryScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("room has {members} other members; only the first {limit} received this message")]
    Capacity { limit: usize, members: usize },
    #[error("failed to start reader task: {0}")]
    ReaderSpawn(#[source] std::io::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to install interrupt handlers: {0}")]
    Signals(#[source] std::io::Error),
    #[error("terminal I/O failed: {0}")]
    Console(#[source] std::io::Error),
    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),
}
