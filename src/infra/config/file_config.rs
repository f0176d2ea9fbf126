use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{AppConfig, BroadcastConfig, LogConfig, ReaderConfig, RoomConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub room: Option<FileRoomConfig>,
    pub broadcast: Option<FileBroadcastConfig>,
    pub reader: Option<FileReaderConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(room) = self.room {
            room.merge_into(&mut config.room);
        }

        if let Some(broadcast) = self.broadcast {
            broadcast.merge_into(&mut config.broadcast);
        }

        if let Some(reader) = self.reader {
            reader.merge_into(&mut config.reader);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileRoomConfig {
    pub base_dir: Option<PathBuf>,
    pub prefix: Option<String>,
}

impl FileRoomConfig {
    fn merge_into(self, config: &mut RoomConfig) {
        if let Some(base_dir) = self.base_dir {
            config.base_dir = base_dir;
        }

        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileBroadcastConfig {
    pub max_recipients: Option<usize>,
    pub delivery_timeout_ms: Option<u64>,
}

impl FileBroadcastConfig {
    fn merge_into(self, config: &mut BroadcastConfig) {
        if let Some(max_recipients) = self.max_recipients {
            config.max_recipients = max_recipients;
        }

        if let Some(timeout_ms) = self.delivery_timeout_ms {
            config.delivery_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileReaderConfig {
    pub buffer_bytes: Option<usize>,
    pub shutdown_grace_ms: Option<u64>,
}

impl FileReaderConfig {
    fn merge_into(self, config: &mut ReaderConfig) {
        if let Some(buffer_bytes) = self.buffer_bytes {
            config.buffer_bytes = buffer_bytes;
        }

        if let Some(grace_ms) = self.shutdown_grace_ms {
            config.shutdown_grace_ms = grace_ms;
        }
    }
}
