use std::path::PathBuf;

use clap::Parser;

use crate::{
    domain::room::{Participant, RoomName, Username},
    infra::error::AppError,
};

#[derive(Debug, Parser)]
#[command(name = "chatroom", about = "Chat with everyone in a local room")]
pub struct Cli {
    /// Path to config file (default: $CHATROOM_CONFIG, then ./config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Room to join; created on first use
    pub room: String,

    /// Your name inside the room
    pub username: String,
}

impl Cli {
    /// Validates the positional names; no side effects.
    pub fn participant(&self) -> Result<Participant, AppError> {
        Ok(Participant::new(
            RoomName::parse(&self.room)?,
            Username::parse(&self.username)?,
        ))
    }
}
