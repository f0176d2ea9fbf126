//! Room and participant identities.
//!
//! Both names end up as single path components inside the shared room
//! directory, so they are validated once here and carried as newtypes.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} `{value}` must not contain `/` or NUL")]
    Separator { kind: &'static str, value: String },
    #[error("{kind} `{value}` is reserved")]
    Reserved { kind: &'static str, value: String },
}

fn validate(kind: &'static str, raw: &str) -> Result<(), NameError> {
    if raw.is_empty() {
        return Err(NameError::Empty { kind });
    }

    if raw.contains(['/', '\0']) {
        return Err(NameError::Separator {
            kind,
            value: raw.to_owned(),
        });
    }

    if raw == "." || raw == ".." {
        return Err(NameError::Reserved {
            kind,
            value: raw.to_owned(),
        });
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomName(String);

impl RoomName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        validate("room name", raw)?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        validate("username", raw)?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user session inside one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub room: RoomName,
    pub username: Username,
}

impl Participant {
    pub fn new(room: RoomName, username: Username) -> Self {
        Self { room, username }
    }

    /// Input prompt shown while waiting for the next line.
    pub fn prompt(&self) -> String {
        format!("[{}] {} > ", self.room, self.username)
    }
}
