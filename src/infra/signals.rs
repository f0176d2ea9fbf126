use std::fmt;

use tokio::signal::unix::{signal, Signal, SignalKind};

use crate::infra::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Interrupt,
    Terminate,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// SIGINT/SIGTERM listeners. Once installed, the default abrupt exit is
/// replaced and the session decides how to shut down.
pub struct Interrupts {
    interrupt: Signal,
    terminate: Signal,
}

impl Interrupts {
    /// Must be called from inside the tokio runtime.
    pub fn install() -> Result<Self, AppError> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).map_err(AppError::Signals)?,
            terminate: signal(SignalKind::terminate()).map_err(AppError::Signals)?,
        })
    }

    pub async fn recv(mut self) -> Interrupt {
        tokio::select! {
            _ = self.interrupt.recv() => Interrupt::Interrupt,
            _ = self.terminate.recv() => Interrupt::Terminate,
        }
    }
}
