use crate::domain::room::Username;

/// Why one recipient did not get a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No reader attached, or the mailbox vanished after the scan.
    NoReader,
    WriteFailed,
    /// The write did not finish within the delivery timeout.
    TimedOut,
    /// The mailbox could not be opened for another reason (permissions, not a pipe).
    Unreachable,
}

impl DropReason {
    pub fn code(self) -> &'static str {
        match self {
            Self::NoReader => "NO_READER",
            Self::WriteFailed => "WRITE_FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Unreachable => "UNREACHABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Dropped(DropReason),
}

/// Result of one broadcast generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub outcomes: Vec<(Username, DeliveryOutcome)>,
    /// Members left out because the recipient bound was reached.
    pub skipped: usize,
}

impl BroadcastReport {
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == DeliveryOutcome::Delivered)
            .count()
    }

    pub fn dropped(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

#[cfg(test)]
impl BroadcastReport {
    pub fn outcome_for(&self, username: &Username) -> Option<DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == username)
            .map(|(_, outcome)| *outcome)
    }
}
