//! Fan-out of one input line to every other member of the room.
//!
//! Each recipient gets its own delivery task so a slow or absent peer never
//! holds up the others. All tasks of one generation are joined before the
//! caller reads the next line, which keeps per-sender ordering.

use tokio::task::JoinSet;

use crate::{
    domain::{
        delivery::{BroadcastReport, DeliveryOutcome},
        message::Message,
        room::{Participant, Username},
    },
    infra::{config::BroadcastConfig, error::AppError, mailbox, membership::RoomDirectory},
};

const DELIVERY_TASK_FAILED: &str = "DELIVERY_TASK_FAILED";

/// Sends `text` from `sender` to everyone else in `room`.
///
/// Returns `Ok(None)` when the line is blank and nothing was sent. Failing
/// to scan the room is the only error; individual drops land in the report.
pub async fn broadcast(
    room: &RoomDirectory,
    sender: &Participant,
    text: &str,
    config: &BroadcastConfig,
) -> Result<Option<BroadcastReport>, AppError> {
    let Some(message) = Message::compose(sender, text) else {
        return Ok(None);
    };

    let recipients: Vec<Username> = room
        .members()?
        .into_iter()
        .filter(|member| *member != sender.username)
        .collect();
    let skipped = recipients.len().saturating_sub(config.max_recipients);

    let mut deliveries = JoinSet::new();
    for recipient in recipients.into_iter().take(config.max_recipients) {
        let target = room.mailbox(&recipient);
        let message = message.clone();
        let timeout = config.delivery_timeout();
        deliveries.spawn(async move {
            let outcome = mailbox::deliver(&target, &message, timeout).await;
            (recipient, outcome)
        });
    }

    tracing::debug!(
        recipients = deliveries.len(),
        skipped,
        bytes = message.byte_len(),
        "broadcast dispatched"
    );

    let mut outcomes = Vec::with_capacity(deliveries.len());
    while let Some(joined) = deliveries.join_next().await {
        match joined {
            Ok((recipient, outcome)) => {
                if let DeliveryOutcome::Dropped(reason) = outcome {
                    tracing::debug!(
                        recipient = %recipient,
                        reason = reason.code(),
                        "delivery dropped"
                    );
                }
                outcomes.push((recipient, outcome));
            }
            Err(error) => {
                tracing::warn!(
                    code = DELIVERY_TASK_FAILED,
                    error = %error,
                    "delivery task did not complete"
                );
            }
        }
    }
    outcomes.sort_by(|(left, _), (right, _)| left.cmp(right));

    Ok(Some(BroadcastReport { outcomes, skipped }))
}
