use std::{
    fs::{File, OpenOptions},
    os::unix::fs::OpenOptionsExt,
    path::Path,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::{
    domain::{
        delivery::DeliveryOutcome,
        message::Message,
        room::{Participant, RoomName, Username},
    },
    infra::{
        config::RoomConfig,
        mailbox::{deliver, Mailbox},
    },
};

pub fn user(name: &str) -> Username {
    Username::parse(name).expect("valid username")
}

pub fn participant(room: &str, name: &str) -> Participant {
    Participant::new(RoomName::parse(room).expect("valid room"), user(name))
}

pub fn room_config(base: &Path) -> RoomConfig {
    RoomConfig {
        base_dir: base.to_path_buf(),
        ..RoomConfig::default()
    }
}

/// `[demo] alice: <text>\n`
pub fn sample_message(text: &str) -> Message {
    Message::compose(&participant("demo", "alice"), text).expect("non-empty message")
}

/// Opens the read end without waiting for a writer.
pub fn nonblocking_reader(path: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .expect("pipe should open for reading")
}

/// Retries delivery until a reader thread has attached or `timeout` passes.
pub async fn deliver_when_attached(
    mailbox: &Mailbox,
    message: &Message,
    timeout: Duration,
) -> DeliveryOutcome {
    let deadline = Instant::now() + timeout;
    loop {
        let outcome = deliver(mailbox, message, timeout).await;
        if outcome == DeliveryOutcome::Delivered || Instant::now() >= deadline {
            return outcome;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}
