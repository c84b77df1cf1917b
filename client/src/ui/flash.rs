//! Single-slot, auto-expiring notification.
//!
//! At most one message is visible. Showing a new one aborts the pending expiry
//! task and schedules a fresh one, and a generation counter makes sure an
//! expiry that already woke up cannot clear a newer message.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for FlashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
            FlashKind::Info => "info",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

#[derive(Default)]
struct Slot {
    message: Option<FlashMessage>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

#[derive(Clone)]
pub struct FlashStore {
    slot: Arc<Mutex<Slot>>,
    default_timeout: Duration,
}

impl fmt::Debug for FlashStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashStore")
            .field("current", &self.current())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl FlashStore {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            default_timeout,
        }
    }

    pub fn show(&self, kind: FlashKind, text: impl Into<String>) {
        self.show_for(kind, text, self.default_timeout);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(FlashKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(FlashKind::Error, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(FlashKind::Info, text);
    }

    pub fn show_for(&self, kind: FlashKind, text: impl Into<String>, timeout: Duration) {
        let text = text.into();
        debug!("flash {}: {}", kind, text);

        let mut slot = self.lock();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.message = Some(FlashMessage { kind, text });

        // Outside a runtime the message simply stays until replaced or cleared.
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        slot.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut slot = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.generation == generation {
                slot.message = None;
                slot.timer = None;
            }
        }));
    }

    pub fn clear(&self) {
        let mut slot = self.lock();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.message = None;
    }

    pub fn current(&self) -> Option<FlashMessage> {
        self.lock().message.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(store: &FlashStore) -> Option<String> {
        store.current().map(|message| message.text)
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_expires_after_timeout() {
        let store = FlashStore::new(Duration::from_millis(2500));
        store.success("Ticket created (#7)");

        tokio::time::sleep(Duration::from_millis(2400)).await;
        assert_eq!(text(&store).as_deref(), Some("Ticket created (#7)"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_show_supersedes_first_timer() {
        let store = FlashStore::new(Duration::from_millis(2500));
        store.info("first");

        tokio::time::sleep(Duration::from_millis(2000)).await;
        store.error("second");

        // the first timer would have fired here
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let current = store.current().unwrap();
        assert_eq!(current.text, "second");
        assert_eq!(current.kind, FlashKind::Error);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(store.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_timer() {
        let store = FlashStore::new(Duration::from_millis(2500));
        store.show_for(FlashKind::Info, "short", Duration::from_millis(100));
        store.clear();
        assert_eq!(store.current(), None);

        store.info("after clear");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(text(&store).as_deref(), Some("after clear"));
    }

    #[test]
    fn test_without_runtime_message_persists() {
        let store = FlashStore::new(Duration::from_millis(10));
        store.success("no runtime");
        assert_eq!(text(&store).as_deref(), Some("no runtime"));
    }
}
