use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 16;

/// In-process session signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected our token; the store has already been cleared.
    Expired,
}

/// Broadcast channel carrying `SessionEvent`s from the response pipeline to
/// whoever registered interest (normally `AuthSession`).
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Fire-and-forget. Returns how many subscribers were notified.
    pub fn emit(&self, event: SessionEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!("Emitted {:?} to {} subscriber(s)", event, receivers);
                receivers
            }
            Err(_) => {
                tracing::debug!("Emitted {:?} with no subscribers", event);
                0
            }
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
