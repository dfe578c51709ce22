use parking_lot::Mutex;
use probe_core::{Command, EventEnvelope, GameContent, Session};
use probe_outcome::OutcomeBackend;
use probe_world::JsonFileStore;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

/// Deadlines owned by the timing driver. At most one timer is live per
/// purpose; navigating away clears them before they can fire.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseTimers {
    /// End of the score-banner pause, after which the outcome request fires.
    pub banner_deadline: Option<Instant>,
    /// Next mission-log entry reveal.
    pub reveal_deadline: Option<Instant>,
}

pub struct SimState {
    pub session: Session,
    pub content: GameContent,
    pub rng: ChaCha8Rng,
    pub store: JsonFileStore,
    pub timers: PhaseTimers,
}

impl SimState {
    pub fn apply(&mut self, command: &Command) -> Vec<EventEnvelope> {
        let SimState {
            ref mut session,
            ref content,
            ref mut rng,
            ref mut store,
            ..
        } = *self;
        probe_core::apply(session, command, content, rng, store)
    }
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
    pub backend: Arc<OutcomeBackend>,
}
