//! Configuration persistence seam.
//!
//! The wizard saves the draft configuration through an injected store after
//! every mutation and reads it back once at session construction. File-backed
//! implementations live outside the core.

use crate::MissionConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(String),
}

pub trait ConfigStore {
    /// The saved configuration, or `None` when nothing usable is stored.
    /// Malformed data is "no saved configuration", never an error.
    fn load(&self) -> Option<MissionConfig>;

    fn save(&mut self, config: &MissionConfig) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: Option<MissionConfig>,
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Option<MissionConfig> {
        self.saved.clone()
    }

    fn save(&mut self, config: &MissionConfig) -> Result<(), StoreError> {
        self.saved = Some(config.clone());
        Ok(())
    }
}
