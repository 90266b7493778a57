//! Outbound proxy selection for dispatches.
//!
//! Selection is a pure function of the running dispatch counter, so
//! rotation is deterministic and testable without mocking time.

use crate::config::{ProxyConfig, ProxyMode};

/// Round-robin / fixed selection over a configured address pool.
#[derive(Debug, Clone)]
pub struct ProxyRotator {
    pool: Vec<String>,
    mode: ProxyMode,
    frequency: u64,
}

impl ProxyRotator {
    pub fn new(pool: Vec<String>, mode: ProxyMode, frequency: u64) -> Self {
        Self {
            pool,
            mode,
            frequency: frequency.max(1),
        }
    }

    pub fn from_config(cfg: &ProxyConfig) -> Self {
        Self::new(cfg.addresses.clone(), cfg.mode, cfg.rotation_frequency)
    }

    /// Address for the given dispatch. Empty pool means "no proxy", which is
    /// not an error; the scheduler dispatches directly.
    ///
    /// In rotating mode the pool advances every `frequency` dispatches:
    /// `index = (dispatch_count / frequency) % pool_len`.
    pub fn next(&self, dispatch_count: u64) -> Option<&str> {
        if self.pool.is_empty() {
            return None;
        }
        let index = match self.mode {
            ProxyMode::Fixed => 0,
            ProxyMode::Rotating => {
                ((dispatch_count / self.frequency) % self.pool.len() as u64) as usize
            }
        };
        Some(self.pool[index].as_str())
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}
