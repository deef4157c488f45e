//! Domain event bus configuration.

use serde::{Deserialize, Serialize};

/// In-process event bus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Capacity of the broadcast channel; slow subscribers past this lag.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Spawn a subscriber that logs every committed admission event.
    #[serde(default = "default_log_events")]
    pub log_events: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            log_events: default_log_events(),
        }
    }
}

fn default_buffer_size() -> usize {
    1024
}

fn default_log_events() -> bool {
    true
}
