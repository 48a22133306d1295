//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks. Requests carry
//! their own records, so nothing here is mutable.

use crate::analysis::CorrelationAnalyzer;
use crate::config::Config;
use crate::narrative::{HttpNarrator, NarrativeError, NarrativeGenerator};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Analyzer built from `[analysis]`
    pub analyzer: CorrelationAnalyzer,
    /// Narrative generator (optional)
    pub narrator: Option<Arc<dyn NarrativeGenerator>>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState without a narrative generator
    pub fn new(config: Config) -> Self {
        Self {
            analyzer: CorrelationAnalyzer::new(config.analysis.options()),
            config: Arc::new(config),
            narrator: None,
            start_time: Instant::now(),
        }
    }

    /// Create AppState, wiring up the HTTP narrator when `[narrative]` is enabled
    pub fn from_config(config: Config) -> Result<Self, NarrativeError> {
        let narrator = if config.narrative.enabled {
            Some(HttpNarrator::from_config(&config.narrative)?)
        } else {
            None
        };

        let state = Self::new(config);
        Ok(match narrator {
            Some(n) => state.with_narrator(Arc::new(n)),
            None => state,
        })
    }

    /// Builder: use the given narrative generator
    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn has_narrator(&self) -> bool {
        self.narrator.is_some()
    }
}
