//! Fallback chain over fetch strategies
//!
//! Strategies run strictly one after another in the configured priority
//! order; the first success short-circuits the rest. This is a linear
//! decision policy, not a scoring mechanism, and the process runs at most a
//! few times per hour, so summed sequential latency is an acceptable trade
//! for simplicity.

use tracing::{info, warn};

use crate::strategies::FetchStrategy;
use crate::types::{ContentRecord, FetchOutcome};

pub struct FallbackResolver {
    strategies: Vec<Box<dyn FetchStrategy>>,
    fallback_text: String,
}

impl FallbackResolver {
    /// Create a resolver over an ordered strategy list and the fixed text
    /// used when every strategy fails.
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>, fallback_text: impl Into<String>) -> Self {
        Self {
            strategies,
            fallback_text: fallback_text.into(),
        }
    }

    /// Run strategies in priority order and return the first success, or a
    /// text-only record built from the fallback text once every strategy has
    /// failed. This never errors: exhaustion is recovered locally.
    pub async fn resolve(&self) -> ContentRecord {
        for strategy in &self.strategies {
            match strategy.fetch().await {
                FetchOutcome::Success(record) => {
                    info!(strategy = strategy.name(), "Content strategy succeeded");
                    return record;
                }
                FetchOutcome::Failure(reason) => {
                    warn!(
                        strategy = strategy.name(),
                        %reason,
                        "Content strategy failed, trying next"
                    );
                }
            }
        }

        warn!("All content strategies failed, using static fallback text");
        ContentRecord::text_only(self.fallback_text.clone())
    }
}
