use dotenv::dotenv;
use std::env;

const STRICT_MODIFY: &str = "ENGINE_STRICT_MODIFY";
const LEVEL_CAPACITY: &str = "ENGINE_LEVEL_CAPACITY";

/// Behavior toggles for the matching engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// When true, a modify that asks to grow a resting order fails as a
    /// whole instead of applying only the price move.
    pub strict_modify: bool,
    /// Initial queue capacity reserved for each new price level.
    pub level_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strict_modify: false,
            level_capacity: 4,
        }
    }
}

impl EngineConfig {
    /// Builds a configuration from the environment, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> EngineConfig {
        // Load .env file
        dotenv().ok();

        let defaults = EngineConfig::default();

        let strict_modify = env::var(STRICT_MODIFY)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.strict_modify);
        let level_capacity = env::var(LEVEL_CAPACITY)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.level_capacity);

        EngineConfig {
            strict_modify,
            level_capacity,
        }
    }
}
