use crate::collaborators::LogLevelPolicy;

use log::LevelFilter;

/// Level fixed at construction, usually taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredLevelPolicy {
    level: LevelFilter,
}

impl ConfiguredLevelPolicy {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl LogLevelPolicy for ConfiguredLevelPolicy {
    fn current_level(&self) -> LevelFilter {
        self.level
    }
}

/// Follows the global `log` max level, so a logger reconfigured at runtime
/// changes policy decisions too.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLevelPolicy;

impl LogLevelPolicy for MaxLevelPolicy {
    fn current_level(&self) -> LevelFilter {
        log::max_level()
    }
}
