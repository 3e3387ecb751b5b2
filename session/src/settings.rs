//! Game settings loaded from TOML.

use std::{
    num::{NonZeroU32, NonZeroUsize},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for a play session.
///
/// Every field has a default, so an empty document is a valid configuration.
/// `rows` and `cols` size the interior of generated boards; loaded levels
/// carry their own dimensions and delay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSettings {
    /// Interior rows of generated boards.
    pub rows: u32,
    /// Interior columns of generated boards.
    pub cols: u32,
    /// Ticks before the first flow on generated boards.
    pub delay: u32,
    /// Ticks between consecutive flows.
    pub flow_period: u32,
    /// Number of upcoming pipes shown to the player.
    pub queue_length: usize,
    /// Wall-clock length of one tick in milliseconds.
    pub tick_interval_ms: u64,
    /// Ticks available before the session is lost, if counting down.
    pub time_limit: Option<u32>,
    /// Seed for board generation and the pipe queue.
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            delay: 10,
            flow_period: 5,
            queue_length: 5,
            tick_interval_ms: 1_000,
            time_limit: None,
            seed: None,
        }
    }
}

/// Reasons settings may be refused.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The document is not valid TOML for [`GameSettings`].
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// Flow would never advance.
    #[error("flow period must be at least 1 tick")]
    ZeroFlowPeriod,
    /// The player would see no upcoming pipe.
    #[error("queue length must be at least 1")]
    ZeroQueueLength,
    /// The clock would spin without pause.
    #[error("tick interval must be at least 1 ms")]
    ZeroTickInterval,
    /// A countdown that is already over.
    #[error("time limit must be at least 1 tick")]
    ZeroTimeLimit,
    /// Generated boards need an interior of at least 2×2.
    #[error("board interior must be at least 2x2, got {rows}x{cols}")]
    InteriorTooSmall {
        /// Configured interior rows.
        rows: u32,
        /// Configured interior columns.
        cols: u32,
    },
}

impl GameSettings {
    /// Parses and validates settings from a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let _ = self.nonzero_flow_period()?;
        let _ = self.nonzero_queue_length()?;
        if self.tick_interval_ms == 0 {
            return Err(SettingsError::ZeroTickInterval);
        }
        if self.time_limit == Some(0) {
            return Err(SettingsError::ZeroTimeLimit);
        }
        if self.rows < 2 || self.cols < 2 {
            return Err(SettingsError::InteriorTooSmall {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Flow period as a non-zero tick count.
    pub fn nonzero_flow_period(&self) -> Result<NonZeroU32, SettingsError> {
        NonZeroU32::new(self.flow_period).ok_or(SettingsError::ZeroFlowPeriod)
    }

    /// Queue length as a non-zero count.
    pub fn nonzero_queue_length(&self) -> Result<NonZeroUsize, SettingsError> {
        NonZeroUsize::new(self.queue_length).ok_or(SettingsError::ZeroQueueLength)
    }

    /// Wall-clock duration of one tick.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
