//! Session tunables and config file loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::scoring::{HintPolicy, StreakBonusRule};

/// Inclusive range the sampled pool size is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSize {
    pub min: usize,
    pub max: usize,
}

impl Default for PoolSize {
    fn default() -> Self {
        Self { min: 5, max: 10 }
    }
}

/// Every tunable of a quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds the learner has for each question.
    #[serde(default = "default_timer_budget")]
    pub timer_budget_secs: u32,
    /// Period of the countdown tick in milliseconds.
    #[serde(default = "default_clock_tick")]
    pub clock_tick_ms: u64,
    /// Period of the engagement signal refresh in milliseconds.
    #[serde(default = "default_engagement_tick")]
    pub engagement_tick_ms: u64,
    /// Answered questions between difficulty checks.
    #[serde(default = "default_recalibration_period")]
    pub recalibration_period: u32,
    /// Range the number of sampled questions is drawn from.
    #[serde(default)]
    pub pool_size: PoolSize,
    /// XP debited per hint.
    #[serde(default = "default_hint_cost")]
    pub hint_cost: u32,
    /// Target difficulty at start and after reset.
    #[serde(default)]
    pub baseline_difficulty: Difficulty,
    /// The first question is the first sampled one at or below this level.
    #[serde(default)]
    pub entry_max_difficulty: Difficulty,
    /// When the streak bonus is paid.
    #[serde(default)]
    pub streak_bonus: StreakBonusRule,
    /// Whether repeated hints for one question are charged again.
    #[serde(default)]
    pub hint_policy: HintPolicy,
    /// Permit pools smaller than `pool_size.min` when the category is small.
    #[serde(default = "default_true")]
    pub allow_short_pool: bool,
}

fn default_timer_budget() -> u32 {
    30
}
fn default_clock_tick() -> u64 {
    1000
}
fn default_engagement_tick() -> u64 {
    3000
}
fn default_recalibration_period() -> u32 {
    3
}
fn default_hint_cost() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timer_budget_secs: default_timer_budget(),
            clock_tick_ms: default_clock_tick(),
            engagement_tick_ms: default_engagement_tick(),
            recalibration_period: default_recalibration_period(),
            pool_size: PoolSize::default(),
            hint_cost: default_hint_cost(),
            baseline_difficulty: Difficulty::default(),
            entry_max_difficulty: Difficulty::default(),
            streak_bonus: StreakBonusRule::default(),
            hint_policy: HintPolicy::default(),
            allow_short_pool: true,
        }
    }
}

impl SessionConfig {
    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn engagement_tick(&self) -> Duration {
        Duration::from_millis(self.engagement_tick_ms)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.timer_budget_secs >= 1,
            "timer_budget_secs must be at least 1"
        );
        anyhow::ensure!(self.clock_tick_ms >= 1, "clock_tick_ms must be at least 1");
        anyhow::ensure!(
            self.engagement_tick_ms >= 1,
            "engagement_tick_ms must be at least 1"
        );
        anyhow::ensure!(
            self.recalibration_period >= 1,
            "recalibration_period must be at least 1"
        );
        anyhow::ensure!(self.pool_size.min >= 1, "pool_size.min must be at least 1");
        anyhow::ensure!(
            self.pool_size.min <= self.pool_size.max,
            "pool_size.min ({}) exceeds pool_size.max ({})",
            self.pool_size.min,
            self.pool_size.max
        );
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptquiz.toml` in the current directory
/// 2. `~/.config/adaptquiz/config.toml`
///
/// Environment variable override: `ADAPTQUIZ_TIMER_SECS`.
pub fn load_config() -> Result<SessionConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SessionConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("adaptquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SessionConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Ok(secs) = std::env::var("ADAPTQUIZ_TIMER_SECS") {
        config.timer_budget_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("invalid ADAPTQUIZ_TIMER_SECS: '{secs}'"))?;
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptquiz"))
}
