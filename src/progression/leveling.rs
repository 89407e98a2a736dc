/// Leveling table - maps cumulative XP to a level
use crate::error::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};

/// Canonical XP thresholds; level `i + 1` starts at `STANDARD_THRESHOLDS[i]`
pub const STANDARD_THRESHOLDS: [u64; 10] = [0, 100, 250, 500, 1000, 2000, 3500, 5000, 7500, 10000];

/// XP per synthetic level past the last threshold
pub const STANDARD_OPEN_INCREMENT: u64 = 5000;

/// Derived level information for a given XP total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u32,
    pub xp_to_next_level: u64,
}

/// Strictly increasing threshold sequence with an open-ended tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    thresholds: Vec<u64>,
    open_increment: u64,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl LevelTable {
    /// The single table used by every code path that derives a level
    pub fn standard() -> Self {
        Self {
            thresholds: STANDARD_THRESHOLDS.to_vec(),
            open_increment: STANDARD_OPEN_INCREMENT,
        }
    }

    /// Create a custom table
    pub fn new(thresholds: Vec<u64>, open_increment: u64) -> TrackerResult<Self> {
        if thresholds.first() != Some(&0) {
            return Err(TrackerError::Validation(
                "Level thresholds must start at 0".to_string(),
            ));
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TrackerError::Validation(
                "Level thresholds must be strictly increasing".to_string(),
            ));
        }
        if open_increment == 0 {
            return Err(TrackerError::Validation(
                "Open-ended level increment must be positive".to_string(),
            ));
        }

        Ok(Self {
            thresholds,
            open_increment,
        })
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    /// Level and XP remaining until the next level
    ///
    /// Past the last threshold every `open_increment` XP is one more level,
    /// so leveling never halts. Saturates at `u32::MAX` levels and at
    /// `u64::MAX` XP rather than overflowing.
    pub fn level_of(&self, xp: u64) -> LevelInfo {
        let n = self.thresholds.len();
        // thresholds[0] == 0, so the partition point is always >= 1
        let reached = self.thresholds.partition_point(|&t| t <= xp);

        if reached < n {
            return LevelInfo {
                level: reached as u32,
                xp_to_next_level: self.thresholds[reached] - xp,
            };
        }

        let last = self.thresholds[n - 1];
        let extra = (xp - last) / self.open_increment;
        let next_at = last.saturating_add(extra.saturating_add(1).saturating_mul(self.open_increment));

        LevelInfo {
            level: u32::try_from((n as u64).saturating_add(extra)).unwrap_or(u32::MAX),
            xp_to_next_level: next_at - xp,
        }
    }
}
