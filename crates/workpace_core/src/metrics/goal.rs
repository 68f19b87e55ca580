use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TARGET_EFFICIENCY: f64 = 80.0;

/// Fraction of the target above which a missed goal still counts as close.
const GOOD_PROGRESS_RATIO: f64 = 0.8;

/// Coarse assessment of efficiency against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStanding {
    /// Target met or exceeded.
    Excellent,
    /// At least 80% of the target.
    GoodProgress,
    NeedsImprovement,
}

impl GoalStanding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::GoodProgress => "good-progress",
            Self::NeedsImprovement => "needs-improvement",
        }
    }

    fn assess(efficiency: f64, target: f64) -> Self {
        if efficiency >= target {
            Self::Excellent
        } else if efficiency >= target * GOOD_PROGRESS_RATIO {
            Self::GoodProgress
        } else {
            Self::NeedsImprovement
        }
    }
}

impl fmt::Display for GoalStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an efficiency figure toward a user-chosen target.
///
/// `progress` is clamped to 100 even though efficiency itself is not.
/// `gap` is relative to the target ("% more needed"), not a difference in
/// percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub target: f64,
    pub efficiency: f64,
    pub progress: f64,
    pub achieved: bool,
    pub gap: f64,
    pub standing: GoalStanding,
}

impl GoalProgress {
    pub fn evaluate(efficiency: f64, target: f64) -> Self {
        let target = clamp_target(target);

        // A zero target is met by any efficiency.
        if target <= 0.0 {
            return Self {
                target,
                efficiency,
                progress: 100.0,
                achieved: true,
                gap: 0.0,
                standing: GoalStanding::Excellent,
            };
        }

        let achieved = efficiency >= target;
        let gap = if achieved {
            0.0
        } else {
            (target - efficiency) / target * 100.0
        };

        Self {
            target,
            efficiency,
            progress: (efficiency / target * 100.0).min(100.0),
            achieved,
            gap,
            standing: GoalStanding::assess(efficiency, target),
        }
    }
}

pub fn clamp_target(target: f64) -> f64 {
    if target.is_nan() {
        return DEFAULT_TARGET_EFFICIENCY;
    }
    target.clamp(0.0, 100.0)
}
