//! Point rules for drill completions.

use serde::{Deserialize, Serialize};

use crate::drill::PERFECT_RATING;

/// Configurable point amounts for drill completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRules {
    /// Awarded for every drill completion.
    #[serde(default = "default_drill_base")]
    pub drill_base: i64,

    /// Added when the drill is rated 5.
    #[serde(default = "default_perfect_rating_bonus")]
    pub perfect_rating_bonus: i64,

    /// Added when the first completion of the day extends the streak.
    #[serde(default = "default_streak_bonus")]
    pub streak_bonus: i64,
}

impl Default for PointRules {
    fn default() -> Self {
        Self {
            drill_base: default_drill_base(),
            perfect_rating_bonus: default_perfect_rating_bonus(),
            streak_bonus: default_streak_bonus(),
        }
    }
}

fn default_drill_base() -> i64 {
    10
}

fn default_perfect_rating_bonus() -> i64 {
    5
}

fn default_streak_bonus() -> i64 {
    20
}

/// Breakdown of the points credited for one drill completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrillPoints {
    pub base: i64,
    pub perfect_bonus: i64,
    pub streak_bonus: i64,
}

impl DrillPoints {
    /// Sum of every component; applied as one increment.
    pub fn total(&self) -> i64 {
        self.base + self.perfect_bonus + self.streak_bonus
    }
}

impl PointRules {
    /// Computes the award for a drill with the given rating.
    pub fn drill_points(&self, rating: Option<u8>, streak_extended: bool) -> DrillPoints {
        DrillPoints {
            base: self.drill_base,
            perfect_bonus: if rating == Some(PERFECT_RATING) {
                self.perfect_rating_bonus
            } else {
                0
            },
            streak_bonus: if streak_extended { self.streak_bonus } else { 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reference_amounts() {
        let rules = PointRules::default();
        assert_eq!(rules.drill_points(None, false).total(), 10);
        assert_eq!(rules.drill_points(Some(4), false).total(), 10);
        assert_eq!(rules.drill_points(Some(5), false).total(), 15);
        assert_eq!(rules.drill_points(Some(5), true).total(), 35);
        assert_eq!(
            rules.drill_points(Some(3), true),
            DrillPoints {
                base: 10,
                perfect_bonus: 0,
                streak_bonus: 20,
            }
        );
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let rules: PointRules = serde_json::from_str(r#"{"streak_bonus": 25}"#).unwrap();
        assert_eq!(rules.streak_bonus, 25);
        assert_eq!(rules.drill_base, 10);
        assert_eq!(rules.perfect_rating_bonus, 5);
    }
}
