pub const BASE_SCORE: f64 = 10_000.0;
pub const PENALTY_PER_SECOND: f64 = 100.0;

/// Time based scoring: start from a base and lose a fixed amount per elapsed second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRule {
    pub base: f64,
    pub penalty_per_second: f64,
    /// Lowest score a session can end with. `None` lets slow play go negative.
    pub floor: Option<f64>,
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self {
            base: BASE_SCORE,
            penalty_per_second: PENALTY_PER_SECOND,
            floor: None,
        }
    }
}

impl ScoreRule {
    pub fn with_floor(floor: Option<f64>) -> Self {
        Self {
            floor,
            ..Self::default()
        }
    }

    pub fn score(&self, elapsed_ms: i64) -> f64 {
        let elapsed_secs = elapsed_ms as f64 / 1000.0;
        let raw = self.base - elapsed_secs * self.penalty_per_second;
        match self.floor {
            Some(floor) => raw.max(floor),
            None => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_seconds_costs_a_thousand() {
        assert_eq!(ScoreRule::default().score(10_000), 9000.0);
    }

    #[test]
    fn fractional_seconds_are_penalised_proportionally() {
        assert_eq!(ScoreRule::default().score(12_500), 8750.0);
        assert!((ScoreRule::default().score(12_345) - 8765.5).abs() < 1e-9);
        assert_eq!(ScoreRule::default().score(0), BASE_SCORE);
    }

    #[test]
    fn slow_play_goes_negative_without_floor() {
        assert_eq!(ScoreRule::default().score(150_000), -5000.0);
    }

    #[test]
    fn floor_clamps_slow_play() {
        let rule = ScoreRule::with_floor(Some(0.0));
        assert_eq!(rule.score(150_000), 0.0);
        assert_eq!(rule.score(10_000), 9000.0);
    }
}
