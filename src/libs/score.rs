use crate::libs::config::LineageConfig;
use crate::libs::error::LineageError;
use crate::libs::stats;
use crate::libs::trajectory::Trajectory;

const ADDITIVE_STRICT: f64 = 2.0;
const ADDITIVE_LOOSE: f64 = 1.0;
const ADDITIVE_VIOLATED: f64 = -2.0;
const ADDITIVE_SUMMATION: f64 = 1.0;
const DERIVATIVE_SCORE: f64 = 2.0;
// Keeps the area swing between two candidates below 0.5
const AREA_WEIGHT: f64 = 0.25;

/// Breakdown of the score of one (background, descendant) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairScore {
    pub additive: f64,
    pub derivative: f64,
    pub area: f64,
    pub total: f64,
    /// Number of timepoints that took part in the comparison
    pub informative: usize,
}

impl PairScore {
    fn new(additive: f64, derivative: f64, area: f64, informative: usize) -> Self {
        Self {
            additive,
            derivative,
            area,
            total: additive + derivative + area,
            informative,
        }
    }
}

/// One evaluated pair, kept for diagnostics only.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub descendant: String,
    pub background: String,
    pub score: PairScore,
}

/// How the frequency changes of two genotypes move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Correlated,
    Anticorrelated,
    Uncorrelated,
}

/// Scores how plausible it is that one genotype is the background of another.
///
/// The score is a pure function of the two trajectories and the cutoffs.
#[derive(Debug, Clone, Copy)]
pub struct PairScorer<'a> {
    config: &'a LineageConfig,
}

impl<'a> PairScorer<'a> {
    pub fn new(config: &'a LineageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LineageConfig {
        self.config
    }

    /// Score `descendant` as nested inside `background`.
    ///
    /// Only informative timepoints are compared: both frequencies above the detection limit
    /// and not both fixed. Fewer than two of them gives an all-zero score.
    pub fn score_pair(
        &self,
        background: &Trajectory,
        descendant: &Trajectory,
    ) -> Result<PairScore, LineageError> {
        if !background.is_aligned(descendant) {
            return Err(LineageError::DimensionMismatch(format!(
                "background has {} timepoints, descendant has {} and they are not aligned",
                background.len(),
                descendant.len()
            )));
        }

        let mut times = vec![];
        let mut left = vec![];
        let mut right = vec![];
        for ((t, b), (_, d)) in background.iter().zip(descendant.iter()) {
            if self.is_informative(b, d) {
                times.push(t);
                left.push(b);
                right.push(d);
            }
        }

        if times.len() < 2 {
            return Ok(PairScore {
                informative: times.len(),
                ..PairScore::default()
            });
        }

        Ok(PairScore::new(
            self.additive_score(&left, &right),
            self.derivative_score(&left, &right),
            self.area_score(&times, &left, &right),
            times.len(),
        ))
    }

    fn is_informative(&self, background: f64, descendant: f64) -> bool {
        let detected = background > self.config.detection_limit
            && descendant > self.config.detection_limit;
        let fixed =
            background >= self.config.fixed_limit && descendant >= self.config.fixed_limit;
        detected && !fixed
    }

    /// A background can't be smaller than what it contains.
    pub fn additive_score(&self, background: &[f64], descendant: &[f64]) -> f64 {
        let excess: Vec<f64> = background
            .iter()
            .zip(descendant)
            .map(|(b, d)| d - b)
            .collect();
        let strict = excess
            .iter()
            .filter(|e| **e > self.config.additive_cutoff)
            .count();
        let loose = excess
            .iter()
            .filter(|e| **e > self.config.significant_cutoff)
            .count();

        let score = if strict == 0 {
            ADDITIVE_STRICT
        } else if loose <= 1 {
            ADDITIVE_LOOSE
        } else {
            return ADDITIVE_VIOLATED;
        };

        // Together above the whole population: they can't be siblings
        let sums: Vec<f64> = background
            .iter()
            .zip(descendant)
            .map(|(b, d)| b + d)
            .collect();
        let double_check = sums
            .iter()
            .filter(|s| **s > 1.0 + self.config.additive_cutoff)
            .count();
        let single_check = sums
            .iter()
            .filter(|s| **s > 1.0 + self.config.significant_cutoff)
            .count();

        if double_check >= 2 || single_check >= 1 {
            score + ADDITIVE_SUMMATION
        } else {
            score
        }
    }

    /// Correlation of the per-step frequency changes.
    pub fn association(&self, background: &[f64], descendant: &[f64]) -> Association {
        let left = stats::deltas(background);
        let right = stats::deltas(descendant);

        match stats::pearson(&left, &right) {
            Some(corr) if corr.pvalue <= self.config.pvalue => {
                if corr.r > self.config.derivative_cutoff {
                    Association::Correlated
                } else if corr.r < -self.config.derivative_cutoff {
                    Association::Anticorrelated
                } else {
                    Association::Uncorrelated
                }
            }
            _ => Association::Uncorrelated,
        }
    }

    pub fn derivative_score(&self, background: &[f64], descendant: &[f64]) -> f64 {
        match self.association(background, descendant) {
            Association::Correlated => DERIVATIVE_SCORE,
            Association::Anticorrelated => -DERIVATIVE_SCORE,
            Association::Uncorrelated => 0.0,
        }
    }

    /// Prefers the background that encloses the descendant most tightly.
    pub fn area_score(&self, times: &[f64], background: &[f64], descendant: &[f64]) -> f64 {
        let span = match (times.first(), times.last()) {
            (Some(first), Some(last)) if last > first => last - first,
            _ => return 0.0,
        };
        let difference =
            stats::trapezoid(times, background) - stats::trapezoid(times, descendant);

        -AREA_WEIGHT * difference / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn traj(values: &[f64]) -> Trajectory {
        let timepoints = (0..values.len()).map(|i| i as f64).collect();
        Trajectory::new(timepoints, values.to_vec()).unwrap()
    }

    #[test]
    fn test_score_correlated_pair() {
        let config = LineageConfig::new(0.03, 0.97, 0.05);
        let scorer = PairScorer::new(&config);

        let background = traj(&[0.2, 0.4, 0.3, 0.5, 0.4, 0.6, 0.5, 0.7]);
        let descendant = traj(&[0.1, 0.3, 0.2, 0.4, 0.3, 0.5, 0.4, 0.6]);
        let score = scorer.score_pair(&background, &descendant).unwrap();

        // Dominance plus summation above 1.15 at the last point
        assert_relative_eq!(score.additive, 3.0);
        assert_relative_eq!(score.derivative, 2.0);
        assert_relative_eq!(score.area, -0.025, epsilon = 1e-12);
        assert_relative_eq!(score.total, 4.975, epsilon = 1e-12);
        assert_eq!(score.informative, 8);
    }

    #[test]
    fn test_score_anticorrelated_pair() {
        let config = LineageConfig::new(0.03, 0.97, 0.05);
        let scorer = PairScorer::new(&config);

        let background = traj(&[0.2, 0.4, 0.3, 0.5, 0.4, 0.6, 0.5, 0.7]);
        let descendant = traj(&[0.15, 0.05, 0.2, 0.1, 0.25, 0.15, 0.3, 0.2]);
        let score = scorer.score_pair(&background, &descendant).unwrap();

        assert_relative_eq!(score.additive, 2.0);
        assert_relative_eq!(score.derivative, -2.0);
        assert_relative_eq!(score.area, -0.06875, epsilon = 1e-12);
        assert_relative_eq!(score.total, -0.06875, epsilon = 1e-12);
    }

    #[test]
    fn test_association() {
        let config = LineageConfig::default();
        let scorer = PairScorer::new(&config);

        let up = [0.1, 0.3, 0.2, 0.4, 0.3, 0.5];
        let same = [0.05, 0.25, 0.15, 0.35, 0.25, 0.45];
        let mirror = [0.5, 0.3, 0.4, 0.2, 0.3, 0.1];
        assert_eq!(scorer.association(&up, &same), Association::Correlated);
        assert_eq!(scorer.association(&up, &mirror), Association::Anticorrelated);

        // A flat background has no variance
        let flat = [1.0; 6];
        assert_eq!(scorer.association(&flat, &up), Association::Uncorrelated);

        // Too few steps to test
        assert_eq!(
            scorer.association(&[0.1, 0.2, 0.3], &[0.1, 0.2, 0.3]),
            Association::Uncorrelated
        );
    }

    #[test]
    fn test_additive_tiers() {
        let config = LineageConfig::new(0.03, 0.97, 0.05);
        let scorer = PairScorer::new(&config);

        // Dominant at every point, sum stays below 1
        assert_relative_eq!(scorer.additive_score(&[0.3, 0.4, 0.5], &[0.1, 0.2, 0.3]), 2.0);
        // One point above the strict tolerance but within the loose one
        assert_relative_eq!(scorer.additive_score(&[0.3, 0.4, 0.5], &[0.1, 0.5, 0.3]), 1.0);
        // One big violation is tolerated by the loose tier
        assert_relative_eq!(scorer.additive_score(&[0.3, 0.4, 0.2], &[0.1, 0.2, 0.4]), 1.0);
        // Two big violations
        assert_relative_eq!(scorer.additive_score(&[0.3, 0.1, 0.1], &[0.1, 0.4, 0.5]), -2.0);
        // Sum above 1.03 twice
        assert_relative_eq!(scorer.additive_score(&[0.8, 0.9, 0.9], &[0.1, 0.2, 0.3]), 3.0);
    }

    #[test]
    fn test_area_prefers_tight_background() {
        let config = LineageConfig::default();
        let scorer = PairScorer::new(&config);

        let times = [0.0, 1.0, 2.0];
        let descendant = [0.1, 0.2, 0.3];
        let tight = scorer.area_score(&times, &[0.2, 0.3, 0.4], &descendant);
        let loose = scorer.area_score(&times, &[1.0, 1.0, 1.0], &descendant);
        assert!(tight > loose);
        assert_relative_eq!(tight, -0.025, epsilon = 1e-12);
        assert_relative_eq!(scorer.area_score(&[1.0], &[0.5], &[0.2]), 0.0);
    }

    #[test]
    fn test_insufficient_data() {
        let config = LineageConfig::new(0.03, 0.97, 0.05);
        let scorer = PairScorer::new(&config);

        // Both detected only at the middle timepoint
        let background = traj(&[0.5, 0.6, 0.0]);
        let descendant = traj(&[0.0, 0.2, 0.5]);
        let score = scorer.score_pair(&background, &descendant).unwrap();
        assert_eq!(score.additive, 0.0);
        assert_eq!(score.derivative, 0.0);
        assert_eq!(score.area, 0.0);
        assert_eq!(score.total, 0.0);
        assert_eq!(score.informative, 1);
    }

    #[test]
    fn test_fixed_points_are_skipped() {
        let config = LineageConfig::new(0.03, 0.97, 0.05);
        let scorer = PairScorer::new(&config);

        // Only one point where they are not both fixed
        let background = traj(&[1.0, 1.0, 1.0]);
        let descendant = traj(&[0.5, 0.98, 1.0]);
        let score = scorer.score_pair(&background, &descendant).unwrap();
        assert_eq!(score.informative, 1);
        assert_eq!(score.total, 0.0);
    }

    #[test]
    fn test_misaligned() {
        let config = LineageConfig::default();
        let scorer = PairScorer::new(&config);

        let background = traj(&[0.5, 0.6, 0.7]);
        let descendant = traj(&[0.1, 0.2]);
        assert!(matches!(
            scorer.score_pair(&background, &descendant),
            Err(LineageError::DimensionMismatch(_))
        ));

        let shifted = Trajectory::new(vec![0.0, 2.0, 4.0], vec![0.1, 0.2, 0.3]).unwrap();
        assert!(scorer.score_pair(&background, &shifted).is_err());
    }
}
