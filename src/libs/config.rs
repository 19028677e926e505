use crate::libs::error::LineageError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DETECTION: f64 = 0.03;
pub const DEFAULT_SIGNIFICANT: f64 = 0.15;
pub const DEFAULT_DERIVATIVE: f64 = 0.5;
pub const DEFAULT_PVALUE: f64 = 0.05;

/// How the genotypes were clustered upstream. Selects the cutoff preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterMethod {
    /// Breakpoint-derived cutoffs
    Hierarchy,
    /// The fixed compatibility preset
    Matlab,
}

impl ClusterMethod {
    pub const ACCEPTED: [&'static str; 2] = ["matlab", "hierarchy"];
}

impl FromStr for ClusterMethod {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hierarchy" => Ok(ClusterMethod::Hierarchy),
            "matlab" => Ok(ClusterMethod::Matlab),
            _ => Err(LineageError::Config(format!(
                "{} is not a valid method. Expected one of {:?}",
                s,
                ClusterMethod::ACCEPTED
            ))),
        }
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterMethod::Hierarchy => write!(f, "hierarchy"),
            ClusterMethod::Matlab => write!(f, "matlab"),
        }
    }
}

/// Cutoffs shared by the pair scorer and the lineage assigner.
///
/// Valid ranges:
/// * `0 <= detection_limit < fixed_limit <= 1`
/// * `additive_cutoff >= 0`, `significant_cutoff >= additive_cutoff`
/// * `0 <= derivative_cutoff <= 1`
/// * `0 < pvalue <= 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineageConfig {
    /// Frequencies at or below this are noise
    pub detection_limit: f64,
    /// Frequencies at or above this have swept the population
    pub fixed_limit: f64,
    /// Tolerance of the strict (double-check) dominance tier
    pub additive_cutoff: f64,
    /// Tolerance of the loose (single-check) dominance tier
    pub significant_cutoff: f64,
    /// Minimum |r| between frequency changes to call a pair (anti)correlated
    pub derivative_cutoff: f64,
    /// Significance threshold of the correlation test
    pub pvalue: f64,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self::from_breakpoints(DEFAULT_DETECTION, DEFAULT_SIGNIFICANT)
    }
}

impl LineageConfig {
    /// The three knobs of a run; the remaining cutoffs follow the detection limit.
    pub fn new(detection_limit: f64, fixed_limit: f64, pvalue: f64) -> Self {
        Self {
            fixed_limit,
            pvalue,
            ..Self::from_breakpoints(detection_limit, DEFAULT_SIGNIFICANT)
        }
    }

    pub fn from_breakpoints(detection: f64, significant: f64) -> Self {
        Self {
            detection_limit: detection,
            fixed_limit: 1.0 - detection,
            additive_cutoff: detection,
            significant_cutoff: significant,
            derivative_cutoff: DEFAULT_DERIVATIVE,
            pvalue: DEFAULT_PVALUE,
        }
    }

    pub fn matlab() -> Self {
        Self {
            detection_limit: 0.03,
            fixed_limit: 0.97,
            additive_cutoff: 0.03,
            significant_cutoff: 0.15,
            derivative_cutoff: DEFAULT_DERIVATIVE,
            pvalue: DEFAULT_PVALUE,
        }
    }

    /// `matlab` ignores the breakpoints.
    pub fn for_method(
        method: &str,
        detection: f64,
        significant: f64,
    ) -> Result<Self, LineageError> {
        let config = match method.parse::<ClusterMethod>()? {
            ClusterMethod::Matlab => Self::matlab(),
            ClusterMethod::Hierarchy => Self::from_breakpoints(detection, significant),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LineageError> {
        let fields = [
            ("detection_limit", self.detection_limit),
            ("fixed_limit", self.fixed_limit),
            ("additive_cutoff", self.additive_cutoff),
            ("significant_cutoff", self.significant_cutoff),
            ("derivative_cutoff", self.derivative_cutoff),
            ("pvalue", self.pvalue),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LineageError::Config(format!("{} = {} is not finite", name, value)));
        }

        if !(0.0..1.0).contains(&self.detection_limit) {
            return Err(LineageError::Config(format!(
                "detection_limit = {} must be in [0, 1)",
                self.detection_limit
            )));
        }
        if self.fixed_limit <= self.detection_limit || self.fixed_limit > 1.0 {
            return Err(LineageError::Config(format!(
                "fixed_limit = {} must be in (detection_limit, 1]",
                self.fixed_limit
            )));
        }
        if self.additive_cutoff < 0.0 {
            return Err(LineageError::Config(format!(
                "additive_cutoff = {} must not be negative",
                self.additive_cutoff
            )));
        }
        if self.significant_cutoff < self.additive_cutoff {
            return Err(LineageError::Config(format!(
                "significant_cutoff = {} is below additive_cutoff = {}",
                self.significant_cutoff, self.additive_cutoff
            )));
        }
        if !(0.0..=1.0).contains(&self.derivative_cutoff) {
            return Err(LineageError::Config(format!(
                "derivative_cutoff = {} must be in [0, 1]",
                self.derivative_cutoff
            )));
        }
        if self.pvalue <= 0.0 || self.pvalue > 1.0 {
            return Err(LineageError::Config(format!(
                "pvalue = {} must be in (0, 1]",
                self.pvalue
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_method_parse() {
        assert_eq!("hierarchy".parse::<ClusterMethod>().unwrap(), ClusterMethod::Hierarchy);
        assert_eq!("matlab".parse::<ClusterMethod>().unwrap(), ClusterMethod::Matlab);
        assert!(matches!(
            "upgma".parse::<ClusterMethod>(),
            Err(LineageError::Config(_))
        ));
        assert_eq!(ClusterMethod::Matlab.to_string(), "matlab");
    }

    #[test]
    fn test_breakpoints() {
        let config = LineageConfig::from_breakpoints(0.05, 0.2);
        assert_relative_eq!(config.fixed_limit, 0.95);
        assert_relative_eq!(config.additive_cutoff, 0.05);
        assert_relative_eq!(config.significant_cutoff, 0.2);
        assert!(config.validate().is_ok());

        let config = LineageConfig::new(0.03, 0.97, 0.01);
        assert_relative_eq!(config.pvalue, 0.01);
        assert_relative_eq!(config.additive_cutoff, 0.03);
        assert_eq!(LineageConfig::default(), LineageConfig::matlab());
    }

    #[test]
    fn test_for_method() {
        let config = LineageConfig::for_method("matlab", 0.1, 0.3).unwrap();
        assert_eq!(config, LineageConfig::matlab());

        let config = LineageConfig::for_method("hierarchy", 0.1, 0.3).unwrap();
        assert_relative_eq!(config.detection_limit, 0.1);

        assert!(LineageConfig::for_method("kmeans", 0.03, 0.15).is_err());
        // significant below detection
        assert!(LineageConfig::for_method("hierarchy", 0.1, 0.05).is_err());
    }

    #[test]
    fn test_validate_ranges() {
        let base = LineageConfig::default();

        let bad = [
            LineageConfig { detection_limit: -0.1, ..base },
            LineageConfig { detection_limit: 1.0, ..base },
            LineageConfig { fixed_limit: 0.01, ..base },
            LineageConfig { fixed_limit: 1.2, ..base },
            LineageConfig { additive_cutoff: -0.01, ..base },
            LineageConfig { derivative_cutoff: 1.5, ..base },
            LineageConfig { pvalue: 0.0, ..base },
            LineageConfig { pvalue: f64::NAN, ..base },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(LineageError::Config(_))),
                "{:?}",
                config
            );
        }
    }
}
