use crate::libs::error::LineageError;
use indexmap::IndexMap;

/// Frequencies of one genotype, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    timepoints: Vec<f64>,
    frequencies: Vec<f64>,
}

impl Trajectory {
    /// Timepoints must be strictly increasing and every frequency must lie in [0, 1].
    ///
    /// ```
    /// use lineage::libs::trajectory::Trajectory;
    ///
    /// let traj = Trajectory::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.25, 0.5]).unwrap();
    /// assert_eq!(traj.len(), 3);
    /// assert!(Trajectory::new(vec![0.0, 1.0], vec![0.5]).is_err());
    /// assert!(Trajectory::new(vec![0.0, 1.0], vec![0.5, 1.5]).is_err());
    /// ```
    pub fn new(timepoints: Vec<f64>, frequencies: Vec<f64>) -> Result<Self, LineageError> {
        if timepoints.len() != frequencies.len() {
            return Err(LineageError::InvalidTrajectory(format!(
                "{} timepoints but {} frequencies",
                timepoints.len(),
                frequencies.len()
            )));
        }
        if let Some(t) = timepoints.iter().find(|t| !t.is_finite()) {
            return Err(LineageError::InvalidTrajectory(format!(
                "timepoint {} is not finite",
                t
            )));
        }
        if timepoints.windows(2).any(|w| w[1] <= w[0]) {
            return Err(LineageError::InvalidTrajectory(
                "timepoints are not strictly increasing".to_string(),
            ));
        }
        if let Some(f) = frequencies
            .iter()
            .find(|f| !f.is_finite() || **f < 0.0 || **f > 1.0)
        {
            return Err(LineageError::InvalidTrajectory(format!(
                "frequency {} is outside [0, 1]",
                f
            )));
        }

        Ok(Self {
            timepoints,
            frequencies,
        })
    }

    pub fn timepoints(&self) -> &[f64] {
        &self.timepoints
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn len(&self) -> usize {
        self.timepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timepoints.is_empty()
    }

    /// (timepoint, frequency) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.timepoints
            .iter()
            .copied()
            .zip(self.frequencies.iter().copied())
    }

    /// True when both trajectories are measured at exactly the same timepoints.
    pub fn is_aligned(&self, other: &Trajectory) -> bool {
        self.timepoints == other.timepoints
    }

    /// First timepoint with a frequency above `limit`.
    pub fn first_above(&self, limit: f64) -> Option<f64> {
        self.iter().find(|(_, f)| *f > limit).map(|(t, _)| t)
    }
}

/// Genotypes ordered by first detection then first fixation. Row 0 is the root.
///
/// The ordering is produced upstream and is never recomputed here.
#[derive(Debug, Clone, Default)]
pub struct GenotypeTable {
    timepoints: Vec<f64>,
    rows: IndexMap<String, Trajectory>,
}

impl GenotypeTable {
    /// An empty table measured at `timepoints`.
    pub fn new(timepoints: Vec<f64>) -> Self {
        Self {
            timepoints,
            rows: IndexMap::new(),
        }
    }

    /// Build a table from `(label, frequencies)` rows, all sharing `timepoints`.
    pub fn from_rows<S>(timepoints: Vec<f64>, rows: Vec<(S, Vec<f64>)>) -> Result<Self, LineageError>
    where
        S: Into<String>,
    {
        let mut table = Self::new(timepoints);
        for (label, frequencies) in rows {
            table.push(label, frequencies)?;
        }
        Ok(table)
    }

    /// Append a genotype after the existing rows.
    pub fn push(
        &mut self,
        label: impl Into<String>,
        frequencies: Vec<f64>,
    ) -> Result<(), LineageError> {
        let label = label.into();
        if self.rows.contains_key(&label) {
            return Err(LineageError::InvalidTrajectory(format!(
                "duplicate genotype {}",
                label
            )));
        }
        if frequencies.len() != self.timepoints.len() {
            return Err(LineageError::InvalidTrajectory(format!(
                "genotype {} has {} values, the table has {} timepoints",
                label,
                frequencies.len(),
                self.timepoints.len()
            )));
        }
        let trajectory = Trajectory::new(self.timepoints.clone(), frequencies)
            .map_err(|e| LineageError::InvalidTrajectory(format!("{}: {}", label, e)))?;
        self.rows.insert(label, trajectory);
        Ok(())
    }

    pub fn timepoints(&self) -> &[f64] {
        &self.timepoints
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The designated root genotype (row 0).
    pub fn root(&self) -> Option<(&str, &Trajectory)> {
        self.get_index(0)
    }

    pub fn get(&self, label: &str) -> Option<&Trajectory> {
        self.rows.get(label)
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &Trajectory)> {
        self.rows
            .get_index(index)
            .map(|(label, traj)| (label.as_str(), traj))
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.rows.get_index_of(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.rows.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Trajectory)> + '_ {
        self.rows.iter().map(|(label, traj)| (label.as_str(), traj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_new() {
        let traj = Trajectory::new(vec![0.0, 10.0, 20.0], vec![0.0, 0.1, 0.4]).unwrap();
        assert_eq!(traj.timepoints(), &[0.0, 10.0, 20.0]);
        assert_eq!(traj.frequencies(), &[0.0, 0.1, 0.4]);
        assert_eq!(traj.first_above(0.03), Some(10.0));
        assert_eq!(traj.first_above(0.5), None);

        // Unordered timepoints
        assert!(matches!(
            Trajectory::new(vec![0.0, 20.0, 10.0], vec![0.0, 0.1, 0.4]),
            Err(LineageError::InvalidTrajectory(_))
        ));
        // NaN frequency
        assert!(Trajectory::new(vec![0.0, 1.0], vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_trajectory_aligned() {
        let a = Trajectory::new(vec![0.0, 1.0], vec![0.0, 0.1]).unwrap();
        let b = Trajectory::new(vec![0.0, 1.0], vec![0.5, 0.6]).unwrap();
        let c = Trajectory::new(vec![0.0, 2.0], vec![0.5, 0.6]).unwrap();
        assert!(a.is_aligned(&b));
        assert!(!a.is_aligned(&c));
    }

    #[test]
    fn test_table() {
        let table = GenotypeTable::from_rows(
            vec![0.0, 1.0, 2.0],
            vec![
                ("genotype-0", vec![1.0, 1.0, 1.0]),
                ("genotype-1", vec![0.0, 0.2, 0.6]),
                ("genotype-2", vec![0.0, 0.0, 0.3]),
            ],
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.root().map(|(l, _)| l), Some("genotype-0"));
        assert_eq!(table.position("genotype-2"), Some(2));
        assert_eq!(
            table.labels().collect::<Vec<_>>(),
            vec!["genotype-0", "genotype-1", "genotype-2"]
        );
        assert!(table.get("genotype-1").unwrap().is_aligned(table.get("genotype-2").unwrap()));
    }

    #[test]
    fn test_table_rejects_bad_rows() {
        let mut table = GenotypeTable::new(vec![0.0, 1.0]);
        table.push("genotype-0", vec![1.0, 1.0]).unwrap();

        assert!(table.push("genotype-0", vec![1.0, 1.0]).is_err());
        assert!(table.push("genotype-1", vec![0.5]).is_err());
        assert!(table.push("genotype-1", vec![0.5, 2.0]).is_err());
        assert_eq!(table.len(), 1);

        assert!(GenotypeTable::new(vec![]).root().is_none());
    }
}
