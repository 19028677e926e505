use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageError {
    /// Two trajectories are not measured on the same timepoints
    DimensionMismatch(String),
    /// An edge that can never be valid (self-loop, edge out of the root)
    InvalidReference(String),
    /// A label that is not part of the sorted genotype table
    UnknownGenotype(String),
    /// The sorted genotype table has no rows
    MissingRoot,
    /// Invalid method name or cutoffs
    Config(String),
    /// Malformed trajectory or genotype table
    InvalidTrajectory(String),
    /// A parent mapping that can't be laid out as a rooted forest
    Forest(String),
}

impl fmt::Display for LineageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineageError::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            LineageError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            LineageError::UnknownGenotype(label) => write!(f, "Unknown genotype: {}", label),
            LineageError::MissingRoot => {
                write!(f, "The sorted genotype table is empty, no root genotype")
            }
            LineageError::Config(msg) => write!(f, "Configuration error: {}", msg),
            LineageError::InvalidTrajectory(msg) => write!(f, "Invalid trajectory: {}", msg),
            LineageError::Forest(msg) => write!(f, "Forest error: {}", msg),
        }
    }
}

impl std::error::Error for LineageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = LineageError::UnknownGenotype("genotype-9".to_string());
        assert_eq!(err.to_string(), "Unknown genotype: genotype-9");

        let err = LineageError::MissingRoot;
        assert!(err.to_string().contains("empty"));

        // Converts into anyhow for the binary
        let err: anyhow::Error = LineageError::Config("bad".to_string()).into();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
