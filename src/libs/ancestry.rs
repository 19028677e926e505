use crate::libs::error::LineageError;
use crate::libs::trajectory::GenotypeTable;
use indexmap::IndexMap;

/// A possible background of a genotype and how plausible it is.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub background: String,
    pub priority: f64,
}

/// Ranked candidate backgrounds for every non-root genotype.
///
/// Candidates are kept in insertion order. Selection takes the highest priority and,
/// among equal priorities, the candidate recorded first.
#[derive(Debug, Clone)]
pub struct AncestryGraph {
    root: String,
    candidates: IndexMap<String, Vec<Candidate>>,
}

impl AncestryGraph {
    /// Every genotype of `table` other than `root_label` starts with no candidates.
    pub fn new(root_label: &str, table: &GenotypeTable) -> Result<Self, LineageError> {
        if !table.contains(root_label) {
            return Err(LineageError::UnknownGenotype(root_label.to_string()));
        }

        let candidates = table
            .labels()
            .filter(|label| *label != root_label)
            .map(|label| (label.to_string(), vec![]))
            .collect();

        Ok(Self {
            root: root_label.to_string(),
            candidates,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn contains(&self, label: &str) -> bool {
        label == self.root || self.candidates.contains_key(label)
    }

    /// Non-root genotypes in table order.
    pub fn genotypes(&self) -> impl Iterator<Item = &str> + '_ {
        self.candidates.keys().map(|k| k.as_str())
    }

    /// Record `background` as a candidate of `genotype`. Duplicates are kept.
    pub fn add_genotype_to_background(
        &mut self,
        genotype: &str,
        background: &str,
        priority: f64,
    ) -> Result<(), LineageError> {
        if genotype == background {
            return Err(LineageError::InvalidReference(format!(
                "{} can't be its own background",
                genotype
            )));
        }
        if genotype == self.root {
            return Err(LineageError::InvalidReference(format!(
                "the root genotype {} has no background",
                genotype
            )));
        }
        if !self.contains(background) {
            return Err(LineageError::UnknownGenotype(background.to_string()));
        }

        match self.candidates.get_mut(genotype) {
            Some(list) => {
                list.push(Candidate {
                    background: background.to_string(),
                    priority,
                });
                Ok(())
            }
            None => Err(LineageError::UnknownGenotype(genotype.to_string())),
        }
    }

    pub fn candidates(&self, genotype: &str) -> Option<&[Candidate]> {
        self.candidates.get(genotype).map(|v| v.as_slice())
    }

    /// The best background of `genotype`; `None` for the root.
    pub fn get_highest_priority(&self, genotype: &str) -> Result<Option<&str>, LineageError> {
        if genotype == self.root {
            return Ok(None);
        }

        let list = self
            .candidates
            .get(genotype)
            .ok_or_else(|| LineageError::UnknownGenotype(genotype.to_string()))?;

        let mut best: Option<&Candidate> = None;
        for candidate in list {
            // Strictly greater: the earliest candidate wins a tie
            if best.map_or(true, |b| candidate.priority > b.priority) {
                best = Some(candidate);
            }
        }

        match best {
            Some(candidate) => Ok(Some(candidate.background.as_str())),
            None => Err(LineageError::UnknownGenotype(format!(
                "{} has no candidate background",
                genotype
            ))),
        }
    }

    /// Candidates of `genotype` by priority, descending. Ties keep insertion order.
    pub fn get_sorted_priorities(&self, genotype: &str) -> Vec<&Candidate> {
        let mut sorted: Vec<&Candidate> = self
            .candidates
            .get(genotype)
            .map(|list| list.iter().collect())
            .unwrap_or_default();
        sorted.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        sorted
    }

    /// genotype -> parent for every non-root genotype, in table order.
    pub fn as_dict(&self) -> Result<IndexMap<String, String>, LineageError> {
        let mut parents = IndexMap::new();
        for genotype in self.genotypes() {
            if let Some(parent) = self.get_highest_priority(genotype)? {
                parents.insert(genotype.to_string(), parent.to_string());
            }
        }
        Ok(parents)
    }
}
