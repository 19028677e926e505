use crate::libs::ancestry::AncestryGraph;
use crate::libs::config::LineageConfig;
use crate::libs::error::LineageError;
use crate::libs::forest::Forest;
use crate::libs::score::{PairScore, PairScorer, ScoreRecord};
use crate::libs::trajectory::{GenotypeTable, Trajectory};
use indexmap::IndexMap;
use log::{debug, info, log_enabled, trace, Level};
use rayon::prelude::*;

/// Priority of user-declared ancestry. Automatic scores never reach it.
pub const OVERRIDE_PRIORITY: f64 = 100.0;

/// Infers which genotype each genotype is nested in.
///
/// The assignment is a greedy, order-dependent sweep over the sorted table:
/// every genotype is compared with all earlier genotypes, newest first, and the
/// best-scoring candidate becomes its background.
#[derive(Debug, Clone, Copy)]
pub struct LineageAssigner<'a> {
    config: &'a LineageConfig,
}

impl<'a> LineageAssigner<'a> {
    pub fn new(config: &'a LineageConfig) -> Self {
        Self { config }
    }

    /// Run the inference on `table`.
    ///
    /// `known` maps a genotype to a user-declared parent; both labels must be in the table.
    pub fn run(
        &self,
        table: &GenotypeTable,
        known: &IndexMap<String, String>,
    ) -> Result<Lineage, LineageError> {
        self.config.validate()?;

        let rows: Vec<(&str, &Trajectory)> = table.iter().collect();
        let root = match rows.first() {
            Some((label, _)) => *label,
            None => return Err(LineageError::MissingRoot),
        };

        let mut graph = AncestryGraph::new(root, table)?;
        add_known_lineages(&mut graph, known)?;

        let scorer = PairScorer::new(self.config);
        let mut records = Vec::with_capacity(rows.len() * rows.len().saturating_sub(1) / 2);

        for (index, (unnested_label, unnested)) in rows.iter().enumerate().skip(1) {
            debug!("Nesting {}", unnested_label);

            // Newest candidates first; the order decides ties
            let scores: Vec<(&str, PairScore)> = (0..index)
                .into_par_iter()
                .rev()
                .map(|i| {
                    let (nested_label, nested) = rows[i];
                    scorer
                        .score_pair(nested, unnested)
                        .map(|score| (nested_label, score))
                })
                .collect::<Result<Vec<_>, _>>()?;

            for (nested_label, score) in scores {
                debug!("{}\t{}\t{}", unnested_label, nested_label, score.total);
                graph.add_genotype_to_background(unnested_label, nested_label, score.total)?;
                records.push(ScoreRecord {
                    descendant: unnested_label.to_string(),
                    background: nested_label.to_string(),
                    score,
                });
            }
        }

        let parents = graph.as_dict()?;
        let lineage = Lineage {
            graph,
            parents,
            records,
        };
        lineage.show_ancestry();

        Ok(lineage)
    }
}

/// Pins every declared parent to the root, then the genotype to its declared parent.
///
/// Chains of declarations longer than one hop are not resolved: a parent that is
/// itself declared keeps whichever edge was injected first.
fn add_known_lineages(
    graph: &mut AncestryGraph,
    known: &IndexMap<String, String>,
) -> Result<(), LineageError> {
    // Reject unknown labels before anything is injected
    for (identity, parent) in known {
        for label in [identity, parent] {
            if !graph.contains(label) {
                return Err(LineageError::UnknownGenotype(label.to_string()));
            }
        }
    }

    if !known.is_empty() {
        info!("Found user-given ancestries.");
    }
    let root = graph.root().to_string();
    for (identity, parent) in known {
        info!("Adding {} as a potential background for {}", parent, identity);
        if *parent != root {
            graph.add_genotype_to_background(parent, &root, OVERRIDE_PRIORITY)?;
        }
        graph.add_genotype_to_background(identity, parent, OVERRIDE_PRIORITY)?;
    }

    Ok(())
}

/// Result of one inference run.
#[derive(Debug, Clone)]
pub struct Lineage {
    graph: AncestryGraph,
    parents: IndexMap<String, String>,
    records: Vec<ScoreRecord>,
}

impl Lineage {
    pub fn root(&self) -> &str {
        self.graph.root()
    }

    /// genotype -> parent for every non-root genotype, in table order.
    pub fn as_dict(&self) -> &IndexMap<String, String> {
        &self.parents
    }

    pub fn get_parent(&self, genotype: &str) -> Option<&str> {
        self.parents.get(genotype).map(|p| p.as_str())
    }

    pub fn ancestry(&self) -> &AncestryGraph {
        &self.graph
    }

    /// Every scored pair, in sweep order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// The assignment as a tree; each node carries the priority of its winning edge as `score`.
    pub fn to_forest(&self) -> Result<Forest, LineageError> {
        let mut forest = Forest::from_parents(self.root(), &self.parents)?;
        for genotype in self.parents.keys() {
            let best = self.graph.get_sorted_priorities(genotype);
            let id = forest.get_node_by_name(genotype);
            if let (Some(candidate), Some(id)) = (best.first(), id) {
                if let Some(node) = forest.get_node_mut(id) {
                    node.add_property("score", format!("{:.4}", candidate.priority));
                }
            }
        }
        Ok(forest)
    }

    fn show_ancestry(&self) {
        info!("Final Ancestry:");
        info!("{}\t", self.root());
        for (genotype, parent) in &self.parents {
            info!("{}\t{}", genotype, parent);
        }

        if log_enabled!(Level::Trace) {
            trace!("descendant\tbackground\tadditive\tderivative\tarea\ttotal");
            for record in &self.records {
                trace!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    record.descendant,
                    record.background,
                    record.score.additive,
                    record.score.derivative,
                    record.score.area,
                    record.score.total
                );
            }
        }
    }
}
