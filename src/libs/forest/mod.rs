pub mod io;

use crate::libs::error::LineageError;
use indexmap::IndexMap;
use std::collections::{BTreeMap, VecDeque};

/// NodeId is an index into the Forest's node vector.
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Index in the arena
    pub id: NodeId,

    /// Parent node ID (None for the root)
    pub parent: Option<NodeId>,

    /// Child node IDs, in the order they were attached
    pub children: Vec<NodeId>,

    /// Genotype label
    pub name: String,

    /// Structured properties, written as NHX tags
    /// Using BTreeMap ensures deterministic output order.
    pub properties: Option<BTreeMap<String, String>>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: name.into(),
            properties: None,
        }
    }

    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Genotypes laid out as a tree hanging from the root genotype.
#[derive(Debug, Default, Clone)]
pub struct Forest {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    index: BTreeMap<String, NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest of a genotype -> parent mapping.
    ///
    /// Nodes are created in mapping order, so children keep the table order.
    /// Fails if a parent is not a node, or if some genotype can't reach the root.
    pub fn from_parents(
        root: &str,
        parents: &IndexMap<String, String>,
    ) -> Result<Forest, LineageError> {
        let mut forest = Forest::new();
        let root_id = forest.add_node(root)?;
        forest.set_root(root_id);

        for genotype in parents.keys() {
            forest.add_node(genotype)?;
        }
        for (genotype, parent) in parents {
            let parent_id = forest
                .get_node_by_name(parent)
                .ok_or_else(|| LineageError::Forest(format!("{} is not a genotype", parent)))?;
            let child_id = forest
                .get_node_by_name(genotype)
                .ok_or_else(|| LineageError::Forest(format!("{} is not a genotype", genotype)))?;
            forest.add_child(parent_id, child_id)?;
        }

        // Nodes that are not reachable from the root sit on a cycle
        let reached = forest.preorder(root_id).len();
        if reached != forest.len() {
            let stranded: Vec<&str> = forest
                .nodes
                .iter()
                .filter(|n| forest.depth(n.id).is_none())
                .map(|n| n.name.as_str())
                .collect();
            return Err(LineageError::Forest(format!(
                "cycle among {}",
                stranded.join(", ")
            )));
        }

        Ok(forest)
    }

    /// Add a new node. Returns the new node's ID.
    pub fn add_node(&mut self, name: &str) -> Result<NodeId, LineageError> {
        if self.index.contains_key(name) {
            return Err(LineageError::Forest(format!("duplicate node {}", name)));
        }
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, name));
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Updates both parent's `children` list and child's `parent` field.
    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), LineageError> {
        if parent_id == child_id {
            return Err(LineageError::Forest(
                "Cannot add node as child of itself".to_string(),
            ));
        }
        if self.get_node(parent_id).is_none() {
            return Err(LineageError::Forest(format!(
                "Parent node {} not found",
                parent_id
            )));
        }
        if self.get_node(child_id).is_none() {
            return Err(LineageError::Forest(format!(
                "Child node {} not found",
                child_id
            )));
        }
        if Some(child_id) == self.root {
            return Err(LineageError::Forest(format!(
                "The root {} can't have a parent",
                self.nodes[child_id].name
            )));
        }
        if let Some(old_parent) = self.nodes[child_id].parent {
            return Err(LineageError::Forest(format!(
                "Node {} already has parent {}",
                self.nodes[child_id].name, self.nodes[old_parent].name
            )));
        }

        self.nodes[child_id].parent = Some(parent_id);
        self.nodes[parent_id].children.push(child_id);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Node IDs in preorder (Root -> Children)
    pub fn preorder(&self, start_node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start_node];

        while let Some(id) = stack.pop() {
            if let Some(node) = self.get_node(id) {
                result.push(id);
                // Push children in reverse order so they are processed in order
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }

        result
    }

    /// Node IDs level by level
    pub fn levelorder(&self, start_node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start_node);

        while let Some(id) = queue.pop_front() {
            if let Some(node) = self.get_node(id) {
                result.push(id);
                queue.extend(node.children.iter().copied());
            }
        }

        result
    }

    /// Number of edges between `id` and the root, `None` if the root can't be reached.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut current = self.get_node(id)?;
        let mut hops = 0;
        while Some(current.id) != self.root {
            current = self.get_node(current.parent?)?;
            hops += 1;
            if hops > self.nodes.len() {
                return None;
            }
        }
        Some(hops)
    }

    /// Labels from the root down to `id`.
    pub fn get_path_from_root(&self, id: NodeId) -> Option<Vec<&str>> {
        self.depth(id)?;
        let mut path = vec![];
        let mut current = self.get_node(id);
        while let Some(node) = current {
            path.push(node.name.as_str());
            current = node.parent.and_then(|p| self.get_node(p));
        }
        path.reverse();
        Some(path)
    }

    pub fn get_leaf_names(&self) -> Vec<&str> {
        match self.root {
            Some(root) => self
                .preorder(root)
                .into_iter()
                .filter_map(|id| self.get_node(id))
                .filter(|n| n.is_leaf())
                .map(|n| n.name.as_str())
                .collect(),
            None => vec![],
        }
    }

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }

    pub fn to_newick_with_format(&self, indent: &str) -> String {
        io::to_newick_with_format(self, indent)
    }

    pub fn to_dot(&self) -> String {
        io::to_dot(self)
    }
}
