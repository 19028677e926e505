use super::{Forest, NodeId};

/// Serialize the forest to a Newick string.
pub fn to_newick(forest: &Forest) -> String {
    to_newick_with_format(forest, "")
}

/// Serialize the forest to a Newick string, one node per line when `indent` is not empty.
pub fn to_newick_with_format(forest: &Forest, indent: &str) -> String {
    match forest.get_root() {
        Some(root) => {
            let mut s = to_newick_recursive(forest, root, indent, 0);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

fn to_newick_recursive(forest: &Forest, node_id: NodeId, indent: &str, depth: usize) -> String {
    let node = match forest.get_node(node_id) {
        Some(node) => node,
        None => return String::new(),
    };
    let is_pretty = !indent.is_empty();
    let my_indent = if is_pretty {
        indent.repeat(depth)
    } else {
        String::new()
    };

    // Label + Comment
    let mut node_info = quote_label(&node.name);
    if let Some(props) = &node.properties {
        if !props.is_empty() {
            node_info.push_str("[&&NHX");
            for (k, v) in props {
                node_info.push_str(&format!(":{}={}", k, v));
            }
            node_info.push(']');
        }
    }

    if node.children.is_empty() {
        format!("{}{}", my_indent, node_info)
    } else {
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(forest, child, indent, depth + 1))
            .collect();

        if is_pretty {
            format!(
                "{}(\n{}\n{}){}",
                my_indent,
                children_strs.join(",\n"),
                my_indent,
                node_info
            )
        } else {
            format!("({}){}", children_strs.join(","), node_info)
        }
    }
}

/// Serialize the forest to a Graphviz DOT string. Edges point from background to genotype.
pub fn to_dot(forest: &Forest) -> String {
    let mut s = String::from("digraph Lineage {\n");
    s.push_str("    node [shape=box];\n");

    if let Some(root) = forest.get_root() {
        for node_id in forest.preorder(root) {
            let node = match forest.get_node(node_id) {
                Some(node) => node,
                None => continue,
            };
            s.push_str(&format!("    {} [label=\"{}\"];\n", node_id, node.name));

            for &child_id in &node.children {
                let score = forest
                    .get_node(child_id)
                    .and_then(|child| child.properties.as_ref())
                    .and_then(|props| props.get("score"));
                match score {
                    Some(score) => s.push_str(&format!(
                        "    {} -> {} [label=\"{}\"];\n",
                        node_id, child_id, score
                    )),
                    None => s.push_str(&format!("    {} -> {};\n", node_id, child_id)),
                }
            }
        }
    }

    s.push_str("}\n");
    s
}

fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[] \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label)
    } else {
        label.to_string()
    }
}
