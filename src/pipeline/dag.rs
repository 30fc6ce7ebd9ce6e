// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Task dependency graph
//!
//! Builds and validates the DAG of ingest/transform tasks, detecting
//! cycles and unknown dependencies before any task is scheduled.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::errors::{LakeflowError, LakeflowResult};

/// One schedulable task with its declared upstream dependencies
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: String,
    pub depends_on: Vec<String>,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, depends_on: Vec<String>) -> Self {
        Self {
            name: name.into(),
            depends_on,
        }
    }
}

/// Dependency DAG over task names
pub struct TaskGraph {
    graph: DiGraph<String, ()>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    /// Build and validate a DAG from task specs
    pub fn build(specs: &[TaskSpec]) -> LakeflowResult<Self> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();

        for spec in specs {
            let node = graph.add_node(spec.name.clone());
            name_to_index.insert(spec.name.clone(), node);
        }

        for spec in specs {
            let task_node = name_to_index[&spec.name];
            for dep in &spec.depends_on {
                let dep_node = name_to_index.get(dep).ok_or_else(|| {
                    LakeflowError::UnknownDependency {
                        task: spec.name.clone(),
                        dependency: dep.clone(),
                    }
                })?;
                graph.add_edge(*dep_node, task_node, ());
            }
        }

        let built = Self { graph, name_to_index };
        built.topological_order()?;
        Ok(built)
    }

    /// Topologically sorted task names
    pub fn topological_order(&self) -> LakeflowResult<Vec<String>> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n].clone()).collect())
            .map_err(|cycle| LakeflowError::CircularDependency {
                tasks: vec![self.graph[cycle.node_id()].clone()],
            })
    }

    /// Tasks that must reach a terminal state before this one starts
    pub fn dependencies(&self, task: &str) -> Vec<String> {
        let Some(node) = self.name_to_index.get(task) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*node, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Tasks that wait on this one
    pub fn dependents(&self, task: &str) -> Vec<String> {
        let Some(node) = self.name_to_index.get(task) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*node, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Text rendering of the execution order
    pub fn to_text(&self) -> LakeflowResult<String> {
        let order = self.topological_order()?;
        let mut out = String::new();
        for (i, name) in order.iter().enumerate() {
            let mut deps = self.dependencies(name);
            deps.sort();
            out.push_str(&format!("{}. {}", i + 1, name));
            if !deps.is_empty() {
                out.push_str(&format!(" [after: {}]", deps.join(", ")));
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// Mermaid diagram of the DAG
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");
        for node in self.graph.node_indices() {
            out.push_str(&format!("    {}[\"{}\"]\n", node.index(), self.graph[node]));
        }
        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).expect("edge endpoints");
            out.push_str(&format!("    {} --> {}\n", from.index(), to.index()));
        }
        out
    }

    /// DOT diagram of the DAG
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).expect("edge endpoints");
            out.push_str(&format!(
                "    \"{}\" -> \"{}\";\n",
                self.graph[from], self.graph[to]
            ));
        }
        for node in self.graph.node_indices() {
            if self.graph.neighbors_undirected(node).count() == 0 {
                out.push_str(&format!("    \"{}\";\n", self.graph[node]));
            }
        }

        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(entries: &[(&str, &[&str])]) -> Vec<TaskSpec> {
        entries
            .iter()
            .map(|(name, deps)| {
                TaskSpec::new(*name, deps.iter().map(|d| d.to_string()).collect())
            })
            .collect()
    }

    #[test]
    fn test_linear_order() {
        let graph = TaskGraph::build(&specs(&[
            ("transform:customers", &[]),
            ("transform:orders", &["transform:customers"]),
            ("transform:order_items", &["transform:orders"]),
        ]))
        .unwrap();

        let order = graph.topological_order().unwrap();
        assert_eq!(
            order,
            vec![
                "transform:customers",
                "transform:orders",
                "transform:order_items"
            ]
        );
    }

    #[test]
    fn test_diamond_order() {
        let graph = TaskGraph::build(&specs(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["b", "c"]),
        ]))
        .unwrap();

        let order = graph.topological_order().unwrap();
        assert_eq!(order[0], "a");
        assert_eq!(order[3], "d");
    }

    #[test]
    fn test_cycle_detected() {
        let result = TaskGraph::build(&specs(&[("a", &["b"]), ("b", &["a"])]));
        assert!(matches!(result, Err(LakeflowError::CircularDependency { .. })));
    }

    #[test]
    fn test_unknown_dependency() {
        let result = TaskGraph::build(&specs(&[("a", &["missing"])]));
        assert!(matches!(result, Err(LakeflowError::UnknownDependency { .. })));
    }

    #[test]
    fn test_dependents_lookup() {
        let graph = TaskGraph::build(&specs(&[
            ("transform:products", &[]),
            ("transform:reviews", &["transform:products"]),
            ("transform:order_items", &["transform:products"]),
        ]))
        .unwrap();

        let mut dependents = graph.dependents("transform:products");
        dependents.sort();
        assert_eq!(
            dependents,
            vec!["transform:order_items", "transform:reviews"]
        );
    }

    #[test]
    fn test_dot_output_lists_isolated_tasks() {
        let graph = TaskGraph::build(&specs(&[("ingest:customers", &[])])).unwrap();
        let dot = graph.to_dot();
        assert!(dot.contains("\"ingest:customers\";"));
    }

    #[test]
    fn test_mermaid_output() {
        let graph = TaskGraph::build(&specs(&[("a", &[]), ("b", &["a"])])).unwrap();
        let mermaid = graph.to_mermaid();
        assert!(mermaid.contains("graph TD"));
        assert!(mermaid.contains("-->"));
    }
}
