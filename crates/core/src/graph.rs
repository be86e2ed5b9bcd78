//! Unit dependency graph
//!
//! Edges go from a unit to its consumers: `A -> B` means B depends on A and
//! must be regenerated when A's generated surface changes.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::unit::UnitId;

/// Directed dependency graph between build units
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Edges go from producer to consumer
    graph: DiGraph<UnitId, ()>,
    /// Unit id to node index mapping
    nodes: HashMap<UnitId, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit (no-op if already present)
    pub fn add_unit(&mut self, unit: UnitId) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&unit) {
            return idx;
        }
        let idx = self.graph.add_node(unit.clone());
        self.nodes.insert(unit, idx);
        idx
    }

    /// Record that `consumer` depends on `producer`
    pub fn add_dependency(&mut self, consumer: UnitId, producer: UnitId) {
        let producer_idx = self.add_unit(producer);
        let consumer_idx = self.add_unit(consumer);
        if self.graph.find_edge(producer_idx, consumer_idx).is_none() {
            self.graph.add_edge(producer_idx, consumer_idx, ());
        }
    }

    /// Check if a unit is part of the graph
    pub fn contains(&self, unit: &UnitId) -> bool {
        self.nodes.contains_key(unit)
    }

    /// Number of units in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no units
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Units that directly depend on `unit`
    pub fn dependents_of(&self, unit: &UnitId) -> Vec<UnitId> {
        self.neighbors(unit, Direction::Outgoing)
    }

    /// Units `unit` directly depends on
    pub fn dependencies_of(&self, unit: &UnitId) -> Vec<UnitId> {
        self.neighbors(unit, Direction::Incoming)
    }

    fn neighbors(&self, unit: &UnitId, direction: Direction) -> Vec<UnitId> {
        match self.nodes.get(unit) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Seeds plus every unit that transitively depends on any seed
    ///
    /// Seeds are always part of the result, even when unknown to the graph.
    /// Cycles are fine: each unit is visited once.
    pub fn reverse_closure<'a>(&self, seeds: impl IntoIterator<Item = &'a UnitId>) -> HashSet<UnitId> {
        let mut closure = HashSet::new();
        let mut queue: VecDeque<UnitId> = seeds.into_iter().cloned().collect();

        while let Some(unit) = queue.pop_front() {
            if !closure.insert(unit.clone()) {
                continue;
            }
            for dependent in self.dependents_of(&unit) {
                if !closure.contains(&dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        closure
    }
}
