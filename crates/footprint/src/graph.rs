//! Undirected adjacency graph reduced to its connected components.

use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;

/// Disjoint-set forest over the vertex universe `0..vertex_count`.
///
/// Only vertices that took part in at least one [`add_edge`](Self::add_edge)
/// call are reported by [`components`](Self::components); a self-loop is enough
/// to register an isolated vertex.
pub struct ComponentGraph {
    sets: UnionFind<usize>,
    registered: Vec<bool>,
}

impl ComponentGraph {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            sets: UnionFind::new(vertex_count),
            registered: vec![false; vertex_count],
        }
    }

    /// Connect `u` and `v`. Symmetric and idempotent; `u == v` registers `u`.
    ///
    /// # Panics
    ///
    /// Panics if either vertex is outside `0..vertex_count`.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        self.registered[u] = true;
        self.registered[v] = true;
        if u != v {
            self.sets.union(u, v);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.registered.len()
    }

    /// Number of vertices touched by some edge.
    pub fn registered_count(&self) -> usize {
        self.registered.iter().filter(|&&seen| seen).count()
    }

    /// Consume the graph and yield its connected components.
    ///
    /// Each component is sorted ascending; components come out ordered by
    /// their smallest vertex.
    pub fn components(self) -> impl Iterator<Item = Vec<usize>> {
        let registered = self.registered;
        let labels = self.sets.into_labeling();

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut order: Vec<usize> = Vec::new();
        for (vertex, root) in labels.into_iter().enumerate() {
            if !registered[vertex] {
                continue;
            }
            let group = groups.entry(root).or_default();
            if group.is_empty() {
                order.push(root);
            }
            group.push(vertex);
        }

        order
            .into_iter()
            .filter_map(move |root| groups.remove(&root))
    }
}
