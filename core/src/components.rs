use std::collections::{HashMap, VecDeque};

use crate::graph::{Graph, NodeId, NodeIndex};

/// Connected-component label. Labels start at 1 and follow first-encounter order.
pub type ComponentId = u32;

/// Result of connected-component labeling over one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLabels {
    /// Label per node position, parallel to `graph.nodes()`.
    labels: Vec<ComponentId>,
    /// Node count per component; `sizes[k - 1]` is the size of component `k`.
    sizes: Vec<usize>,
    ids: Vec<NodeId>,
    index: HashMap<NodeId, NodeIndex>,
}

impl ComponentLabels {
    pub fn component_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn label_at(&self, index: usize) -> ComponentId {
        self.labels[index]
    }

    pub fn label_of(&self, id: &str) -> Option<ComponentId> {
        self.index.get(id).map(|&i| self.labels[i])
    }

    pub fn size_of(&self, label: ComponentId) -> usize {
        label
            .checked_sub(1)
            .and_then(|k| self.sizes.get(k as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Component with the most nodes; the lowest label wins a tie.
    pub fn largest(&self) -> Option<(ComponentId, usize)> {
        self.sizes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(ComponentId, usize)>, (k, &size)| match best {
                Some((_, s)) if s >= size => best,
                _ => Some((k as ComponentId + 1, size)),
            })
    }

    /// Node ids of one component, in graph order.
    pub fn members(&self, label: ComponentId) -> Vec<&str> {
        self.ids
            .iter()
            .zip(&self.labels)
            .filter(|(_, &l)| l == label)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Node id -> label mapping.
    pub fn to_map(&self) -> HashMap<NodeId, ComponentId> {
        self.ids
            .iter()
            .cloned()
            .zip(self.labels.iter().copied())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ComponentId)> {
        self.ids.iter().map(|s| s.as_str()).zip(self.labels.iter().copied())
    }
}

/// Display group written onto a labeled copy, e.g. `comp-3`.
pub fn component_group(label: ComponentId) -> String {
    format!("comp-{}", label)
}

/// Label connected components, treating every edge as undirected.
///
/// Nodes are scanned in graph order; each node not yet reached seeds a BFS
/// and receives the next label. The result is deterministic for a given
/// node order. Isolated nodes get a singleton component.
pub fn label_components(graph: &Graph) -> ComponentLabels {
    let adj = graph.adjacency();
    let n = graph.node_count();
    let mut labels: Vec<ComponentId> = vec![0; n];
    let mut sizes: Vec<usize> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for seed in 0..n {
        if labels[seed] != 0 {
            continue;
        }
        let label = sizes.len() as ComponentId + 1;
        let mut size = 0usize;

        labels[seed] = label;
        queue.push_back(seed);
        while let Some(current) = queue.pop_front() {
            size += 1;
            for a in &adj[current] {
                if labels[a.node] == 0 {
                    labels[a.node] = label;
                    queue.push_back(a.node);
                }
            }
        }
        sizes.push(size);
    }

    ComponentLabels {
        labels,
        sizes,
        ids: graph.nodes().iter().map(|n| n.id.clone()).collect(),
        index: graph.id_index().clone(),
    }
}

/// Copy of `graph` with each node's group replaced by its component label.
///
/// `labels` must come from [`label_components`] on the same graph.
pub fn labeled_view(graph: &Graph, labels: &ComponentLabels) -> Graph {
    let mut view = graph.clone();
    for (i, node) in view.nodes_mut().iter_mut().enumerate() {
        node.group = Some(component_group(labels.label_at(i)));
    }
    view
}
