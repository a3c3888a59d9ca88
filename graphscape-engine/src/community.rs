// Multilevel modularity community detection

use crate::graph::SpatialGraph;
use std::collections::BTreeMap;
use tracing::debug;

/// A partition of the graph's nodes into communities, with the modularity of
/// that partition. `membership[i]` is the community of the node at petgraph
/// index `i`, renumbered to `0..count()`.
#[derive(Debug, Clone)]
pub struct Communities {
    pub membership: Vec<usize>,
    pub modularity: f64,
}

impl Communities {
    pub fn count(&self) -> usize {
        self.membership.iter().copied().max().map_or(0, |m| m + 1)
    }
}

/// Run multilevel (Louvain-style) modularity optimization: repeated local
/// moving followed by graph aggregation until the partition stops improving.
/// Nodes are visited in index order, so the result is deterministic.
pub fn detect(graph: &SpatialGraph) -> Result<Communities, String> {
    let n = graph.node_count();
    if n == 0 {
        return Err("empty graph".to_string());
    }

    // Flat weighted adjacency, both directions per edge; a self-loop is a
    // single entry carrying twice its weight so that degree bookkeeping
    // stays uniform.
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut total_weight_x2 = 0.0;
    for (a, b, w) in graph.edge_list() {
        let w = w.max(0.0);
        if a == b {
            adjacency[a].push((a, 2.0 * w));
        } else {
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
        total_weight_x2 += 2.0 * w;
    }
    if total_weight_x2 <= 0.0 {
        return Err("graph has no positive-weight edges".to_string());
    }

    let mut membership: Vec<usize> = (0..n).collect();
    let mut level_adjacency = adjacency.clone();

    loop {
        let mut level_membership: Vec<usize> = (0..level_adjacency.len()).collect();
        let improved = local_moving(&level_adjacency, total_weight_x2, &mut level_membership);
        let (renumbered, community_count) = renumber(&level_membership);

        for slot in membership.iter_mut() {
            *slot = renumbered[*slot];
        }

        if !improved || community_count == level_adjacency.len() {
            break;
        }
        level_adjacency = aggregate(&level_adjacency, &renumbered, community_count);
    }

    let modularity = partition_modularity(&adjacency, total_weight_x2, &membership);
    let communities = Communities {
        membership,
        modularity,
    };
    debug!(
        communities = communities.count(),
        modularity, "community detection finished"
    );
    Ok(communities)
}

/// One round of local moving: each node is moved to the neighboring
/// community with the best modularity gain until a full sweep changes
/// nothing. Returns whether any node moved.
fn local_moving(
    adjacency: &[Vec<(usize, f64)>],
    total_weight_x2: f64,
    membership: &mut [usize],
) -> bool {
    let n = adjacency.len();
    let degrees: Vec<f64> = adjacency
        .iter()
        .map(|neighbors| neighbors.iter().map(|&(_, w)| w).sum())
        .collect();
    let mut community_degree = vec![0.0; n];
    for i in 0..n {
        community_degree[membership[i]] += degrees[i];
    }

    let mut improved = false;
    loop {
        let mut moved = false;
        for i in 0..n {
            let current = membership[i];
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for &(j, w) in &adjacency[i] {
                if j != i {
                    *links.entry(membership[j]).or_insert(0.0) += w;
                }
            }

            community_degree[current] -= degrees[i];
            let mut best = current;
            let mut best_score = links.get(&current).copied().unwrap_or(0.0)
                - degrees[i] * community_degree[current] / total_weight_x2;
            for (&candidate, &link_weight) in &links {
                if candidate == current {
                    continue;
                }
                let score =
                    link_weight - degrees[i] * community_degree[candidate] / total_weight_x2;
                if score > best_score + 1e-12 {
                    best_score = score;
                    best = candidate;
                }
            }
            membership[i] = best;
            community_degree[best] += degrees[i];
            if best != current {
                moved = true;
                improved = true;
            }
        }
        if !moved {
            break;
        }
    }
    improved
}

/// Renumber community labels to a dense 0..count range, preserving the order
/// of first appearance.
fn renumber(membership: &[usize]) -> (Vec<usize>, usize) {
    let mut labels: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    let mut renumbered = Vec::with_capacity(membership.len());
    for &community in membership {
        let label = *labels.entry(community).or_insert_with(|| {
            let label = next;
            next += 1;
            label
        });
        renumbered.push(label);
    }
    (renumbered, next)
}

/// Collapse each community into one node, summing edge weights between
/// communities; intra-community weight becomes a self entry.
fn aggregate(
    adjacency: &[Vec<(usize, f64)>],
    membership: &[usize],
    community_count: usize,
) -> Vec<Vec<(usize, f64)>> {
    let mut weights: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); community_count];
    for (i, neighbors) in adjacency.iter().enumerate() {
        let ci = membership[i];
        for &(j, w) in neighbors {
            *weights[ci].entry(membership[j]).or_insert(0.0) += w;
        }
    }
    weights
        .into_iter()
        .map(|row| row.into_iter().collect())
        .collect()
}

fn partition_modularity(
    adjacency: &[Vec<(usize, f64)>],
    total_weight_x2: f64,
    membership: &[usize],
) -> f64 {
    let community_count = membership.iter().copied().max().map_or(0, |m| m + 1);
    let mut community_degree = vec![0.0; community_count];
    let mut intra = 0.0;
    for (i, neighbors) in adjacency.iter().enumerate() {
        for &(j, w) in neighbors {
            if membership[i] == membership[j] {
                intra += w;
            }
        }
        let degree: f64 = neighbors.iter().map(|&(_, w)| w).sum();
        community_degree[membership[i]] += degree;
    }
    let mut modularity = intra / total_weight_x2;
    for degree in community_degree {
        modularity -= (degree / total_weight_x2).powi(2);
    }
    modularity
}
