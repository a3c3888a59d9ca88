// 3-D layout engine: algorithm selection, execution, normalization

mod force;
mod geometric;

use crate::community;
use crate::graph::SpatialGraph;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Half-width of the normalized coordinate cube.
pub const DEFAULT_SCALE: f64 = 50.0;

/// Layouts always run seeded so repeated runs over the same input are
/// bit-identical.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlgorithm {
    FruchtermanReingold,
    KamadaKawai,
    Drl,
    ForceAtlas,
    Random,
    Sphere,
    Grid,
}

impl LayoutAlgorithm {
    /// Parse an algorithm name. Unknown names resolve to None; the layout
    /// entry point treats them as `fruchterman_reingold`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "fruchterman_reingold" | "spring" => Some(Self::FruchtermanReingold),
            "kamada_kawai" => Some(Self::KamadaKawai),
            "drl" => Some(Self::Drl),
            "force_atlas" => Some(Self::ForceAtlas),
            "random" => Some(Self::Random),
            "sphere" => Some(Self::Sphere),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FruchtermanReingold => "fruchterman_reingold",
            Self::KamadaKawai => "kamada_kawai",
            Self::Drl => "drl",
            Self::ForceAtlas => "force_atlas",
            Self::Random => "random",
            Self::Sphere => "sphere",
            Self::Grid => "grid",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub scale: f64,
    pub seed: u64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            seed: DEFAULT_SEED,
        }
    }
}

/// Compute a 3-D layout and write `(x, y, z)` onto every node.
///
/// `algorithm` may be `"auto"`, a known algorithm name, or anything else
/// (treated as `fruchterman_reingold`). Returns the name of the algorithm
/// actually executed, which is `"random"` whenever the chosen pass failed
/// and the fallback placement ran instead.
pub fn apply_layout(graph: &mut SpatialGraph, algorithm: &str, options: LayoutOptions) -> String {
    let resolved = if algorithm == "auto" {
        let choice = auto_select(graph);
        debug!(algorithm = choice.as_str(), "auto layout selection");
        choice
    } else {
        LayoutAlgorithm::parse(algorithm).unwrap_or(LayoutAlgorithm::FruchtermanReingold)
    };

    if graph.node_count() == 0 {
        return resolved.as_str().to_string();
    }

    match execute(resolved, graph, &options) {
        Ok(mut positions) => {
            normalize(&mut positions, options.scale);
            assign(graph, &positions);
            resolved.as_str().to_string()
        }
        Err(reason) => {
            warn!(
                algorithm = resolved.as_str(),
                %reason,
                "layout failed, degrading to random placement"
            );
            let mut rng = StdRng::seed_from_u64(options.seed);
            let mut positions = geometric::random(graph.node_count(), &mut rng);
            normalize(&mut positions, options.scale);
            assign(graph, &positions);
            LayoutAlgorithm::Random.as_str().to_string()
        }
    }
}

/// The auto-mode decision tree. Thresholds are exact cutoffs: huge or very
/// sparse graphs get cheap geometric or approximate layouts, small dense
/// graphs get stress majorization, and mid-density graphs with strong
/// community structure get the community-banded pass.
pub fn auto_select(graph: &SpatialGraph) -> LayoutAlgorithm {
    let nodes = graph.node_count();
    let density = graph.density();

    if nodes > 5000 {
        return LayoutAlgorithm::Drl;
    }
    if nodes > 2000 {
        return if density < 0.01 {
            LayoutAlgorithm::Sphere
        } else {
            LayoutAlgorithm::Drl
        };
    }
    if density > 0.3 {
        return LayoutAlgorithm::KamadaKawai;
    }
    if density < 0.05 {
        return if nodes < 500 {
            LayoutAlgorithm::Sphere
        } else {
            LayoutAlgorithm::FruchtermanReingold
        };
    }
    match community::detect(graph) {
        Ok(communities) if communities.modularity > 0.4 && communities.count() > 3 => {
            LayoutAlgorithm::ForceAtlas
        }
        Ok(_) => LayoutAlgorithm::FruchtermanReingold,
        Err(reason) => {
            debug!(%reason, "community detection failed during auto selection");
            LayoutAlgorithm::FruchtermanReingold
        }
    }
}

fn execute(
    algorithm: LayoutAlgorithm,
    graph: &SpatialGraph,
    options: &LayoutOptions,
) -> Result<Vec<[f64; 3]>, String> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let positions = match algorithm {
        LayoutAlgorithm::FruchtermanReingold => force::fruchterman_reingold(graph, &mut rng)?,
        LayoutAlgorithm::KamadaKawai => force::kamada_kawai(graph)?,
        LayoutAlgorithm::Drl => force::drl(graph, &mut rng)?,
        LayoutAlgorithm::ForceAtlas => force::force_atlas(graph, &mut rng)?,
        LayoutAlgorithm::Random => geometric::random(graph.node_count(), &mut rng),
        LayoutAlgorithm::Sphere => geometric::sphere(graph.node_count()),
        LayoutAlgorithm::Grid => geometric::grid(graph.node_count()),
    };
    if positions
        .iter()
        .any(|p| p.iter().any(|c| !c.is_finite()))
    {
        return Err("produced non-finite coordinates".to_string());
    }
    Ok(positions)
}

/// Rescale every axis independently into [-scale, scale]. A degenerate axis
/// (all values equal) is treated as having range 1, which lands every
/// coordinate on -scale.
pub fn normalize(positions: &mut [[f64; 3]], scale: f64) {
    if positions.is_empty() {
        return;
    }
    for axis in 0..3 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for position in positions.iter() {
            min = min.min(position[axis]);
            max = max.max(position[axis]);
        }
        let range = if max - min == 0.0 { 1.0 } else { max - min };
        for position in positions.iter_mut() {
            position[axis] = ((position[axis] - min) / range - 0.5) * scale * 2.0;
        }
    }
}

fn assign(graph: &mut SpatialGraph, positions: &[[f64; 3]]) {
    let indices: Vec<_> = graph.node_indices().collect();
    for (index, position) in indices.into_iter().zip(positions) {
        graph.set_position(index, *position);
    }
}
