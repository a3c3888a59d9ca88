// Force-simulation layouts

use super::geometric;
use crate::community;
use crate::graph::SpatialGraph;
use rand::Rng;
use rand::rngs::StdRng;

/// Classic Fruchterman-Reingold in three dimensions: pairwise repulsion,
/// attraction along edges, displacement capped by a cooling temperature.
pub fn fruchterman_reingold(
    graph: &SpatialGraph,
    rng: &mut StdRng,
) -> Result<Vec<[f64; 3]>, String> {
    let n = graph.node_count();
    let mut positions = geometric::random(n, rng);
    if n == 1 {
        return Ok(positions);
    }
    let edges = graph.edge_list();

    // Optimal pair distance for a unit-volume cube.
    let k = (1.0 / n as f64).cbrt();
    let iterations = 50;
    let mut temperature = 0.1;
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut displacement = vec![[0.0f64; 3]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = sub(positions[i], positions[j]);
                let dist = norm(delta).max(1e-9);
                let force = k * k / dist;
                for axis in 0..3 {
                    let push = delta[axis] / dist * force;
                    displacement[i][axis] += push;
                    displacement[j][axis] -= push;
                }
            }
        }

        for &(a, b, weight) in &edges {
            if a == b {
                continue;
            }
            let delta = sub(positions[a], positions[b]);
            let dist = norm(delta).max(1e-9);
            let force = dist * dist / k * weight.max(0.0);
            for axis in 0..3 {
                let pull = delta[axis] / dist * force;
                displacement[a][axis] -= pull;
                displacement[b][axis] += pull;
            }
        }

        apply_displacement(&mut positions, &displacement, temperature);
        temperature -= cooling;
        if temperature <= 0.0 {
            break;
        }
    }

    Ok(positions)
}

/// Stress majorization over graph-theoretic distances. Preserves the
/// distance structure better than spring forces at higher cost, which is
/// why selection reserves it for small dense graphs.
pub fn kamada_kawai(graph: &SpatialGraph) -> Result<Vec<[f64; 3]>, String> {
    let n = graph.node_count();
    if n == 1 {
        return Ok(vec![[0.0, 0.0, 0.0]]);
    }
    let distances = all_pairs_distances(graph)?;

    // Deterministic start: sphere scaled to the graph diameter.
    let diameter = distances
        .iter()
        .flatten()
        .copied()
        .fold(0.0f64, f64::max);
    let mut positions = geometric::sphere(n);
    for position in positions.iter_mut() {
        for coordinate in position.iter_mut() {
            *coordinate *= diameter / 2.0;
        }
    }

    // SMACOF iterations with weights 1/d^2.
    for _ in 0..200 {
        let mut next = vec![[0.0f64; 3]; n];
        let mut moved = 0.0;
        for i in 0..n {
            let mut numerator = [0.0f64; 3];
            let mut denominator = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = distances[i][j];
                let w = 1.0 / (d * d);
                let delta = sub(positions[i], positions[j]);
                let dist = norm(delta).max(1e-9);
                let ratio = d / dist;
                for axis in 0..3 {
                    numerator[axis] += w * (positions[j][axis] + ratio * delta[axis]);
                }
                denominator += w;
            }
            for axis in 0..3 {
                next[i][axis] = numerator[axis] / denominator;
            }
            moved += norm(sub(next[i], positions[i]));
        }
        positions = next;
        if moved / (n as f64) < 1e-6 {
            break;
        }
    }

    Ok(positions)
}

/// Scalable force-directed layout for graphs with thousands of nodes. Keeps
/// the Fruchterman-Reingold structure but samples repulsion partners each
/// iteration, so an iteration costs O(n * sample) instead of O(n^2).
pub fn drl(graph: &SpatialGraph, rng: &mut StdRng) -> Result<Vec<[f64; 3]>, String> {
    let n = graph.node_count();
    let mut positions = geometric::random(n, rng);
    if n == 1 {
        return Ok(positions);
    }
    let edges = graph.edge_list();

    let k = (1.0 / n as f64).cbrt();
    let sample = ((n as f64).sqrt().ceil() as usize).clamp(1, n - 1);
    let iterations = 100;
    let mut temperature = 0.1;
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut displacement = vec![[0.0f64; 3]; n];

        for i in 0..n {
            for _ in 0..sample {
                let j = rng.gen_range(0..n);
                if j == i {
                    continue;
                }
                let delta = sub(positions[i], positions[j]);
                let dist = norm(delta).max(1e-9);
                // Sampled repulsion is scaled up to stand in for the full sum.
                let force = k * k / dist * (n as f64 / sample as f64);
                for axis in 0..3 {
                    displacement[i][axis] += delta[axis] / dist * force;
                }
            }
        }

        for &(a, b, weight) in &edges {
            if a == b {
                continue;
            }
            let delta = sub(positions[a], positions[b]);
            let dist = norm(delta).max(1e-9);
            let force = dist * dist / k * weight.max(0.0);
            for axis in 0..3 {
                let pull = delta[axis] / dist * force;
                displacement[a][axis] -= pull;
                displacement[b][axis] += pull;
            }
        }

        apply_displacement(&mut positions, &displacement, temperature);
        temperature -= cooling;
        if temperature <= 0.0 {
            break;
        }
    }

    Ok(positions)
}

const FORCE_ATLAS_ITERATIONS: usize = 2000;
const COMMUNITY_BAND_SPACING: f64 = 20.0;
const COMMUNITY_BAND_JITTER: f64 = 2.0;

/// A 2-D force-directed pass followed by community banding on the z axis:
/// one band per detected community, spaced 20 units apart with a small
/// jitter, so communities separate vertically. Not a native 3-D simulation.
pub fn force_atlas(graph: &SpatialGraph, rng: &mut StdRng) -> Result<Vec<[f64; 3]>, String> {
    let communities = community::detect(graph)
        .map_err(|reason| format!("community detection failed: {reason}"))?;

    let n = graph.node_count();
    let edges = graph.edge_list();
    let mut degrees = vec![0.0f64; n];
    for &(a, b, _) in &edges {
        degrees[a] += 1.0;
        degrees[b] += 1.0;
    }

    let mut xy: Vec<[f64; 2]> = (0..n)
        .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect();

    // Degree-scaled repulsion with linear attraction, the ForceAtlas force
    // model. Above the sample cutoff repulsion partners are sampled, the
    // same approximation the reference implementation makes with its
    // Barnes-Hut tree.
    let repulsion = 0.01 / n as f64;
    let sample_cutoff = 300;
    let sample = ((n as f64).sqrt().ceil() as usize).clamp(1, n.max(2) - 1);
    let step = 0.01;

    for _ in 0..FORCE_ATLAS_ITERATIONS {
        let mut displacement = vec![[0.0f64; 2]; n];

        if n <= sample_cutoff {
            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = sub2(xy[i], xy[j]);
                    let dist = norm2(delta).max(1e-9);
                    let force = repulsion * (degrees[i] + 1.0) * (degrees[j] + 1.0) / dist;
                    for axis in 0..2 {
                        let push = delta[axis] / dist * force;
                        displacement[i][axis] += push;
                        displacement[j][axis] -= push;
                    }
                }
            }
        } else {
            for i in 0..n {
                for _ in 0..sample {
                    let j = rng.gen_range(0..n);
                    if j == i {
                        continue;
                    }
                    let delta = sub2(xy[i], xy[j]);
                    let dist = norm2(delta).max(1e-9);
                    let force = repulsion * (degrees[i] + 1.0) * (degrees[j] + 1.0) / dist
                        * (n as f64 / sample as f64);
                    for axis in 0..2 {
                        displacement[i][axis] += delta[axis] / dist * force;
                    }
                }
            }
        }

        for &(a, b, weight) in &edges {
            if a == b {
                continue;
            }
            let delta = sub2(xy[a], xy[b]);
            let dist = norm2(delta).max(1e-9);
            let force = dist * weight.max(0.0);
            for axis in 0..2 {
                let pull = delta[axis] / dist * force;
                displacement[a][axis] -= pull;
                displacement[b][axis] += pull;
            }
        }

        for i in 0..n {
            let magnitude = norm2(displacement[i]);
            if magnitude > 1e-12 {
                let limited = magnitude.min(step);
                for axis in 0..2 {
                    xy[i][axis] += displacement[i][axis] / magnitude * limited;
                }
            }
        }
    }

    let positions = (0..n)
        .map(|i| {
            let band = communities.membership[i] as f64 * COMMUNITY_BAND_SPACING;
            let jitter = rng.gen_range(-COMMUNITY_BAND_JITTER..COMMUNITY_BAND_JITTER);
            [xy[i][0], xy[i][1], band + jitter]
        })
        .collect();
    Ok(positions)
}

/// BFS hop distances between all node pairs. Unreachable pairs are pushed
/// just beyond the largest finite distance; a graph with no finite
/// distances at all cannot be embedded this way.
fn all_pairs_distances(graph: &SpatialGraph) -> Result<Vec<Vec<f64>>, String> {
    let n = graph.node_count();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (a, b, _) in graph.edge_list() {
        if a != b {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    }

    let mut distances = vec![vec![f64::INFINITY; n]; n];
    let mut queue = std::collections::VecDeque::new();
    for start in 0..n {
        distances[start][start] = 0.0;
        queue.clear();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            let next_distance = distances[start][current] + 1.0;
            for &neighbor in &adjacency[current] {
                if distances[start][neighbor].is_infinite() {
                    distances[start][neighbor] = next_distance;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    let max_finite = distances
        .iter()
        .flatten()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0f64, f64::max);
    if max_finite == 0.0 {
        return Err("no finite graph distances".to_string());
    }
    for row in distances.iter_mut() {
        for distance in row.iter_mut() {
            if distance.is_infinite() {
                *distance = max_finite + 1.0;
            }
        }
    }
    Ok(distances)
}

fn apply_displacement(positions: &mut [[f64; 3]], displacement: &[[f64; 3]], temperature: f64) {
    for (position, shift) in positions.iter_mut().zip(displacement) {
        let magnitude = norm(*shift);
        if magnitude > 1e-12 {
            let limited = magnitude.min(temperature);
            for axis in 0..3 {
                position[axis] += shift[axis] / magnitude * limited;
            }
        }
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn sub2(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn norm2(v: [f64; 2]) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}
