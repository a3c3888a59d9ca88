// Non-simulated placements: random, sphere surface, cubic grid

use rand::Rng;
use rand::rngs::StdRng;

pub fn random(count: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    (0..count)
        .map(|_| {
            [
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
            ]
        })
        .collect()
}

/// Golden-angle spiral over the unit sphere: evenly spread and fully
/// deterministic.
pub fn sphere(count: usize) -> Vec<[f64; 3]> {
    if count == 1 {
        return vec![[0.0, 0.0, 0.0]];
    }
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * i as f64 / (count as f64 - 1.0);
            let radius = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f64;
            [radius * theta.cos(), y, radius * theta.sin()]
        })
        .collect()
}

pub fn grid(count: usize) -> Vec<[f64; 3]> {
    let side = (count as f64).cbrt().ceil().max(1.0) as usize;
    (0..count)
        .map(|i| {
            let x = i % side;
            let y = (i / side) % side;
            let z = i / (side * side);
            [x as f64, y as f64, z as f64]
        })
        .collect()
}
