//! Splat a random particle cloud onto a grid and probe the resulting field.
//!
//! Run with: cargo run --example field_demo -p splat2d
//! Set RUST_LOG=debug to see per-stage counts.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use splat2d::{splat_field, AttributeTable, FieldConfig, Grid, InterpMethod, Poly6};

fn main() {
    env_logger::init();

    const N_PARTICLES: usize = 500;
    const GRID_N: usize = 32;
    const DOMAIN: f32 = 10.0;

    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let channels = ["mass", "vx", "vy", "inertia", "angle", "spin"];
    let mut table = AttributeTable::new(channels);
    let mut positions = Vec::with_capacity(N_PARTICLES);
    let mut ids = Vec::with_capacity(N_PARTICLES);

    println!("Spawning {} particles in a {}x{} box...", N_PARTICLES, DOMAIN, DOMAIN);
    for id in 0..N_PARTICLES as u64 {
        positions.push(Vec2::new(
            rng.random_range(0.0..DOMAIN),
            rng.random_range(0.0..DOMAIN),
        ));
        ids.push(id);
        let mass = rng.random_range(0.5..2.0);
        table
            .insert(
                id,
                &[
                    mass,
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    mass * 0.4,
                    rng.random_range(0.0..std::f32::consts::TAU),
                    rng.random_range(-0.5..0.5),
                ],
            )
            .unwrap();
    }

    let grid = Grid::uniform(Vec2::ZERO, DOMAIN / (GRID_N - 1) as f32, GRID_N, GRID_N);
    let config = FieldConfig {
        support_radius: 0.8,
        method: InterpMethod::Cubic,
    };

    let start = std::time::Instant::now();
    let output = splat_field(&grid, &positions, &ids, &table, &channels, &config, &Poly6)
        .expect("pipeline failed");
    println!(
        "Pipeline: {} occupied / {} nodes in {:.2?}",
        output.weights.occupied_cells(),
        grid.len(),
        start.elapsed()
    );

    println!("\n{:>6} {:>6}  {}", "x", "y", channels.join("  "));
    for (x, y) in [(1.0, 1.0), (3.3, 7.1), (5.0, 5.0), (9.9, 0.2)] {
        let v = output.field.query(x, y).expect("query inside the domain");
        let formatted: Vec<String> = v.iter().map(|c| format!("{:7.3}", c)).collect();
        println!("{:>6.1} {:>6.1}  {}", x, y, formatted.join(" "));
    }

    // Kernel-density normalization is a caller choice; show the hook
    let density = output.weights.density();
    let max_density = density.iter().cloned().fold(0.0f32, f32::max);
    println!("\nPeak kernel density on the grid: {:.3}", max_density);
}
