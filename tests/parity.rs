use band_life::bandlife::{Engine, Grid, SeedRule, step_serial};
use rand::SeedableRng;

fn random_grid(width: usize, height: usize, density: f64, seed: u64) -> Grid {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    SeedRule::Random {
        live_probability: density,
    }
    .fill(width, height, &mut rng)
    .expect("valid fill")
}

fn run_parity_case(width: usize, height: usize, density: f64, steps: u64, workers: usize, seed: u64) {
    let initial = random_grid(width, height, density, seed);
    let mut serial = initial.clone();
    let mut engine = Engine::from_grid(initial, workers).expect("engine");

    for step in 1..=steps {
        engine.step().expect("generation");
        serial = step_serial(&serial);
        assert_eq!(
            engine.grid(),
            &serial,
            "grid mismatch at step {step} for {width}x{height} density {density} workers {workers} seed {seed}"
        );
    }
}

#[test]
fn parity_sparse_mid_dense() {
    run_parity_case(96, 96, 0.10, 6, 4, 0xA1);
    run_parity_case(96, 96, 0.42, 6, 4, 0xB2);
    run_parity_case(96, 96, 0.83, 4, 4, 0xC3);
}

#[test]
fn parity_multiple_seeds() {
    for seed in [11u64, 22, 33, 44] {
        run_parity_case(72, 40, 0.35, 7, 3, seed);
    }
}

#[test]
fn parity_uneven_partitions() {
    // (height - 2) is not a multiple of the worker count in each of these.
    run_parity_case(31, 29, 0.4, 5, 4, 0x11);
    run_parity_case(17, 12, 0.5, 5, 3, 0x22);
    run_parity_case(10, 90, 0.3, 5, 12, 0x33);
}

#[test]
fn parity_degenerate_shapes() {
    for (w, h) in [(1, 1), (1, 7), (7, 1), (2, 9), (9, 2), (3, 3)] {
        run_parity_case(w, h, 0.6, 4, 2, (w * 31 + h) as u64);
    }
}

#[test]
fn worker_count_never_changes_result() {
    let initial = random_grid(48, 50, 0.37, 0xD37E_A515);

    let run = |workers: usize| {
        let mut engine = Engine::from_grid(initial.clone(), workers).expect("engine");
        engine.step_n(12).expect("generations");
        engine.grid().clone()
    };

    let baseline = run(1);
    for workers in [2, 3, 4, 6, 8, 12, 16, 24, 48] {
        assert_eq!(run(workers), baseline, "workers = {workers}");
    }
}
