use std::time::Instant;

use band_life::bandlife::{Engine, EngineConfig, SeedRule};

const SEED: u64 = 0x5EED_1234_ABCD_EF01;
const DENSITY: f64 = 0.42;

fn bench(size: usize, workers: usize, iterations: u64) -> (f64, u64) {
    let mut engine = Engine::new(
        EngineConfig::default()
            .size(size, size)
            .worker_count(workers)
            .seed(SeedRule::Random {
                live_probability: DENSITY,
            })
            .rng_seed(SEED),
    )
    .expect("valid bench config");

    let start = Instant::now();
    engine.step_n(iterations).expect("generation failed");
    let duration = start.elapsed();

    (duration.as_secs_f64() * 1000.0, engine.population())
}

fn main() {
    let sizes: &[(usize, u64)] = &[(256, 200), (1024, 50), (2048, 20)];
    let max_workers = num_cpus::get().max(1);
    let mut worker_counts = vec![1usize];
    while let Some(&last) = worker_counts.last() {
        if last * 2 > max_workers {
            break;
        }
        worker_counts.push(last * 2);
    }

    println!(
        "{:<12} {:>8} {:>8} {:>12} {:>10} {:>10}",
        "Grid", "Workers", "Iters", "Total(ms)", "Avg(ms)", "Pop"
    );
    println!("{}", "-".repeat(66));

    for &(size, iters) in sizes {
        let mut reference_pop = None;
        for &workers in &worker_counts {
            let (total_ms, pop) = bench(size, workers, iters);
            // Same seed, so every worker count must land on the same grid.
            let pop_note = match reference_pop {
                None => {
                    reference_pop = Some(pop);
                    ""
                }
                Some(expected) if expected == pop => "",
                Some(_) => " MISMATCH",
            };
            println!(
                "{:<12} {:>8} {:>8} {:>12.1} {:>10.4} {:>10}{pop_note}",
                format!("{size}x{size}"),
                workers,
                iters,
                total_ms,
                total_ms / iters as f64,
                pop
            );
        }
    }
}
