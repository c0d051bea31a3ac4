#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use band_life::bandlife::{Engine, EngineConfig, SeedRule, step_serial};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_GENERATIONS: u64 = 1000;
const REPORT_INTERVAL: u64 = 100;

struct MainArgs {
    config: EngineConfig,
    generations: u64,
    check: bool,
    print: bool,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut config = EngineConfig::default();
    let mut generations = DEFAULT_GENERATIONS;
    let mut check = false;
    let mut print = false;
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                config.width = next_arg(i, "--width")
                    .parse()
                    .expect("--width requires a positive integer");
            }
            "--height" => {
                i += 1;
                config.height = next_arg(i, "--height")
                    .parse()
                    .expect("--height requires a positive integer");
            }
            "--workers" => {
                i += 1;
                let n: usize = next_arg(i, "--workers")
                    .parse()
                    .expect("--workers requires a positive integer");
                config = config.worker_count(n);
            }
            "--density" => {
                i += 1;
                let p: f64 = next_arg(i, "--density")
                    .parse()
                    .expect("--density requires a number in [0, 1]");
                let rule = if p == 0.0 {
                    SeedRule::Dead
                } else {
                    SeedRule::Random { live_probability: p }
                };
                config = config.seed(rule);
            }
            "--seed" => {
                i += 1;
                let seed: u64 = next_arg(i, "--seed")
                    .parse()
                    .expect("--seed requires an unsigned integer");
                config = config.rng_seed(seed);
            }
            "--generations" => {
                i += 1;
                generations = next_arg(i, "--generations")
                    .parse()
                    .expect("--generations requires an unsigned integer");
            }
            "--check" => check = true,
            "--print" => print = true,
            other => panic!(
                "unknown argument: {other}\nusage: band-life [--width N] [--height N] [--workers N] [--density P] [--seed S] [--generations N] [--check] [--print]"
            ),
        }
        i += 1;
    }
    MainArgs {
        config,
        generations,
        check,
        print,
    }
}

fn run(args: MainArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(args.config)?;
    let mut reference = args.check.then(|| engine.grid().clone());
    let mut serial_total = Duration::ZERO;
    let mut parallel_total = Duration::ZERO;
    let mut mismatches = 0u64;

    for generation in 1..=args.generations {
        let start = Instant::now();
        engine.step()?;
        parallel_total += start.elapsed();

        if let Some(grid) = reference.as_mut() {
            let start = Instant::now();
            *grid = step_serial(grid);
            serial_total += start.elapsed();
            if grid != engine.grid() {
                mismatches += 1;
                error!(generation, "parallel grid diverged from serial reference");
            }
        }

        if generation % REPORT_INTERVAL == 0 || generation == args.generations {
            let status = match (&reference, mismatches) {
                (None, _) => "",
                (Some(_), 0) => " [MATCH]",
                (Some(_), _) => " [MISMATCH]",
            };
            println!(
                "Generation {generation}: population = {}{status}",
                engine.population()
            );
        }
    }

    if args.print {
        println!("{}", engine.grid());
    }

    let generations = args.generations.max(1) as f64;
    let parallel_ms = parallel_total.as_secs_f64() * 1000.0;
    println!(
        "\n--- Summary ({} generations, {}x{}, {} workers) ---",
        args.generations,
        engine.grid().width(),
        engine.grid().height(),
        engine.workers()
    );
    println!(
        "Parallel: {parallel_ms:.3} ms total, {:.6} ms/gen",
        parallel_ms / generations
    );
    if let Some(stats) = engine.last_stats() {
        println!(
            "Last generation: boundary {:?}, dispatch {:?}, await {:?}, merge {:?}",
            stats.boundary, stats.dispatch, stats.await_results, stats.merge
        );
    }
    if reference.is_some() {
        let serial_ms = serial_total.as_secs_f64() * 1000.0;
        println!(
            "Serial:   {serial_ms:.3} ms total, {:.6} ms/gen",
            serial_ms / generations
        );
        if mismatches > 0 {
            return Err(format!("{mismatches} generations diverged from the serial reference").into());
        }
    }

    engine.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(parse_args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "band-life failed");
            ExitCode::FAILURE
        }
    }
}
