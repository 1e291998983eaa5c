//! Profiling tool comparing the serial and parallel erosion drivers

use std::time::{Duration, Instant};

use clap::Parser;

use droplet_terrain::{
    build_erosion_brush, generate_height_field, simulate_erosion, simulate_erosion_parallel,
    ErosionParameters, HeightField, NoiseSettings,
};

#[derive(Parser, Debug)]
#[command(name = "profile_erosion")]
struct Args {
    /// Side length of the height field
    #[arg(short = 'n', long, default_value = "512")]
    size: usize,

    /// Droplets per run
    #[arg(short, long, default_value = "200000")]
    iterations: usize,

    #[arg(short, long, default_value = "1337")]
    seed: u64,

    /// Brush radii to profile
    #[arg(short, long, value_delimiter = ',', default_value = "1,3,5")]
    radii: Vec<usize>,
}

fn run(args: &Args) -> droplet_terrain::Result<()> {
    println!("=== Erosion Profiling ===");
    println!("Map size: {}x{} ({} cells)", args.size, args.size, args.size * args.size);
    println!("Droplets per run: {}", args.iterations);
    println!();

    let settings = NoiseSettings {
        seed: args.seed,
        ..Default::default()
    };

    let start = Instant::now();
    let base = generate_height_field(&settings, args.size)?;
    println!("Height field generation: {:?}", start.elapsed());

    for &radius in &args.radii {
        let params = ErosionParameters {
            brush_radius: radius,
            ..Default::default()
        };

        let start = Instant::now();
        let brush = build_erosion_brush(radius);
        let brush_time = start.elapsed();

        let mut serial = base.clone();
        let start = Instant::now();
        let stats = simulate_erosion(&mut serial, &brush, &params, args.iterations, args.seed)?;
        let serial_time = start.elapsed();

        let mut parallel = base.clone();
        let start = Instant::now();
        simulate_erosion_parallel(&mut parallel, &brush, &params, args.iterations, args.seed)?;
        let parallel_time = start.elapsed();

        println!("\nBrush radius {} ({} cells, built in {:?})", radius, brush.len(), brush_time);
        println!("  Serial:   {:?} ({:.0} steps/s)", serial_time, rate(stats.steps_taken, serial_time));
        println!("  Parallel: {:?} ({:.2}x)", parallel_time, speedup(serial_time, parallel_time));
        println!("  Mean |serial - parallel|: {:.6}", mean_abs_diff(&serial, &parallel));
    }

    Ok(())
}

fn rate(steps: u64, elapsed: Duration) -> f64 {
    steps as f64 / elapsed.as_secs_f64().max(1e-9)
}

fn speedup(serial: Duration, parallel: Duration) -> f64 {
    serial.as_secs_f64() / parallel.as_secs_f64().max(1e-9)
}

fn mean_abs_diff(a: &HeightField, b: &HeightField) -> f64 {
    let sum: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).abs() as f64)
        .sum();
    sum / a.as_slice().len() as f64
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
