use std::time::Instant;

use clap::Parser;

use droplet_terrain::{
    ErosionParameters, ErosionPreset, HeightField, SimulationContext, TerrainConfig, TerrainSeeds,
};

#[derive(Parser, Debug)]
#[command(name = "droplet_terrain")]
#[command(about = "Generate a fractal height field and erode it with water droplets")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Side length of the square height field
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Master seed (uses a random seed if neither this nor the config sets one)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of droplets to simulate
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Number of noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Amplitude decay per octave
    #[arg(long)]
    persistence: Option<f64>,

    /// Erosion parameter preset (gentle, normal, dramatic)
    #[arg(long)]
    preset: Option<ErosionPreset>,

    /// Erosion brush radius
    #[arg(short, long)]
    radius: Option<usize>,

    /// Use the batched parallel driver
    #[arg(long)]
    parallel: bool,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn build_config(args: &Args) -> droplet_terrain::Result<TerrainConfig> {
    let mut config = match &args.config {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig {
            noise: droplet_terrain::NoiseSettings {
                seed: rand::random(),
                ..Default::default()
            },
            ..Default::default()
        },
    };

    if let Some(preset) = args.preset {
        config.erosion = ErosionParameters::from_preset(preset);
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(seed) = args.seed {
        config.noise.seed = TerrainSeeds::from_master(seed).heightmap;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(octaves) = args.octaves {
        config.noise.octaves = octaves;
    }
    if let Some(persistence) = args.persistence {
        config.noise.persistence = persistence;
    }
    if let Some(radius) = args.radius {
        config.erosion.brush_radius = radius;
    }
    config.parallel |= args.parallel;

    config.validate()?;
    Ok(config)
}

/// Banner line naming the seed the user chose: the master seed when one was
/// given on the command line, otherwise the noise seed from config or chance.
fn seed_banner(master: Option<u64>, config: &TerrainConfig) -> String {
    match master {
        Some(master) => format!(
            "Generating terrain with seed: {} ({})",
            master,
            TerrainSeeds::from_master(master)
        ),
        None => format!("Generating terrain with seed: {}", config.noise.seed),
    }
}

fn report_range(label: &str, field: &HeightField) {
    let (min_h, max_h) = field.min_max();
    println!("{}: {:.4} to {:.4} (total {:.2})", label, min_h, max_h, field.total());
}

fn run(args: Args) -> droplet_terrain::Result<()> {
    let config = build_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    println!("{}", seed_banner(args.seed, &config));
    println!("Map size: {}x{}", config.size, config.size);

    let mut ctx = SimulationContext::new(config.size)?;
    ctx.set_parameters(config.noise.clone(), config.erosion.clone())?;

    let start = Instant::now();
    ctx.generate_noise()?;
    println!("Height field generated in {:?}", start.elapsed());
    report_range("Height range", ctx.field());

    println!(
        "Simulating {} droplets ({})...",
        config.iterations,
        if config.parallel { "parallel" } else { "serial" }
    );
    let start = Instant::now();
    let stats = if config.parallel {
        ctx.erode_iter_parallel(config.iterations)?
    } else {
        ctx.erode_iter(config.iterations)?
    };
    println!("Erosion complete in {:?}:", start.elapsed());
    println!("  Total eroded: {:.3} units", stats.total_eroded);
    println!("  Total deposited: {:.3} units", stats.total_deposited);
    println!("  Steps taken: {}", stats.steps_taken);
    println!(
        "  Terminations: {} lifetime, {} stalled, {} left interior",
        stats.lifetime_exhausted, stats.stalled, stats.left_interior
    );
    report_range("Post-erosion range", ctx.field());

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_seed(seed: Option<u64>) -> Args {
        let mut argv = vec!["droplet_terrain".to_string()];
        if let Some(seed) = seed {
            argv.push("--seed".to_string());
            argv.push(seed.to_string());
        }
        Args::parse_from(argv)
    }

    #[test]
    fn test_banner_shows_master_seed() {
        let args = args_with_seed(Some(42));
        let config = build_config(&args).unwrap();
        let derived = TerrainSeeds::from_master(42).heightmap;
        assert_eq!(config.noise.seed, derived);

        let banner = seed_banner(args.seed, &config);
        assert!(banner.starts_with("Generating terrain with seed: 42 ("));
        assert!(banner.contains(&format!("heightmap: {}", derived)));
    }

    #[test]
    fn test_banner_without_master_uses_noise_seed() {
        let args = args_with_seed(None);
        let config = build_config(&args).unwrap();
        assert_eq!(
            seed_banner(None, &config),
            format!("Generating terrain with seed: {}", config.noise.seed)
        );
    }
}
