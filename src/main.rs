use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use worldmap_generator::{export, persistence, GenerationError, GeneratorConfig, WorldGenerator, WorldMap};

#[derive(Parser, Debug)]
#[command(name = "worldmap_generator")]
#[command(about = "Generate themed procedural world maps with rivers, settlements and trade routes")]
struct Args {
    /// Width of the map in cells
    #[arg(short = 'W', long, default_value = "2000")]
    width: usize,

    /// Height of the map in cells
    #[arg(short = 'H', long, default_value = "1500")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// World theme: medieval, fantasy, scifi or steampunk
    #[arg(short, long, default_value = "medieval")]
    theme: String,

    /// Generator configuration file (JSON, missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the default configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Save the generated world to a JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a world from a JSON save instead of generating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Export the biome map with features to a PNG
    #[arg(long)]
    export_png: Option<PathBuf>,

    /// Export the elevation field to a PNG
    #[arg(long)]
    export_elevation: Option<PathBuf>,

    /// Number of themed rumours to print
    #[arg(long, default_value = "3")]
    rumors: usize,

    /// Log filter (e.g. "debug"); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

/// Install the console subscriber. An explicit level wins over RUST_LOG,
/// which wins over the `info` default.
fn init_logging(level: Option<&str>) {
    let env_filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

fn run(args: &Args) -> Result<(), GenerationError> {
    if args.dump_config {
        println!("{}", GeneratorConfig::default().to_json()?);
        return Ok(());
    }

    let world: WorldMap = match &args.load {
        Some(path) => persistence::load_world(path)?,
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            let mut generator = WorldGenerator::new(args.width, args.height, seed, &args.theme)?;
            if let Some(path) = &args.config {
                generator = generator.with_config(GeneratorConfig::load(path)?)?;
            }
            generator.generate()
        }
    };

    println!(
        "{} {} world, seed {} ({}x{})",
        world.theme.icon(),
        world.theme.display_name(),
        world.seed(),
        world.width,
        world.height
    );
    println!("{}", world.theme.description());
    println!();
    println!("{}", world.summary());
    println!();

    println!("Biomes:");
    let total = (world.width * world.height) as f64;
    for (biome, count) in world.biome_histogram() {
        if count > 0 {
            println!("  {:<16} {:>6.2}%", biome.name(), 100.0 * count as f64 / total);
        }
    }

    if let Some(capital) = world
        .features
        .cities
        .iter()
        .max_by(|a, b| a.population.total_cmp(&b.population))
    {
        println!();
        println!(
            "Largest city: {} ({:.0} people, {}), {}",
            capital.name, capital.population, capital.specialty, capital.biome
        );
    }

    if args.rumors > 0 {
        println!();
        println!("Rumours:");
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.names);
        for _ in 0..args.rumors {
            let event = world.theme.random_event(&mut rng);
            println!("  [{}] {}", event.category, event.name);
        }
    }

    if let Some(path) = &args.save {
        persistence::save_world(&world, path)?;
        println!("Saved world to {}", path.display());
    }
    if let Some(path) = &args.export_png {
        export::export_biome_png(&world, path)?;
        println!("Exported map to {}", path.display());
    }
    if let Some(path) = &args.export_elevation {
        export::export_elevation_png(&world.elevation, path)?;
        println!("Exported elevation to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
