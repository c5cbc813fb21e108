use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pseudo_erosion::erosion::{self, JitterMode, PipelineParams};
use pseudo_erosion::{export, Result};

#[derive(Parser, Debug)]
#[command(name = "pseudo-erosion")]
#[command(about = "Generate an eroded-looking grayscale heightmap from coherent noise")]
struct Args {
    /// Pixels per unit of noise space (larger = coarser features)
    #[arg(long = "featuresize", default_value = "64")]
    feature_size: usize,

    /// Lattice cells per side for the coarsest stage
    #[arg(long = "gridsize", default_value = "30")]
    grid_size: usize,

    /// Output width and height in pixels
    #[arg(long = "size", default_value = "1024")]
    size: usize,

    /// Noise seed
    #[arg(long, default_value = "123456")]
    seed: u64,

    /// Output PNG path
    #[arg(long = "outputfile", default_value = "output.png")]
    output_file: PathBuf,

    /// Use this image as the first stage instead of generating one
    #[arg(long)]
    input: Option<PathBuf>,

    /// Site jitter strategy for the first stage
    #[arg(long, value_enum, default_value_t = JitterMode::Noise)]
    jitter: JitterMode,

    /// Write only the raw noise field, skipping erosion
    #[arg(long = "noise-only")]
    noise_only: bool,

    /// Also write each stage as <PREFIX>_stage<N>.png
    #[arg(long)]
    stages: Option<String>,
}

fn main() {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("pseudo-erosion: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let params = PipelineParams {
        image_size: args.size,
        feature_size: args.feature_size,
        grid_size: args.grid_size,
        seed: args.seed,
        jitter: args.jitter,
    };

    if args.noise_only {
        let image = erosion::generate_noise_image(&params)?;
        println!(
            "pseudo-erosion: Generating {} x {} noise image '{}'",
            params.image_size,
            params.image_size,
            args.output_file.display()
        );
        return export::save_height_image(&image, &args.output_file);
    }

    params.validate()?;

    // Load the input before any generation so a bad file fails fast.
    let input = match &args.input {
        Some(path) => {
            println!("pseudo-erosion: Reading input image '{}'", path.display());
            Some(export::load_input_image(path, params.image_size)?)
        }
        None => None,
    };

    println!(
        "pseudo-erosion: Generating {} x {} heightmap image '{}'",
        params.image_size,
        params.image_size,
        args.output_file.display()
    );

    let output = erosion::generate_with_stages(&params, input)?;

    if let Some(prefix) = &args.stages {
        for (i, stage) in output.stages.iter().enumerate() {
            let path = format!("{}_stage{}.png", prefix, i + 1);
            export::save_height_image(stage, &path)?;
            println!("  Saved stage {}: {}", i + 1, path);
        }
    }

    export::save_height_image(&output.composite, &args.output_file)
}
