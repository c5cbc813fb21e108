//! Profiling tool to see where pipeline time goes

use std::time::Instant;

use pseudo_erosion::erosion::{self, PipelineParams};

fn main() {
    let params = PipelineParams::default();

    println!("=== Performance Profiling ===");
    println!(
        "Image: {}x{}, grid {}, feature size {}",
        params.image_size, params.image_size, params.grid_size, params.feature_size
    );
    println!("Threads: {}", rayon::current_num_threads());
    println!();

    let start = Instant::now();
    let output = match erosion::generate_with_stages(&params, None) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            std::process::exit(1);
        }
    };
    let total = start.elapsed();

    let stage_total: f64 = output.stats.iter().map(|s| s.elapsed.as_secs_f64()).sum();
    let composite_time = total.as_secs_f64() - stage_total;

    println!("=== Summary ===");
    for stats in &output.stats {
        println!(
            "Stage {} (density {:>4}): {:>8.2}% ({:?}, {} sinks)",
            stats.stage,
            stats.density,
            100.0 * stats.elapsed.as_secs_f64() / total.as_secs_f64(),
            stats.elapsed,
            stats.sinks
        );
    }
    println!(
        "Compositing:           {:>8.2}% ({:.3}s)",
        100.0 * composite_time / total.as_secs_f64(),
        composite_time
    );
    println!("─────────────────────────────────");
    println!("TOTAL:                 {:>8}  {:?}", "100%", total);
}
