use std::path::{Path, PathBuf};

use clap::Parser;
use plotters::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_orrery::astro::orbit::OrbitSample;
use rust_orrery::config::SamplingConfig;
use rust_orrery::consts::J2000;
use rust_orrery::file::{read_system, ResourceCache};
use rust_orrery::math::geometry::from_internal;

/// Draws a body's path around its parent, as seen from ecliptic north.
#[derive(Debug, Parser)]
struct Args {
    /// Body to plot
    name: String,
    /// System table to load
    #[arg(short, long, default_value = "data/solar-system.txt")]
    system: PathBuf,
    /// TDB Julian date to start from
    #[arg(long, default_value_t = J2000)]
    start: f64,
    /// Days to cover; one orbital period if omitted
    #[arg(long)]
    days: Option<f64>,
    /// Maximum midpoint error of the sampled path, km
    #[arg(long, default_value_t = 1.0)]
    tolerance: f64,
    #[arg(short, long, default_value = "orbit.png")]
    output: PathBuf,
    /// Image width and height, pixels
    #[arg(long, default_value_t = 800)]
    size: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut cache = ResourceCache::new();
    let orrery = read_system(&args.system, &mut cache)?;
    let id = orrery
        .find(&args.name)
        .body()
        .ok_or_else(|| format!("no body named {}", args.name))?;

    let orbit = orrery.body(id).orbit(args.start);
    let end = args.start + args.days.unwrap_or_else(|| orbit.period());
    let config = SamplingConfig {
        tolerance: args.tolerance,
        ..SamplingConfig::default()
    };

    let mut samples: Vec<OrbitSample> = vec![];
    orbit.sample_with_config(args.start, end, &mut samples, &config);
    info!("Sampled {} points for {}", samples.len(), args.name);

    // Ecliptic x and y
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| from_internal(&s.position))
        .map(|p| (p.x, p.y))
        .collect();
    draw_plot(&args.output, &points, args.size)?;
    Ok(())
}

fn draw_plot(
    path: &Path,
    points: &[(f64, f64)],
    size: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let extent = points
        .iter()
        .map(|(x, y)| x.abs().max(y.abs()))
        .fold(0.0, f64::max)
        * 1.1;
    let extent = if extent > 0.0 { extent } else { 1.0 };

    let root = BitMapBackend::new(path, (size, size)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-extent..extent, -extent..extent)?;

    chart.configure_mesh().draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &RED))?;
    chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), 4, BLUE.filled())))?;

    root.present()?;
    Ok(())
}
