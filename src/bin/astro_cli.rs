use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use rust_orrery::astro::rotation::custom_rotation_names;
use rust_orrery::consts::J2000;
use rust_orrery::file::{read_system, ResourceCache};
use rust_orrery::frames::ReferenceFrame;
use rust_orrery::math::geometry::from_internal;
use rust_orrery::orrery::{Orrery, Selection};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FrameChoice {
    Ecliptic,
    Equator,
    Fixed,
}

/// Prints the state of a body at one instant.
#[derive(Debug, Parser)]
struct Args {
    /// System table to load
    #[arg(default_value = "data/solar-system.txt")]
    system: PathBuf,
    /// Body to report on
    #[arg(short, long)]
    name: Option<String>,
    /// TDB Julian date
    #[arg(short, long, default_value_t = J2000)]
    time: f64,
    /// Axes to report the state in, centered on the body's parent
    #[arg(short, long, value_enum, default_value_t = FrameChoice::Ecliptic)]
    frame: FrameChoice,
    /// List the built-in rotation models and exit
    #[arg(long)]
    list_rotations: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.list_rotations {
        for name in custom_rotation_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let mut cache = ResourceCache::new();
    let orrery = match read_system(&args.system, &mut cache) {
        Ok(orrery) => orrery,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    for body in orrery.bodies() {
        if let Some(name) = &args.name {
            if body.name().to_lowercase() != name.to_lowercase() {
                continue;
            }
        }
        print_body(&orrery, body.id(), args.time, args.frame);
    }

    ExitCode::SUCCESS
}

fn print_body(orrery: &Orrery, id: rust_orrery::orrery::BodyID, t: f64, choice: FrameChoice) {
    let body = orrery.body(id);
    let parent = body.orbit_frame(t).center();
    let frame = match choice {
        FrameChoice::Ecliptic => ReferenceFrame::j2000_ecliptic(parent),
        FrameChoice::Equator => ReferenceFrame::j2000_equator(parent),
        FrameChoice::Fixed => ReferenceFrame::body_fixed(parent, parent),
    };
    let (position, velocity) = frame.body_state(orrery, id, t);
    let orbit = body.orbit(t);
    let rotation = body.rotation_model(t);

    println!("State of {} at JD {}", body.name(), t);
    if let Selection::Body(parent) = parent {
        println!("- Parent: {}", orrery.body(parent).name());
    }
    println!("- Position (km): {:?}", from_internal(&position.coords));
    println!("- Velocity (km/day): {:?}", from_internal(&velocity));
    println!("- Distance (km): {}", position.coords.norm());
    println!("- Orbital period (days): {}", orbit.period());
    println!("- Bounding radius (km): {}", orbit.bounding_radius());
    if let Some(range) = orbit.valid_range() {
        println!("- Valid from JD {} to {}", range.lo(), range.hi());
    }
    if rotation.is_periodic() {
        println!("- Rotation period (days): {}", rotation.period());
    }
    println!(
        "- Angular velocity (rad/day): {:?}",
        from_internal(&orrery.body_angular_velocity(id, t))
    );
    println!();
}
