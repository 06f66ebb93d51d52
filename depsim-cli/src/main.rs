mod console;
mod scenario;
mod sweep;

use clap::{Parser, Subcommand};
use console::{particle_table, status, Console};
use depsim_core::{ElectrodeKind, MediumKind, ParticleKind, StepperExit};
use log::info;
use scenario::ScenarioConfig;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "depsim")]
#[command(about = "depsim - dielectrophoresis particle simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario for a while and print where the particles ended up
    Run {
        /// Scenario YAML file; defaults are used when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Wall-clock seconds to play for
        #[arg(long, default_value_t = 2.0)]
        seconds: f64,
        /// Extra particles to add, by species name (repeatable)
        #[arg(short, long = "particle")]
        particles: Vec<ParticleKind>,
        /// Seed for particle sizes, overriding the scenario's
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Drive an engine interactively from stdin
    Console {
        /// Scenario YAML file; defaults are used when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
    /// List the particle, medium and electrode names
    Species,
    /// Print a species' Clausius-Mossotti factor at each frequency decade
    Fcm {
        /// Particle species
        particle: ParticleKind,
        /// Suspending medium
        #[arg(default_value = "deionized-water")]
        medium: MediumKind,
        /// Exponent of the first frequency, 10^FROM Hz
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        from: i32,
        /// Number of decades to print
        #[arg(long, default_value_t = 10)]
        decades: u32,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            seconds,
            particles,
            seed,
        } => run(scenario, seconds, &particles, seed),
        Commands::Console { scenario } => run_console(scenario),
        Commands::Species => {
            list_species();
            Ok(())
        }
        Commands::Fcm {
            particle,
            medium,
            from,
            decades,
        } => print_fcm(particle, medium, from, decades),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    scenario: Option<PathBuf>,
    seconds: f64,
    particles: &[ParticleKind],
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ScenarioConfig::load_or_default(scenario.as_deref())?;
    if seed.is_some() {
        config.seed = seed;
    }
    let duration = Duration::try_from_secs_f64(seconds)?;

    let engine = config.build_engine(particles)?;
    engine.play()?;
    info!("playing for {:?}", duration);
    std::thread::sleep(duration);
    engine.pause();

    print!("{}", status(&engine));
    print!("{}", particle_table(&engine));

    let exit = engine.stepper_exit();
    engine.shutdown();
    match exit {
        Some(StepperExit::Failed(error)) => Err(error.into()),
        _ => Ok(()),
    }
}

fn run_console(scenario: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ScenarioConfig::load_or_default(scenario.as_deref())?;
    let engine = config.build_engine(&[])?;
    let mut console = Console::new(&engine, config.rng());

    println!("depsim console, type 'help' for commands");
    console.run(io::stdin().lock(), &mut io::stdout())?;
    engine.shutdown();
    Ok(())
}

fn list_species() {
    println!("particles:");
    for kind in ParticleKind::ALL {
        let species = kind.constants();
        println!(
            "  {:<16} mass {:.3e} kg  radius {:.3e} m  εr {}  σ {} S/m",
            kind, species.mass, species.radius, species.permittivity, species.conductivity
        );
    }
    println!("media:");
    for kind in MediumKind::ALL {
        let medium = kind.constants();
        println!(
            "  {:<16} εr {}  σ {} S/m  ρ {} kg/m³",
            kind, medium.permittivity, medium.conductivity, medium.density
        );
    }
    println!("electrodes:");
    for kind in ElectrodeKind::ALL {
        println!("  {}", kind);
    }
}

fn print_fcm(
    particle: ParticleKind,
    medium: MediumKind,
    from: i32,
    decades: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} in {}", particle, medium);
    println!("{:>12}  {:>12}  {:>12}", "Hz", "Re fCM", "Im fCM");
    for sample in sweep::fcm_sweep(particle, medium, from, decades)? {
        println!(
            "{:>12.3e}  {:>12.6}  {:>12.6}",
            sample.frequency, sample.real, sample.imag
        );
    }
    Ok(())
}
