//! Line-oriented command console driving a running engine.
//!
//! Each line is one command. Lines that fail to parse, or commands the
//! engine rejects, are logged and skipped; the engine keeps its previous
//! state.

use crate::scenario::{default_electrode, spawn};
use depsim_core::{ElectrodeKind, MediumKind, ParticleKind, SimulationEngine, Vector};
use log::{info, warn};
use rand::Rng;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

/// One console command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Reset,
    Step,
    Add(ParticleKind),
    Medium(MediumKind),
    Electrode(ElectrodeKind),
    Frequency(f64),
    Voltage(f64),
    Faster,
    Slower,
    Low(Vector),
    High(Vector),
    Status,
    List,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  play | pause | stop | reset | step
  add <particle>            yeast, polystyrene-1um, test-particle
  medium <medium>           water, distilled-water, deionized-water
  electrode <electrode>     point-charge, dipole, quadrupole
  frequency <hz>
  voltage <volts>
  faster | slower
  low <x> <y> <z>
  high <x> <y> <z>
  status | list | help | quit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or("empty command")?;
        let args: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "reset" => Command::Reset,
            "step" => Command::Step,
            "faster" => Command::Faster,
            "slower" => Command::Slower,
            "status" => Command::Status,
            "list" => Command::List,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "add" => Command::Add(single(verb, &args)?.parse()?),
            "medium" => Command::Medium(single(verb, &args)?.parse()?),
            "electrode" => Command::Electrode(single(verb, &args)?.parse()?),
            "frequency" => Command::Frequency(number(single(verb, &args)?)?),
            "voltage" => Command::Voltage(number(single(verb, &args)?)?),
            "low" => Command::Low(vector(verb, &args)?),
            "high" => Command::High(vector(verb, &args)?),
            other => return Err(format!("unknown command '{}'", other)),
        };

        let expected = match command {
            Command::Add(_)
            | Command::Medium(_)
            | Command::Electrode(_)
            | Command::Frequency(_)
            | Command::Voltage(_) => 1,
            Command::Low(_) | Command::High(_) => 3,
            _ => 0,
        };
        if args.len() != expected {
            return Err(format!("'{}' takes {} arguments, got {}", verb, expected, args.len()));
        }
        Ok(command)
    }
}

fn single<'a>(verb: &str, args: &[&'a str]) -> Result<&'a str, String> {
    args.first()
        .copied()
        .ok_or_else(|| format!("'{}' needs an argument", verb))
}

fn number(text: &str) -> Result<f64, String> {
    text.parse()
        .map_err(|_| format!("'{}' is not a number", text))
}

fn vector(verb: &str, args: &[&str]) -> Result<Vector, String> {
    match args {
        [x, y, z] => Ok(Vector::new(number(x)?, number(y)?, number(z)?)),
        _ => Err(format!("'{}' needs three coordinates", verb)),
    }
}

/// Whether the console should keep reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Console state around an engine
pub struct Console<'a, R> {
    engine: &'a SimulationEngine,
    rng: R,
    /// Last accepted voltage, reapplied when the electrode changes
    voltage: Option<f64>,
}

impl<'a, R: Rng> Console<'a, R> {
    pub fn new(engine: &'a SimulationEngine, rng: R) -> Self {
        Self {
            engine,
            rng,
            voltage: None,
        }
    }

    /// Parse and execute one line, writing any report to `out`
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match Command::parse(line) {
            Ok(command) => self.execute(command, out),
            Err(message) => {
                warn!("{}", message);
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        let engine = self.engine;
        let outcome = match command {
            Command::Play => engine.play(),
            Command::Pause => {
                engine.pause();
                Ok(())
            }
            Command::Stop => {
                engine.stop();
                Ok(())
            }
            Command::Reset => {
                engine.reset();
                Ok(())
            }
            Command::Step => engine.step_once(),
            Command::Add(kind) => engine.add_particle(spawn(kind, &mut self.rng)).map(|index| {
                info!("added {} as particle {}", kind, index);
            }),
            Command::Medium(kind) => {
                let level = engine.medium().level();
                engine.set_medium(depsim_core::Medium::from_kind(kind).with_level(level))
            }
            Command::Electrode(kind) => self.switch_electrode(kind),
            Command::Frequency(frequency) => engine.set_frequency(frequency),
            Command::Voltage(voltage) => engine.set_voltage(voltage).map(|()| {
                self.voltage = Some(voltage);
            }),
            Command::Faster => {
                writeln!(out, "speed {}x", engine.faster())?;
                Ok(())
            }
            Command::Slower => {
                writeln!(out, "speed {}x", engine.slower())?;
                Ok(())
            }
            Command::Low(low) => engine.set_low_bounds(low),
            Command::High(high) => engine.set_high_bounds(high),
            Command::Status => {
                out.write_all(status(engine).as_bytes())?;
                Ok(())
            }
            Command::List => {
                out.write_all(particle_table(engine).as_bytes())?;
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                Ok(())
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        if let Err(error) = outcome {
            warn!("{:?} rejected: {}", command, error);
        }
        Ok(Flow::Continue)
    }

    /// Install a fresh electrode already driven at the last voltage, in a
    /// single swap. A geometry that cannot take the voltage is installed
    /// uncharged and the error is reported.
    fn switch_electrode(&mut self, kind: ElectrodeKind) -> depsim_core::Result<()> {
        let mut electrode = default_electrode(kind, &self.engine.bounds())?;
        let charged = match self.voltage {
            Some(voltage) => electrode.set_voltage(voltage),
            None => Ok(()),
        };
        self.engine.set_electrode(electrode);
        charged
    }

    /// Read commands from `input` until it ends or `quit` is entered
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        for line in input.lines() {
            if self.handle_line(&line?, out)? == Flow::Quit {
                break;
            }
            out.flush()?;
        }
        Ok(())
    }
}

/// Multi-line engine summary
pub fn status(engine: &SimulationEngine) -> String {
    let medium = engine.medium();
    let mut text = String::new();
    let _ = writeln!(text, "state      {:?}", engine.run_state());
    let _ = writeln!(text, "particles  {}", engine.particle_count());
    let _ = writeln!(text, "ticks      {}", engine.ticks());
    let _ = writeln!(text, "speed      {}x (dt {} s)", engine.speed_multiplier(), engine.delta_time());
    let _ = writeln!(text, "frequency  {} Hz", engine.frequency());
    let _ = writeln!(text, "electrode  {}", engine.electrode().kind());
    let _ = writeln!(
        text,
        "medium     εr {} σ {} S/m level {} m",
        medium.permittivity(),
        medium.conductivity(),
        medium.level()
    );
    let _ = writeln!(text, "bounds     {} .. {}", engine.low_bounds(), engine.high_bounds());
    if let Some(exit) = engine.stepper_exit() {
        let _ = writeln!(text, "stepper    {:?}", exit);
    }
    text
}

/// One line per particle: index, species, position, speed, Re[fCM]
pub fn particle_table(engine: &SimulationEngine) -> String {
    let mut text = String::new();
    for (index, particle) in engine.particles().iter().enumerate() {
        let _ = writeln!(
            text,
            "{:>3} {:<16} {} v={:.3e} m/s fcm={:.4}",
            index,
            particle.kind(),
            particle.position(),
            particle.velocity(),
            particle.fcm_real()
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsim_core::config::DEFAULT_BOUND;
    use depsim_core::{Electrode, EngineConfig, RunState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn engine() -> SimulationEngine {
        SimulationEngine::new(EngineConfig::default().with_tick_interval(Duration::from_millis(1)))
            .unwrap()
    }

    fn console(engine: &SimulationEngine) -> Console<'_, StdRng> {
        Console::new(engine, StdRng::seed_from_u64(1))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("play"), Ok(Command::Play));
        assert_eq!(Command::parse("  QUIT "), Ok(Command::Quit));
        assert_eq!(Command::parse("add yeast"), Ok(Command::Add(ParticleKind::Yeast)));
        assert_eq!(
            Command::parse("medium distilled-water"),
            Ok(Command::Medium(MediumKind::DistilledWater))
        );
        assert_eq!(
            Command::parse("electrode quadrupole"),
            Ok(Command::Electrode(ElectrodeKind::Quadrupole))
        );
        assert_eq!(Command::parse("frequency 2.5e3"), Ok(Command::Frequency(2500.0)));
        assert_eq!(
            Command::parse("high 1 2 3"),
            Ok(Command::High(Vector::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("jump").is_err());
        assert!(Command::parse("add").is_err());
        assert!(Command::parse("add bacteria").is_err());
        assert!(Command::parse("frequency fast").is_err());
        assert!(Command::parse("low 1 2").is_err());
        assert!(Command::parse("play now").is_err());
    }

    #[test]
    fn bad_input_leaves_engine_unchanged() {
        let engine = engine();
        let mut console = console(&engine);
        let mut out = Vec::new();

        for line in ["frequency abc", "frequency -5", "medium mud", "high 1 -1 1"] {
            assert_eq!(console.handle_line(line, &mut out).unwrap(), Flow::Continue);
        }

        assert_eq!(engine.frequency(), 1000.0);
        assert_eq!(engine.medium(), EngineConfig::default().medium);
        assert_eq!(engine.high_bounds(), Vector::splat(DEFAULT_BOUND));
    }

    #[test]
    fn script_drives_transport() {
        let engine = engine();
        let mut console = console(&engine);
        let script = "add yeast\nadd test-particle\nplay\nfaster\npause\nstatus\nquit\nplay\n";
        let mut out = Vec::new();

        console.run(script.as_bytes(), &mut out).unwrap();

        assert_eq!(engine.particle_count(), 2);
        assert_eq!(engine.run_state(), RunState::Paused);
        assert_eq!(engine.speed_multiplier(), 2.0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("speed 2x"));
        assert!(text.contains("particles  2"));
    }

    #[test]
    fn electrode_switch_keeps_voltage() {
        let engine = engine();
        let mut console = console(&engine);
        let mut out = Vec::new();

        console.handle_line("voltage 10", &mut out).unwrap();
        console.handle_line("electrode point-charge", &mut out).unwrap();

        match engine.electrode() {
            Electrode::PointCharge(charge) => assert!(charge.charge() > 0.0),
            other => panic!("expected a point charge, got {:?}", other),
        }
    }

    #[test]
    fn electrode_switch_installs_charged_electrode() {
        let engine = engine();
        let mut console = console(&engine);
        let mut out = Vec::new();

        console.handle_line("voltage 10", &mut out).unwrap();
        console.handle_line("electrode dipole", &mut out).unwrap();

        let mut expected = default_electrode(ElectrodeKind::Dipole, &engine.bounds()).unwrap();
        expected.set_voltage(10.0).unwrap();
        assert_eq!(engine.electrode(), expected);
    }

    #[test]
    fn quadrupole_switch_reports_unsupported_voltage() {
        let engine = engine();
        let mut console = console(&engine);
        let mut out = Vec::new();

        console.handle_line("voltage 10", &mut out).unwrap();
        console.handle_line("electrode quadrupole", &mut out).unwrap();

        // The geometry changes even though the voltage cannot follow
        assert_eq!(engine.electrode().kind(), ElectrodeKind::Quadrupole);
    }
}
