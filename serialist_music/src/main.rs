// Serialist note generator: CLI entry point.
//
// Runs one batch for a single voice through the same `Engine` a transport
// would drive, then prints each event as a JSON line on stdout. Useful for
// auditioning parameter settings and for eyeballing the dissonance bands.
// Logs go to stderr, filtered by RUST_LOG.
//
// Usage:
//   cargo run -p serialist_music --bin generate -- [--ticks N] [--seed N]
//     [--dissonance D] [--complexity C] [--chord P] [--rest P]
//     [--range LO HI] [--tempo BPM] [--config PATH] [--midi PATH]
//
// `--rest P` enables rests with probability P percent; without it the voice
// never rests.

use serialist_music::midi::write_midi;
use serialist_music::{Engine, EngineConfig, RawGlobalParams, RawVoiceParams, SessionId, VoiceId};
use serialist_prng::SerialRng;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let ticks: usize = parse_flag(&args, "--ticks").unwrap_or(16);
    let seed: Option<u64> = parse_flag(&args, "--seed");
    let dissonance: f64 = parse_flag(&args, "--dissonance").unwrap_or(0.5);
    let complexity: f64 = parse_flag(&args, "--complexity").unwrap_or(50.0);
    let chord: f64 = parse_flag(&args, "--chord").unwrap_or(20.0);
    let rest: Option<f64> = parse_flag(&args, "--rest");
    let (lower, upper) = parse_range(&args).unwrap_or((48.0, 84.0));
    let tempo: f64 = parse_flag(&args, "--tempo").unwrap_or(120.0);
    let config_path: Option<String> = parse_flag(&args, "--config");
    let midi_path: Option<String> = parse_flag(&args, "--midi");

    let config = match config_path {
        Some(path) => match EngineConfig::load(Path::new(&path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let rng = match seed {
        Some(s) => SerialRng::new(s),
        None => SerialRng::from_time(),
    };
    let mut engine = match Engine::with_rng(config, rng) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Invalid config: {e}");
            std::process::exit(1);
        }
    };

    let params = RawVoiceParams {
        duration: Some(complexity),
        velocity: Some(0.7),
        velocity_variation: Some(10.0),
        rest: Some(rest.is_some()),
        rest_probability: Some(rest.unwrap_or(0.0)),
        range_lower: Some(lower),
        range_upper: Some(upper),
        chord_probability: Some(chord),
        tempo: Some(tempo),
    };
    let global = RawGlobalParams {
        dissonance_level: Some(dissonance),
        tempo_factor: None,
        volume_factor: None,
    };

    let session = SessionId::from("cli");
    let events = match engine.generate_next_notes(&session, VoiceId(0), &params, &global, ticks)
    {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Invalid parameters: {e}");
            std::process::exit(2);
        }
    };

    for event in &events {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("Failed to encode event: {e}");
                std::process::exit(1);
            }
        }
    }

    if let Some(path) = midi_path {
        if let Err(e) = write_midi(&events, 0, Path::new(&path)) {
            eprintln!("Error writing MIDI: {e}");
            std::process::exit(1);
        }
        eprintln!("Wrote {} events to {path}", events.len());
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

/// `--range LO HI` takes two values, so it can't go through `parse_flag`.
fn parse_range(args: &[String]) -> Option<(f64, f64)> {
    let i = args.iter().position(|a| a == "--range")?;
    let lo = args.get(i + 1)?.parse().ok()?;
    let hi = args.get(i + 2)?.parse().ok()?;
    Some((lo, hi))
}
