//! Loads settings and runs the offline mixer simulation.

use std::time::Duration;

use clap::ArgMatches;
use log::{debug, info};
use serde_json::json;

use stemmix_lib::error::MixError;
use stemmix_lib::mixer::Mixer;
use stemmix_lib::output::{Clip, ClipLibrary, MemoryBackend, MemoryMaster};
use stemmix_lib::settings::MixerSettings;

const TONE_BASE_HZ: f32 = 220.0;
const TONE_STEP_HZ: f32 = 55.0;
const TONE_SECONDS: f32 = 1.0;
const TONE_SAMPLE_RATE: u32 = 8_000;

/// Execute the CLI request and return the process exit code.
pub fn run(args: &ArgMatches) -> Result<i32, MixError> {
    let path = args
        .get_one::<String>("settings")
        .ok_or_else(|| MixError::Settings("missing settings path".to_string()))?;
    let settings = MixerSettings::from_json_file(path)?;

    if args.get_flag("list") {
        print_summary(&settings);
        return Ok(0);
    }

    let ticks = parse_arg::<u32>(args, "ticks")?;
    let dt_ms = parse_arg::<u64>(args, "dt-ms")?;
    let next_every = match args.get_one::<String>("next-track-every") {
        Some(raw) => Some(parse_value::<u32>("next-track-every", raw)?),
        None => None,
    };
    let toggles = parse_toggles(args)?;

    let clips = tone_library(&settings);
    let mut backend = MemoryBackend::new();
    let master = MemoryMaster::new();
    let mut mixer = Mixer::new(&settings, Box::new(master.clone()))?;
    mixer.initialize(&clips, &mut backend);

    let dt = Duration::from_millis(dt_ms);
    for frame in 0..ticks {
        if let Some(every) = next_every {
            if every > 0 && frame > 0 && frame % every == 0 {
                mixer.next_track()?;
            }
        }
        for (at, layer) in &toggles {
            if *at == frame {
                debug!("frame {}: toggling layer {}", frame, layer);
                mixer.toggle_layer(*layer, None, None, None)?;
            }
        }
        mixer.tick(dt);
    }

    info!(
        "simulated {} frames of {} ms across {} tracks",
        ticks,
        dt_ms,
        mixer.tracks().len()
    );

    if args.get_flag("json") {
        print_json(&mixer, &master);
    } else {
        print_volumes(&mixer);
    }

    Ok(0)
}

/// Synthesize one tone clip per distinct clip name in the settings, so a mix
/// can be simulated without any decoded assets.
fn tone_library(settings: &MixerSettings) -> ClipLibrary {
    let mut names: Vec<&str> = Vec::new();
    for track in &settings.tracks {
        for layer in &track.layers {
            if !names.contains(&layer.clip.as_str()) {
                names.push(&layer.clip);
            }
        }
    }

    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            Clip::sine(
                *name,
                TONE_BASE_HZ + TONE_STEP_HZ * index as f32,
                TONE_SECONDS,
                TONE_SAMPLE_RATE,
            )
        })
        .collect()
}

fn print_summary(settings: &MixerSettings) {
    println!(
        "{} tracks (start index {})",
        settings.tracks.len(),
        settings.start_index
    );
    for (track_index, track) in settings.tracks.iter().enumerate() {
        println!(
            "track {} {:?}: volume {} rate {}",
            track_index, track.name, track.track_volume, track.track_rate
        );
        for (layer_index, layer) in track.layers.iter().enumerate() {
            println!(
                "  layer {} {:?}: clip {:?} volume {} rate {}",
                layer_index, layer.name, layer.clip, layer.volume, layer.rate
            );
        }
    }
}

fn print_volumes(mixer: &Mixer) {
    println!(
        "active track {} (previous {})",
        mixer.active_index(),
        mixer.previous_index()
    );
    for (track_index, track) in mixer.tracks().iter().enumerate() {
        for (layer_index, layer) in track.layers().iter().enumerate() {
            let volume = layer
                .handle_volume()
                .map(|volume| format!("{:.3}", volume))
                .unwrap_or_else(|| "unbound".to_string());
            println!(
                "track {} layer {} {:?}: {}",
                track_index, layer_index, layer.name(), volume
            );
        }
    }
}

fn print_json(mixer: &Mixer, master: &MemoryMaster) {
    let tracks: Vec<_> = mixer
        .tracks()
        .iter()
        .map(|track| {
            let layers: Vec<_> = track
                .layers()
                .iter()
                .map(|layer| {
                    json!({
                        "name": layer.name(),
                        "volume": layer.volume(),
                        "handle_volume": layer.handle_volume(),
                    })
                })
                .collect();
            json!({ "name": track.name(), "layers": layers })
        })
        .collect();

    let report = json!({
        "active_index": mixer.active_index(),
        "previous_index": mixer.previous_index(),
        "master_volume": master.volume(),
        "music_volume": mixer.music_volume(),
        "tracks": tracks,
    });
    println!("{}", report);
}

/// Parse every `--toggle FRAME:LAYER` occurrence into a toggle schedule.
fn parse_toggles(args: &ArgMatches) -> Result<Vec<(u32, usize)>, MixError> {
    let mut toggles = Vec::new();
    if let Some(values) = args.get_many::<String>("toggle") {
        for raw in values {
            let (frame, layer) = raw.split_once(':').ok_or_else(|| {
                MixError::Settings(format!(
                    "invalid value {:?} for --toggle, expected FRAME:LAYER",
                    raw
                ))
            })?;
            toggles.push((
                parse_value::<u32>("toggle", frame)?,
                parse_value::<usize>("toggle", layer)?,
            ));
        }
    }
    Ok(toggles)
}

fn parse_arg<T: std::str::FromStr>(args: &ArgMatches, name: &str) -> Result<T, MixError> {
    let raw = args
        .get_one::<String>(name)
        .ok_or_else(|| MixError::Settings(format!("missing value for --{}", name)))?;
    parse_value(name, raw)
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, MixError> {
    raw.parse()
        .map_err(|_| MixError::Settings(format!("invalid value {:?} for --{}", raw, name)))
}
