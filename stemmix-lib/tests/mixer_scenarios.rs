use std::time::Duration;

use stemmix_lib::mixer::Mixer;
use stemmix_lib::output::{Clip, ClipLibrary, MemoryBackend, MemoryMaster, PlayMode};
use stemmix_lib::settings::MixerSettings;

const FRAME: Duration = Duration::from_millis(16);

fn library(names: &[&str]) -> ClipLibrary {
    names
        .iter()
        .map(|name| Clip::sine(*name, 330.0, 0.2, 8_000))
        .collect()
}

#[test]
fn single_layer_reaches_full_volume_then_track_change_silences_it() {
    // Track 0 has one full-volume instant layer; track 1 is empty.
    let settings = MixerSettings::from_json_str(
        r#"{
            "tracks": [
                {"name": "a", "layers": [{"name": "only", "clip": "only", "volume": 1.0, "rate": 0.0}]},
                {"name": "b", "layers": []}
            ]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    mixer.initialize(&library(&["only"]), &mut backend);

    let state = backend.state(0).expect("layer handle");
    assert_eq!(state.mode, PlayMode::Loop);
    assert_eq!(state.volume, 0.0);
    assert!(state.playing);

    mixer.tick(FRAME);
    assert_eq!(backend.state(0).unwrap().volume, 1.0);

    mixer.change_track(1).expect("change track");
    assert_eq!(backend.state(0).unwrap().volume, 0.0);

    // The empty active track produces no further writes.
    let writes_before = backend.state(0).unwrap().volume_writes;
    mixer.tick(FRAME);
    mixer.tick(FRAME);
    assert_eq!(backend.handle_count(), 1);
    assert_eq!(backend.state(0).unwrap().volume_writes, writes_before);
}

#[test]
fn smoothed_layers_fade_in_over_multiple_frames() {
    let settings = MixerSettings::from_json_str(
        r#"{
            "tracks": [{
                "name": "calm",
                "track_rate": 2.0,
                "layers": [{"name": "pad", "clip": "pad", "volume": 1.0, "rate": 3.0}]
            }]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    mixer.initialize(&library(&["pad"]), &mut backend);

    mixer.tick(FRAME);
    let after_one = backend.state(0).unwrap().volume;
    assert!(after_one > 0.0 && after_one < 1.0);

    let mut last = after_one;
    for _ in 0..600 {
        mixer.tick(FRAME);
        let current = backend.state(0).unwrap().volume;
        assert!(current >= last && current <= 1.0);
        last = current;
    }
    assert!((last - 1.0).abs() < 1e-3);
}

#[test]
fn track_and_music_volumes_multiply_layer_targets() {
    let settings = MixerSettings::from_json_str(
        r#"{
            "music_volume": 0.5,
            "tracks": [{
                "name": "mixdown",
                "track_volume": 0.5,
                "layers": [{"name": "pad", "clip": "pad", "volume": 0.8, "rate": 0.0}]
            }]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    mixer.initialize(&library(&["pad"]), &mut backend);

    mixer.tick(FRAME);
    // 0.8 layer * 0.5 track * 0.5 music, scaled once more by music volume.
    let volume = backend.state(0).unwrap().volume;
    assert!((volume - 0.8 * 0.5 * 0.5 * 0.5).abs() < 1e-6);
}

#[test]
fn toggled_layers_join_and_leave_the_mix_across_ticks() {
    let settings = MixerSettings::from_json_str(
        r#"{
            "tracks": [{
                "name": "calm",
                "layers": [
                    {"name": "pad", "clip": "pad", "volume": 1.0, "rate": 0.0},
                    {"name": "drums", "clip": "drums", "volume": 0.0, "rate": 0.0}
                ]
            }]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    mixer.initialize(&library(&["pad", "drums"]), &mut backend);

    mixer.tick(FRAME);
    assert_eq!(backend.state(1).unwrap().volume, 0.0);

    mixer.toggle_layer(1, None, None, None).expect("enable");
    mixer.tick(FRAME);
    assert_eq!(backend.state(1).unwrap().volume, 1.0);

    mixer.toggle_layer(1, None, None, None).expect("disable");
    mixer.tick(FRAME);
    assert_eq!(backend.state(1).unwrap().volume, 0.0);
}

#[test]
fn tick_override_attenuates_the_whole_track() {
    let settings = MixerSettings::from_json_str(
        r#"{
            "tracks": [{
                "name": "calm",
                "layers": [{"name": "pad", "clip": "pad", "volume": 1.0, "rate": 0.0}]
            }]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    mixer.initialize(&library(&["pad"]), &mut backend);

    mixer.tick_with_override(FRAME, 0.25);
    assert!((backend.state(0).unwrap().volume - 0.25).abs() < 1e-6);

    mixer.tick(FRAME);
    assert_eq!(backend.state(0).unwrap().volume, 1.0);
}

#[test]
fn reinitialization_replaces_all_handles() {
    let settings = MixerSettings::from_json_str(
        r#"{
            "tracks": [{
                "name": "calm",
                "layers": [{"name": "pad", "clip": "pad", "volume": 1.0}]
            }]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    let clips = library(&["pad"]);

    mixer.initialize(&clips, &mut backend);
    mixer.initialize(&clips, &mut backend);

    // The first handle was stopped during teardown; the second is live.
    assert_eq!(backend.handle_count(), 2);
    assert_eq!(backend.state(0).unwrap().stop_calls, 2);
    assert!(!backend.state(0).unwrap().playing);
    assert!(backend.state(1).unwrap().playing);

    mixer.tick(FRAME);
    assert_eq!(backend.state(0).unwrap().volume, 0.0);
    assert_eq!(backend.state(1).unwrap().volume, 1.0);
}

#[test]
fn layers_with_unknown_clips_stay_unbound_and_silent() {
    let settings = MixerSettings::from_json_str(
        r#"{
            "tracks": [{
                "name": "calm",
                "layers": [
                    {"name": "pad", "clip": "pad", "volume": 1.0},
                    {"name": "ghost", "clip": "nope", "volume": 1.0}
                ]
            }]
        }"#,
    )
    .expect("parse settings");

    let mut backend = MemoryBackend::new();
    let mut mixer = Mixer::new(&settings, Box::new(MemoryMaster::new())).expect("build mixer");
    mixer.initialize(&library(&["pad"]), &mut backend);

    assert_eq!(backend.handle_count(), 1);
    assert!(mixer.tracks()[0].layers()[0].is_bound());
    assert!(!mixer.tracks()[0].layers()[1].is_bound());

    mixer.tick(FRAME);
    assert_eq!(backend.state(0).unwrap().volume, 1.0);
}

#[test]
fn start_index_past_the_tracks_is_rejected() {
    let settings = MixerSettings::from_json_str(
        r#"{"start_index": 3, "tracks": [{"name": "only", "layers": []}]}"#,
    )
    .expect("parse settings");

    assert!(Mixer::new(&settings, Box::new(MemoryMaster::new())).is_err());
}
