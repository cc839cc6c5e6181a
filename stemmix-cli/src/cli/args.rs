//! CLI argument definitions for `stemmix-cli`.

use clap::{Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    // Build the CLI definition in one place to keep main.rs slim.
    Command::new("Stemmix")
        .version("0.1.0")
        .about("Simulate layered music mixes from a settings file")
        .arg_required_else_help(true)
        .arg(
            Arg::new("settings")
                .value_name("SETTINGS")
                .required(true)
                .help("Path to a JSON mixer settings file"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .action(ArgAction::SetTrue)
                .help("Print the parsed track and layer summary, then exit"),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .short('t')
                .value_name("COUNT")
                .default_value("120")
                .help("Number of simulation frames to run"),
        )
        .arg(
            Arg::new("dt-ms")
                .long("dt-ms")
                .value_name("MS")
                .default_value("16")
                .help("Elapsed milliseconds per simulated frame"),
        )
        .arg(
            Arg::new("next-track-every")
                .long("next-track-every")
                .value_name("FRAMES")
                .help("Advance to the next track every N frames"),
        )
        .arg(
            Arg::new("toggle")
                .long("toggle")
                .value_name("FRAME:LAYER")
                .action(ArgAction::Append)
                .help("Toggle layer LAYER of the active track at frame FRAME (repeatable)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Emit the final layer volumes as JSON"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .action(ArgAction::SetTrue)
                .help("Show debug output"),
        )
}
