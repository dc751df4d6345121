//! blockdsp - live block filter between the default input and output devices
//!
//! Run with: cargo run -- [preset] [knob=value ...]
//!
//! Presets: average, eq (default), echo, flanger.
//! While running, type `<knob> <value>` (for example `bass 8`), `reset`,
//! `help` or `quit`.

mod app;

use app::LiveRunner;
use blockdsp::{params::KnobId, Preset};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut args = std::env::args().skip(1);
    let preset = match args.next() {
        Some(name) => Preset::from_name(&name).ok_or_else(|| {
            eyre!("unknown preset '{}' (average, eq, echo, flanger)", name)
        })?,
        None => Preset::default(),
    };

    let mut runner = LiveRunner::new(preset);
    for arg in args {
        let (knob, value) = parse_setting(&arg)?;
        runner = runner.knob(knob, value);
    }
    runner.run()
}

fn parse_setting(arg: &str) -> EyreResult<(KnobId, i32)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| eyre!("expected knob=value, got '{}'", arg))?;
    let knob = KnobId::from_name(name).ok_or_else(|| eyre!("unknown knob '{}'", name))?;
    let value = value
        .parse()
        .wrap_err_with(|| format!("invalid value for {}", knob))?;
    Ok((knob, value))
}
