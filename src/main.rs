#![warn(trivial_numeric_casts)]

mod config;
mod decoder;
mod display;
mod harness;
mod macros;
mod signal;

use std::env;

use config::Options;
use decoder::Decoder;
use display::{NullDisplay, SdlDisplay};
use eyre::Result;
use harness::Harness;
use log::info;
use signal::generator::VgaGenerator;
use signal::timing::VideoTiming;
use signal::SignalSource;

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help") {
        println!("{}", config::USAGE);
        return Ok(());
    }

    let options = Options::from_args(args.get(1..).unwrap_or_default())?;
    let timing = VideoTiming::VGA_640X480;
    let config = options.config(&timing);
    let decoder = Decoder::new(config)?;

    let mut source = VgaGenerator::new(timing, options.pattern, config.depth);
    source.reset();

    info!(
        "Decoding {:?} pattern into {}x{}, offsets ({}, {}), {}-bit color, {} clocks per frame",
        options.pattern,
        config.width,
        config.height,
        config.offset_x,
        config.offset_y,
        config.depth,
        timing.clocks_per_frame()
    );

    let mut harness = Harness::new(source, decoder).with_frame_limit(options.frames);
    let frames = if options.headless {
        harness.run(&mut NullDisplay::new(options.frames))?
    } else {
        let mut display = SdlDisplay::new(
            "VGA Sim",
            config.width as u32,
            config.height as u32,
            options.fullscreen,
        )?;
        harness.run(&mut display)?
    };

    info!(
        "Presented {} of {} decoded frames",
        frames,
        harness.decoder().frames_decoded()
    );
    Ok(())
}
