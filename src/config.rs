use eyre::{eyre, Result};

use crate::signal::generator::Pattern;
use crate::signal::timing::VideoTiming;

pub const SCREEN_WIDTH: usize = 640;
pub const SCREEN_HEIGHT: usize = 480;

// Pixel clocks from the hsync leading edge to the first visible pixel
pub const OFFSET_X: isize = 144;
// Lines from the vsync trailing edge to the first visible line
pub const OFFSET_Y: isize = 34;

pub const COLOR_DEPTH: u32 = 4;

/// Decoder geometry, fixed for the lifetime of a `Decoder`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub offset_x: isize,
    pub offset_y: isize,
    pub depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            offset_x: OFFSET_X,
            offset_y: OFFSET_Y,
            depth: COLOR_DEPTH,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(eyre!(
                "Framebuffer must not be empty ({}x{})",
                self.width,
                self.height
            ));
        }
        if !(1..=8).contains(&self.depth) {
            return Err(eyre!("Unsupported color depth of {} bits", self.depth));
        }
        Ok(())
    }

    /// Largest value a channel can carry at this depth
    pub const fn channel_max(&self) -> u8 {
        ((1u16 << self.depth) - 1) as u8
    }

    /// Scales a raw channel sample to 8-bit intensity. For 4-bit channels this is `v * 17`.
    pub fn scale_channel(&self, value: u8) -> u8 {
        let max = self.channel_max() as u16;
        ((value as u16 & max) * 255 / max) as u8
    }
}

/// Startup flags
#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    pub pattern: Pattern,
    pub fullscreen: bool,
    pub headless: bool,
    pub frames: Option<u64>,
    pub depth: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pattern: Pattern::Bars,
            fullscreen: false,
            headless: false,
            frames: None,
            depth: COLOR_DEPTH,
        }
    }
}

pub const USAGE: &str = "Usage: vgasim [options]
  --pattern <name>   -- bars, checker, gradient, square or noise
  --fullscreen       -- open the display fullscreen
  --headless         -- decode without opening a window
  --frames <n>       -- stop after n frames
  --depth <bits>     -- color channel bit depth (1-8)";

impl Options {
    /// Parses everything after the program name
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fullscreen" => options.fullscreen = true,
                "--headless" => options.headless = true,
                "--pattern" => options.pattern = Self::value(&mut args, arg)?.parse()?,
                "--frames" => {
                    let frames = Self::value(&mut args, arg)?;
                    options.frames = Some(
                        frames
                            .parse()
                            .map_err(|_| eyre!("Invalid frame count '{}'", frames))?,
                    );
                }
                "--depth" => {
                    let depth = Self::value(&mut args, arg)?;
                    options.depth = depth
                        .parse()
                        .map_err(|_| eyre!("Invalid color depth '{}'", depth))?;
                }
                _ => return Err(eyre!("Unknown option '{}'\n{}", arg, USAGE)),
            }
        }

        Ok(options)
    }

    fn value<'a>(args: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
        args.next()
            .map(String::as_str)
            .ok_or_else(|| eyre!("{} needs a value\n{}", flag, USAGE))
    }

    /// Decoder geometry for a source running `timing`
    pub fn config(&self, timing: &VideoTiming) -> Config {
        Config {
            width: timing.horizontal.active,
            height: timing.vertical.active,
            offset_x: timing.h_offset(),
            offset_y: timing.v_offset(),
            depth: self.depth,
        }
    }
}
