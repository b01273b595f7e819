use std::str::FromStr;

use eyre::{eyre, Report};

use super::timing::VideoTiming;
use super::{SignalSample, SignalSource};
use crate::macros::bit_bool;

/// What the generator draws inside the active region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    Bars,
    Checker,
    Gradient,
    Square,
    Noise,
}

impl FromStr for Pattern {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bars" => Ok(Pattern::Bars),
            "checker" => Ok(Pattern::Checker),
            "gradient" => Ok(Pattern::Gradient),
            "square" => Ok(Pattern::Square),
            "noise" => Ok(Pattern::Noise),
            _ => Err(eyre!("Unknown pattern '{}'", s)),
        }
    }
}

impl Pattern {
    const BAR_COLORS: [(u8, u8, u8); 8] = [
        (0xF, 0xF, 0xF),
        (0xF, 0xF, 0x0),
        (0x0, 0xF, 0xF),
        (0x0, 0xF, 0x0),
        (0xF, 0x0, 0xF),
        (0xF, 0x0, 0x0),
        (0x0, 0x0, 0xF),
        (0x0, 0x0, 0x0),
    ];
    const CHECKER_SIZE: usize = 16;
    const SQUARE_SIZE: usize = 64;

    /// Bit depth of the colors returned by `color`
    pub const DEPTH: u32 = 4;

    /// 4-bit color of an active pixel
    pub fn color(
        &self,
        x: usize,
        y: usize,
        frame: usize,
        width: usize,
        height: usize,
    ) -> (u8, u8, u8) {
        match self {
            Pattern::Bars => Self::BAR_COLORS[x * Self::BAR_COLORS.len() / width],
            Pattern::Checker => {
                if (x / Self::CHECKER_SIZE + y / Self::CHECKER_SIZE) % 2 == 0 {
                    (0xF, 0xF, 0xF)
                } else {
                    (0x2, 0x2, 0x2)
                }
            }
            Pattern::Gradient => ((x * 16 / width) as u8, (y * 16 / height) as u8, 0x8),
            Pattern::Square => {
                let left = Self::bounce(frame * 2, width.saturating_sub(Self::SQUARE_SIZE));
                let top = Self::bounce(frame, height.saturating_sub(Self::SQUARE_SIZE));
                if (left..left + Self::SQUARE_SIZE).contains(&x)
                    && (top..top + Self::SQUARE_SIZE).contains(&y)
                {
                    (0xF, 0xF, 0x0)
                } else {
                    (0x0, 0x0, 0x8)
                }
            }
            Pattern::Noise => (
                rand::random::<u8>() & 0xF,
                rand::random::<u8>() & 0xF,
                rand::random::<u8>() & 0xF,
            ),
        }
    }

    // Position moving back and forth over 0..=span
    fn bounce(t: usize, span: usize) -> usize {
        if span == 0 {
            return 0;
        }
        let p = t % (2 * span);
        if p < span {
            p
        } else {
            2 * span - p
        }
    }
}

/// Model of a VGA timing generator clocked from a 100 MHz master clock.
///
/// The pixel clock is the master clock divided by four. Counters advance on
/// pixel clock rising edges and the outputs follow the counters in the same
/// evaluation. Both syncs are active low. The line counter that drives vsync
/// rolls over at the hsync leading edge, so vsync edges share a pixel clock
/// with an hsync leading edge.
pub struct VgaGenerator {
    timing: VideoTiming,
    pattern: Pattern,
    channel_max: u16,

    clk_master: bool,
    prev_master: bool,
    master_ticks: usize,
    clk_pix: bool,

    sx: usize,
    sy: usize,
    frame: usize,

    output: SignalSample,
}

impl VgaGenerator {
    /// Color outputs are `depth` bits wide
    pub fn new(timing: VideoTiming, pattern: Pattern, depth: u32) -> Self {
        let mut generator = Self {
            timing,
            pattern,
            channel_max: (1u16 << depth.min(8)) - 1,
            clk_master: false,
            prev_master: false,
            master_ticks: 0,
            clk_pix: false,
            sx: 0,
            sy: 0,
            frame: 0,
            output: SignalSample::default(),
        };
        generator.reset();
        generator
    }

    #[cfg(test)]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Current beam position, in pixel clocks and lines from the top left of the active region
    #[cfg(test)]
    pub fn position(&self) -> (usize, usize) {
        (self.sx, self.sy)
    }

    // Rescales a pattern color to the output channel width
    fn widen(&self, value: u8) -> u8 {
        let pattern_max = (1u16 << Pattern::DEPTH) - 1;
        (value as u16 * self.channel_max / pattern_max) as u8
    }

    fn tick_pixel(&mut self) {
        self.sx += 1;
        if self.sx == self.timing.horizontal.total() {
            self.sx = 0;
            self.sy += 1;
            if self.sy == self.timing.vertical.active {
                // Animate during vertical blanking
                self.frame += 1;
            } else if self.sy == self.timing.vertical.total() {
                self.sy = 0;
            }
        }
    }

    fn outputs(&self) -> SignalSample {
        let h = &self.timing.horizontal;
        let v = &self.timing.vertical;

        let h_sync = !(h.sync_start()..h.sync_end()).contains(&self.sx);

        let pos = self.sy * h.total() + self.sx;
        let vsync_start = v.sync_start().saturating_sub(1) * h.total() + h.sync_start();
        let vsync_end = vsync_start + v.sync * h.total();
        let v_sync = !(vsync_start..vsync_end).contains(&pos);

        let (red, green, blue) = if self.sx < h.active && self.sy < v.active {
            let (r, g, b) = self
                .pattern
                .color(self.sx, self.sy, self.frame, h.active, v.active);
            (self.widen(r), self.widen(g), self.widen(b))
        } else {
            (0, 0, 0)
        };

        SignalSample {
            pixel_clock: self.clk_pix,
            h_sync,
            v_sync,
            red,
            green,
            blue,
        }
    }
}

impl SignalSource for VgaGenerator {
    fn toggle_clock(&mut self) {
        self.clk_master = !self.clk_master;
    }

    fn eval(&mut self) {
        if self.clk_master && !self.prev_master {
            self.master_ticks = self.master_ticks.wrapping_add(1);
            let clk_pix = bit_bool!(self.master_ticks, 1);
            if clk_pix && !self.clk_pix {
                self.tick_pixel();
            }
            self.clk_pix = clk_pix;
        }
        self.prev_master = self.clk_master;
        self.output = self.outputs();
    }

    fn sample(&self) -> SignalSample {
        self.output
    }

    fn reset(&mut self) {
        self.master_ticks = 0;
        self.clk_pix = false;
        // The first pixel clock edge wraps to the top left corner
        self.sx = self.timing.horizontal.total() - 1;
        self.sy = self.timing.vertical.total() - 1;
        self.frame = 0;
        self.output = self.outputs();
    }
}
