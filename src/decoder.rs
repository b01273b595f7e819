pub mod frame;

use eyre::Result;

use crate::config::Config;
use crate::signal::{SignalSample, SignalSource};
use frame::{Framebuffer, Rgb888};

/// Everything the decoder remembers between half-cycles.
///
/// `x` and `y` only move on a pixel clock rising edge. They go negative while
/// the beam is in the border and blanking intervals before the visible region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeState {
    pub prev_clk: bool,
    pub prev_hsync: bool,
    pub prev_vsync: bool,
    pub x: isize,
    pub y: isize,
}

impl DecodeState {
    pub const fn new(config: &Config) -> Self {
        Self {
            prev_clk: false,
            prev_hsync: false,
            prev_vsync: false,
            x: -config.offset_x,
            y: -config.offset_y,
        }
    }
}

/// Turns clock and sync edges into pixel coordinates and fills a framebuffer.
///
/// Decoding is total: any sequence of levels gives a defined coordinate
/// update, and samples outside the visible window are dropped.
pub struct Decoder {
    config: Config,
    state: DecodeState,
    frame: Framebuffer,
    frames: u64,
}

impl Decoder {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            state: DecodeState::new(&config),
            frame: Framebuffer::new(config.width, config.height)?,
            frames: 0,
        })
    }

    #[cfg(test)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[cfg(test)]
    pub fn state(&self) -> &DecodeState {
        &self.state
    }

    #[cfg(test)]
    pub fn position(&self) -> (isize, isize) {
        (self.state.x, self.state.y)
    }

    #[cfg(test)]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.frame
    }

    /// Vsync edges seen so far
    pub fn frames_decoded(&self) -> u64 {
        self.frames
    }

    /// Clocks the source by half a cycle and decodes the result.
    ///
    /// Returns true when this half-cycle completed a frame.
    pub fn advance_half_cycle<S>(&mut self, source: &mut S) -> bool
    where
        S: SignalSource + ?Sized,
    {
        source.toggle_clock();
        source.eval();
        self.step(source.sample())
    }

    /// Decodes one sample taken after an evaluation step
    pub fn step(&mut self, sample: SignalSample) -> bool {
        let state = &mut self.state;
        let mut frame_done = false;

        if !state.prev_clk && sample.pixel_clock {
            // Vsync is active low, its trailing edge starts a frame
            if !state.prev_vsync && sample.v_sync {
                state.x = -self.config.offset_x;
                state.y = -self.config.offset_y;
                frame_done = true;
            }
            state.prev_vsync = sample.v_sync;

            // Hsync leading edge starts a line
            if state.prev_hsync && !sample.h_sync {
                state.x = -self.config.offset_x;
                state.y += 1;
            }
            state.prev_hsync = sample.h_sync;

            if let (Ok(x), Ok(y)) = (usize::try_from(state.x), usize::try_from(state.y)) {
                if x < self.config.width && y < self.config.height {
                    let pixel = Rgb888::from_rgb(
                        self.config.scale_channel(sample.red),
                        self.config.scale_channel(sample.green),
                        self.config.scale_channel(sample.blue),
                    );
                    self.frame.set_pixel(x, y, pixel);
                }
            }
            state.x += 1;
        }
        state.prev_clk = sample.pixel_clock;

        if frame_done {
            self.frames += 1;
        }
        frame_done
    }

    /// Clocks the source until the next vsync edge and returns the finished frame.
    ///
    /// The frame is only valid until the next call; the same storage is
    /// overwritten as decoding continues.
    pub fn run_until_frame<S>(&mut self, source: &mut S) -> &Framebuffer
    where
        S: SignalSource + ?Sized,
    {
        while !self.advance_half_cycle(source) {}
        &self.frame
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::trace::TraceBuilder;

    const RED: (u8, u8, u8) = (0xF, 0, 0);
    const GREY: (u8, u8, u8) = (0x8, 0x8, 0x8);

    fn rising(h_sync: bool, v_sync: bool, color: (u8, u8, u8)) -> [SignalSample; 2] {
        let high = SignalSample {
            pixel_clock: true,
            h_sync,
            v_sync,
            red: color.0,
            green: color.1,
            blue: color.2,
        };
        let low = SignalSample {
            pixel_clock: false,
            ..high
        };
        [low, high]
    }

    fn feed(decoder: &mut Decoder, samples: &[SignalSample]) -> usize {
        samples.iter().filter(|s| decoder.step(**s)).count()
    }

    fn small_config() -> Config {
        Config {
            width: 4,
            height: 3,
            offset_x: 0,
            offset_y: 0,
            depth: 4,
        }
    }

    fn written(decoder: &Decoder) -> usize {
        decoder
            .framebuffer()
            .pixels()
            .iter()
            .filter(|p| p.data != 0)
            .count()
    }

    #[test]
    fn test_initial_state() {
        let decoder = Decoder::new(Config::default()).unwrap();
        assert_eq!(decoder.position(), (-144, -34));
        assert!(!decoder.state().prev_clk);
        assert!(!decoder.state().prev_hsync);
        assert!(!decoder.state().prev_vsync);
        assert_eq!(decoder.frames_decoded(), 0);
        assert_eq!(written(&decoder), 0);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Decoder::new(Config {
            depth: 0,
            ..Config::default()
        })
        .is_err());
    }

    #[test]
    fn test_no_clock_edges_leave_state_unchanged() {
        let mut decoder = Decoder::new(small_config()).unwrap();
        let before = decoder.position();

        // Clock held low, then held high after a single edge, while syncs thrash
        for i in 0..64 {
            let sample = SignalSample {
                pixel_clock: false,
                h_sync: i % 2 == 0,
                v_sync: i % 3 == 0,
                red: 0xF,
                green: 0xF,
                blue: 0xF,
            };
            assert!(!decoder.step(sample));
        }
        assert_eq!(decoder.position(), before);
        assert_eq!(written(&decoder), 0);

        decoder.step(SignalSample::idle(true, (0, 0, 0)));
        let after_edge = decoder.position();
        for i in 0..64 {
            let sample = SignalSample {
                pixel_clock: true,
                h_sync: i % 2 == 0,
                v_sync: i % 3 == 0,
                red: 0xF,
                green: 0xF,
                blue: 0xF,
            };
            decoder.step(sample);
        }
        assert_eq!(decoder.position(), after_edge);
        assert_eq!(written(&decoder), 0);
    }

    #[test]
    fn test_x_advances_once_per_rising_edge() {
        let mut decoder = Decoder::new(small_config()).unwrap();
        for _ in 0..5 {
            feed(&mut decoder, &rising(false, false, (0, 0, 0)));
        }
        assert_eq!(decoder.position(), (5, 0));
    }

    #[test]
    fn test_vsync_edge_resets_position() {
        let mut decoder = Decoder::new(Config::default()).unwrap();

        // Wander off somewhere: a few lines down, a few pixels in
        let mut samples = Vec::new();
        for _ in 0..50 {
            samples.extend(rising(true, false, (0, 0, 0)));
            samples.extend(rising(false, false, (0, 0, 0)));
        }
        for _ in 0..7 {
            samples.extend(rising(false, false, (0, 0, 0)));
        }
        feed(&mut decoder, &samples);
        assert_ne!(decoder.position(), (-144 + 1, -34));

        // Vsync trailing edge with hsync idle
        let done = feed(&mut decoder, &rising(false, true, (0, 0, 0)));
        assert_eq!(done, 1);
        assert_eq!(decoder.position(), (-144 + 1, -34));
        assert_eq!(decoder.frames_decoded(), 1);
    }

    #[test]
    fn test_vsync_and_hsync_on_same_edge() {
        let mut decoder = Decoder::new(Config::default()).unwrap();
        feed(&mut decoder, &rising(true, false, (0, 0, 0)));
        for _ in 0..10 {
            feed(&mut decoder, &rising(true, false, (0, 0, 0)));
        }

        // Reset first, then the line start counts from the reset position
        let done = feed(&mut decoder, &rising(false, true, (0, 0, 0)));
        assert_eq!(done, 1);
        assert_eq!(decoder.position(), (-144 + 1, -34 + 1));
    }

    #[test]
    fn test_hsync_falling_edge_starts_line() {
        let mut decoder = Decoder::new(Config::default()).unwrap();
        feed(&mut decoder, &rising(true, true, RED));
        for _ in 0..300 {
            feed(&mut decoder, &rising(true, true, RED));
        }
        let (_, y) = decoder.position();

        feed(&mut decoder, &rising(false, true, RED));
        assert_eq!(decoder.position(), (-144 + 1, y + 1));

        // Staying low is not another edge
        feed(&mut decoder, &rising(false, true, RED));
        assert_eq!(decoder.position(), (-144 + 2, y + 1));

        // Rising hsync does nothing either
        feed(&mut decoder, &rising(true, true, RED));
        assert_eq!(decoder.position(), (-144 + 3, y + 1));
        assert_eq!(written(&decoder), 0);
    }

    #[test]
    fn test_writes_only_inside_window() {
        let mut decoder = Decoder::new(Config {
            offset_x: 2,
            offset_y: 1,
            ..small_config()
        })
        .unwrap();

        // Start at (-2, -1); line start moves to y = 0
        feed(&mut decoder, &rising(true, true, GREY));
        assert_eq!(written(&decoder), 0);
        feed(&mut decoder, &rising(false, true, GREY));
        assert_eq!(decoder.position(), (-1, 0));
        assert_eq!(written(&decoder), 0);

        // x = -1 is dropped, then 0..4 written, then 4.. dropped
        for _ in 0..8 {
            feed(&mut decoder, &rising(false, true, GREY));
        }
        assert_eq!(decoder.position(), (7, 0));
        assert_eq!(written(&decoder), 4);
        let frame = decoder.framebuffer();
        for x in 0..4 {
            assert_eq!(frame.pixel(x, 0), Rgb888::from_rgb(0x88, 0x88, 0x88));
        }
        assert_eq!(frame.pixel(0, 1).data, 0);
    }

    #[test]
    fn test_write_uses_pre_increment_x() {
        let mut decoder = Decoder::new(small_config()).unwrap();
        feed(&mut decoder, &rising(false, false, RED));
        assert_eq!(decoder.position(), (1, 0));
        assert_eq!(decoder.framebuffer().pixel(0, 0), Rgb888::from_rgb(255, 0, 0));
        assert_eq!(decoder.framebuffer().pixel(1, 0).data, 0);
    }

    #[test]
    fn test_color_scaling() {
        let mut decoder = Decoder::new(small_config()).unwrap();
        for v in [0u8, 1, 15] {
            feed(&mut decoder, &rising(false, false, (v, 15 - v, v)));
        }
        let frame = decoder.framebuffer();
        assert_eq!(frame.pixel(0, 0), Rgb888::from_rgb(0, 255, 0));
        assert_eq!(frame.pixel(1, 0), Rgb888::from_rgb(17, 238, 17));
        assert_eq!(frame.pixel(2, 0), Rgb888::from_rgb(255, 0, 255));
        assert_eq!(frame.pixel(2, 0).data, 0x00FF_00FF);
    }

    #[test]
    fn test_replayed_sample_is_idempotent() {
        let mut decoder = Decoder::new(small_config()).unwrap();
        let [low, high] = rising(false, false, RED);
        decoder.step(low);
        decoder.step(high);
        let state = *decoder.state();
        let pixels = decoder.framebuffer().pixels().to_vec();

        for _ in 0..100 {
            assert!(!decoder.step(high));
        }
        assert_eq!(*decoder.state(), state);
        assert_eq!(decoder.framebuffer().pixels(), &pixels[..]);
    }

    #[test]
    fn test_solid_frame_from_trace() {
        // 6 visible, 2 front porch, 2 sync, 3 back porch per line
        let config = Config {
            width: 6,
            height: 4,
            offset_x: 2 + 3,
            offset_y: 1,
            depth: 4,
        };
        let mut decoder = Decoder::new(config).unwrap();

        let mut builder = TraceBuilder::new().vsync_pulse(3);
        for line in 0..8 {
            builder = builder
                .blank(2)
                .hsync_pulse(2)
                .blank(3)
                .pixels(6, GREY)
                // Extra blanking grows line by line
                .blank(2 + line);
        }
        let mut trace = builder.vsync_pulse(1).blank(1).build();

        let mut ready = 0;
        while !trace.is_finished() {
            if decoder.advance_half_cycle(&mut trace) {
                ready += 1;
            }
        }

        assert_eq!(ready, 2);
        let expected = Rgb888::from_rgb(0x88, 0x88, 0x88);
        assert!(decoder.framebuffer().pixels().iter().all(|p| *p == expected));
    }

    #[test]
    fn test_lines_without_vsync() {
        let config = Config {
            width: 6,
            height: 4,
            offset_x: 2 + 3,
            offset_y: 1,
            depth: 4,
        };
        let mut decoder = Decoder::new(config).unwrap();

        // Only the startup edge resets the position; vsync then stays idle
        let mut builder = TraceBuilder::new().blank(1);
        for line in 0..8 {
            builder = builder
                .hsync_pulse(2)
                .blank(3)
                .pixels(6, GREY)
                .blank(2 + line);
        }
        let mut trace = builder.build();

        let mut ready = 0;
        while !trace.is_finished() {
            if decoder.advance_half_cycle(&mut trace) {
                ready += 1;
            }
        }

        assert_eq!(ready, 1);
        assert_eq!(decoder.frames_decoded(), 1);
        assert_eq!(decoder.position().1, 7);
        let expected = Rgb888::from_rgb(0x88, 0x88, 0x88);
        for y in 0..config.height {
            for x in 0..config.width {
                assert_eq!(decoder.framebuffer().pixel(x, y), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_frame_ready_once_per_vsync_edge() {
        let mut decoder = Decoder::new(Config::default()).unwrap();
        let mut trace = TraceBuilder::new()
            .blank(10)
            .vsync_pulse(2)
            .blank(100)
            .vsync_pulse(2)
            .blank(100)
            .build();

        let mut ready_at = Vec::new();
        let mut half_cycles = 0;
        while !trace.is_finished() {
            half_cycles += 1;
            if decoder.advance_half_cycle(&mut trace) {
                ready_at.push(half_cycles);
            }
        }

        // The latches start low, so idle-high vsync counts as an edge on the
        // first pixel. Each pulse then ends on the rising half of the pixel after it.
        assert_eq!(
            ready_at,
            vec![2, (10 + 2) * 2 + 2, (10 + 2 + 100 + 2) * 2 + 2]
        );
        assert_eq!(decoder.frames_decoded(), 3);
        assert_eq!(written(&decoder), 0);
    }
}
