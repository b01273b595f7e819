use super::{SignalSample, SignalSource};

/// Replays a recorded list of samples, one per `eval`.
///
/// The clock input is ignored; each sample already carries its own pixel
/// clock level. Once the trace runs out the last sample is held.
pub struct TraceSource {
    samples: Vec<SignalSample>,
    evals: usize,
}

impl TraceSource {
    pub fn new(samples: Vec<SignalSample>) -> Self {
        Self { samples, evals: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.evals >= self.samples.len()
    }
}

impl SignalSource for TraceSource {
    fn toggle_clock(&mut self) {}

    fn eval(&mut self) {
        if self.evals < self.samples.len() {
            self.evals += 1;
        }
    }

    fn sample(&self) -> SignalSample {
        match self.evals {
            0 => SignalSample::default(),
            n => self.samples.get(n - 1).copied().unwrap_or_default(),
        }
    }

    fn reset(&mut self) {
        self.evals = 0;
    }
}

/// Builds traces pixel clock by pixel clock.
///
/// Every pixel is two samples: clock low, then clock high, with the current
/// sync levels and the given color on both. Syncs idle high.
pub struct TraceBuilder {
    samples: Vec<SignalSample>,
    h_sync: bool,
    v_sync: bool,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            h_sync: true,
            v_sync: true,
        }
    }

    pub fn pixel(mut self, color: (u8, u8, u8)) -> Self {
        for pixel_clock in [false, true] {
            self.samples.push(SignalSample {
                pixel_clock,
                h_sync: self.h_sync,
                v_sync: self.v_sync,
                red: color.0,
                green: color.1,
                blue: color.2,
            });
        }
        self
    }

    pub fn pixels(mut self, count: usize, color: (u8, u8, u8)) -> Self {
        for _ in 0..count {
            self = self.pixel(color);
        }
        self
    }

    /// Black pixels with both syncs idle
    pub fn blank(self, count: usize) -> Self {
        self.pixels(count, (0, 0, 0))
    }

    /// Holds hsync low for `width` black pixels
    pub fn hsync_pulse(mut self, width: usize) -> Self {
        self.h_sync = false;
        self = self.blank(width);
        self.h_sync = true;
        self
    }

    /// Holds vsync low for `width` black pixels. The trailing edge lands on the next pixel.
    pub fn vsync_pulse(mut self, width: usize) -> Self {
        self.v_sync = false;
        self = self.blank(width);
        self.v_sync = true;
        self
    }

    pub fn samples(&self) -> &[SignalSample] {
        &self.samples
    }

    pub fn build(self) -> TraceSource {
        TraceSource::new(self.samples)
    }
}
