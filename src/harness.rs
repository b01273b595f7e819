use std::time::Instant;

use eyre::Result;
use log::{debug, info};

use crate::decoder::Decoder;
use crate::display::DisplaySink;
use crate::signal::SignalSource;

const RATE_WINDOW: u64 = 60;

/// Runs a source through the decoder and hands each finished frame to a display
pub struct Harness<S: SignalSource> {
    source: S,
    decoder: Decoder,
    frame_limit: Option<u64>,
}

impl<S: SignalSource> Harness<S> {
    pub fn new(source: S, decoder: Decoder) -> Self {
        Self {
            source,
            decoder,
            frame_limit: None,
        }
    }

    pub fn with_frame_limit(mut self, frame_limit: Option<u64>) -> Self {
        self.frame_limit = frame_limit;
        self
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Decodes and presents frames until the display asks to quit or the
    /// frame limit is hit. Returns the number of frames presented.
    pub fn run<D>(&mut self, sink: &mut D) -> Result<u64>
    where
        D: DisplaySink + ?Sized,
    {
        let mut presented = 0;
        let mut window_start = Instant::now();

        loop {
            let frame = self.decoder.run_until_frame(&mut self.source);
            sink.present(frame)?;
            presented += 1;
            debug!("Frame {} presented", presented);

            if presented % RATE_WINDOW == 0 {
                let elapsed = window_start.elapsed().as_secs_f64();
                info!("Decoding at {:.1} fps", RATE_WINDOW as f64 / elapsed);
                window_start = Instant::now();
            }

            if sink.poll_quit() {
                info!("Quit requested after {} frames", presented);
                break;
            }
            if self.frame_limit.map_or(false, |limit| presented >= limit) {
                info!("Frame limit of {} reached", presented);
                break;
            }
        }

        Ok(presented)
    }
}
