pub mod generator;
pub mod timing;
#[cfg_attr(not(test), allow(dead_code))]
pub mod trace;

/// Levels of every line the decoder watches, read after one evaluation step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignalSample {
    pub pixel_clock: bool,
    pub h_sync: bool,
    pub v_sync: bool,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl SignalSample {
    /// Both syncs idle (high) with the given clock level and color
    #[cfg(test)]
    pub const fn idle(pixel_clock: bool, color: (u8, u8, u8)) -> Self {
        Self {
            pixel_clock,
            h_sync: true,
            v_sync: true,
            red: color.0,
            green: color.1,
            blue: color.2,
        }
    }
}

/// Anything that produces a clocked video signal.
///
/// The decoder drives the source one half-cycle at a time: it flips the clock
/// input, lets the source settle with `eval`, then reads the lines back.
pub trait SignalSource {
    fn toggle_clock(&mut self);

    /// Recomputes outputs from the current inputs. Must not block.
    fn eval(&mut self);

    fn sample(&self) -> SignalSample;

    /// Returns the source to its power-on state
    fn reset(&mut self) {}
}
