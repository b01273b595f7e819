/// Pixel clocks (or lines) spent in each part of one axis.
///
/// Sections run in the order active, front porch, sync, back porch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisTiming {
    pub active: usize,
    pub front_porch: usize,
    pub sync: usize,
    pub back_porch: usize,
}

impl AxisTiming {
    pub const fn total(&self) -> usize {
        self.active + self.front_porch + self.sync + self.back_porch
    }

    pub const fn sync_start(&self) -> usize {
        self.active + self.front_porch
    }

    pub const fn sync_end(&self) -> usize {
        self.sync_start() + self.sync
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoTiming {
    pub horizontal: AxisTiming,
    pub vertical: AxisTiming,
}

impl VideoTiming {
    /// 640x480 at 60 Hz with a 25 MHz pixel clock
    pub const VGA_640X480: Self = Self {
        horizontal: AxisTiming {
            active: 640,
            front_porch: 16,
            sync: 96,
            back_porch: 48,
        },
        vertical: AxisTiming {
            active: 480,
            front_porch: 10,
            sync: 2,
            back_porch: 33,
        },
    };

    /// Decoder x offset: clocks from the hsync leading edge to the first active pixel
    pub const fn h_offset(&self) -> isize {
        (self.horizontal.sync + self.horizontal.back_porch) as isize
    }

    /// Decoder y offset. The vsync trailing edge lands on an hsync leading
    /// edge, which counts as one extra line.
    pub const fn v_offset(&self) -> isize {
        (self.vertical.back_porch + 1) as isize
    }

    pub const fn clocks_per_frame(&self) -> usize {
        self.horizontal.total() * self.vertical.total()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{OFFSET_X, OFFSET_Y, SCREEN_HEIGHT, SCREEN_WIDTH};

    #[test]
    fn test_vga_totals() {
        let timing = VideoTiming::VGA_640X480;
        assert_eq!(timing.horizontal.total(), 800);
        assert_eq!(timing.vertical.total(), 525);
        assert_eq!(timing.horizontal.sync_start(), 656);
        assert_eq!(timing.horizontal.sync_end(), 752);
        assert_eq!(timing.clocks_per_frame(), 420_000);
    }

    #[test]
    fn test_vga_matches_default_offsets() {
        let timing = VideoTiming::VGA_640X480;
        assert_eq!(timing.h_offset(), OFFSET_X);
        assert_eq!(timing.v_offset(), OFFSET_Y);
        assert_eq!(timing.horizontal.active, SCREEN_WIDTH);
        assert_eq!(timing.vertical.active, SCREEN_HEIGHT);
    }
}
