use bitbash::bitfield;
use eyre::{eyre, Result};

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
    pub struct Rgb888 {
        pub data: u32,
    }

    pub field red:   u8 = data[16..=23];
    pub field green: u8 = data[8..=15];
    pub field blue:  u8 = data[0..=7];
}

impl Rgb888 {
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let mut pixel = Self { data: 0 };
        pixel.set_red(red);
        pixel.set_green(green);
        pixel.set_blue(blue);
        pixel
    }
}

/// One frame of decoded pixels, row major
#[derive(Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb888>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or_else(|| eyre!("Framebuffer of {}x{} is too large", width, height))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| eyre!("Unable to allocate {}x{} framebuffer: {}", width, height, e))?;
        pixels.resize(len, Rgb888::default());

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Writes are dropped outside the frame
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Rgb888) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = pixel;
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb888 {
        self.pixels[y * self.width + x]
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    /// Copies the frame into a packed RGB24 buffer of `width * height * 3` bytes
    pub fn write_rgb24(&self, out: &mut [u8]) {
        for (pixel, rgb) in self.pixels.iter().zip(out.chunks_exact_mut(3)) {
            rgb[0] = pixel.red();
            rgb[1] = pixel.green();
            rgb[2] = pixel.blue();
        }
    }
}
