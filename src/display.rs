use eyre::Result;
use log::{debug, info};
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    pixels::{Color, PixelFormatEnum},
    rect::Rect,
    render::{Canvas, TextureCreator},
    video::{FullscreenType, Window, WindowContext},
    EventPump,
};

use crate::decoder::frame::Framebuffer;
use crate::macros::fw_error;

/// Where finished frames go
pub trait DisplaySink {
    /// Shows a frame. The frame must be fully read before returning, the
    /// decoder starts overwriting it straight after.
    fn present(&mut self, frame: &Framebuffer) -> Result<()>;

    /// True once the user asked to quit
    fn poll_quit(&mut self) -> bool;
}

/// Largest rectangle with the frame's aspect ratio, centred in the output surface.
///
/// Wider outputs get bars left and right, taller ones get bars top and bottom.
pub fn letterbox(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Option<Rect> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return None;
    }

    let (src_w, src_h) = (src_w as u64, src_h as u64);
    let (dst_w, dst_h) = (dst_w as u64, dst_h as u64);

    if dst_w * src_h > dst_h * src_w {
        // Output wider than the frame, pillarbox
        let w = dst_h * src_w / src_h;
        Some(Rect::new(((dst_w - w) / 2) as i32, 0, w as u32, dst_h as u32))
    } else {
        // Output taller than the frame, letterbox
        let h = dst_w * src_h / src_w;
        Some(Rect::new(0, ((dst_h - h) / 2) as i32, dst_w as u32, h as u32))
    }
}

pub struct SdlDisplay {
    event_pump: EventPump,
    canvas: Canvas<Window>,
    tex_creator: TextureCreator<WindowContext>,
    rgb: Vec<u8>,
    quit: bool,
}

impl SdlDisplay {
    pub fn new(title: &str, width: u32, height: u32, fullscreen: bool) -> Result<Self> {
        let sdl = fw_error!(sdl2::init());
        let video = fw_error!(sdl.video());

        let mut window = video
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()?;

        if fullscreen {
            fw_error!(window.set_fullscreen(FullscreenType::Desktop));
        }

        // Nearest neighbour keeps pixels sharp when scaled
        if !sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", "0") {
            debug!("Renderer ignored the scale quality hint");
        }

        let canvas = window.into_canvas().accelerated().build()?;
        let tex_creator = canvas.texture_creator();
        let event_pump = fw_error!(sdl.event_pump());

        info!("Opened {}x{} display", width, height);

        Ok(Self {
            event_pump,
            canvas,
            tex_creator,
            rgb: vec![0; width as usize * height as usize * 3],
            quit: false,
        })
    }
}

impl DisplaySink for SdlDisplay {
    fn present(&mut self, frame: &Framebuffer) -> Result<()> {
        let (width, height) = (frame.width() as u32, frame.height() as u32);

        let mut texture =
            self.tex_creator
                .create_texture_streaming(PixelFormatEnum::RGB24, width, height)?;

        self.rgb.resize(frame.width() * frame.height() * 3, 0);
        frame.write_rgb24(&mut self.rgb);
        texture.update(None, &self.rgb, frame.width() * 3)?;

        let (out_w, out_h) = fw_error!(self.canvas.output_size());

        self.canvas.set_draw_color(Color::RGB(0, 0, 0));
        self.canvas.clear();
        if let Some(dest) = letterbox(width, height, out_w, out_h) {
            fw_error!(self.canvas.copy(&texture, None, dest));
        }
        self.canvas.present();

        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                }
                | Event::Quit { .. } => self.quit = true,
                Event::Window {
                    win_event: WindowEvent::Resized(w, h),
                    ..
                } => debug!("Window resized to {}x{}", w, h),
                _ => { /* do nothing */ }
            }
        }
        self.quit
    }
}

/// Discards frames, optionally asking to quit after a fixed count
pub struct NullDisplay {
    quit_after: Option<u64>,
    presented: u64,
}

impl NullDisplay {
    pub fn new(quit_after: Option<u64>) -> Self {
        Self {
            quit_after,
            presented: 0,
        }
    }

    #[cfg(test)]
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DisplaySink for NullDisplay {
    fn present(&mut self, frame: &Framebuffer) -> Result<()> {
        self.presented += 1;
        debug!(
            "Dropped {}x{} frame {}",
            frame.width(),
            frame.height(),
            self.presented
        );
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.quit_after
            .map_or(false, |limit| self.presented >= limit)
    }
}
