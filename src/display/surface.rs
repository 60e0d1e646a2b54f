use crate::error::Result;
use image::RgbImage;
use tracing::trace;

/// Contract for the full-screen surface the booth renders to. Draw calls
/// paint into a back buffer; nothing reaches the panel until `present`.
pub trait DisplaySurface {
    fn size(&self) -> (u32, u32);
    fn draw_image(&mut self, image: &RgbImage, x: u32, y: u32) -> Result<()>;
    fn present(&mut self) -> Result<()>;
}

/// Surface with no panel behind it. Used for keyboard-only runs and on hosts
/// without a framebuffer; draws are counted so tests can observe rendering.
pub struct NullDisplay {
    width: u32,
    height: u32,
    presented: u64,
}

impl NullDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DisplaySurface for NullDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw_image(&mut self, _image: &RgbImage, _x: u32, _y: u32) -> Result<()> {
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presented += 1;
        trace!("Null display presented frame {}", self.presented);
        Ok(())
    }
}
