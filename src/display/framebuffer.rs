use super::DisplaySurface;
use crate::error::{BoothError, Result};
use image::RgbImage;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use tracing::info;

/// Full-screen surface writing RGB565 into a Linux framebuffer device.
pub struct FramebufferDisplay {
    device: File,
    back: RgbImage,
    scratch: Vec<u8>,
}

impl FramebufferDisplay {
    pub fn open(device_path: &str, width: u32, height: u32) -> Result<Self> {
        let device = OpenOptions::new()
            .write(true)
            .open(device_path)
            .map_err(|e| {
                BoothError::component(
                    "display".to_string(),
                    format!("Failed to open framebuffer '{}': {}", device_path, e),
                )
            })?;
        info!(
            "Framebuffer display on {} at {}x{}",
            device_path, width, height
        );
        Ok(Self {
            device,
            back: RgbImage::new(width, height),
            scratch: vec![0u8; (width * height * 2) as usize],
        })
    }
}

impl DisplaySurface for FramebufferDisplay {
    fn size(&self) -> (u32, u32) {
        self.back.dimensions()
    }

    fn draw_image(&mut self, image: &RgbImage, x: u32, y: u32) -> Result<()> {
        let (width, height) = self.back.dimensions();
        for (sx, sy, pixel) in image.enumerate_pixels() {
            let dx = x + sx;
            let dy = y + sy;
            if dx < width && dy < height {
                self.back.put_pixel(dx, dy, *pixel);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        for (i, pixel) in self.back.pixels().enumerate() {
            let [r, g, b] = pixel.0;
            let packed = (((r as u16) & 0xF8) << 8)
                | (((g as u16) & 0xFC) << 3)
                | ((b as u16) >> 3);
            let bytes = packed.to_le_bytes();
            self.scratch[i * 2] = bytes[0];
            self.scratch[i * 2 + 1] = bytes[1];
        }

        self.device.seek(SeekFrom::Start(0))?;
        self.device.write_all(&self.scratch)?;
        Ok(())
    }
}
