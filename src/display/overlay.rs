use crate::error::{BoothError, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use std::fs;

/// On-screen text font, loaded once at startup.
pub struct OverlayFont {
    font: Font<'static>,
    scale: Scale,
}

impl OverlayFont {
    pub fn load(path: &str, size: f32) -> Result<Self> {
        let data = fs::read(path).map_err(|e| {
            BoothError::component(
                "display".to_string(),
                format!("Failed to read font file '{}': {}", path, e),
            )
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| {
            BoothError::component(
                "display".to_string(),
                format!("Failed to parse font file '{}'", path),
            )
        })?;
        Ok(Self {
            font,
            scale: Scale::uniform(size),
        })
    }

    fn line_height(&self) -> u32 {
        (self.scale.y * 1.5) as u32
    }

    /// Draw a line of text at the given position.
    pub fn draw(&self, image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        draw_text_mut(image, color, x, y, self.scale, &self.font, text);
    }
}

/// Draw a single line of white text over a darkened strip at the bottom of
/// the image, so it stays readable over any frame content.
pub fn draw_banner(image: &mut RgbImage, font: &OverlayFont, text: &str) {
    let x: u32 = 10;
    let y: u32 = image.height().saturating_sub(font.line_height());

    let (text_width, text_height) = text_size(font.scale, &font.font, text);

    for dy in 0..(text_height as u32 + 10) {
        for dx in 0..(text_width as u32 + 10) {
            let px = x.saturating_sub(5) + dx;
            let py = y.saturating_sub(5) + dy;
            if px < image.width() && py < image.height() {
                let pixel = image.get_pixel(px, py);
                image.put_pixel(
                    px,
                    py,
                    Rgb([pixel[0] / 3, pixel[1] / 3, pixel[2] / 3]),
                );
            }
        }
    }

    draw_text_mut(
        image,
        Rgb([255, 255, 255]),
        x as i32,
        y as i32,
        font.scale,
        &font.font,
        text,
    );
}

/// One of the two alternating title-screen images. The accent band flips
/// side with `alternate` so the title visibly pulses while idle.
pub fn splash_frame(
    width: u32,
    height: u32,
    font: Option<&OverlayFont>,
    alternate: bool,
) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([20, 20, 30]));

    let band_height = height / 8;
    let band_top = if alternate {
        height.saturating_sub(band_height)
    } else {
        0
    };
    let accent = Rgb([200, 60, 60]);
    for y in band_top..(band_top + band_height).min(height) {
        for x in 0..width {
            image.put_pixel(x, y, accent);
        }
    }

    if let Some(font) = font {
        draw_text_mut(
            &mut image,
            Rgb([235, 235, 235]),
            (width / 8) as i32,
            (height / 3) as i32,
            font.scale,
            &font.font,
            "FRAMEBOOTH",
        );
        draw_text_mut(
            &mut image,
            Rgb([160, 160, 160]),
            (width / 8) as i32,
            (height / 2) as i32,
            font.scale,
            &font.font,
            "press any button to start",
        );
    }

    image
}
