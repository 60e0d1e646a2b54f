use crate::display::{DisplaySurface, OverlayFont};
use crate::error::Result;
use crate::keyboard::Keyboard;
use crossterm::event::KeyCode;
use image::{Rgb, RgbImage};
use std::time::Duration;
use tracing::debug;

const MAX_TITLE_LEN: usize = 60;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of the title-entry sub-loop.
#[derive(Debug, PartialEq, Eq)]
pub enum TextEntry {
    Confirmed(String),
    Cancelled,
}

/// Blocking text-entry sub-loop: renders the buffer on a light background
/// every poll, confirms on enter, cancels on escape.
pub fn collect_title(
    display: &mut dyn DisplaySurface,
    keyboard: &mut dyn Keyboard,
    font: Option<&OverlayFont>,
) -> Result<TextEntry> {
    let mut buffer = String::new();

    loop {
        render(display, font, &buffer)?;

        match keyboard.poll_key(POLL_INTERVAL)? {
            Some(KeyCode::Enter) => {
                debug!("Title confirmed: '{}'", buffer);
                return Ok(TextEntry::Confirmed(buffer));
            }
            Some(KeyCode::Esc) => {
                debug!("Title entry cancelled");
                return Ok(TextEntry::Cancelled);
            }
            Some(KeyCode::Backspace) => {
                buffer.pop();
            }
            Some(KeyCode::Char(c)) if !c.is_control() && buffer.len() < MAX_TITLE_LEN => {
                buffer.push(c);
            }
            _ => {}
        }
    }
}

fn render(
    display: &mut dyn DisplaySurface,
    font: Option<&OverlayFont>,
    buffer: &str,
) -> Result<()> {
    let (width, height) = display.size();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([225, 225, 225]));

    if let Some(font) = font {
        font.draw(
            &mut canvas,
            10,
            10,
            Rgb([20, 20, 20]),
            &format!("{}_", buffer),
        );
        font.draw(
            &mut canvas,
            10,
            (height / 2) as i32,
            Rgb([120, 120, 120]),
            "name your movie, enter to save",
        );
    }

    display.draw_image(&canvas, 0, 0)?;
    display.present()
}
