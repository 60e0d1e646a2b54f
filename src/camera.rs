use crate::config::CameraConfig;
use crate::error::{BoothError, Result};
use image::{Rgb, RgbImage};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

/// Contract for the camera the booth captures through. The core only drives
/// the preview lifecycle and asks for stills at explicit paths.
pub trait CameraDevice {
    fn start_preview(&mut self) -> Result<()>;
    fn stop_preview(&mut self) -> Result<()>;
    fn set_preview_alpha(&mut self, alpha: u8);
    fn capture_to(&mut self, path: &Path) -> Result<()>;
}

/// Camera backend driving the libcamera command line tools. The preview runs
/// as a long-lived child process; stills are one-shot invocations with the
/// output path appended.
pub struct RpicamCamera {
    config: CameraConfig,
    preview: Option<Child>,
}

impl RpicamCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            preview: None,
        }
    }

    fn split_command(command: &str) -> Result<(String, Vec<String>)> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            BoothError::component("camera", "Camera command line is empty")
        })?;
        Ok((program, parts.collect()))
    }

    fn map_spawn_error(program: &str, err: std::io::Error) -> BoothError {
        if err.kind() == ErrorKind::NotFound {
            BoothError::component(
                "camera".to_string(),
                format!("'{}' not found on PATH - install the libcamera apps", program),
            )
        } else {
            err.into()
        }
    }
}

impl CameraDevice for RpicamCamera {
    fn start_preview(&mut self) -> Result<()> {
        if self.preview.is_some() {
            return Ok(());
        }

        let (program, args) = Self::split_command(&self.config.preview_command)?;
        let child = Command::new(&program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Self::map_spawn_error(&program, e))?;

        info!("Live preview started ({})", program);
        self.preview = Some(child);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<()> {
        if let Some(mut child) = self.preview.take() {
            if let Err(e) = child.kill() {
                warn!("Failed to kill preview process: {}", e);
            }
            let _ = child.wait();
            info!("Live preview stopped");
        }
        Ok(())
    }

    fn set_preview_alpha(&mut self, alpha: u8) {
        // The libcamera preview has no opacity control; remember the value so
        // a future backend swap can honor it.
        self.config.preview_alpha = alpha;
        debug!("Preview alpha set to {} (ignored by rpicam backend)", alpha);
    }

    fn capture_to(&mut self, path: &Path) -> Result<()> {
        // The libcamera tools cannot share the sensor: the preview yields
        // for the duration of the still and comes back afterwards.
        let was_previewing = self.preview.is_some();
        if was_previewing {
            self.stop_preview()?;
        }

        let result = (|| {
            let (program, args) = Self::split_command(&self.config.still_command)?;

            let status = Command::new(&program)
                .args(&args)
                .arg(path)
                .status()
                .map_err(|e| Self::map_spawn_error(&program, e))?;

            if !status.success() {
                return Err(BoothError::component(
                    "camera".to_string(),
                    format!("'{}' exited with {}", program, status),
                ));
            }

            debug!("Captured still to {}", path.display());
            Ok(())
        })();

        if was_previewing {
            self.start_preview()?;
        }
        result
    }
}

impl Drop for RpicamCamera {
    fn drop(&mut self) {
        let _ = self.stop_preview();
    }
}

/// Hardware-free camera that writes synthetic frames, used by
/// `--keyboard-only` runs and benches on machines without a camera.
pub struct PatternCamera {
    width: u32,
    height: u32,
    shot: u32,
}

impl PatternCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            shot: 0,
        }
    }
}

impl CameraDevice for PatternCamera {
    fn start_preview(&mut self) -> Result<()> {
        debug!("Pattern camera preview started");
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<()> {
        debug!("Pattern camera preview stopped");
        Ok(())
    }

    fn set_preview_alpha(&mut self, _alpha: u8) {}

    fn capture_to(&mut self, path: &Path) -> Result<()> {
        // Cycle the hue with the shot count so successive frames differ.
        let base = (self.shot.wrapping_mul(37) % 200) as u8;
        let image = RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb([base, 255 - base, 120]),
        );
        image.save(path)?;
        self.shot += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_command() {
        let (program, args) =
            RpicamCamera::split_command("rpicam-still --immediate -o").unwrap();
        assert_eq!(program, "rpicam-still");
        assert_eq!(args, vec!["--immediate".to_string(), "-o".to_string()]);

        assert!(RpicamCamera::split_command("   ").is_err());
    }

    #[test]
    fn test_pattern_camera_writes_decodable_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shot.jpg");

        let mut camera = PatternCamera::new(32, 24);
        camera.capture_to(&path).unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!(image.width(), 32);
        assert_eq!(image.height(), 24);
    }

    #[test]
    fn test_pattern_camera_varies_between_shots() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");

        let mut camera = PatternCamera::new(8, 8);
        camera.capture_to(&a).unwrap();
        camera.capture_to(&b).unwrap();

        let a = image::open(&a).unwrap().to_rgb8();
        let b = image::open(&b).unwrap().to_rgb8();
        assert_ne!(a.get_pixel(0, 0), b.get_pixel(0, 0));
    }
}
