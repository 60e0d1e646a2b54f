use crate::camera::CameraDevice;
use crate::error::Result;
use image::imageops::FilterType;
use image::{ImageError, RgbImage};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FRAME_PREFIX: &str = "frame_";
const FRAME_EXT: &str = ".jpg";

/// Filesystem-backed store of numbered frames. The directory is the only
/// source of truth: every query rescans it rather than trusting a cached
/// index, so a frame that disappeared underneath us is simply not listed.
pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    /// Open the store, creating the frame directory if needed. Failure here
    /// is fatal to startup.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Frame store ready at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the frame with the given index.
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!("{}{:04}{}", FRAME_PREFIX, index, FRAME_EXT))
    }

    /// Sorted indices of every frame currently on disk. Filenames that do not
    /// match the fixed pattern are ignored.
    pub fn list_indices(&self) -> Result<Vec<u32>> {
        let mut indices = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if let Some(index) = parse_index(name) {
                    indices.push(index);
                }
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Index of the highest-numbered frame, if any.
    pub fn last_index(&self) -> Result<Option<u32>> {
        Ok(self.list_indices()?.last().copied())
    }

    /// Capture a new frame through the camera at `max(existing) + 1`, or 0
    /// when the store is empty. Returns the new index.
    pub fn capture(&self, camera: &mut dyn CameraDevice) -> Result<u32> {
        let index = match self.last_index()? {
            Some(last) => last + 1,
            None => 0,
        };
        let path = self.frame_path(index);
        camera.capture_to(&path)?;
        debug!("Captured frame {} to {}", index, path.display());
        Ok(index)
    }

    /// Delete the highest-numbered frame. No-op when the store is empty, or
    /// when the frame vanished between scan and removal.
    pub fn erase_last(&self) -> Result<()> {
        if let Some(index) = self.last_index()? {
            match fs::remove_file(self.frame_path(index)) {
                Ok(()) => debug!("Erased frame {}", index),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Delete every frame. Returns the number actually removed.
    pub fn delete_all(&self) -> Result<usize> {
        let mut removed = 0;
        for index in self.list_indices()? {
            match fs::remove_file(self.frame_path(index)) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if removed > 0 {
            info!("Deleted {} frames", removed);
        }
        Ok(removed)
    }

    /// The ghost image: the highest-numbered frame scaled to exactly the
    /// requested size, or a solid black image when there is no frame (or it
    /// vanished between scan and load).
    pub fn last_frame_image(&self, width: u32, height: u32) -> Result<RgbImage> {
        let Some(index) = self.last_index()? else {
            return Ok(RgbImage::new(width, height));
        };

        match image::open(self.frame_path(index)) {
            Ok(image) => Ok(image
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgb8()),
            Err(ImageError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                Ok(RgbImage::new(width, height))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Parse `frame_NNNN.jpg` into NNNN. Anything else is not a frame.
fn parse_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(FRAME_PREFIX)?.strip_suffix(FRAME_EXT)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
