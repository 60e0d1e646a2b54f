use crate::error::{BoothError, Result};
use crate::store::FrameStore;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Contract for the external encoder: turn an ordered list of frame images
/// into a video at the given rate. Exit status is authoritative.
pub trait MovieEncoder {
    fn encode(&self, frames: &[PathBuf], fps: u32, output: &Path) -> Result<()>;
}

/// Encoder backend spawning ffmpeg. Frames are handed over as a concat list
/// rather than a shell glob so gapped index sequences encode exactly in
/// store order.
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn write_concat_list(frames: &[PathBuf], fps: u32, list_path: &Path) -> Result<()> {
        let mut list = String::from("ffconcat version 1.0\n");
        for frame in frames {
            let absolute = frame.canonicalize()?;
            list.push_str(&format!("file '{}'\n", absolute.display()));
            list.push_str(&format!("duration {:.6}\n", 1.0 / fps as f64));
        }
        fs::write(list_path, list)?;
        Ok(())
    }
}

impl MovieEncoder for FfmpegEncoder {
    fn encode(&self, frames: &[PathBuf], fps: u32, output: &Path) -> Result<()> {
        let list_path = output.with_extension("frames.txt");
        Self::write_concat_list(frames, fps, &list_path)?;

        let fps_arg = fps.to_string();
        let mut command = Command::new(&self.program);
        command.args([
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ]);
        command.arg(&list_path);
        command.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-r", &fps_arg]);
        command.arg(output);

        debug!("Spawning encoder: {} {:?}", self.program, command.get_args());
        let status = command.status();
        let _ = fs::remove_file(&list_path);

        match status {
            Ok(status) if status.success() => {
                info!("Encoded {} frames to {}", frames.len(), output.display());
                Ok(())
            }
            Ok(status) => Err(BoothError::encoder(
                status.to_string(),
                self.program.clone(),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BoothError::component(
                "encoder".to_string(),
                format!("'{}' not found on PATH - install ffmpeg", self.program),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sidecar written next to a movie when metadata saving is enabled.
#[derive(Debug, Serialize, Deserialize)]
pub struct MovieMetadata {
    pub title: String,
    pub frame_count: usize,
    pub fps: u32,
    pub created_at: String,
}

/// Assembles the current frame set into a timestamped movie file.
pub struct MovieBuilder {
    dir: PathBuf,
    save_metadata: bool,
}

impl MovieBuilder {
    /// Open the builder, creating the movie directory if needed. Failure here
    /// is fatal to startup.
    pub fn open<P: Into<PathBuf>>(dir: P, save_metadata: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Movie directory ready at {}", dir.display());
        Ok(Self { dir, save_metadata })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a movie from every stored frame in ascending index order.
    /// Returns `None` without touching the encoder when the store is empty.
    pub fn build(
        &self,
        store: &FrameStore,
        encoder: &dyn MovieEncoder,
        name: &str,
        fps: u32,
    ) -> Result<Option<PathBuf>> {
        let indices = store.list_indices()?;
        if indices.is_empty() {
            debug!("No frames on disk, skipping movie build");
            return Ok(None);
        }

        let frames: Vec<PathBuf> = indices.iter().map(|n| store.frame_path(*n)).collect();
        let output = self.output_path(name, &Local::now());

        encoder.encode(&frames, fps, &output)?;

        if self.save_metadata {
            self.write_metadata(&output, name, frames.len(), fps)?;
        }

        Ok(Some(output))
    }

    /// `movie_{name}_{HHMM}.mp4`, spaces flattened to underscores, with a
    /// numeric suffix when the same minute already produced that name.
    fn output_path(&self, name: &str, now: &DateTime<Local>) -> PathBuf {
        let name = name.trim().replace(' ', "_");
        let stamp = now.format("%H%M");
        let stem = if name.is_empty() {
            format!("movie_{}", stamp)
        } else {
            format!("movie_{}_{}", name, stamp)
        };

        let mut path = self.dir.join(format!("{}.mp4", stem));
        let mut attempt = 2;
        while path.exists() {
            path = self.dir.join(format!("{}_{}.mp4", stem, attempt));
            attempt += 1;
        }
        path
    }

    fn write_metadata(
        &self,
        output: &Path,
        name: &str,
        frame_count: usize,
        fps: u32,
    ) -> Result<()> {
        let metadata = MovieMetadata {
            title: name.trim().to_string(),
            frame_count,
            fps,
            created_at: Local::now().to_rfc3339(),
        };
        let sidecar = output.with_extension("json");
        let body = serde_json::to_string_pretty(&metadata)
            .map_err(|e| BoothError::component("movie".to_string(), e.to_string()))?;
        fs::write(&sidecar, body)?;
        debug!("Wrote movie metadata to {}", sidecar.display());
        Ok(())
    }
}
