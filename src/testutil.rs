//! Test doubles for the hardware collaborators.

use crate::buttons::ButtonPad;
use crate::camera::CameraDevice;
use crate::error::{BoothError, Result};
use crate::keyboard::Keyboard;
use crate::movie::MovieEncoder;
use crossterm::event::KeyCode;
use image::{Rgb, RgbImage};
use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct CameraCounters {
    pub previews_started: AtomicU32,
    pub previews_stopped: AtomicU32,
    pub shots: AtomicU32,
}

/// Camera double that writes real, decodable JPEGs with per-shot colors.
pub struct StubCamera {
    counters: Arc<CameraCounters>,
}

impl StubCamera {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(CameraCounters::default()),
        }
    }

    pub fn counters(&self) -> Arc<CameraCounters> {
        Arc::clone(&self.counters)
    }
}

impl CameraDevice for StubCamera {
    fn start_preview(&mut self) -> Result<()> {
        self.counters.previews_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<()> {
        self.counters.previews_stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_preview_alpha(&mut self, _alpha: u8) {}

    fn capture_to(&mut self, path: &Path) -> Result<()> {
        let shot = self.counters.shots.fetch_add(1, Ordering::SeqCst);
        let tint = (shot * 40 % 200) as u8 + 40;
        RgbImage::from_pixel(16, 12, Rgb([tint, 90, 200 - tint])).save(path)?;
        Ok(())
    }
}

/// Keyboard double replaying a fixed script. An exhausted script reports
/// escape so controller loops always terminate in tests.
pub struct ScriptedKeyboard {
    script: VecDeque<Option<KeyCode>>,
}

impl ScriptedKeyboard {
    pub fn new(script: impl IntoIterator<Item = Option<KeyCode>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl Keyboard for ScriptedKeyboard {
    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyCode>> {
        Ok(self.script.pop_front().unwrap_or(Some(KeyCode::Esc)))
    }
}

/// Button pad double replaying a fixed per-tick script of held sets.
pub struct ScriptedButtons {
    script: VecDeque<BTreeSet<u16>>,
}

impl ScriptedButtons {
    pub fn new(script: impl IntoIterator<Item = BTreeSet<u16>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn press(button: u16) -> BTreeSet<u16> {
        [button].into_iter().collect()
    }
}

impl ButtonPad for ScriptedButtons {
    fn held(&mut self) -> Result<BTreeSet<u16>> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct EncoderInvocation {
    pub frames: Vec<PathBuf>,
    pub fps: u32,
    pub output: PathBuf,
}

/// Encoder double recording every invocation and creating the output file.
#[derive(Clone)]
pub struct RecordingEncoder {
    invocations: Arc<Mutex<Vec<EncoderInvocation>>>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn invocations(&self) -> Vec<EncoderInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

impl MovieEncoder for RecordingEncoder {
    fn encode(&self, frames: &[PathBuf], fps: u32, output: &Path) -> Result<()> {
        fs::write(output, b"")?;
        self.invocations.lock().unwrap().push(EncoderInvocation {
            frames: frames.to_vec(),
            fps,
            output: output.to_path_buf(),
        });
        Ok(())
    }
}

/// Encoder double that always fails, as a crashed ffmpeg would.
pub struct FailingEncoder;

impl MovieEncoder for FailingEncoder {
    fn encode(&self, _frames: &[PathBuf], _fps: u32, _output: &Path) -> Result<()> {
        Err(BoothError::encoder("exit status: 1", "ffmpeg"))
    }
}
