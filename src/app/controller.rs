use super::{AppMode, Ticker};
use crate::buttons::ButtonPad;
use crate::camera::CameraDevice;
use crate::config::BoothConfig;
use crate::display::{self, DisplaySurface, OverlayFont};
use crate::error::Result;
use crate::input::{Action, InputMap};
use crate::keyboard::Keyboard;
use crate::movie::{MovieBuilder, MovieEncoder};
use crate::store::FrameStore;
use crate::textinput::{self, TextEntry};
use crossterm::event::KeyCode;
use image::imageops::FilterType;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Ticks the error banner stays up before the booth resumes.
const ERROR_HOLD_TICKS: u32 = 10;

/// The hardware the controller drives, behind their call contracts.
pub struct Peripherals {
    pub camera: Box<dyn CameraDevice>,
    pub buttons: Box<dyn ButtonPad>,
    pub keyboard: Box<dyn Keyboard>,
    pub display: Box<dyn DisplaySurface>,
    pub encoder: Box<dyn MovieEncoder>,
}

/// What one pass of input sampling means for an attract/playback loop.
enum WakeSignal {
    None,
    Wake,
    Exit,
}

/// The booth's single-threaded control loop: one mode at a time, one action
/// per tick, everything executed to completion before the next render.
pub struct BoothController {
    config: BoothConfig,
    store: FrameStore,
    movies: MovieBuilder,
    input: InputMap,
    camera: Box<dyn CameraDevice>,
    buttons: Box<dyn ButtonPad>,
    keyboard: Box<dyn Keyboard>,
    display: Box<dyn DisplaySurface>,
    encoder: Box<dyn MovieEncoder>,
    font: Option<OverlayFont>,
    ticker: Ticker,
    mode: AppMode,
    last_movie: Option<PathBuf>,
}

impl BoothController {
    /// Build the controller. Directory creation failures are fatal here;
    /// a missing font only disables on-screen text.
    pub fn new(config: BoothConfig, peripherals: Peripherals) -> Result<Self> {
        let store = FrameStore::open(config.frames.path.as_str())?;
        let movies = MovieBuilder::open(config.movies.path.as_str(), config.movies.save_metadata)?;
        let input = InputMap::new(config.input.buttons.clone());

        let font = match OverlayFont::load(&config.display.font_path, config.display.font_size) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("On-screen text disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            store,
            movies,
            input,
            camera: peripherals.camera,
            buttons: peripherals.buttons,
            keyboard: peripherals.keyboard,
            display: peripherals.display,
            encoder: peripherals.encoder,
            font,
            ticker: Ticker::new(),
            mode: AppMode::Title,
            last_movie: None,
        })
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Run the booth until an exit action. Cleanup (clear frames, stop the
    /// preview) always runs on the way out.
    pub fn run(&mut self) -> Result<()> {
        info!("Booth running");
        self.camera
            .set_preview_alpha(self.config.camera.preview_alpha);

        loop {
            let next = match self.mode {
                AppMode::Title => self.title_screen()?,
                AppMode::Idle => self.idle_tick()?,
                AppMode::PlayingPreview => self.play_preview()?,
                AppMode::EnteringMovieName => self.enter_movie_name()?,
                AppMode::PlayingMovie => self.playing_movie()?,
            };

            match next {
                Some(mode) => self.set_mode(mode),
                None => break,
            }
        }

        self.cleanup()
    }

    fn set_mode(&mut self, mode: AppMode) {
        if self.mode != mode {
            debug!("Mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Attract loop: two splash images alternating on a tick counter until
    /// any input wakes the booth (or exit ends it).
    fn title_screen(&mut self) -> Result<Option<AppMode>> {
        let (width, height) = self.display.size();
        let splashes = [
            display::splash_frame(width, height, self.font.as_ref(), false),
            display::splash_frame(width, height, self.font.as_ref(), true),
        ];

        let mut ticks = 0;
        let mut phase = 0;
        loop {
            if let Err(e) = self.present_full(&splashes[phase]) {
                warn!("Splash render failed: {}", e);
            }

            match self.sample_wake()? {
                WakeSignal::Exit => return Ok(None),
                WakeSignal::Wake => {
                    if let Err(e) = self.camera.start_preview() {
                        warn!("Live preview unavailable: {}", e);
                    }
                    self.render_ghost();
                    return Ok(Some(AppMode::Idle));
                }
                WakeSignal::None => {}
            }

            ticks += 1;
            if ticks >= self.config.display.splash_cycle_ticks {
                ticks = 0;
                phase = 1 - phase;
            }
            self.ticker.tick(self.config.playback.fps);
        }
    }

    /// One Idle tick: sample both signal sources, resolve one action,
    /// execute it, throttle.
    fn idle_tick(&mut self) -> Result<Option<AppMode>> {
        let held = self.sample_buttons();
        let key = self.keyboard.poll_key(Duration::ZERO)?;

        match self.input.resolve(&held, key) {
            Action::CaptureFrame => {
                if let Err(e) = self.store.capture(self.camera.as_mut()) {
                    warn!("Capture failed: {}", e);
                }
                self.render_ghost();
            }
            Action::EraseLastFrame => {
                if let Err(e) = self.store.erase_last() {
                    warn!("Erase failed: {}", e);
                }
                self.render_ghost();
            }
            Action::DeleteAllAndReset => {
                if let Err(e) = self.store.delete_all() {
                    warn!("Delete failed: {}", e);
                }
                self.render_ghost();
            }
            Action::PlayPreview => return Ok(Some(AppMode::PlayingPreview)),
            Action::BeginMovieCreation => return Ok(Some(AppMode::EnteringMovieName)),
            Action::ExitApp => return Ok(None),
            Action::NoAction => {}
        }

        self.ticker.tick(self.config.playback.fps);
        Ok(Some(AppMode::Idle))
    }

    /// Play every stored frame once at the capture rate, then hand the booth
    /// back to Idle with the ghost and live preview restored.
    fn play_preview(&mut self) -> Result<Option<AppMode>> {
        if let Err(e) = self.camera.stop_preview() {
            warn!("Failed to stop preview: {}", e);
        }

        match self.store.list_indices() {
            Ok(indices) => {
                for index in indices {
                    self.render_frame(index, None);
                    self.ticker.tick(self.config.playback.fps);
                }
            }
            Err(e) => warn!("Preview scan failed: {}", e),
        }

        self.ticker.tick(self.config.playback.fps);
        self.render_ghost();
        if let Err(e) = self.camera.start_preview() {
            warn!("Live preview unavailable: {}", e);
        }
        Ok(Some(AppMode::Idle))
    }

    /// Collect a movie title, build the movie, and move to playback. An
    /// encoder failure is shown on screen and drops back to Idle.
    fn enter_movie_name(&mut self) -> Result<Option<AppMode>> {
        if let Err(e) = self.camera.stop_preview() {
            warn!("Failed to stop preview: {}", e);
        }

        let entry = textinput::collect_title(
            self.display.as_mut(),
            self.keyboard.as_mut(),
            self.font.as_ref(),
        )?;

        let title = match entry {
            TextEntry::Cancelled => return Ok(None),
            TextEntry::Confirmed(title) => title,
        };

        match self
            .movies
            .build(&self.store, self.encoder.as_ref(), &title, self.config.movies.fps)
        {
            Ok(Some(path)) => {
                info!("Movie saved to {}", path.display());
                self.last_movie = Some(path);
                Ok(Some(AppMode::PlayingMovie))
            }
            Ok(None) => {
                info!("No frames to encode, returning to capture");
                self.resume_idle();
                Ok(Some(AppMode::Idle))
            }
            Err(e) => {
                error!("Movie build failed: {}", e);
                self.flash_message("encoding failed - frames kept");
                self.resume_idle();
                Ok(Some(AppMode::Idle))
            }
        }
    }

    /// Loop the frame sequence with the output path overlaid until input
    /// restarts the booth (back to Title, frames cleared) or exits it.
    fn playing_movie(&mut self) -> Result<Option<AppMode>> {
        let caption = self
            .last_movie
            .as_ref()
            .map(|path| format!("{} - press any button to restart", path.display()));

        loop {
            let indices = self.store.list_indices().unwrap_or_else(|e| {
                warn!("Playback scan failed: {}", e);
                Vec::new()
            });

            if indices.is_empty() {
                self.render_ghost();
                match self.sample_wake()? {
                    WakeSignal::Exit => return Ok(None),
                    WakeSignal::Wake => return self.restart(),
                    WakeSignal::None => {}
                }
                self.ticker.tick(self.config.playback.fps);
                continue;
            }

            for index in indices {
                self.render_frame(index, caption.as_deref());
                match self.sample_wake()? {
                    WakeSignal::Exit => return Ok(None),
                    WakeSignal::Wake => return self.restart(),
                    WakeSignal::None => {}
                }
                self.ticker.tick(self.config.playback.fps);
            }
        }
    }

    fn restart(&mut self) -> Result<Option<AppMode>> {
        if let Err(e) = self.store.delete_all() {
            warn!("Failed to clear frames: {}", e);
        }
        self.last_movie = None;
        Ok(Some(AppMode::Title))
    }

    /// Sample both signal sources for the attract/playback loops: escape or
    /// the exit button ends the booth, anything else wakes it.
    fn sample_wake(&mut self) -> Result<WakeSignal> {
        let held = self.sample_buttons();
        let key = self.keyboard.poll_key(Duration::ZERO)?;

        if matches!(key, Some(KeyCode::Esc))
            || self.input.action_for_buttons(&held) == Action::ExitApp
        {
            return Ok(WakeSignal::Exit);
        }
        if key.is_some() || !held.is_empty() {
            return Ok(WakeSignal::Wake);
        }
        Ok(WakeSignal::None)
    }

    fn sample_buttons(&mut self) -> BTreeSet<u16> {
        self.buttons.held().unwrap_or_else(|e| {
            warn!("Button sampling failed: {}", e);
            BTreeSet::new()
        })
    }

    /// Redisplay the ghost frame so the next shot can be aligned against the
    /// previous one. Render failures never stop the loop.
    fn render_ghost(&mut self) {
        let (width, height) = self.display.size();
        let result = self
            .store
            .last_frame_image(width, height)
            .and_then(|ghost| self.present_full(&ghost));
        if let Err(e) = result {
            warn!("Ghost render failed: {}", e);
        }
    }

    /// Draw one stored frame full screen, with an optional caption banner.
    /// A frame missing between scan and load is skipped, not an error.
    fn render_frame(&mut self, index: u32, caption: Option<&str>) {
        let (width, height) = self.display.size();
        match image::open(self.store.frame_path(index)) {
            Ok(image) => {
                let mut frame = image
                    .resize_exact(width, height, FilterType::Triangle)
                    .to_rgb8();
                if let (Some(font), Some(caption)) = (&self.font, caption) {
                    display::draw_banner(&mut frame, font, caption);
                }
                if let Err(e) = self.present_full(&frame) {
                    warn!("Frame render failed: {}", e);
                }
            }
            Err(e) => debug!("Skipping frame {}: {}", index, e),
        }
    }

    fn present_full(&mut self, image: &image::RgbImage) -> Result<()> {
        self.display.draw_image(image, 0, 0)?;
        self.display.present()
    }

    /// Show the build error briefly, then continue as if nothing happened.
    fn flash_message(&mut self, message: &str) {
        let (width, height) = self.display.size();
        let result = self.store.last_frame_image(width, height).map(|mut ghost| {
            if let Some(font) = &self.font {
                display::draw_banner(&mut ghost, font, message);
            }
            ghost
        });
        match result.and_then(|ghost| self.present_full(&ghost)) {
            Ok(()) => {
                for _ in 0..ERROR_HOLD_TICKS {
                    self.ticker.tick(self.config.playback.fps);
                }
            }
            Err(e) => warn!("Error banner render failed: {}", e),
        }
    }

    fn resume_idle(&mut self) {
        self.render_ghost();
        if let Err(e) = self.camera.start_preview() {
            warn!("Live preview unavailable: {}", e);
        }
    }

    fn cleanup(&mut self) -> Result<()> {
        info!("Shutting down: clearing frames and stopping the camera");
        let removed = self.store.delete_all()?;
        debug!("Removed {} frames at shutdown", removed);
        self.camera.stop_preview()?;
        Ok(())
    }
}
