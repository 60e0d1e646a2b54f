use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BoothConfig {
    pub frames: FramesConfig,
    pub movies: MoviesConfig,
    pub playback: PlaybackConfig,
    pub input: InputConfig,
    pub display: DisplayConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FramesConfig {
    /// Directory holding the numbered frame JPEGs
    #[serde(default = "default_frames_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MoviesConfig {
    /// Directory receiving encoded movies
    #[serde(default = "default_movies_path")]
    pub path: String,

    /// Frame rate of the encoded movie
    #[serde(default = "default_movie_fps")]
    pub fps: u32,

    /// Encoder binary to spawn
    #[serde(default = "default_encoder_program")]
    pub encoder: String,

    /// Write a JSON sidecar next to each movie
    #[serde(default = "default_save_metadata")]
    pub save_metadata: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlaybackConfig {
    /// Tick rate of the control loop and in-booth frame playback
    #[serde(default = "default_playback_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InputConfig {
    /// Input device exposing the physical buttons (gpio-keys)
    #[serde(default = "default_input_device")]
    pub device: String,

    pub buttons: ButtonsConfig,
}

/// Key codes reported by the button device, one per booth function.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ButtonsConfig {
    #[serde(default = "default_button_delete")]
    pub delete: u16,

    #[serde(default = "default_button_preview")]
    pub preview: u16,

    #[serde(default = "default_button_erase")]
    pub erase: u16,

    #[serde(default = "default_button_capture")]
    pub capture: u16,

    #[serde(default = "default_button_save")]
    pub save: u16,

    #[serde(default = "default_button_exit")]
    pub exit: u16,
}

impl ButtonsConfig {
    /// All configured key codes, in table order.
    pub fn all(&self) -> [u16; 6] {
        [
            self.delete,
            self.preview,
            self.erase,
            self.capture,
            self.save,
            self.exit,
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Framebuffer device path
    #[serde(default = "default_framebuffer_device")]
    pub framebuffer_device: String,

    /// Display resolution (width, height)
    #[serde(default = "default_display_resolution")]
    pub resolution: (u32, u32),

    /// Path to TrueType font file for on-screen text
    #[serde(default = "default_font_path")]
    pub font_path: String,

    /// Font size for on-screen text
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Ticks between title-screen splash alternations
    #[serde(default = "default_splash_cycle_ticks")]
    pub splash_cycle_ticks: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Command line used to capture a still (output path is appended)
    #[serde(default = "default_still_command")]
    pub still_command: String,

    /// Command line spawned for the live preview
    #[serde(default = "default_preview_command")]
    pub preview_command: String,

    /// Preview overlay opacity, 0-255
    #[serde(default = "default_preview_alpha")]
    pub preview_alpha: u8,
}

impl BoothConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("booth.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("frames.path", default_frames_path())?
            .set_default("movies.path", default_movies_path())?
            .set_default("movies.fps", default_movie_fps())?
            .set_default("movies.encoder", default_encoder_program())?
            .set_default("movies.save_metadata", default_save_metadata())?
            .set_default("playback.fps", default_playback_fps())?
            .set_default("input.device", default_input_device())?
            .set_default("input.buttons.delete", default_button_delete() as i64)?
            .set_default("input.buttons.preview", default_button_preview() as i64)?
            .set_default("input.buttons.erase", default_button_erase() as i64)?
            .set_default("input.buttons.capture", default_button_capture() as i64)?
            .set_default("input.buttons.save", default_button_save() as i64)?
            .set_default("input.buttons.exit", default_button_exit() as i64)?
            .set_default("display.framebuffer_device", default_framebuffer_device())?
            .set_default(
                "display.resolution",
                vec![
                    default_display_resolution().0,
                    default_display_resolution().1,
                ],
            )?
            .set_default("display.font_path", default_font_path())?
            .set_default("display.font_size", default_font_size() as f64)?
            .set_default(
                "display.splash_cycle_ticks",
                default_splash_cycle_ticks() as i64,
            )?
            .set_default("camera.still_command", default_still_command())?
            .set_default("camera.preview_command", default_preview_command())?
            .set_default("camera.preview_alpha", default_preview_alpha() as i64)?
            .add_source(File::with_name(&path_str).required(false))
            .add_source(Environment::with_prefix("BOOTH").separator("_"))
            .build()?;

        let config: BoothConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.movies.fps == 0 {
            return Err(ConfigError::Message(
                "Movie fps must be greater than 0".to_string(),
            ));
        }

        if self.playback.fps == 0 {
            return Err(ConfigError::Message(
                "Playback fps must be greater than 0".to_string(),
            ));
        }

        if self.movies.encoder.trim().is_empty() {
            return Err(ConfigError::Message(
                "Encoder program must not be empty".to_string(),
            ));
        }

        if self.display.resolution.0 == 0 || self.display.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Display resolution must be greater than 0".to_string(),
            ));
        }

        if self.display.font_size <= 0.0 {
            return Err(ConfigError::Message(
                "Font size must be greater than 0".to_string(),
            ));
        }

        if self.display.splash_cycle_ticks == 0 {
            return Err(ConfigError::Message(
                "Splash cycle ticks must be greater than 0".to_string(),
            ));
        }

        let buttons: BTreeSet<u16> = self.input.buttons.all().into_iter().collect();
        if buttons.len() != 6 {
            return Err(ConfigError::Message(
                "Button key codes must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            frames: FramesConfig {
                path: default_frames_path(),
            },
            movies: MoviesConfig {
                path: default_movies_path(),
                fps: default_movie_fps(),
                encoder: default_encoder_program(),
                save_metadata: default_save_metadata(),
            },
            playback: PlaybackConfig {
                fps: default_playback_fps(),
            },
            input: InputConfig {
                device: default_input_device(),
                buttons: ButtonsConfig {
                    delete: default_button_delete(),
                    preview: default_button_preview(),
                    erase: default_button_erase(),
                    capture: default_button_capture(),
                    save: default_button_save(),
                    exit: default_button_exit(),
                },
            },
            display: DisplayConfig {
                framebuffer_device: default_framebuffer_device(),
                resolution: default_display_resolution(),
                font_path: default_font_path(),
                font_size: default_font_size(),
                splash_cycle_ticks: default_splash_cycle_ticks(),
            },
            camera: CameraConfig {
                still_command: default_still_command(),
                preview_command: default_preview_command(),
                preview_alpha: default_preview_alpha(),
            },
        }
    }
}

// Default value functions
fn default_frames_path() -> String {
    "./frames".to_string()
}
fn default_movies_path() -> String {
    "./movies".to_string()
}
fn default_movie_fps() -> u32 {
    5
}
fn default_encoder_program() -> String {
    "ffmpeg".to_string()
}
fn default_save_metadata() -> bool {
    false
}

fn default_playback_fps() -> u32 {
    10
}

fn default_input_device() -> String {
    "/dev/input/event0".to_string()
}
fn default_button_delete() -> u16 {
    2
}
fn default_button_preview() -> u16 {
    3
}
fn default_button_erase() -> u16 {
    4
}
fn default_button_capture() -> u16 {
    5
}
fn default_button_save() -> u16 {
    6
}
fn default_button_exit() -> u16 {
    13
}

fn default_framebuffer_device() -> String {
    "/dev/fb0".to_string()
}
fn default_display_resolution() -> (u32, u32) {
    (800, 480)
}
fn default_font_path() -> String {
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string()
}
fn default_font_size() -> f32 {
    24.0
}
fn default_splash_cycle_ticks() -> u32 {
    15
}

fn default_still_command() -> String {
    "rpicam-still --immediate --nopreview -o".to_string()
}
fn default_preview_command() -> String {
    "rpicam-hello -t 0".to_string()
}
fn default_preview_alpha() -> u8 {
    128
}
