pub mod app;
pub mod buttons;
pub mod camera;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod keyboard;
pub mod movie;
pub mod store;
pub mod textinput;

#[cfg(test)]
pub(crate) mod testutil;

pub use app::{AppMode, BoothController, Peripherals, Ticker};
pub use buttons::{ButtonPad, InertButtonPad};
pub use camera::{CameraDevice, PatternCamera, RpicamCamera};
pub use config::BoothConfig;
pub use display::{DisplaySurface, NullDisplay, OverlayFont};
pub use error::{BoothError, Result};
pub use input::{Action, InputMap};
pub use keyboard::{Keyboard, TerminalKeyboard};
pub use movie::{FfmpegEncoder, MovieBuilder, MovieEncoder, MovieMetadata};
pub use store::FrameStore;
pub use textinput::TextEntry;

#[cfg(all(target_os = "linux", feature = "gpio-buttons"))]
pub use buttons::GpioButtonPad;

#[cfg(target_os = "linux")]
pub use display::FramebufferDisplay;
