use crate::error::Result;
use std::collections::BTreeSet;

/// Contract for the physical button panel: the set of key codes currently
/// held, sampled once per tick. The core polls, it never subscribes.
pub trait ButtonPad {
    fn held(&mut self) -> Result<BTreeSet<u16>>;
}

/// Button pad with no hardware behind it, for keyboard-only operation.
pub struct InertButtonPad;

impl ButtonPad for InertButtonPad {
    fn held(&mut self) -> Result<BTreeSet<u16>> {
        Ok(BTreeSet::new())
    }
}

#[cfg(all(target_os = "linux", feature = "gpio-buttons"))]
pub use self::gpio::GpioButtonPad;

#[cfg(all(target_os = "linux", feature = "gpio-buttons"))]
mod gpio {
    use super::ButtonPad;
    use crate::error::{BoothError, Result};
    use std::collections::BTreeSet;
    use tracing::info;

    /// Physical buttons wired through a gpio-keys overlay, read as an evdev
    /// device. Only the configured key codes are reported; anything else the
    /// device emits is ignored.
    pub struct GpioButtonPad {
        device: evdev::Device,
        watched: BTreeSet<u16>,
    }

    impl GpioButtonPad {
        pub fn open(path: &str, watched: impl IntoIterator<Item = u16>) -> Result<Self> {
            let device = evdev::Device::open(path).map_err(|e| {
                BoothError::component(
                    "buttons".to_string(),
                    format!("Failed to open input device '{}': {}", path, e),
                )
            })?;
            info!(
                "Button pad on {} ({})",
                path,
                device.name().unwrap_or("unnamed device")
            );
            Ok(Self {
                device,
                watched: watched.into_iter().collect(),
            })
        }
    }

    impl ButtonPad for GpioButtonPad {
        fn held(&mut self) -> Result<BTreeSet<u16>> {
            let state = self.device.get_key_state().map_err(|e| {
                BoothError::component(
                    "buttons".to_string(),
                    format!("Failed to read key state: {}", e),
                )
            })?;
            Ok(state
                .iter()
                .map(|key| key.code())
                .filter(|code| self.watched.contains(code))
                .collect())
        }
    }
}
