mod controller;
mod mode;
mod ticker;

#[cfg(test)]
mod tests;

pub use controller::{BoothController, Peripherals};
pub use mode::AppMode;
pub use ticker::Ticker;
