mod overlay;
mod surface;

#[cfg(target_os = "linux")]
mod framebuffer;

pub use overlay::{draw_banner, splash_frame, OverlayFont};
pub use surface::{DisplaySurface, NullDisplay};

#[cfg(target_os = "linux")]
pub use framebuffer::FramebufferDisplay;
