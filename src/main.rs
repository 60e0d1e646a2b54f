use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use framebooth::{
    BoothConfig, BoothController, ButtonPad, CameraDevice, DisplaySurface, FfmpegEncoder,
    InertButtonPad, NullDisplay, PatternCamera, Peripherals, RpicamCamera, TerminalKeyboard,
};

#[derive(Parser, Debug)]
#[command(name = "framebooth")]
#[command(about = "Button-driven stop-motion animation capture booth")]
#[command(version)]
#[command(long_about = "A stop-motion capture booth for a Raspberry Pi photo rig: \
six physical buttons (with keyboard equivalents) drive frame capture, ghost-frame \
preview, in-booth playback, and movie assembly through an external encoder.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "booth.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the booth")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Run without camera, buttons, or panel hardware
    #[arg(long, help = "Drive the booth from the keyboard alone, with a synthetic camera")]
    keyboard_only: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config();
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting framebooth v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match BoothConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate()?;

    let camera: Box<dyn CameraDevice> = if args.keyboard_only {
        let (width, height) = config.display.resolution;
        Box::new(PatternCamera::new(width, height))
    } else {
        Box::new(RpicamCamera::new(config.camera.clone()))
    };

    let buttons: Box<dyn ButtonPad> = build_button_pad(&config, args.keyboard_only);
    let display: Box<dyn DisplaySurface> = build_display(&config, args.keyboard_only);
    let keyboard = TerminalKeyboard::new()?;
    let encoder = FfmpegEncoder::new(config.movies.encoder.clone());

    let peripherals = Peripherals {
        camera,
        buttons,
        keyboard: Box::new(keyboard),
        display,
        encoder: Box::new(encoder),
    };

    let mut controller = BoothController::new(config, peripherals)?;
    controller.run()?;

    info!("Booth shut down");
    Ok(())
}

fn build_button_pad(config: &BoothConfig, keyboard_only: bool) -> Box<dyn ButtonPad> {
    if keyboard_only {
        return Box::new(InertButtonPad);
    }

    #[cfg(all(target_os = "linux", feature = "gpio-buttons"))]
    {
        match framebooth::GpioButtonPad::open(
            &config.input.device,
            config.input.buttons.all(),
        ) {
            Ok(pad) => return Box::new(pad),
            Err(e) => tracing::warn!("Button pad unavailable, keyboard only: {}", e),
        }
    }

    let _ = config;
    Box::new(InertButtonPad)
}

fn build_display(config: &BoothConfig, keyboard_only: bool) -> Box<dyn DisplaySurface> {
    let (width, height) = config.display.resolution;

    if !keyboard_only {
        #[cfg(target_os = "linux")]
        {
            match framebooth::FramebufferDisplay::open(
                &config.display.framebuffer_device,
                width,
                height,
            ) {
                Ok(display) => return Box::new(display),
                Err(e) => tracing::warn!("Framebuffer unavailable, running headless: {}", e),
            }
        }
    }

    Box::new(NullDisplay::new(width, height))
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("framebooth={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_target(true).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() {
    let default_config = r#"# Framebooth Configuration File
# This is the default configuration with all available options

[frames]
# Directory holding the numbered frame JPEGs
path = "./frames"

[movies]
# Directory receiving encoded movies
path = "./movies"
# Frame rate of the encoded movie
fps = 5
# Encoder binary to spawn
encoder = "ffmpeg"
# Write a JSON sidecar next to each movie
save_metadata = false

[playback]
# Tick rate of the control loop and in-booth frame playback
fps = 10

[input]
# Input device exposing the physical buttons (gpio-keys)
device = "/dev/input/event0"

[input.buttons]
# Key codes reported by the button device, one per booth function
delete = 2
preview = 3
erase = 4
capture = 5
save = 6
exit = 13

[display]
# Framebuffer device path
framebuffer_device = "/dev/fb0"
# Display resolution (width, height)
resolution = [800, 480]
# Path to TrueType font file for on-screen text
font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
# Font size for on-screen text
font_size = 24.0
# Ticks between title-screen splash alternations
splash_cycle_ticks = 15

[camera]
# Command line used to capture a still (output path is appended)
still_command = "rpicam-still --immediate --nopreview -o"
# Command line spawned for the live preview
preview_command = "rpicam-hello -t 0"
# Preview overlay opacity, 0-255
preview_alpha = 128
"#;

    println!("{}", default_config);
}
