//! THMI Display Tool
//!
//! Runs the demo programs on a simulated T-HMI panel, saving PNG
//! screenshots, and converts TrueType fonts and images into the driver's
//! font and bitmap formats.

mod config;
mod convert;
mod demos;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thmi_hw::bus::out1_set_masks;
use thmi_hw::color::parse_hex_color;
use thmi_hw::font::bundled;
use thmi_hw::{Bitmap, ProportionalFont, Rotation};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use session::Session;

#[derive(Parser)]
#[command(name = "thmictl")]
#[command(about = "Demo runner and asset converter for the T-HMI display driver")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// Override the configured rotation (portrait, landscape, inverted-portrait, inverted-landscape or 0-3)
    #[arg(long, global = true, value_parser = parse_rotation)]
    rotation: Option<Rotation>,

    /// Override the screenshot directory
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Delay between demo frames in milliseconds
    #[arg(long, global = true, default_value = "0")]
    delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a demo program
    Demo {
        #[command(subcommand)]
        demo: DemoCommands,
    },
    /// Draw text in a bundled bitmap font
    Text {
        /// Text to draw
        text: String,

        /// Font name: basic_8x8, basic_8x16, basic_16x16, basic_16x32
        #[arg(long, default_value = "basic_8x16")]
        font: String,

        #[arg(long, default_value = "0")]
        x: i32,

        #[arg(long, default_value = "0")]
        y: i32,

        /// Foreground color in hex format (e.g., #FF0000 for red)
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        fg: u16,

        /// Background color in hex format
        #[arg(long, default_value = "#000000", value_parser = parse_color)]
        bg: u16,
    },
    /// Draw text in a converted proportional font
    Write {
        /// Text to draw
        text: String,

        /// Converted font (JSON)
        #[arg(long)]
        font: PathBuf,

        #[arg(long, default_value = "0")]
        x: i32,

        #[arg(long, default_value = "0")]
        y: i32,

        /// Center the text horizontally, ignoring --x
        #[arg(long)]
        center: bool,

        /// Foreground color in hex format
        #[arg(long, default_value = "#FFFFFF", value_parser = parse_color)]
        fg: u16,

        /// Background color in hex format
        #[arg(long, default_value = "#000000", value_parser = parse_color)]
        bg: u16,
    },
    /// Draw a frame of a converted bitmap
    Blit {
        /// Converted bitmap (JSON)
        bitmap: PathBuf,

        /// Frame index
        #[arg(long, default_value = "0")]
        index: usize,

        #[arg(long, default_value = "0")]
        x: i32,

        #[arg(long, default_value = "0")]
        y: i32,
    },
    /// Convert a TrueType font to the proportional font format
    ConvertFont {
        /// TrueType font file
        ttf: PathBuf,

        /// Glyph height in pixels
        #[arg(long)]
        height: u16,

        /// Characters to include (default: printable ASCII)
        #[arg(long)]
        chars: Option<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert an image to the palette bitmap format
    ConvertImage {
        /// Input image
        image: PathBuf,

        /// Bits per pixel (1-8)
        #[arg(long, default_value = "4")]
        bpp: u8,

        /// Number of equal-width frames laid out horizontally
        #[arg(long, default_value = "1")]
        frames_horizontal: u32,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show the effective configuration
    Info {
        /// Also write the effective configuration to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DemoCommands {
    /// Random lines and filled rectangles
    Lines {
        #[arg(long, default_value = "100")]
        frames: usize,

        /// Save a screenshot every N frames
        #[arg(long)]
        every: Option<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// "Hello!" at random positions in each rotation
    Hello {
        #[arg(long, default_value = "1")]
        frames: usize,

        /// Bundled font name
        #[arg(long, default_value = "basic_16x32")]
        font: String,

        /// Save a screenshot of every rotation of every N-th frame
        #[arg(long)]
        every: Option<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Proportional font showcase
    Fonts {
        /// Converted fonts (JSON), one line each
        #[arg(long = "font", required = true)]
        fonts: Vec<PathBuf>,

        /// Sample text (default: each font's file name)
        #[arg(long)]
        text: Option<String>,
    },
    /// Hardware vertical scrolling
    Scroll {
        #[arg(long, default_value = "32")]
        frames: usize,

        /// Lines scrolled per frame
        #[arg(long, default_value = "10")]
        step: u16,

        /// Save a screenshot every N frames
        #[arg(long)]
        every: Option<usize>,
    },
}

fn parse_color(s: &str) -> std::result::Result<u16, String> {
    parse_hex_color(s).ok_or_else(|| format!("invalid color '{}', expected #RRGGBB", s))
}

fn parse_rotation(s: &str) -> std::result::Result<Rotation, String> {
    s.parse::<Rotation>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::load_or_default(&cli.config).context("Failed to load configuration")?;
    if let Some(rotation) = cli.rotation {
        config.display.rotation = rotation;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }

    match cli.command {
        Commands::Demo { demo } => handle_demo(demo, &config, cli.delay_ms).await,
        Commands::Text {
            text,
            font,
            x,
            y,
            fg,
            bg,
        } => handle_text(&config, &text, &font, x, y, fg, bg),
        Commands::Write {
            text,
            font,
            x,
            y,
            center,
            fg,
            bg,
        } => handle_write(&config, &text, &font, x, y, center, fg, bg),
        Commands::Blit {
            bitmap,
            index,
            x,
            y,
        } => handle_blit(&config, &bitmap, index, x, y),
        Commands::ConvertFont {
            ttf,
            height,
            chars,
            output,
        } => handle_convert_font(&ttf, height, chars.as_deref(), &output),
        Commands::ConvertImage {
            image,
            bpp,
            frames_horizontal,
            output,
        } => handle_convert_image(&image, bpp, frames_horizontal, &output),
        Commands::Info { save } => handle_info(&config, save.as_deref()),
    }
}

fn open_session(config: &Config, delay_ms: u64) -> Result<Session> {
    Session::new(
        &config.display,
        &config.output.dir,
        config.output.scale,
        delay_ms,
    )
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_saved(session: &Session) {
    for path in session.saved() {
        println!("Saved {}", path.display());
    }
}

async fn handle_demo(demo: DemoCommands, config: &Config, delay_ms: u64) -> Result<()> {
    let mut session = open_session(config, delay_ms)?;
    session.listen_for_ctrl_c();

    match demo {
        DemoCommands::Lines {
            frames,
            every,
            seed,
        } => {
            info!("Running lines demo ({} frames)", frames);
            demos::lines::run(&mut session, &mut rng(seed), frames, every).await?;
        }
        DemoCommands::Hello {
            frames,
            font,
            every,
            seed,
        } => {
            let font = bundled::by_name(&font).with_context(|| {
                format!(
                    "Unknown font: {}. Use: {}",
                    font,
                    bundled::NAMES.join(", ")
                )
            })?;
            info!("Running hello demo ({} frames)", frames);
            demos::hello::run(&mut session, &mut rng(seed), font, frames, every).await?;
        }
        DemoCommands::Fonts { fonts, text } => {
            info!("Running fonts demo ({} fonts)", fonts.len());
            demos::fonts::run(&mut session, &fonts, text.as_deref())?;
        }
        DemoCommands::Scroll {
            frames,
            step,
            every,
        } => {
            info!("Running scroll demo ({} frames)", frames);
            demos::scroll::run(&mut session, frames, step, every).await?;
        }
    }

    print_saved(&session);
    Ok(())
}

fn handle_text(
    config: &Config,
    text: &str,
    font: &str,
    x: i32,
    y: i32,
    fg: u16,
    bg: u16,
) -> Result<()> {
    let font = bundled::by_name(font).with_context(|| {
        format!(
            "Unknown font: {}. Use: {}",
            font,
            bundled::NAMES.join(", ")
        )
    })?;
    let mut session = open_session(config, 0)?;
    session.display.clear(false)?;
    session.display.text(font, text, x, y, fg, bg)?;
    session.snapshot("text")?;
    print_saved(&session);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_write(
    config: &Config,
    text: &str,
    font: &Path,
    x: i32,
    y: i32,
    center: bool,
    fg: u16,
    bg: u16,
) -> Result<()> {
    let font = ProportionalFont::load(font)
        .with_context(|| format!("Failed to load font {}", font.display()))?;
    let mut session = open_session(config, 0)?;
    let display = &mut session.display;
    display.clear(false)?;
    let x = if center {
        demos::fonts::centre(display.width(), display.write_width(&font, text))
    } else {
        x
    };
    display.write(&font, text, x, y, fg, bg)?;
    session.snapshot("write")?;
    print_saved(&session);
    Ok(())
}

fn handle_blit(config: &Config, path: &Path, index: usize, x: i32, y: i32) -> Result<()> {
    let bitmap = Bitmap::load(path)
        .with_context(|| format!("Failed to load bitmap {}", path.display()))?;
    let mut session = open_session(config, 0)?;
    session.display.clear(false)?;
    session.display.bitmap(&bitmap, x, y, index)?;
    session.snapshot(&format!("blit-{index}"))?;
    print_saved(&session);
    Ok(())
}

fn handle_convert_font(ttf: &Path, height: u16, chars: Option<&str>, output: &Path) -> Result<()> {
    let data = std::fs::read(ttf).with_context(|| format!("Failed to read {}", ttf.display()))?;
    let chars = chars
        .map(str::to_string)
        .unwrap_or_else(convert::font::default_chars);
    let font = convert::font::convert(&data, height, &chars)?;
    font.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Converted {} glyphs ({} bytes of bitmap) to {}",
        font.len(),
        font.bitmaps.len(),
        output.display()
    );
    Ok(())
}

fn handle_convert_image(image: &Path, bpp: u8, frames: u32, output: &Path) -> Result<()> {
    let bitmap = convert::bitmap::convert_file(image, bpp, frames)?;
    bitmap
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Converted {}x{} x{} frames, {} colors to {}",
        bitmap.width,
        bitmap.height,
        bitmap.count,
        bitmap.palette.len(),
        output.display()
    );
    Ok(())
}

fn handle_info(config: &Config, save: Option<&Path>) -> Result<()> {
    let madctls = config.display.madctls();
    println!("Display:");
    println!("  Rotation: {}", config.display.rotation);
    println!("  Inverted: {}", if config.display.inverted { "yes" } else { "no" });
    println!("  Color mode: {:#04x}", config.display.color_mode);
    println!("Rotations:");
    for rotation in Rotation::ALL {
        let (width, height) = rotation.dimensions();
        println!(
            "  {} {}: {}x{} (MADCTL {:#04x})",
            rotation.index(),
            rotation,
            width,
            height,
            rotation.madctl(&madctls)
        );
    }
    let masks = out1_set_masks(config.bus.data_pins);
    println!("Bus:");
    println!("  Data pins: {:?}", config.bus.data_pins);
    println!("  OUT1 data mask: {:#010x}", masks[0xFF]);
    println!(
        "  WR: GPIO{}  DC: GPIO{}  CS: GPIO{}",
        config.bus.wr, config.bus.dc, config.bus.cs
    );
    println!(
        "  Backlight: GPIO{}  Power: GPIO{}",
        config.bus.backlight, config.bus.power
    );
    println!("  Pulse width: {}", config.bus.pulse);
    println!("Output:");
    println!("  Directory: {}", config.output.dir.display());
    println!("  Scale: {}x", config.output.scale);

    if let Some(path) = save {
        config.save(path)?;
        println!("Configuration written to {}", path.display());
    }
    Ok(())
}
