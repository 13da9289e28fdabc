//! Sandfall: falling-block puzzle in the terminal where locked pieces crumble into sand.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use sandfall::SessionConfig;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded, using defaults: {e}");
        theme::Theme::default_for_palette(args.palette)
    });
    let config = args.session_config();
    config.validate().context("invalid game settings")?;
    log::info!(
        "starting {}x{} cells (scale {}), seed {}",
        config.width,
        config.height,
        config.unit,
        config.seed
    );
    let mut app = App::new(args, config, theme)?;
    app.run()
}

/// The terminal belongs to the UI, so records only go to a file when asked.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Falling blocks that turn into sand when they land.
#[derive(Debug, Parser)]
#[command(
    name = "sandfall",
    version,
    about = "Falling-block puzzle in the terminal. Pieces crumble into sand when they lock; fill rows to clear them.",
    long_about = "Sandfall is a terminal puzzle game in the spirit of Sandtrix.\n\n\
        Steer falling pieces. When one locks it turns into loose sand that keeps sliding \
        down and sideways. Any row that is (nearly) full is cleared and the sand above \
        pours into the gap.\n\n\
        CONTROLS:\n  Left/Right  Move    Up        Rotate      Down       Soft drop\n  \
        Enter/Space Hard drop   P          Pause       R          Restart (after game over)\n  \
        Q / Esc     Quit\n\n\
        Vim-style: h/l move, k rotate, j soft drop."
)]
pub struct Args {
    /// Playfield width in piece cells.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: u16,

    /// Playfield height in piece cells.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// Sand grains per piece cell along each axis (1 = plain blocks).
    #[arg(short, long, default_value = "2", value_name = "N")]
    pub scale: u16,

    /// Milliseconds between automatic piece falls.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub fall_ms: u64,

    /// Milliseconds between sand settling steps.
    #[arg(long, default_value = "10", value_name = "MS")]
    pub sand_ms: u64,

    /// Percentage of a row that must be sand for it to clear.
    #[arg(long, default_value = "95", value_name = "PCT")]
    pub threshold: u8,

    /// Points per cleared row.
    #[arg(long, default_value = "100", value_name = "N")]
    pub points: u32,

    /// Random seed; defaults to the current time.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]="value").
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Disable the fade on cleared rows.
    #[arg(long)]
    pub no_animation: bool,

    /// Write log records to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Session settings for a `width` x `height` board of piece cells.
    pub fn session_config_for(&self, width: u16, height: u16) -> SessionConfig {
        let unit = usize::from(self.scale);
        let seed = self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        });
        SessionConfig {
            width: usize::from(width) * unit,
            height: usize::from(height) * unit,
            unit,
            fall_interval: Duration::from_millis(self.fall_ms),
            sand_interval: Duration::from_millis(self.sand_ms),
            clear_threshold_pct: self.threshold,
            points_per_row: self.points,
            seed,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        self.session_config_for(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
