//! Configuration for the window overview and the home launcher gesture.
//!
//! The config is a KDL document. Every node is optional and falls back to the built-in
//! defaults, so an empty file is a valid config.

use std::ffi::OsStr;
use std::path::Path;

use miette::{Context, IntoDiagnostic};
use tracing::debug;

mod animations;

pub use animations::{Animation, AnimationPart, Animations, Curve};

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub overview: Overview,
    #[knuffel(child, default)]
    pub home_launcher: HomeLauncher,
    #[knuffel(child, default)]
    pub animations: Animations,
}

/// Overview grid geometry.
#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Overview {
    /// Gap around every window cell, in logical pixels.
    #[knuffel(child, unwrap(argument), default = Self::default().window_margin)]
    pub window_margin: i32,
    /// Upper limit for the height of a grid row, not counting the margins.
    #[knuffel(child, unwrap(argument), default = Self::default().max_row_height)]
    pub max_row_height: i32,
    /// Share of the smaller work area dimension used as the outer inset.
    #[knuffel(child, unwrap(argument), default = Self::default().inset_ratio)]
    pub inset_ratio: f64,
    /// Additional vertical inset, as a share of the height left after the outer inset.
    #[knuffel(child, unwrap(argument), default = Self::default().vertical_inset_ratio)]
    pub vertical_inset_ratio: f64,
    /// Height of the title header drawn above each window in the grid.
    #[knuffel(child, unwrap(argument), default = Self::default().header_height)]
    pub header_height: i32,
    /// Windows whose aspect ratio is beyond this are letterboxed or pillarboxed.
    #[knuffel(child, unwrap(argument), default = Self::default().extreme_window_ratio)]
    pub extreme_window_ratio: f64,
    /// Opacity of items that do not match the text filter.
    #[knuffel(child, unwrap(argument), default = Self::default().dimmed_opacity)]
    pub dimmed_opacity: f64,
}

impl Default for Overview {
    fn default() -> Self {
        Self {
            window_margin: 5,
            max_row_height: 512,
            inset_ratio: 0.05,
            vertical_inset_ratio: 0.1,
            header_height: 40,
            extreme_window_ratio: 2.,
            dimmed_opacity: 0.3,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct HomeLauncher {
    /// Width of the off-screen workspace relative to the work area.
    #[knuffel(child, unwrap(argument), default = Self::default().offscreen_width_ratio)]
    pub offscreen_width_ratio: f64,
    /// Opacity the workspace backdrop fades to while the launcher is shown.
    #[knuffel(child, unwrap(argument), default = Self::default().backdrop_target_opacity)]
    pub backdrop_target_opacity: f64,
}

impl Default for HomeLauncher {
    fn default() -> Self {
        Self {
            offscreen_width_ratio: 0.8,
            backdrop_target_opacity: 0.01,
        }
    }
}

/// Error returned when a config document fails to parse.
pub type ConfigParseError = knuffel::Error;

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, ConfigParseError> {
        knuffel::parse(filename, text)
    }
}
