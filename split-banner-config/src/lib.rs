//! Banner configuration parsing.
//!
//! The banner reads a small KDL file describing the responsive breakpoint and
//! the animation cadence. Every knob has a default matching the shipped
//! artwork, so an empty file is a valid configuration.
//!
//! ```kdl
//! breakpoint {
//!     max-width 1023
//! }
//!
//! animations {
//!     slowdown 2.0
//!     slide-duration-ms 3000
//!     step-delay-ms 1500
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use miette::{Context, IntoDiagnostic};
use tracing::debug;

#[derive(knuffel::Decode, Debug, Clone, PartialEq, Default)]
pub struct Config {
    #[knuffel(child, default)]
    pub breakpoint: Breakpoint,
    #[knuffel(child, default)]
    pub animations: Animations,
}

/// The viewport width at which the banner switches orientation.
///
/// Widths strictly above `max_width` lay the banner out horizontally;
/// everything at or below it gets the vertical (narrow) layout.
#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Breakpoint {
    #[knuffel(child, unwrap(argument), default = Self::default().max_width)]
    pub max_width: u16,
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self { max_width: 1023 }
    }
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Animations {
    /// Disables the slide cycle entirely; the banner still lays out.
    #[knuffel(child)]
    pub off: bool,
    /// Time multiplier for every animation; larger is slower.
    #[knuffel(child, unwrap(argument), default = Self::default().slowdown)]
    pub slowdown: f64,
    /// How long one tile pair takes to slide out of view.
    #[knuffel(child, unwrap(argument), default = Self::default().slide_duration_ms)]
    pub slide_duration_ms: u64,
    /// Pause between one pair finishing and the next pair starting.
    #[knuffel(child, unwrap(argument), default = Self::default().step_delay_ms)]
    pub step_delay_ms: u64,
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            off: false,
            slowdown: 1.,
            slide_duration_ms: 3000,
            step_delay_ms: 1500,
        }
    }
}

impl Animations {
    pub fn slide_duration(&self) -> Duration {
        Duration::from_millis(self.slide_duration_ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("config.kdl"),
            &contents,
        )
        .map_err(miette::Report::new)?;

        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        knuffel::parse(filename, text)
    }
}
