// Defaults applied by the plot context when it creates figures

use std::env;

use log::warn;

/// Context-wide defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// Prefix of the title given to keyed figures created without one.
    pub title_prefix: String,
    pub width: u32,
    pub height: u32,
    pub animation_duration: u32,
    /// Whether drawing calls create axes unless told otherwise.
    pub draw_axes: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            title_prefix: "Figure".to_string(),
            width: 800,
            height: 500,
            animation_duration: 0,
            draw_axes: true,
        }
    }
}

impl PlotConfig {
    /// Defaults overridden by `PLOTCTX_TITLE_PREFIX`, `PLOTCTX_WIDTH` and
    /// `PLOTCTX_HEIGHT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(prefix) = env::var("PLOTCTX_TITLE_PREFIX") {
            config.title_prefix = prefix;
        }
        if let Some(width) = read_dimension("PLOTCTX_WIDTH") {
            config.width = width;
        }
        if let Some(height) = read_dimension("PLOTCTX_HEIGHT") {
            config.height = height;
        }
        config
    }

    pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn animation_duration(mut self, millis: u32) -> Self {
        self.animation_duration = millis;
        self
    }

    pub fn draw_axes(mut self, enabled: bool) -> Self {
        self.draw_axes = enabled;
        self
    }

    /// Title for a figure created under `key`.
    pub fn default_title(&self, key: &str) -> String {
        format!("{} {}", self.title_prefix, key)
    }
}

fn read_dimension(var: &str) -> Option<u32> {
    let raw = env::var(var).ok()?;
    match raw.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a pixel count", var, raw);
            None
        }
    }
}
