//! Plot and grid configuration.
//!
//! Both structs carry working defaults. With the `config` feature they can
//! also be read from YAML; missing keys fall back to the defaults.

use crate::color::{Color, DEFAULT_PALETTE};
use crate::error::{Error, Result};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Space reserved around the plotting area for titles, ticks and labels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize), serde(default))]
pub struct Margins {
    /// Left margin (y axis title and tick values).
    pub left: f32,
    /// Top margin (plot name).
    pub top: f32,
    /// Right margin (label toggle button).
    pub right: f32,
    /// Bottom margin (x axis title and tick values).
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 90.0,
            top: 30.0,
            right: 40.0,
            bottom: 60.0,
        }
    }
}

/// Per-plot settings applied when a plot is created.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize), serde(default))]
pub struct PlotConfig {
    /// Fixed margins around the plotting area.
    pub margins: Margins,
    /// Manual x range used until auto-ranging is enabled.
    pub x_range: (f32, f32),
    /// Manual y range used until auto-ranging is enabled.
    pub y_range: (f32, f32),
    /// Major subdivisions per axis; each has four ticks.
    pub subdivisions: usize,
    /// Curve colors, cycled in curve order.
    pub palette: Vec<Color>,
    /// Extra width added to the widest curve label in the label panel.
    pub label_padding: f32,
    /// Vertical distance between two entries of the label panel.
    pub label_row_height: f32,
    /// Length of the color swatch drawn next to each label.
    pub swatch_length: f32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            x_range: (0.0, 10.0),
            y_range: (0.0, 10.0),
            subdivisions: 6,
            palette: DEFAULT_PALETTE.to_vec(),
            label_padding: 40.0,
            label_row_height: 16.0,
            swatch_length: 20.0,
        }
    }
}

impl PlotConfig {
    /// Set the number of subdivisions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubdivisions`] if `subdivisions` is zero.
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Result<Self> {
        if subdivisions == 0 {
            return Err(Error::InvalidSubdivisions(subdivisions));
        }
        self.subdivisions = subdivisions;
        Ok(self)
    }

    /// Set the curve palette.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPalette`] if `palette` is empty.
    pub fn with_palette(mut self, palette: Vec<Color>) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::EmptyPalette);
        }
        self.palette = palette;
        Ok(self)
    }

    /// Set the manual axis ranges.
    #[must_use]
    pub fn with_ranges(mut self, x_range: (f32, f32), y_range: (f32, f32)) -> Self {
        self.x_range = x_range;
        self.y_range = y_range;
        self
    }

    /// Set the margins.
    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Check the invariants the builders enforce (useful after deserializing).
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.subdivisions == 0 {
            return Err(Error::InvalidSubdivisions(self.subdivisions));
        }
        if self.palette.is_empty() {
            return Err(Error::EmptyPalette);
        }
        Ok(())
    }
}

/// Settings of a plot grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize), serde(default))]
pub struct GridConfig {
    /// Nominal width of one plot cell; the window minimum is `cols * plot_width`.
    pub plot_width: u32,
    /// Nominal height of one plot cell; the window minimum is `rows * plot_height`.
    pub plot_height: u32,
    /// Auto-refresh period started with the grid, 0 = disabled.
    pub auto_refresh_ms: u64,
    /// Settings for every plot the grid creates.
    pub plot: PlotConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            plot_width: 655,
            plot_height: 450,
            auto_refresh_ms: 0,
            plot: PlotConfig::default(),
        }
    }
}

impl GridConfig {
    /// Set the nominal plot cell size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either side is zero.
    pub fn with_plot_size(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        self.plot_width = width;
        self.plot_height = height;
        Ok(self)
    }

    /// Start auto-refresh with this period when the grid is created.
    #[must_use]
    pub fn with_auto_refresh(mut self, period_ms: u64) -> Self {
        self.auto_refresh_ms = period_ms;
        self
    }

    /// Use these settings for every plot.
    #[must_use]
    pub fn with_plot_config(mut self, plot: PlotConfig) -> Self {
        self.plot = plot;
        self
    }

    /// Check the grid and plot invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.plot_width == 0 || self.plot_height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.plot_width,
                height: self.plot_height,
            });
        }
        self.plot.validate()
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed YAML or invalid values.
    #[cfg(feature = "config")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(yaml_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Config`]
    /// if its content is invalid.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    #[cfg(feature = "config")]
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(yaml_error)
    }
}

#[cfg(feature = "config")]
fn yaml_error(err: serde_yaml_ng::Error) -> Error {
    Error::Config(err.to_string())
}
