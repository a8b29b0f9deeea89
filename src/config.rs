//! Configuration for the line-selection plot and its window.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::x_formatter::AxisFormatter;
use crate::error::{PlotError, Result};

/// Settings shared by [`LineSelectPlot`](crate::LineSelectPlot) and the standalone app.
///
/// Every field has a default, so a YAML file only needs the keys it changes:
///
/// ```
/// # use flightline_plot::LineSelectConfig;
/// let cfg = LineSelectConfig::from_yaml_str("rows: 3\nsharex: false\n").unwrap();
/// assert_eq!(cfg.rows, 3);
/// assert!(!cfg.sharex);
/// assert_eq!(cfg.proximity, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSelectConfig {
    /// Window title.
    pub title: String,
    /// Number of stacked plot rows.
    pub rows: usize,
    /// Give every row an independent right-hand y axis.
    pub multiy: bool,
    /// Keep the x range of all rows identical.
    pub sharex: bool,
    /// Fraction of the visible span around an existing boundary in which a
    /// click does not create a new segment.
    pub proximity: f64,
    /// Half-width of a click-created segment as a fraction of the visible span.
    pub click_width: f64,
    /// Pointer distance (pixels) at which a boundary can be grabbed.
    pub boundary_tolerance_px: f32,
    /// Bottom-axis formatter applied to every row at startup.
    pub x_formatter: AxisFormatter,
    /// Initial window size in logical pixels.
    pub window_size: [f32; 2],
}

impl Default for LineSelectConfig {
    fn default() -> Self {
        Self {
            title: "Flight Line Selection".to_string(),
            rows: 2,
            multiy: false,
            sharex: true,
            proximity: 0.1,
            click_width: 0.05,
            boundary_tolerance_px: 6.0,
            x_formatter: AxisFormatter::DateTime,
            window_size: [1400.0, 900.0],
        }
    }
}

impl LineSelectConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self =
            serde_yaml::from_str(text).map_err(|e| PlotError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PlotError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| PlotError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(PlotError::Config("rows must be at least 1".into()));
        }
        if !(self.proximity.is_finite() && self.proximity >= 0.0) {
            return Err(PlotError::Config(format!(
                "proximity must be a non-negative fraction, got {}",
                self.proximity
            )));
        }
        if !(self.click_width.is_finite() && self.click_width > 0.0) {
            return Err(PlotError::Config(format!(
                "click_width must be positive, got {}",
                self.click_width
            )));
        }
        Ok(())
    }
}
