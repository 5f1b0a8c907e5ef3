//! Rendering defaults that can be stored alongside an application's
//! own settings as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{BlendMode, Color};
use crate::draw::{beziers_points, curve_closed_points, curve_points, LineAlgorithm, DEFAULT_STEP_FACTOR};
use crate::error::Result;
use crate::surface::BitmapContext;

/// Catmull-Rom tension
pub const DEFAULT_TENSION: f32 = 0.5;

fn default_step_factor() -> f32 {
    DEFAULT_STEP_FACTOR
}

fn default_tension() -> f32 {
    DEFAULT_TENSION
}

/// Defaults for the configurable drawing entry points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Curve tessellation step factor (larger means fewer segments)
    #[serde(default = "default_step_factor")]
    pub step_factor: f32,
    #[serde(default)]
    pub line_algorithm: LineAlgorithm,
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Cardinal spline tension
    #[serde(default = "default_tension")]
    pub tension: f32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            step_factor: DEFAULT_STEP_FACTOR,
            line_algorithm: LineAlgorithm::default(),
            blend_mode: BlendMode::default(),
            tension: DEFAULT_TENSION,
        }
    }
}

impl RasterConfig {
    /// Parse from a JSON string; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl BitmapContext<'_> {
    /// Line with the configured algorithm and blend mode
    pub fn draw_line_configured(
        &mut self,
        config: &RasterConfig,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    ) {
        self.draw_line_using(config.line_algorithm, x1, y1, x2, y2, color, config.blend_mode);
    }

    /// Bézier chain tessellated with the configured step factor
    pub fn draw_beziers_configured(&mut self, config: &RasterConfig, points: &[i32], color: Color) {
        let points = beziers_points(points, config.step_factor);
        self.draw_polyline_using(config.line_algorithm, &points, color, config.blend_mode);
    }

    /// Open Cardinal spline with the configured tension and step factor
    pub fn draw_curve_configured(&mut self, config: &RasterConfig, points: &[i32], color: Color) {
        let points = curve_points(points, config.tension, config.step_factor);
        self.draw_polyline_using(config.line_algorithm, &points, color, config.blend_mode);
    }

    /// Closed Cardinal spline with the configured tension and step factor
    pub fn draw_curve_closed_configured(
        &mut self,
        config: &RasterConfig,
        points: &[i32],
        color: Color,
    ) {
        let points = curve_closed_points(points, config.tension, config.step_factor);
        self.draw_polyline_using(config.line_algorithm, &points, color, config.blend_mode);
    }
}
