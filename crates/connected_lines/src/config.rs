//! Render configuration: defaults, attribute overrides and coercion.
//!
//! A [`Config`] is assembled once per attach by layering, in order, the built-in defaults,
//! caller overrides, container attribute overrides ([`Config::apply_override`]) and theme
//! colours ([`Config::apply_theme`]). Before a pass reads it, [`Config::sanitized`] clamps
//! every probability and fade fraction into [0, 1] and coerces non-finite values.
use tracing::warn;

use crate::color::Color;
use crate::error::{Error, Result};

/// Style property holding the first accent colour.
pub const ACCENT_PROPERTY: &str = "--accent";
/// Style property holding the second accent colour.
pub const ACCENT_SECONDARY_PROPERTY: &str = "--accent-2";

/// Tunables for one connected-lines renderer.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Grid step in px between sampled positions. Floored; never below 2.
    pub sample_step: f32,
    /// Base chance to keep a grid position.
    pub keep_probability: f64,
    /// Extra keep chance scaled by pixel darkness.
    pub dark_boost: f64,
    /// Hard cap on sampled points.
    pub max_points: usize,
    /// Link radius in px.
    pub max_link_distance: f32,
    /// Maximum links drawn from any one point.
    pub max_neighbors: usize,
    /// Node marker radius in px; `0` disables markers.
    pub node_radius: f32,
    /// Opacity of the cover-fitted source image drawn behind the links.
    pub background_alpha: f32,
    /// Stroke width in px.
    pub line_width: f32,
    /// Fraction of the link radius at which lines start to fade.
    pub fade_near: f32,
    /// Fraction of the link radius at which lines are fully faded.
    pub fade_far: f32,
    /// Positional jitter amplitude in px.
    pub jitter: f32,
    /// Colour used for links between points of similar brightness.
    pub accent: Color,
    /// Colour used for links between points of opposite brightness.
    pub accent_secondary: Color,
    /// Pinned generator seed. `None` draws a fresh seed for every pass.
    pub seed: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_step: 6.0,
            keep_probability: 0.70,
            dark_boost: 0.75,
            max_points: 8000,
            max_link_distance: 38.0,
            max_neighbors: 5,
            node_radius: 1.0,
            background_alpha: 0.08,
            line_width: 1.0,
            fade_near: 0.25,
            fade_far: 1.0,
            jitter: 0.7,
            accent: Color::rgb(0x21, 0xd4, 0xfd),
            accent_secondary: Color::rgb(0xff, 0x4d, 0x6d),
            seed: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_step(mut self, sample_step: f32) -> Self {
        self.sample_step = sample_step;
        self
    }

    pub fn with_keep_probability(mut self, keep_probability: f64) -> Self {
        self.keep_probability = keep_probability;
        self
    }

    pub fn with_dark_boost(mut self, dark_boost: f64) -> Self {
        self.dark_boost = dark_boost;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_max_link_distance(mut self, max_link_distance: f32) -> Self {
        self.max_link_distance = max_link_distance;
        self
    }

    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    pub fn with_node_radius(mut self, node_radius: f32) -> Self {
        self.node_radius = node_radius;
        self
    }

    pub fn with_background_alpha(mut self, background_alpha: f32) -> Self {
        self.background_alpha = background_alpha;
        self
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    /// Sets both fade fractions.
    pub fn with_fade(mut self, near: f32, far: f32) -> Self {
        self.fade_near = near;
        self.fade_far = far;
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_accents(mut self, accent: Color, accent_secondary: Color) -> Self {
        self.accent = accent;
        self.accent_secondary = accent_secondary;
        self
    }

    /// Pins the generator seed so passes are reproducible.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effective grid step in whole px.
    pub fn step(&self) -> u32 {
        let step = if self.sample_step.is_finite() {
            self.sample_step.floor()
        } else {
            0.0
        };
        step.max(2.0).min(u32::MAX as f32) as u32
    }

    /// Spatial index cell size in px: the floored link radius, at least 8.
    pub fn cell_size(&self) -> f32 {
        let radius = if self.max_link_distance.is_finite() {
            self.max_link_distance.floor()
        } else {
            0.0
        };
        radius.max(8.0)
    }

    /// Returns a copy with every field coerced into its valid range.
    pub fn sanitized(&self) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let chance = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let non_negative = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            sample_step: self.step() as f32,
            keep_probability: chance(self.keep_probability),
            dark_boost: chance(self.dark_boost),
            max_points: self.max_points,
            max_link_distance: non_negative(self.max_link_distance),
            max_neighbors: self.max_neighbors,
            node_radius: non_negative(self.node_radius),
            background_alpha: unit(self.background_alpha),
            line_width: non_negative(self.line_width),
            fade_near: unit(self.fade_near),
            fade_far: unit(self.fade_far),
            jitter: if self.jitter.is_finite() {
                self.jitter.abs()
            } else {
                0.0
            },
            accent: self.accent,
            accent_secondary: self.accent_secondary,
            seed: self.seed,
        }
    }

    /// Applies one textual override such as a `data-max-dist="42"` attribute.
    ///
    /// Keys are matched case-insensitively with `-` and `_` ignored, so `max-neighbors`,
    /// `maxNeighbors` and `max_neighbors` name the same field. The legacy short names
    /// (`maxDist`, `neonA`, `neonB`) are accepted as aliases.
    ///
    /// Returns `Ok(false)` for keys that name no field and leaves the config untouched
    /// when the value does not parse.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<bool> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let invalid = || Error::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let double = || -> Result<f64> {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };
        let float = || -> Result<f32> {
            value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };
        let count = || -> Result<usize> { float().map(|v| v.max(0.0).floor() as usize) };

        match normalized.as_str() {
            "samplestep" => self.sample_step = float()?,
            "keepprobability" => self.keep_probability = double()?,
            "darkboost" => self.dark_boost = double()?,
            "maxpoints" => self.max_points = count()?,
            "maxdist" | "maxlinkdistance" => self.max_link_distance = float()?,
            "maxneighbors" => self.max_neighbors = count()?,
            "noderadius" => self.node_radius = float()?,
            "backgroundalpha" => self.background_alpha = float()?,
            "linewidth" => self.line_width = float()?,
            "fadenear" => self.fade_near = float()?,
            "fadefar" => self.fade_far = float()?,
            "jitter" => self.jitter = float()?,
            "seed" => {
                let seed = value.trim().parse::<u32>().map_err(|_| invalid())?;
                self.seed = Some(seed);
            }
            "neona" | "accent" => self.accent = value.parse().map_err(|_| invalid())?,
            "neonb" | "accent2" | "accentsecondary" => {
                self.accent_secondary = value.parse().map_err(|_| invalid())?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Applies every override, logging and skipping the ones that fail to parse.
    ///
    /// Returns the keys that were rejected.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut rejected = Vec::new();
        for (key, value) in overrides {
            if let Err(e) = self.apply_override(key, value) {
                warn!("Ignoring override: {}.", e);
                rejected.push(key.to_owned());
            }
        }
        rejected
    }

    /// Replaces the accent colours with theme values where present and parsable.
    ///
    /// `lookup` resolves a style property name (see [`ACCENT_PROPERTY`]) to its value.
    /// Missing, empty or unparsable values keep the configured colour.
    pub fn apply_theme<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut resolve = |property: &str, current: Color| -> Color {
            match lookup(property) {
                Some(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|e| {
                    warn!("Theme property '{}': {}; keeping {}.", property, e, current);
                    current
                }),
                _ => current,
            }
        };
        self.accent = resolve(ACCENT_PROPERTY, self.accent);
        self.accent_secondary = resolve(ACCENT_SECONDARY_PROPERTY, self.accent_secondary);
    }
}
