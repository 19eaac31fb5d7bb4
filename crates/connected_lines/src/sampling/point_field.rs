//! Dark-biased, jittered grid sampling.
use glam::Vec2;
use rand::RngCore;

use crate::config::Config;
use crate::sampling::{unit, BrightnessField, Point};

/// Scans a region on a regular grid and keeps positions with a probability that grows
/// with pixel darkness.
#[derive(Debug, Clone)]
pub struct PointFieldSampler {
    /// Grid step in px, at least 2.
    pub step: u32,
    /// Base keep chance in [0, 1].
    pub keep_probability: f64,
    /// Extra keep chance for fully dark pixels, in [0, 1].
    pub dark_boost: f64,
    /// Hard cap on emitted points.
    pub max_points: usize,
    /// Jitter amplitude in px.
    pub jitter: f32,
}

impl PointFieldSampler {
    pub fn new(
        step: u32,
        keep_probability: f64,
        dark_boost: f64,
        max_points: usize,
        jitter: f32,
    ) -> Self {
        Self {
            step: step.max(2),
            keep_probability: keep_probability.clamp(0.0, 1.0),
            dark_boost: dark_boost.clamp(0.0, 1.0),
            max_points,
            jitter: jitter.abs(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let c = config.sanitized();
        Self::new(
            c.step(),
            c.keep_probability,
            c.dark_boost,
            c.max_points,
            c.jitter,
        )
    }

    /// Chance of keeping a grid position with the given brightness.
    ///
    /// Evaluated in `f64` so draws compare against the same threshold for every host.
    #[inline]
    pub fn keep_chance(&self, brightness: f64) -> f64 {
        (self.keep_probability + (1.0 - brightness) * self.dark_boost).clamp(0.0, 1.0)
    }

    /// Samples a `width × height` region in row-major order.
    ///
    /// Each visited grid position consumes one draw for the keep decision; kept positions
    /// consume two more for the x and y jitter. Sampling stops as soon as
    /// [`Self::max_points`] points have been emitted.
    pub fn sample(
        &self,
        width: u32,
        height: u32,
        field: &dyn BrightnessField,
        rng: &mut dyn RngCore,
    ) -> Vec<Point> {
        if width == 0 || height == 0 || self.max_points == 0 {
            return Vec::new();
        }

        let step = self.step.max(2) as usize;
        let cols = (width as usize).div_ceil(step);
        let rows = (height as usize).div_ceil(step);
        let mut points = Vec::with_capacity((cols * rows).min(self.max_points));

        for y in (0..height).step_by(step) {
            for x in (0..width).step_by(step) {
                let brightness = field.brightness(x, y).clamp(0.0, 1.0);
                let keep = self.keep_chance(brightness);
                if unit(rng) < keep {
                    let jx = (unit(rng) * 2.0 - 1.0) as f32 * self.jitter;
                    let jy = (unit(rng) * 2.0 - 1.0) as f32 * self.jitter;
                    points.push(Point::new(
                        Vec2::new(x as f32 + jx, y as f32 + jy),
                        brightness as f32,
                    ));
                    if points.len() >= self.max_points {
                        return points;
                    }
                }
            }
        }

        points
    }
}
