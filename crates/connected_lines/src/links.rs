//! Nearest-neighbour links between sampled points.
//!
//! [`LinkPlanner`] walks every point, queries the [`SpatialIndex`] for candidates, keeps
//! the `max_neighbors` nearest within `max_link_distance` and derives a fade, an opacity
//! and a blended colour for each kept pair. Points are processed independently, so a pair
//! that is mutually among each other's nearest neighbours yields two links, one from each
//! side.
use glam::Vec2;

use crate::color::Color;
use crate::config::Config;
use crate::sampling::Point;
use crate::spatial::SpatialIndex;

/// Upper bound on link opacity.
pub const MAX_LINK_ALPHA: f32 = 0.9;

const FADE_EPSILON: f32 = 1e-6;

/// A segment to stroke between two sampled points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    /// Index of the point the link was found from.
    pub source: usize,
    /// Index of the linked neighbour.
    pub target: usize,
    pub from: Vec2,
    pub to: Vec2,
    /// Euclidean distance between the endpoints.
    pub distance: f32,
    /// Distance fade in [0, 1]; `1` is fully faded.
    pub fade: f32,
    /// Stroke colour including opacity.
    pub color: Color,
}

/// Distance fade: `0` up to `max_dist * near`, rising to `1` at `max_dist * far`.
#[inline]
pub fn distance_fade(distance: f32, max_dist: f32, near: f32, far: f32) -> f32 {
    ((distance - max_dist * near) / (max_dist * (far - near) + FADE_EPSILON)).clamp(0.0, 1.0)
}

/// Opacity of a link: darker and closer pairs are more opaque.
#[inline]
pub fn link_alpha(brightness_a: f32, brightness_b: f32, fade: f32) -> f32 {
    let darkness = 1.0 - (brightness_a + brightness_b) / 2.0;
    (MAX_LINK_ALPHA * darkness * (1.0 - fade)).clamp(0.0, MAX_LINK_ALPHA)
}

/// Link colour: the accents blended by the brightness contrast between the endpoints.
#[inline]
pub fn link_color(
    accent: Color,
    accent_secondary: Color,
    brightness_a: f32,
    brightness_b: f32,
) -> Color {
    let contrast = (brightness_a - brightness_b).abs();
    accent.mix(accent_secondary, contrast)
}

/// Link selection and styling parameters taken from a [`Config`].
#[derive(Clone, Debug)]
pub struct LinkPlanner {
    pub max_link_distance: f32,
    pub max_neighbors: usize,
    pub fade_near: f32,
    pub fade_far: f32,
    pub accent: Color,
    pub accent_secondary: Color,
}

impl LinkPlanner {
    pub fn from_config(config: &Config) -> Self {
        let c = config.sanitized();
        Self {
            max_link_distance: c.max_link_distance,
            max_neighbors: c.max_neighbors,
            fade_near: c.fade_near,
            fade_far: c.fade_far,
            accent: c.accent,
            accent_secondary: c.accent_secondary,
        }
    }

    /// Builds the link from `points[source]` to `points[target]`.
    pub fn link(&self, points: &[Point], source: usize, target: usize, distance: f32) -> Link {
        let a = points[source];
        let b = points[target];
        let fade = distance_fade(
            distance,
            self.max_link_distance,
            self.fade_near,
            self.fade_far,
        );
        let alpha = link_alpha(a.brightness, b.brightness, fade);
        let color = link_color(self.accent, self.accent_secondary, a.brightness, b.brightness)
            .with_alpha(alpha);
        Link {
            source,
            target,
            from: a.position,
            to: b.position,
            distance,
            fade,
            color,
        }
    }

    /// Nearest partners of `points[i]` as `(index, squared distance)`, closest first.
    ///
    /// `candidates` is scratch space reused across calls.
    pub fn nearest(
        &self,
        points: &[Point],
        index: &SpatialIndex,
        i: usize,
        candidates: &mut Vec<usize>,
    ) -> Vec<(usize, f32)> {
        if self.max_neighbors == 0 {
            return Vec::new();
        }
        let a = points[i].position;
        let max_d2 = self.max_link_distance * self.max_link_distance;

        candidates.clear();
        index.neighbors_into(a, candidates);

        let mut near: Vec<(usize, f32)> = candidates
            .iter()
            .copied()
            .filter(|&j| j != i)
            .filter_map(|j| {
                let d2 = points[j].position.distance_squared(a);
                (d2 <= max_d2).then_some((j, d2))
            })
            .collect();
        near.sort_by(|u, v| u.1.total_cmp(&v.1));
        near.truncate(self.max_neighbors);
        near
    }

    /// Visits every link in drawing order: point by point, nearest partner first.
    pub fn for_each_link<F>(&self, points: &[Point], index: &SpatialIndex, mut f: F)
    where
        F: FnMut(Link),
    {
        if self.max_neighbors == 0 {
            return;
        }
        let mut candidates = Vec::new();
        for i in 0..points.len() {
            for (j, d2) in self.nearest(points, index, i, &mut candidates) {
                f(self.link(points, i, j, d2.sqrt()));
            }
        }
    }

    /// Collects every link; see [`Self::for_each_link`].
    pub fn links(&self, points: &[Point], index: &SpatialIndex) -> Vec<Link> {
        let mut out = Vec::new();
        self.for_each_link(points, index, |link| out.push(link));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(max_dist: f32, max_neighbors: usize) -> LinkPlanner {
        LinkPlanner::from_config(
            &Config::default()
                .with_max_link_distance(max_dist)
                .with_max_neighbors(max_neighbors),
        )
    }

    fn index_for(points: &[Point], extent: Vec2, max_dist: f32) -> SpatialIndex {
        let cell = max_dist.floor().max(8.0);
        SpatialIndex::build(points.iter().map(|p| p.position), extent, cell)
    }

    fn pt(x: f32, y: f32, b: f32) -> Point {
        Point::new(Vec2::new(x, y), b)
    }

    #[test]
    fn fade_is_zero_near_and_one_at_the_radius() {
        assert_eq!(distance_fade(5.0, 40.0, 0.25, 1.0), 0.0);
        assert_eq!(distance_fade(10.0, 40.0, 0.25, 1.0), 0.0);
        assert!((distance_fade(25.0, 40.0, 0.25, 1.0) - 0.5).abs() < 1e-4);
        assert!(distance_fade(40.0, 40.0, 0.25, 1.0) > 0.9999);
    }

    #[test]
    fn alpha_prefers_dark_pairs() {
        assert!((link_alpha(0.0, 0.0, 0.0) - 0.9).abs() < 1e-6);
        assert_eq!(link_alpha(1.0, 1.0, 0.0), 0.0);
        assert_eq!(link_alpha(0.0, 0.0, 1.0), 0.0);
        assert!((link_alpha(0.5, 0.5, 0.5) - 0.225).abs() < 1e-6);
    }

    #[test]
    fn color_blends_by_contrast() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(link_color(a, b, 0.3, 0.3), a);
        assert_eq!(link_color(a, b, 1.0, 0.0), b);
        assert_eq!(link_color(a, b, 0.25, 0.75), Color::rgb(100, 50, 25));
    }

    #[test]
    fn exact_radius_is_included() {
        let points = vec![pt(0.0, 0.0, 0.5), pt(38.0, 0.0, 0.5)];
        let p = planner(38.0, 5);
        let index = index_for(&points, Vec2::new(100.0, 100.0), 38.0);
        let links = p.links(&points, &index);
        assert_eq!(links.len(), 2);
        assert_eq!((links[0].source, links[0].target), (0, 1));
        assert_eq!((links[1].source, links[1].target), (1, 0));
        assert_eq!(links[0].distance, 38.0);
    }

    #[test]
    fn beyond_radius_is_excluded() {
        let points = vec![pt(0.0, 0.0, 0.5), pt(38.01, 0.0, 0.5)];
        let p = planner(38.0, 5);
        let index = index_for(&points, Vec2::new(100.0, 100.0), 38.0);
        assert!(p.links(&points, &index).is_empty());
    }

    #[test]
    fn zero_neighbors_draws_nothing() {
        let points: Vec<Point> = (0..50)
            .map(|i| pt((i % 10) as f32 * 3.0, (i / 10) as f32 * 3.0, 0.1))
            .collect();
        let p = planner(38.0, 0);
        let index = index_for(&points, Vec2::new(30.0, 15.0), 38.0);
        assert!(p.links(&points, &index).is_empty());
    }

    #[test]
    fn keeps_nearest_partners_only() {
        let points = vec![
            pt(10.0, 10.0, 0.0),
            pt(20.0, 10.0, 0.0),
            pt(12.0, 10.0, 0.0),
            pt(15.0, 10.0, 0.0),
        ];
        let p = planner(38.0, 2);
        let index = index_for(&points, Vec2::new(50.0, 50.0), 38.0);
        let mut scratch = Vec::new();
        let near = p.nearest(&points, &index, 0, &mut scratch);
        assert_eq!(near, vec![(2, 4.0), (3, 25.0)]);

        let links = p.links(&points, &index);
        for i in 0..points.len() {
            let from_i: Vec<_> = links.iter().filter(|l| l.source == i).collect();
            assert!(from_i.len() <= 2);
            assert!(from_i.iter().all(|l| l.target != i && l.distance <= 38.0));
        }
    }
}
