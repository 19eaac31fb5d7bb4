//! Colours for strokes, nodes and theme accents.
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An sRGB colour with 8-bit channels and a straight (non-premultiplied) alpha in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// Opaque colour from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same channels with a different alpha, clamped to [0, 1].
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Channel-wise linear blend toward `other`, rounding each channel.
    ///
    /// Alpha is taken from `self`; `t` is clamped to [0, 1].
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
            a: self.a,
        }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// CSS `rgba(...)` notation, as accepted by canvas stroke and fill styles.
    pub fn to_css(&self) -> String {
        self.to_string()
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        match digits.as_slice() {
            [r, g, b] => Some(Self::rgb(r * 17, g * 17, b * 17)),
            [r1, r0, g1, g0, b1, b0] => {
                Some(Self::rgb(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
            }
            _ => None,
        }
    }

    fn parse_functional(body: &str, with_alpha: bool) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            let v: f32 = s.parse().ok()?;
            v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
        };
        let a = if with_alpha {
            let v: f32 = parts[3].parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            v.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            Self::parse_hex(hex)
        } else if let Some(body) = lower
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Self::parse_functional(body, true)
        } else if let Some(body) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Self::parse_functional(body, false)
        } else {
            None
        };
        parsed.ok_or_else(|| Error::InvalidColor {
            value: trimmed.to_owned(),
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#21d4fd".parse::<Color>().unwrap(), Color::rgb(0x21, 0xd4, 0xfd));
        assert_eq!("#FFF".parse::<Color>().unwrap(), Color::rgb(255, 255, 255));
        assert_eq!(" #ff4d6d ".parse::<Color>().unwrap(), Color::rgb(255, 77, 109));
    }

    #[test]
    fn parses_functional_notation() {
        assert_eq!(
            "rgb(10, 20, 30)".parse::<Color>().unwrap(),
            Color::rgb(10, 20, 30)
        );
        let c: Color = "rgba(232,237,246,.8)".parse().unwrap();
        assert_eq!(c.channels(), [232, 237, 246]);
        assert!((c.a - 0.8).abs() < 1e-6);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12", "#12345g", "blue", "rgb(1,2)", "rgba(1,2,3)"] {
            assert!(
                matches!(bad.parse::<Color>(), Err(Error::InvalidColor { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn mix_rounds_channels_and_keeps_alpha() {
        let a = Color::rgba(0, 0, 0, 0.5);
        let b = Color::rgb(255, 100, 1);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), Color::rgba(255, 100, 1, 0.5));
        assert_eq!(a.mix(b, 0.5), Color::rgba(128, 50, 1, 0.5));
    }

    #[test]
    fn css_output_matches_canvas_syntax() {
        assert_eq!(Color::rgba(1, 2, 3, 0.25).to_css(), "rgba(1,2,3,0.25)");
    }
}
