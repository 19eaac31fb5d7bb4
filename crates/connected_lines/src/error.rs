//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid override values, unparsable colours, image decoding and IO. None of them
//! abort a render pass: the pass degrades and reports a warning instead.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("invalid colour '{value}'")]
    InvalidColor { value: String },

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("image buffer of {len} bytes does not match {width}x{height} RGBA")]
    ImageBuffer { width: u32, height: u32, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn invalid_value_names_key_and_value() {
        let err = Error::InvalidValue {
            key: "maxPoints".into(),
            value: "lots".into(),
        };
        assert_eq!(err.to_string(), "invalid value 'lots' for 'maxPoints'");
    }

    fn variant(err: &Error) -> &'static str {
        match err {
            Error::InvalidValue { .. } => "value",
            Error::InvalidColor { .. } => "colour",
            Error::Image(_) => "image",
            Error::ImageBuffer { .. } => "buffer",
            Error::Io(_) => "io",
            Error::Other(_) => "other",
        }
    }

    #[test]
    fn every_variant_is_produced_by_the_crate() {
        use crate::color::Color;
        use crate::config::Config;
        use crate::source::SourceImage;

        let produced = [
            Config::default().apply_override("jitter", "x").unwrap_err(),
            "#12".parse::<Color>().unwrap_err(),
            SourceImage::decode(b"nope").unwrap_err(),
            SourceImage::from_rgba(1, 1, vec![0; 3]).unwrap_err(),
            SourceImage::open("/nonexistent/connected-lines.png").unwrap_err(),
            Error::from("other"),
        ];
        let kinds: Vec<_> = produced.iter().map(variant).collect();
        assert_eq!(kinds, ["value", "colour", "image", "buffer", "io", "other"]);
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "missing.png");
    }
}
