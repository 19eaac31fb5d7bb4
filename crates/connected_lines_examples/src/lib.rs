#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{
    init_tracing, linear_gradient, render_to_png, synthetic_portrait, PngConfig, StaticContainer,
};
