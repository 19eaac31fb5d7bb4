use std::time::Duration;

use criterion::{Criterion, Throughput};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

/// Points, links or draw calls handled per iteration.
#[allow(dead_code)]
pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Region pixels covered per iteration.
#[allow(dead_code)]
pub fn region_throughput(width: u32, height: u32) -> Throughput {
    Throughput::Elements((width as u64 * height as u64).max(1))
}
