//! `--benchmark`: time the scalar and dispatched kernel tables on the same
//! synthetic series.

use std::fmt;
use std::hint::black_box;
use std::time::Instant;

use quant::{Kernels, QuantResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// Series length per call.
pub const SERIES_LEN: usize = 4096;
/// Calls per primitive per table.
pub const ITERATIONS: usize = 2000;

/// Timing of one kernel table.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelTiming {
    pub variant: String,
    pub correlation_secs: f64,
    pub regression_secs: f64,
    pub gflops: f64,
}

impl fmt::Display for KernelTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<7} correlation {:>8.3} ms | regression {:>8.3} ms | {:>6.2} GFLOPS",
            self.variant,
            self.correlation_secs * 1e3,
            self.regression_secs * 1e3,
            self.gflops
        )
    }
}

/// Two correlated random walks of `len` points.
pub fn synthetic_series(len: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut a, mut b) = (100.0, 50.0);
    (0..len)
        .map(|_| {
            let common: f64 = StandardNormal.sample(&mut rng);
            let noise: f64 = StandardNormal.sample(&mut rng);
            a += common;
            b += 0.5 * common + 0.3 * noise;
            (a, b)
        })
        .unzip()
}

/// Run correlation then regression `iterations` times on `kernels`.
pub fn time_kernels(kernels: &Kernels, x: &[f64], y: &[f64], iterations: usize) -> QuantResult<KernelTiming> {
    kernels.reset_stats();

    let started = Instant::now();
    for _ in 0..iterations {
        black_box(kernels.correlation(black_box(x), black_box(y))?);
    }
    let correlation_secs = started.elapsed().as_secs_f64();

    let started = Instant::now();
    for _ in 0..iterations {
        black_box(kernels.linear_regression(black_box(y), black_box(x))?);
    }
    let regression_secs = started.elapsed().as_secs_f64();

    Ok(KernelTiming {
        variant: kernels.variant().name().to_string(),
        correlation_secs,
        regression_secs,
        gflops: kernels.stats().gflops(correlation_secs + regression_secs),
    })
}

/// Scalar baseline first, then the best table this CPU supports.
pub fn run() -> QuantResult<Vec<KernelTiming>> {
    let (x, y) = synthetic_series(SERIES_LEN, 42);
    let scalar = time_kernels(&Kernels::scalar(), &x, &y, ITERATIONS)?;
    let dispatched = time_kernels(&Kernels::select(true), &x, &y, ITERATIONS)?;
    Ok(vec![scalar, dispatched])
}
