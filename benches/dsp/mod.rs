//! Benchmarks for low-level DSP primitives and node processors.

mod delay;
mod envelope;
mod filter;
mod oscillator;
mod resonators;

pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use resonators::bench_resonators;
