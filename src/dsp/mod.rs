//! Low-level DSP primitives used by the graph nodes.
//!
//! Nothing in here allocates after construction. Buffers that need storage
//! (delay lines) size themselves once in `with_capacity` and are built on the
//! control thread before they ever reach the renderer.

/// Fractional circular delay line.
pub mod delay;
/// Linear ADSR envelope generator.
pub mod envelope;
/// Euclidean pattern generation and fixed-size step patterns.
pub mod euclid;
/// RBJ biquad, one-pole lowpass and DC blocker.
pub mod filter;
/// LFO shapes and polarity conversion.
pub mod lfo;
/// Smoothed summed-sine noise and white noise.
pub mod noise;
/// Periodic waveforms and the phase accumulator.
pub mod oscillator;
/// Pan law, distance attenuation and clipping.
pub mod pan;

pub use envelope::EnvelopeStage;
