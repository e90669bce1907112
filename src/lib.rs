pub mod config;
pub mod dsp; // Allocation-free DSP primitives
pub mod engine; // Render loop, topology apply and the control channel
pub mod error;
pub mod graph; // Node types and their processors
pub mod io;

pub use config::EngineConfig;
pub use engine::{channel, ControlHandle, Engine};
pub use error::{Error, Result};
pub use graph::{NodeId, NodeType, ParamId};
pub use io::{
    message::Notification,
    patch::{GraphPatch, MacroValue, ParamValue},
    sample::SampleBuffer,
    AudioInput, AudioOutput,
};

pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
