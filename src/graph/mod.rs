//! Node types and their per-sample processors.
//!
//! Each file holds the processor for one node type. [`state::NodeState`]
//! wraps them in a single enum so the engine can dispatch with an exhaustive
//! match, and [`node::Node`] pairs that state with its parameters.

pub mod delay;
pub mod envelope;
pub mod filter;
pub mod gate;
pub mod granular;
pub mod kind;
pub mod lfo;
pub mod modal;
pub mod node;
pub mod noise;
pub mod oscillator;
pub mod panner;
pub mod params;
pub mod physics;
pub mod state;
pub mod string;

pub use kind::{NodeSettings, NodeType, Role};
pub use node::{Node, NodeId, RenderCtx};
pub use params::{ParamId, Params};
pub use state::NodeState;
