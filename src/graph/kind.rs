//! Node types, their processing roles and their non-numeric settings.

use std::{fmt, str::FromStr, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{euclid::StepPattern, filter::FilterType, lfo::LfoShape, oscillator::Waveform},
    error::Error,
    graph::modal::Material,
};

/// Every node type the engine renders. A node's type never changes; a patch
/// that reuses an id with a different type gets a freshly built node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Oscillator,
    Lfo,
    Envelope,
    Noise,
    Euclidean,
    Sequencer,
    Physics,
    Modal,
    Karplus,
    Granular,
    Filter,
    Panner,
    Delay,
    Sample,
    Output,
}

/// Which evaluation phase a node runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Step gates. Run first so their triggers land in the same sample.
    Gate,
    /// LFO, envelope and noise: produce a modulation signal only.
    Control,
    /// Produce audio without reading upstream signal.
    Source,
    /// Transform the summed upstream signal.
    Effect,
    /// Output sinks, read by the mixer.
    Sink,
    /// Rendered outside the engine; only receives trigger notifications.
    External,
}

impl NodeType {
    pub const ALL: [NodeType; 15] = [
        NodeType::Oscillator,
        NodeType::Lfo,
        NodeType::Envelope,
        NodeType::Noise,
        NodeType::Euclidean,
        NodeType::Sequencer,
        NodeType::Physics,
        NodeType::Modal,
        NodeType::Karplus,
        NodeType::Granular,
        NodeType::Filter,
        NodeType::Panner,
        NodeType::Delay,
        NodeType::Sample,
        NodeType::Output,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Oscillator => "oscillator",
            NodeType::Lfo => "lfo",
            NodeType::Envelope => "envelope",
            NodeType::Noise => "noise",
            NodeType::Euclidean => "euclidean",
            NodeType::Sequencer => "sequencer",
            NodeType::Physics => "physics",
            NodeType::Modal => "modal",
            NodeType::Karplus => "karplus",
            NodeType::Granular => "granular",
            NodeType::Filter => "filter",
            NodeType::Panner => "panner",
            NodeType::Delay => "delay",
            NodeType::Sample => "sample",
            NodeType::Output => "output",
        }
    }

    /// Role ignoring topology. A plucked string with upstream inputs is
    /// promoted to [`Role::Effect`] when the topology is resolved.
    pub fn role(self) -> Role {
        match self {
            NodeType::Euclidean | NodeType::Sequencer => Role::Gate,
            NodeType::Lfo | NodeType::Envelope | NodeType::Noise => Role::Control,
            NodeType::Oscillator
            | NodeType::Physics
            | NodeType::Modal
            | NodeType::Karplus
            | NodeType::Granular => Role::Source,
            NodeType::Filter | NodeType::Panner | NodeType::Delay => Role::Effect,
            NodeType::Output => Role::Sink,
            NodeType::Sample => Role::External,
        }
    }

    /// Whether the node publishes a modulation output.
    pub fn has_mod_output(self) -> bool {
        matches!(self.role(), Role::Gate | Role::Control) || self == NodeType::Physics
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| Error::UnknownNodeType(s.to_owned()))
    }
}

/// Non-numeric, per-type configuration. Numeric values live in
/// [`Params`](crate::graph::params::Params) so they can be modulated.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSettings {
    Oscillator { waveform: Waveform },
    Lfo { shape: LfoShape },
    Noise { unipolar: bool },
    Sequencer { pattern: StepPattern },
    Modal { material: Material },
    Filter { mode: FilterType },
    Sample { sample_id: Arc<str> },
    Plain,
}

impl NodeSettings {
    /// Defaults for a node type.
    pub fn defaults(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Oscillator => NodeSettings::Oscillator {
                waveform: Waveform::Sine,
            },
            NodeType::Lfo => NodeSettings::Lfo {
                shape: LfoShape::Sine,
            },
            NodeType::Noise => NodeSettings::Noise { unipolar: false },
            NodeType::Sequencer => NodeSettings::Sequencer {
                pattern: StepPattern::default(),
            },
            NodeType::Modal => NodeSettings::Modal {
                material: Material::Wood,
            },
            NodeType::Filter => NodeSettings::Filter {
                mode: FilterType::LowPass,
            },
            NodeType::Sample => NodeSettings::Sample {
                sample_id: Arc::from(""),
            },
            _ => NodeSettings::Plain,
        }
    }
}
