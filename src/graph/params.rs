//! Typed parameter storage and the static range tables.
//!
//! Every numeric parameter has an id, a default, a valid range used for
//! clamping, and a modulation range that scales route amounts. Each node type
//! owns a slice of [`ParamSpec`]; parameters outside that slice do not exist
//! for the type and cannot be modulated.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::Error, graph::kind::NodeType};

macro_rules! param_ids {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ParamId {
            $(#[cfg_attr(feature = "serde", serde(rename = $name))] $variant),+
        }

        impl ParamId {
            pub const ALL: &'static [ParamId] = &[$(ParamId::$variant),+];
            pub const COUNT: usize = Self::ALL.len();

            /// Wire name, as used in patch `params` maps and route `targetParam`.
            pub fn name(self) -> &'static str {
                match self {
                    $(ParamId::$variant => $name),+
                }
            }
        }

        impl FromStr for ParamId {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(ParamId::$variant),)+
                    other => Err(Error::UnknownParam(other.to_owned())),
                }
            }
        }
    };
}

param_ids! {
    Frequency => "frequency",
    Gain => "gain",
    Pan => "pan",
    Depth => "depth",
    AttackTime => "attackTime",
    DecayTime => "decayTime",
    SustainLevel => "sustainLevel",
    ReleaseTime => "releaseTime",
    Rate => "rate",
    Smoothness => "smoothness",
    Tempo => "tempo",
    Steps => "steps",
    Pulses => "pulses",
    Rotation => "rotation",
    Gravity => "gravity",
    Restitution => "restitution",
    Height => "height",
    Brightness => "brightness",
    Damping => "damping",
    Stiffness => "stiffness",
    Decay => "decay",
    Excitation => "excitation",
    Position => "position",
    Spray => "spray",
    GrainSize => "grainSize",
    Density => "density",
    Pitch => "pitch",
    PitchJitter => "pitchJitter",
    Cutoff => "cutoff",
    Resonance => "resonance",
    GainDb => "gainDb",
    X => "x",
    Y => "y",
    Z => "z",
    RefDistance => "refDistance",
    Rolloff => "rolloff",
    Time => "time",
    Feedback => "feedback",
    Mix => "mix",
}

/// How far a full-scale route (`amount = 1`, signal = 1) moves a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModRange {
    /// Fraction of the base value, e.g. ±50% of an oscillator's frequency.
    Relative(f32),
    /// Fixed span in the parameter's own unit, e.g. ±5000 Hz of cutoff.
    Absolute(f32),
}

impl ModRange {
    #[inline]
    pub fn span(self, base: f32) -> f32 {
        match self {
            ModRange::Relative(fraction) => base.abs() * fraction,
            ModRange::Absolute(span) => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub param: ParamId,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub mod_range: ModRange,
}

impl ParamSpec {
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

const fn spec(param: ParamId, default: f32, min: f32, max: f32, mod_range: ModRange) -> ParamSpec {
    ParamSpec {
        param,
        default,
        min,
        max,
        mod_range,
    }
}

use ModRange::{Absolute, Relative};
use ParamId::*;

const GAIN: ParamSpec = spec(Gain, 1.0, 0.0, 2.0, Absolute(1.0));
const PAN: ParamSpec = spec(Pan, 0.0, -1.0, 1.0, Absolute(1.0));

static OSCILLATOR: [ParamSpec; 3] = [
    spec(Frequency, 440.0, 20.0, 20_000.0, Relative(0.5)),
    GAIN,
    PAN,
];

static LFO: [ParamSpec; 2] = [
    spec(Frequency, 1.0, 0.01, 50.0, Relative(0.5)),
    spec(Depth, 1.0, 0.0, 1.0, Absolute(1.0)),
];

static ENVELOPE: [ParamSpec; 4] = [
    spec(AttackTime, 0.01, 0.001, 10.0, Relative(0.5)),
    spec(DecayTime, 0.1, 0.001, 10.0, Relative(0.5)),
    spec(SustainLevel, 0.7, 0.0, 1.0, Absolute(0.5)),
    spec(ReleaseTime, 0.3, 0.001, 10.0, Relative(0.5)),
];

static NOISE: [ParamSpec; 3] = [
    spec(Rate, 1.0, 0.01, 100.0, Relative(0.5)),
    spec(Smoothness, 0.5, 0.0, 1.0, Absolute(0.5)),
    spec(Depth, 1.0, 0.0, 1.0, Absolute(1.0)),
];

static EUCLIDEAN: [ParamSpec; 4] = [
    spec(Tempo, 120.0, 20.0, 300.0, Relative(0.5)),
    spec(Steps, 16.0, 1.0, 64.0, Absolute(8.0)),
    spec(Pulses, 4.0, 0.0, 64.0, Absolute(8.0)),
    spec(Rotation, 0.0, 0.0, 63.0, Absolute(8.0)),
];

static SEQUENCER: [ParamSpec; 1] = [spec(Tempo, 120.0, 20.0, 300.0, Relative(0.5))];

static PHYSICS: [ParamSpec; 5] = [
    spec(Gravity, 9.81, 0.1, 100.0, Relative(0.5)),
    spec(Restitution, 0.8, 0.0, 1.0, Absolute(0.2)),
    spec(Height, 1.0, 0.01, 10.0, Relative(0.5)),
    GAIN,
    PAN,
];

static MODAL: [ParamSpec; 4] = [
    spec(Frequency, 220.0, 20.0, 5_000.0, Relative(0.5)),
    spec(Brightness, 0.5, 0.0, 1.0, Absolute(0.5)),
    GAIN,
    PAN,
];

static KARPLUS: [ParamSpec; 7] = [
    spec(Frequency, 220.0, 20.0, 2_000.0, Relative(0.5)),
    spec(Damping, 0.5, 0.0, 1.0, Absolute(0.5)),
    spec(Stiffness, 0.0, 0.0, 1.0, Absolute(0.5)),
    spec(Decay, 2.0, 0.05, 30.0, Relative(0.5)),
    spec(Excitation, 0.5, 0.0, 1.0, Absolute(0.5)),
    GAIN,
    PAN,
];

static GRANULAR: [ParamSpec; 8] = [
    spec(Position, 0.5, 0.0, 1.0, Absolute(0.5)),
    spec(Spray, 0.1, 0.0, 1.0, Absolute(0.5)),
    spec(GrainSize, 0.1, 0.005, 1.0, Relative(0.5)),
    spec(Density, 20.0, 1.0, 200.0, Relative(0.5)),
    spec(Pitch, 1.0, 0.25, 4.0, Relative(0.5)),
    spec(PitchJitter, 0.1, 0.0, 1.0, Absolute(0.5)),
    GAIN,
    PAN,
];

static FILTER: [ParamSpec; 5] = [
    spec(Cutoff, 1_000.0, 20.0, 20_000.0, Absolute(5_000.0)),
    spec(Resonance, 0.707, 0.1, 30.0, Relative(0.5)),
    spec(GainDb, 0.0, -24.0, 24.0, Absolute(12.0)),
    GAIN,
    PAN,
];

static PANNER: [ParamSpec; 6] = [
    spec(X, 0.0, -100.0, 100.0, Absolute(10.0)),
    spec(Y, 0.0, -100.0, 100.0, Absolute(10.0)),
    spec(Z, 0.0, -100.0, 100.0, Absolute(10.0)),
    spec(RefDistance, 1.0, 0.01, 100.0, Relative(0.5)),
    spec(Rolloff, 1.0, 0.0, 10.0, Absolute(1.0)),
    GAIN,
];

static DELAY: [ParamSpec; 6] = [
    spec(Time, 0.3, 0.001, 2.0, Relative(0.5)),
    spec(Feedback, 0.4, 0.0, 0.95, Absolute(0.5)),
    spec(Mix, 0.5, 0.0, 1.0, Absolute(0.5)),
    spec(Cutoff, 6_000.0, 200.0, 20_000.0, Absolute(5_000.0)),
    GAIN,
    PAN,
];

static SAMPLE: [ParamSpec; 2] = [GAIN, PAN];

/// The parameter table for a node type.
pub fn specs(node_type: NodeType) -> &'static [ParamSpec] {
    match node_type {
        NodeType::Oscillator => &OSCILLATOR,
        NodeType::Lfo => &LFO,
        NodeType::Envelope => &ENVELOPE,
        NodeType::Noise => &NOISE,
        NodeType::Euclidean => &EUCLIDEAN,
        NodeType::Sequencer => &SEQUENCER,
        NodeType::Physics => &PHYSICS,
        NodeType::Modal => &MODAL,
        NodeType::Karplus => &KARPLUS,
        NodeType::Granular => &GRANULAR,
        NodeType::Filter => &FILTER,
        NodeType::Panner => &PANNER,
        NodeType::Delay => &DELAY,
        NodeType::Sample => &SAMPLE,
        NodeType::Output => &[],
    }
}

pub fn lookup(node_type: NodeType, param: ParamId) -> Option<&'static ParamSpec> {
    specs(node_type).iter().find(|spec| spec.param == param)
}

/// Numeric parameters of one node, indexed by [`ParamId`].
///
/// `Copy` on purpose: the router rebuilds effective values from the base
/// values every sample by plain assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    values: [f32; ParamId::COUNT],
}

impl Params {
    pub fn defaults(node_type: NodeType) -> Self {
        let mut values = [0.0; ParamId::COUNT];
        for spec in specs(node_type) {
            values[spec.param as usize] = spec.default;
        }
        Self { values }
    }

    #[inline]
    pub fn get(&self, param: ParamId) -> f32 {
        self.values[param as usize]
    }

    #[inline]
    pub fn set(&mut self, param: ParamId, value: f32) {
        self.values[param as usize] = value;
    }

    #[inline]
    pub fn add(&mut self, param: ParamId, delta: f32) {
        self.values[param as usize] += delta;
    }

    /// Clamp one parameter into its valid range for `node_type`.
    #[inline]
    pub fn clamp(&mut self, node_type: NodeType, param: ParamId) {
        if let Some(spec) = lookup(node_type, param) {
            self.set(param, spec.clamp(self.get(param)));
        }
    }

    /// Set a value clamped into range. Returns false if the type has no such parameter.
    pub fn set_clamped(&mut self, node_type: NodeType, param: ParamId, value: f32) -> bool {
        match lookup(node_type, param) {
            Some(spec) => {
                self.set(param, spec.clamp(value));
                true
            }
            None => false,
        }
    }
}
