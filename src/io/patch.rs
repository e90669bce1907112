//! Wire-level graph snapshot, as authored by the patch editor.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": "osc", "type": "oscillator", "params": { "frequency": 440, "waveform": "sine" } },
//!     { "id": "out", "type": "output" }
//!   ],
//!   "connections": [ { "sourceId": "osc", "targetId": "out" } ],
//!   "modulations": []
//! }
//! ```
//!
//! Parameters stay string-keyed here. They are converted into typed
//! [`Params`](crate::graph::Params) on the control thread before anything
//! reaches the renderer.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::NodeType;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Pattern(Vec<bool>),
}

impl ParamValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Number(n) => Some(*n as f32),
            ParamValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<Vec<bool>> for ParamValue {
    fn from(value: Vec<bool>) -> Self {
        ParamValue::Pattern(value)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescription {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub node_type: NodeType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, ParamValue>,
}

/// Directed signal edge. Handles are carried for the editor and not
/// interpreted by the engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source_id: String,
    pub target_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_handle: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_handle: Option<String>,
}

#[cfg(feature = "serde")]
fn default_bipolar() -> bool {
    true
}

/// Control edge: `source`'s modulation output moves `target.targetParam`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ModulationRoute {
    pub source_id: String,
    pub target_id: String,
    pub target_param: String,
    pub amount: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_bipolar"))]
    pub bipolar: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphPatch {
    pub nodes: Vec<NodeDescription>,
    pub connections: Vec<Connection>,
    pub modulations: Vec<ModulationRoute>,
}

impl GraphPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a node. Builder style, for tests and programmatic patches.
    pub fn node<I, K, V>(mut self, id: &str, node_type: NodeType, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.nodes.push(NodeDescription {
            id: id.to_owned(),
            node_type,
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.connections.push(Connection {
            source_id: source.to_owned(),
            target_id: target.to_owned(),
            source_handle: None,
            target_handle: None,
        });
        self
    }

    pub fn modulate(mut self, source: &str, target: &str, param: &str, amount: f32, bipolar: bool) -> Self {
        self.modulations.push(ModulationRoute {
            source_id: source.to_owned(),
            target_id: target.to_owned(),
            target_param: param.to_owned(),
            amount,
            bipolar,
        });
        self
    }
}

/// Named macro value, see `UPDATE_MACROS`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MacroValue {
    pub id: String,
    pub value: f32,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn parses_editor_json() {
        let patch = GraphPatch::from_json(
            r#"{
                "nodes": [
                    { "id": "seq", "type": "sequencer", "params": { "pattern": [true, false, true], "tempo": 90 } },
                    { "id": "osc", "type": "oscillator", "params": { "frequency": 220.5, "waveform": "saw", "muted": false } },
                    { "id": "out", "type": "output" }
                ],
                "connections": [ { "sourceId": "osc", "targetId": "out", "sourceHandle": "audio" } ],
                "modulations": [ { "sourceId": "seq", "targetId": "osc", "targetParam": "frequency", "amount": 0.25 } ]
            }"#,
        )
        .unwrap();

        assert_eq!(patch.nodes.len(), 3);
        assert_eq!(patch.nodes[0].params["pattern"], ParamValue::Pattern(vec![true, false, true]));
        assert_eq!(patch.nodes[1].params["frequency"].as_f32(), Some(220.5));
        assert_eq!(patch.nodes[1].params["waveform"].as_str(), Some("saw"));
        assert_eq!(patch.nodes[1].params["muted"].as_bool(), Some(false));
        assert!(patch.nodes[2].params.is_empty());
        assert_eq!(patch.connections[0].source_handle.as_deref(), Some("audio"));
        assert!(patch.modulations[0].bipolar, "bipolar defaults to true");
    }

    #[test]
    fn unknown_node_type_is_a_json_error() {
        let err = GraphPatch::from_json(r#"{ "nodes": [ { "id": "x", "type": "theremin" } ] }"#);
        assert!(matches!(err, Err(crate::error::Error::Json(_))));
    }
}
