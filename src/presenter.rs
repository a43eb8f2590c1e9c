//! Display state derived from posterior probabilities.
//!
//! Computing a node's label and color is pure ([`node_display`]). Pushing the
//! result onto the canvas is left to the force graph component.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde_json::Value;

use crate::network::{NODES, NodeId};

/// Fill used for nodes with no probability.
pub const NEUTRAL_COLOR: &str = "#ccc";

/// Probabilities returned for a single node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeProbability {
	/// P(node = 0), when supplied.
	pub p0: Option<f64>,
	/// P(node = 1), when supplied.
	pub p1: Option<f64>,
}

/// Posterior probabilities keyed by node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbabilityMap {
	entries: BTreeMap<NodeId, NodeProbability>,
}

/// The response body was not a JSON object.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("expected a JSON object keyed by node id, got {0}")]
pub struct NotAnObject(pub String);

impl ProbabilityMap {
	/// Map with no entries; applying it resets every node.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Record P(1) for `id`, deriving P(0) as its complement.
	pub fn with_p1(mut self, id: NodeId, p1: f64) -> Self {
		self.entries.insert(
			id,
			NodeProbability {
				p0: Some(1.0 - p1),
				p1: Some(p1),
			},
		);
		self
	}

	/// Entry for `id`, if the response carried one.
	pub fn get(&self, id: NodeId) -> Option<&NodeProbability> {
		self.entries.get(&id)
	}

	/// P(1) for `id`, if defined.
	pub fn p1(&self, id: NodeId) -> Option<f64> {
		self.get(id).and_then(|entry| entry.p1)
	}

	/// Number of nodes with an entry.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no node has an entry.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn state(entry: &Value, key: &str) -> Option<f64> {
	entry.get(key).and_then(Value::as_f64)
}

impl TryFrom<Value> for ProbabilityMap {
	type Error = NotAnObject;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		let Value::Object(object) = value else {
			return Err(NotAnObject(value.to_string()));
		};
		let mut entries = BTreeMap::new();
		for (key, entry) in &object {
			let Ok(id) = key.parse::<NodeId>() else {
				debug!("Ignoring probabilities for unknown node {key}");
				continue;
			};
			if !entry.is_object() {
				debug!("Ignoring non-object probabilities for {id}: {entry}");
				continue;
			}
			entries.insert(
				id,
				NodeProbability {
					p0: state(entry, "0"),
					p1: state(entry, "1"),
				},
			);
		}
		Ok(Self { entries })
	}
}

/// An `rgb()` fill whose channels are not clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	/// Red channel.
	pub r: i64,
	/// Green channel.
	pub g: i64,
	/// Blue channel.
	pub b: i64,
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
	}
}

/// Nearest integer, halves rounded towards positive infinity.
fn round_half_up(x: f64) -> i64 {
	(x + 0.5).floor() as i64
}

/// Blue at p=0 through red at p=1.
pub fn evidence_color(p: f64) -> Rgb {
	Rgb {
		r: round_half_up(255.0 * p),
		g: 0,
		b: round_half_up(255.0 * (1.0 - p)),
	}
}

/// `p` with three decimals. Exact ties round away from zero, unlike `{:.3}`
/// which rounds them to even.
pub fn three_decimals(p: f64) -> String {
	// Only odd multiples of 1/16 end in a 5 at the fourth decimal.
	let sixteenths = p * 16.0;
	if sixteenths.fract() == 0.0 && sixteenths % 2.0 != 0.0 {
		let magnitude = (p.abs() * 1000.0).ceil() / 1000.0;
		return format!("{:.3}", magnitude.copysign(p));
	}
	format!("{p:.3}")
}

/// Label and fill of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDisplay {
	/// Node being displayed.
	pub id: NodeId,
	/// Multi-line label.
	pub label: String,
	/// CSS color.
	pub color: String,
}

/// Derive the display of `id` from `map`.
pub fn node_display(id: NodeId, map: &ProbabilityMap) -> NodeDisplay {
	match map.p1(id) {
		Some(p) => NodeDisplay {
			id,
			label: format!("{}\nP(1)={}", id.base_label(), three_decimals(p)),
			color: evidence_color(p).to_string(),
		},
		None => NodeDisplay {
			id,
			label: format!("{}\n(N/A)", id.base_label()),
			color: NEUTRAL_COLOR.to_string(),
		},
	}
}

/// Owns the display state of every node for the session.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphPresenter {
	displays: Vec<NodeDisplay>,
}

impl Default for GraphPresenter {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphPresenter {
	/// Every node starts idle.
	pub fn new() -> Self {
		let mut presenter = Self {
			displays: Vec::with_capacity(NODES.len()),
		};
		presenter.apply_probabilities(&ProbabilityMap::empty());
		presenter
	}

	/// Recompute every node's label and color from `map`.
	pub fn apply_probabilities(&mut self, map: &ProbabilityMap) {
		self.displays = NODES.iter().map(|&id| node_display(id, map)).collect();
	}

	/// Current displays, in network order.
	pub fn displays(&self) -> &[NodeDisplay] {
		&self.displays
	}

	/// Current display of `id`.
	pub fn display(&self, id: NodeId) -> Option<&NodeDisplay> {
		self.displays.iter().find(|display| display.id == id)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn color_channels_follow_probability() {
		for (p, expected) in [
			(0.0, "rgb(0, 0, 255)"),
			(0.004, "rgb(1, 0, 254)"),
			(0.25, "rgb(64, 0, 191)"),
			(0.5, "rgb(128, 0, 128)"),
			(0.999, "rgb(255, 0, 0)"),
			(1.0, "rgb(255, 0, 0)"),
		] {
			assert_eq!(evidence_color(p).to_string(), expected, "p = {p}");
		}
	}

	#[test]
	fn negative_half_channels_round_up() {
		// 255 * p is exactly -0.5 and 255 * (1 - p) exactly 255.5.
		assert_eq!(evidence_color(-0.5 / 255.0).to_string(), "rgb(0, 0, 256)");
		assert_eq!(round_half_up(-2.5), -2);
		assert_eq!(round_half_up(2.5), 3);
	}

	#[test]
	fn label_ties_round_away_from_zero() {
		for (p, expected) in [
			(0.0625, "0.063"),
			(0.3125, "0.313"),
			(0.5625, "0.563"),
			(-0.0625, "-0.063"),
			(0.125, "0.125"),
			(0.0005, "0.001"),
			(1.0005, "1.000"),
			(0.73, "0.730"),
		] {
			assert_eq!(three_decimals(p), expected, "p = {p}");
		}
		let map = ProbabilityMap::empty().with_p1(NodeId::IS5, 0.0625);
		assert_eq!(node_display(NodeId::IS5, &map).label, "IS5: Knowl Act\nP(1)=0.063");
	}

	#[test]
	fn out_of_range_probabilities_are_not_clamped() {
		assert_eq!(evidence_color(1.2).to_string(), "rgb(306, 0, -51)");
		let map = ProbabilityMap::empty().with_p1(NodeId::IS2, -0.5);
		assert_eq!(node_display(NodeId::IS2, &map).label, "IS2: Cog Load\nP(1)=-0.500");
	}

	#[test]
	fn predicted_action_is_relabelled_and_recolored() {
		let map = ProbabilityMap::try_from(json!({"O1": {"0": 0.27, "1": 0.73}})).unwrap();
		let display = node_display(NodeId::O1, &map);
		assert_eq!(display.label, "O1: Pred Action\nP(1)=0.730");
		assert_eq!(display.color, "rgb(186, 0, 69)");
	}

	#[test]
	fn missing_or_undefined_state_is_not_available() {
		let map = ProbabilityMap::try_from(json!({
			"A1": {"0": 0.2},
			"A2": {"1": null},
			"A3": {"1": "0.4"},
			"A4": 0.9,
			"IS1": {"1": 0.6},
		}))
		.unwrap();
		for id in [NodeId::A1, NodeId::A2, NodeId::A3, NodeId::A4, NodeId::O3] {
			let display = node_display(id, &map);
			assert!(display.label.ends_with("(N/A)"), "{}", display.label);
			assert_eq!(display.color, NEUTRAL_COLOR);
		}
		assert_eq!(node_display(NodeId::IS1, &map).color, "rgb(153, 0, 102)");
	}

	#[test]
	fn unknown_nodes_are_ignored_and_non_objects_rejected() {
		let map = ProbabilityMap::try_from(json!({"Z9": {"1": 0.1}, "H": {"1": 1}})).unwrap();
		assert_eq!(map.len(), 1);
		assert_eq!(map.p1(NodeId::H), Some(1.0));
		assert!(ProbabilityMap::try_from(json!([0.1, 0.2])).is_err());
		assert!(ProbabilityMap::try_from(json!("oops")).is_err());
	}

	#[test]
	fn empty_map_resets_every_node() {
		let mut presenter = GraphPresenter::new();
		let full = NODES
			.iter()
			.fold(ProbabilityMap::empty(), |map, &id| map.with_p1(id, 0.6));
		presenter.apply_probabilities(&full);
		assert!(presenter.displays().iter().all(|d| d.color == "rgb(153, 0, 102)"));

		presenter.apply_probabilities(&ProbabilityMap::empty());
		assert_eq!(presenter.displays().len(), NODES.len());
		for display in presenter.displays() {
			assert_eq!(display.label, format!("{}\n(N/A)", display.id.base_label()));
			assert_eq!(display.color, NEUTRAL_COLOR);
		}
		assert_eq!(presenter, GraphPresenter::new());
	}

	#[test]
	fn presenter_keeps_network_order() {
		let presenter = GraphPresenter::new();
		let ids: Vec<NodeId> = presenter.displays().iter().map(|d| d.id).collect();
		assert_eq!(ids, NODES.to_vec());
		assert!(presenter.display(NodeId::O2).is_some());
	}
}
