//! Static topology of the displayed belief network.
//!
//! Seven evidence inputs feed five internal states, which in turn feed three
//! outputs. Node ids are a closed set, so every edge endpoint is known to
//! exist by construction.

use std::fmt;
use std::str::FromStr;

/// Role of a node in the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// User-supplied evidence.
	Input,
	/// Latent state inferred by the backend.
	InternalState,
	/// Predicted behaviour.
	Output,
}

/// Identifier of one of the 15 network variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
	/// Domain expertise.
	A1,
	/// Web literacy.
	A2,
	/// Task familiarity.
	A3,
	/// Goal.
	A4,
	/// Motivation.
	A5,
	/// UI state.
	UI,
	/// History.
	H,
	/// Confidence.
	IS1,
	/// Cognitive load.
	IS2,
	/// Confusion.
	IS3,
	/// Current sub-goal.
	IS4,
	/// Relevant knowledge activated.
	IS5,
	/// Predicted action.
	O1,
	/// Action probability.
	O2,
	/// Reasoning.
	O3,
}

/// Every node, in display order.
pub const NODES: [NodeId; 15] = [
	NodeId::A1,
	NodeId::A2,
	NodeId::A3,
	NodeId::A4,
	NodeId::A5,
	NodeId::UI,
	NodeId::H,
	NodeId::IS1,
	NodeId::IS2,
	NodeId::IS3,
	NodeId::IS4,
	NodeId::IS5,
	NodeId::O1,
	NodeId::O2,
	NodeId::O3,
];

/// The evidence nodes the user sets, in form order.
pub const INPUT_NODES: [NodeId; 7] = [
	NodeId::A1,
	NodeId::A2,
	NodeId::A3,
	NodeId::A4,
	NodeId::A5,
	NodeId::UI,
	NodeId::H,
];

/// Directed dependencies `(parent, child)`.
pub const EDGES: [(NodeId, NodeId); 29] = {
	use NodeId::*;
	[
		(A1, IS1),
		(A1, IS3),
		(A1, IS5),
		(A2, IS1),
		(A2, IS2),
		(A2, IS3),
		(A3, IS1),
		(A3, IS4),
		(A3, IS5),
		(A4, IS4),
		(A5, IS1),
		(A5, IS2),
		(UI, IS1),
		(UI, IS2),
		(UI, IS3),
		(H, IS1),
		(H, IS4),
		(H, IS3),
		(IS2, IS3),
		(IS3, IS1),
		(IS5, IS1),
		(IS4, IS5),
		(IS1, O1),
		(IS1, O2),
		(IS3, O1),
		(IS3, O3),
		(IS4, O1),
		(IS5, O1),
		(IS5, O3),
	]
};

impl NodeId {
	/// Wire name, as used in request and response bodies.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeId::A1 => "A1",
			NodeId::A2 => "A2",
			NodeId::A3 => "A3",
			NodeId::A4 => "A4",
			NodeId::A5 => "A5",
			NodeId::UI => "UI",
			NodeId::H => "H",
			NodeId::IS1 => "IS1",
			NodeId::IS2 => "IS2",
			NodeId::IS3 => "IS3",
			NodeId::IS4 => "IS4",
			NodeId::IS5 => "IS5",
			NodeId::O1 => "O1",
			NodeId::O2 => "O2",
			NodeId::O3 => "O3",
		}
	}

	/// Human-readable label shown on the canvas.
	pub fn base_label(self) -> &'static str {
		match self {
			NodeId::A1 => "A1: Domain Exp",
			NodeId::A2 => "A2: Web Lit",
			NodeId::A3 => "A3: Task Fam",
			NodeId::A4 => "A4: Goal",
			NodeId::A5 => "A5: Motivation",
			NodeId::UI => "UI: UI State",
			NodeId::H => "H: History",
			NodeId::IS1 => "IS1: Confidence",
			NodeId::IS2 => "IS2: Cog Load",
			NodeId::IS3 => "IS3: Confusion",
			NodeId::IS4 => "IS4: Sub-Goal",
			NodeId::IS5 => "IS5: Knowl Act",
			NodeId::O1 => "O1: Pred Action",
			NodeId::O2 => "O2: Action Prob",
			NodeId::O3 => "O3: Reasoning",
		}
	}

	/// Role of this node.
	pub fn kind(self) -> NodeKind {
		match self {
			NodeId::A1
			| NodeId::A2
			| NodeId::A3
			| NodeId::A4
			| NodeId::A5
			| NodeId::UI
			| NodeId::H => NodeKind::Input,
			NodeId::IS1 | NodeId::IS2 | NodeId::IS3 | NodeId::IS4 | NodeId::IS5 => {
				NodeKind::InternalState
			}
			NodeId::O1 | NodeId::O2 | NodeId::O3 => NodeKind::Output,
		}
	}

	/// DOM id of the form field holding this node's evidence.
	pub fn input_element_id(self) -> String {
		format!("input-{}", self.as_str())
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string names no known node.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown node id `{0}`")]
pub struct UnknownNode(pub String);

impl FromStr for NodeId {
	type Err = UnknownNode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		NODES
			.iter()
			.copied()
			.find(|id| id.as_str() == s)
			.ok_or_else(|| UnknownNode(s.to_string()))
	}
}

/// Stable edge identifier, e.g. `is3_o1`.
pub fn edge_id(source: NodeId, target: NodeId) -> String {
	format!(
		"{}_{}",
		source.as_str().to_lowercase(),
		target.as_str().to_lowercase()
	)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn ids_round_trip_through_wire_names() {
		for id in NODES {
			assert_eq!(id.as_str().parse::<NodeId>(), Ok(id));
			assert!(id.base_label().starts_with(id.as_str()));
		}
		assert_eq!("X9".parse::<NodeId>(), Err(UnknownNode("X9".into())));
	}

	#[test]
	fn node_kinds_split_seven_five_three() {
		let count = |kind| NODES.iter().filter(|id| id.kind() == kind).count();
		assert_eq!(count(NodeKind::Input), 7);
		assert_eq!(count(NodeKind::InternalState), 5);
		assert_eq!(count(NodeKind::Output), 3);
		assert!(INPUT_NODES.iter().all(|id| id.kind() == NodeKind::Input));
	}

	#[test]
	fn edges_are_unique_and_never_target_inputs() {
		let ids: HashSet<String> = EDGES.iter().map(|&(s, t)| edge_id(s, t)).collect();
		assert_eq!(ids.len(), EDGES.len());
		assert!(ids.contains("is5_o3"));
		assert!(EDGES.iter().all(|&(_, t)| t.kind() != NodeKind::Input));
		assert!(EDGES.iter().all(|&(s, _)| s.kind() != NodeKind::Output));
	}
}
