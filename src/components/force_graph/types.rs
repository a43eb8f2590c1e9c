use crate::network::{EDGES, NODES, edge_id};
use crate::presenter::NEUTRAL_COLOR;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub id: String,
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// The fixed belief network, every node idle.
	pub fn belief_network() -> Self {
		let nodes = NODES
			.iter()
			.map(|id| GraphNode {
				id: id.to_string(),
				label: Some(id.base_label().to_string()),
				color: Some(NEUTRAL_COLOR.to_string()),
			})
			.collect();
		let links = EDGES
			.iter()
			.map(|&(source, target)| GraphLink {
				id: edge_id(source, target),
				source: source.to_string(),
				target: target.to_string(),
			})
			.collect();
		Self { nodes, links }
	}
}
