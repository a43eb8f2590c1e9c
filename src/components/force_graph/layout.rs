use std::collections::HashMap;

use super::types::GraphData;

/// Gap between ranks before spacing is applied.
const RANK_GAP: f64 = 110.0;
/// Gap between siblings in a rank before spacing is applied.
const NODE_GAP: f64 = 110.0;

/// Longest-path rank of every node, top to bottom. Nodes caught in a cycle
/// keep the rank they had when the cycle was detected.
pub fn ranks(data: &GraphData) -> HashMap<String, usize> {
	let mut rank: HashMap<String, usize> = data.nodes.iter().map(|n| (n.id.clone(), 0)).collect();
	// Relax |V| times; a DAG settles well before that.
	for _ in 0..data.nodes.len() {
		let mut changed = false;
		for link in &data.links {
			let (Some(&src), Some(&tgt)) = (rank.get(&link.source), rank.get(&link.target)) else {
				continue;
			};
			if tgt <= src {
				rank.insert(link.target.clone(), src + 1);
				changed = true;
			}
		}
		if !changed {
			break;
		}
	}
	rank
}

/// Positions centred on the origin: ranks stacked vertically, nodes within a
/// rank spread horizontally in declaration order.
pub fn layered_positions(data: &GraphData, spacing: f64) -> HashMap<String, (f64, f64)> {
	let rank = ranks(data);
	let depth = rank.values().copied().max().unwrap_or(0);
	let mut rows: Vec<Vec<&str>> = vec![Vec::new(); depth + 1];
	for node in &data.nodes {
		rows[rank[&node.id]].push(&node.id);
	}

	let (dy, dx) = (RANK_GAP * spacing, NODE_GAP * spacing);
	let top = -(depth as f64) * dy / 2.0;
	let mut positions = HashMap::new();
	for (r, row) in rows.iter().enumerate() {
		let left = -((row.len().max(1) - 1) as f64) * dx / 2.0;
		for (i, id) in row.iter().enumerate() {
			positions.insert(id.to_string(), (left + i as f64 * dx, top + r as f64 * dy));
		}
	}
	positions
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::GraphLink;
	use crate::network::NodeId;

	fn network() -> GraphData {
		GraphData::belief_network()
	}

	#[test]
	fn every_edge_points_down_a_rank() {
		let data = network();
		let rank = ranks(&data);
		for link in &data.links {
			assert!(rank[&link.source] < rank[&link.target], "{} -> {}", link.source, link.target);
		}
	}

	#[test]
	fn inputs_sit_on_top_and_confidence_below_confusion() {
		let rank = ranks(&network());
		for id in crate::network::INPUT_NODES {
			assert_eq!(rank[id.as_str()], 0);
		}
		assert_eq!(rank[NodeId::IS3.as_str()], 2);
		assert_eq!(rank[NodeId::IS1.as_str()], 3);
		assert_eq!(rank[NodeId::O1.as_str()], 4);
	}

	#[test]
	fn rows_are_centred_and_spaced() {
		let positions = layered_positions(&network(), 1.2);
		assert_eq!(positions.len(), 15);
		let (a1, h) = (positions["A1"], positions["H"]);
		assert_eq!(a1.1, h.1);
		assert!((a1.0 + h.0).abs() < 1e-9);
		assert!((positions["IS2"].1 - a1.1 - 132.0).abs() < 1e-9);
	}

	#[test]
	fn cycles_do_not_hang() {
		let mut data = network();
		data.links.push(GraphLink {
			id: "o1_a1".into(),
			source: "O1".into(),
			target: "A1".into(),
		});
		assert_eq!(ranks(&data).len(), 15);
	}
}
