pub mod force_graph;
pub mod evidence_form;
