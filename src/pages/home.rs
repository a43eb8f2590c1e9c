use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::components::evidence_form::EvidenceForm;
use crate::components::force_graph::{ForceGraphCanvas, GraphData};
use crate::config::{AppConfig, DEFAULT_EVIDENCE};
use crate::network::{INPUT_NODES, NodeId};
use crate::prediction::{BrowserAlert, BusyGuard, InputVector, PredictionClient, fetch_predictions};
use crate::presenter::GraphPresenter;

#[derive(Clone, Debug, PartialEq)]
enum BackendStatus {
	Checking,
	Online(String),
	Unreachable,
}

impl BackendStatus {
	fn text(&self) -> String {
		match self {
			BackendStatus::Checking => "Backend: checking...".into(),
			BackendStatus::Online(message) => format!("Backend: online ({message})"),
			BackendStatus::Unreachable => "Backend: unreachable".into(),
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = AppConfig::from_document();
	let client = PredictionClient::for_page(&config);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{client.map(|client| view! { <BeliefNetwork client=client /> })}
		</ErrorBoundary>
	}
}

/// Graph, evidence form and backend status for one session.
#[component]
fn BeliefNetwork(client: PredictionClient) -> impl IntoView {
	let client = Rc::new(client);
	let graph_data = Signal::derive(GraphData::belief_network);
	let presenter = RwSignal::new(GraphPresenter::new());
	let display = Signal::derive(move || presenter.with(|p| p.displays().to_vec()));
	let busy = RwSignal::new(false);
	let status = RwSignal::new(BackendStatus::Checking);
	let fields: Vec<(NodeId, RwSignal<String>)> = INPUT_NODES
		.iter()
		.map(|&id| (id, RwSignal::new(DEFAULT_EVIDENCE.to_string())))
		.collect();

	let ping_client = client.clone();
	spawn_local(async move {
		match ping_client.ping().await {
			Ok(message) => {
				info!("Backend answered ping: {message}");
				status.set(BackendStatus::Online(message));
			}
			Err(e) => {
				warn!("Backend ping failed: {e}");
				status.set(BackendStatus::Unreachable);
			}
		}
	});

	let form_fields = fields.clone();
	let on_submit = move || {
		let input = InputVector::from_fields(|id| {
			fields
				.iter()
				.find(|(field, _)| *field == id)
				.map(|(_, value)| value.get_untracked())
		});
		let Some(guard) = BusyGuard::acquire(busy) else {
			return;
		};
		let client = client.clone();
		spawn_local(async move {
			let _guard = guard;
			if let Some(map) = fetch_predictions(&client, &input, &BrowserAlert).await {
				presenter.update(|p| p.apply_probabilities(&map));
			}
		});
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=graph_data display=display fullscreen=true />
			<div class="graph-overlay">
				<h1>"Belief Network"</h1>
				<p class="subtitle">"Set evidence for the inputs, then update. Drag nodes to reposition. Scroll to zoom."</p>
				<EvidenceForm fields=form_fields busy=busy on_submit=on_submit />
				<div class="legend">
					<span>"P(1)=0"</span>
					<span class="legend-gradient"></span>
					<span>"P(1)=1"</span>
				</div>
				<p class="backend-status">{move || status.get().text()}</p>
			</div>
		</div>
	}
}
