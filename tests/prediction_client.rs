#![cfg(not(target_arch = "wasm32"))]
//! Round trips against a mock inference backend.

use std::cell::RefCell;

use belief_graph_viewer::config::AppConfig;
use belief_graph_viewer::network::{NODES, NodeId};
use belief_graph_viewer::prediction::{
	InputVector, Notifier, PredictError, PredictionClient, fetch_predictions,
};
use belief_graph_viewer::presenter::{GraphPresenter, NEUTRAL_COLOR};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Alerts(RefCell<Vec<String>>);

impl Notifier for Alerts {
	fn notify(&self, message: &str) {
		self.0.borrow_mut().push(message.to_string());
	}
}

fn client_for(server: &MockServer) -> PredictionClient {
	PredictionClient::new(&AppConfig::default(), &server.uri()).unwrap()
}

fn scenario_input() -> InputVector {
	InputVector::from_fields(|id| (id == NodeId::A1).then(|| "0.8".to_string()))
}

fn full_response() -> Value {
	let mut body = serde_json::Map::new();
	for id in NODES {
		let p1 = if id == NodeId::O1 { 0.73 } else { 0.5 };
		body.insert(id.to_string(), json!({"0": 1.0 - p1, "1": p1}));
	}
	Value::Object(body)
}

#[tokio::test]
async fn successful_prediction_recolors_output() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/predict_openai_bn_single_call"))
		.and(header("content-type", "application/json"))
		.and(body_json(json!({
			"A1": 0.8, "A2": 0.5, "A3": 0.5, "A4": 0.5, "A5": 0.5, "UI": 0.5, "H": 0.5
		})))
		.respond_with(ResponseTemplate::new(200).set_body_json(full_response()))
		.expect(1)
		.mount(&server)
		.await;

	let alerts = Alerts::default();
	let map = fetch_predictions(&client_for(&server), &scenario_input(), &alerts)
		.await
		.expect("prediction succeeds");
	assert_eq!(map.len(), NODES.len());

	let mut presenter = GraphPresenter::new();
	presenter.apply_probabilities(&map);
	let o1 = presenter.display(NodeId::O1).unwrap();
	assert_eq!(o1.label, "O1: Pred Action\nP(1)=0.730");
	assert_eq!(o1.color, "rgb(186, 0, 69)");
	assert!(alerts.0.borrow().is_empty());
}

#[tokio::test]
async fn server_error_detail_reaches_the_user_and_graph_is_unchanged() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(
			ResponseTemplate::new(500).set_body_json(json!({"detail": "model unavailable"})),
		)
		.mount(&server)
		.await;

	let presenter = GraphPresenter::new();
	let before = presenter.clone();
	let alerts = Alerts::default();
	let result = fetch_predictions(&client_for(&server), &scenario_input(), &alerts).await;

	assert!(result.is_none());
	assert_eq!(presenter, before);
	let alerts = alerts.0.into_inner();
	assert_eq!(alerts.len(), 1);
	assert!(alerts[0].contains("model unavailable"), "{}", alerts[0]);
	assert!(alerts[0].contains("status: 500"), "{}", alerts[0]);
	assert!(presenter.displays().iter().all(|d| d.color == NEUTRAL_COLOR));
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_raw_text() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(502).set_body_string("<h1>Bad Gateway</h1>"))
		.mount(&server)
		.await;

	let err = client_for(&server)
		.predict(&InputVector::default())
		.await
		.unwrap_err();
	match err {
		PredictError::Http { status, detail } => {
			assert_eq!(status, 502);
			assert_eq!(detail, "<h1>Bad Gateway</h1>");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
async fn malformed_success_body_is_reported_not_applied() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
		.mount(&server)
		.await;

	let alerts = Alerts::default();
	let result = fetch_predictions(&client_for(&server), &InputVector::default(), &alerts).await;
	assert!(result.is_none());
	assert!(alerts.0.borrow()[0].starts_with("Error fetching predictions: malformed response"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
	let client = PredictionClient::new(&AppConfig::default(), "http://127.0.0.1:1").unwrap();

	let err = client.predict(&InputVector::default()).await.unwrap_err();
	assert!(matches!(err, PredictError::Transport(_)), "{err}");
}

#[tokio::test]
async fn ping_reads_message() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/ping"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "pong"})))
		.mount(&server)
		.await;

	assert_eq!(client_for(&server).ping().await.unwrap(), "pong");
}

#[tokio::test]
async fn failed_ping_is_an_http_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
		.mount(&server)
		.await;

	let err = client_for(&server).ping().await.unwrap_err();
	assert_eq!(err.to_string(), "HTTP error! status: 404, detail: Not Found");
}
