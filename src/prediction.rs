//! Evidence input, the prediction request and failure reporting.

use leptos::prelude::*;
use log::{debug, error, info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{AppConfig, ConfigError, DEFAULT_EVIDENCE, resolve_endpoint};
use crate::network::NodeId;
use crate::presenter::ProbabilityMap;

/// Caption of the trigger while idle.
pub const IDLE_CAPTION: &str = "Update Probabilities";
/// Caption of the trigger while a request is in flight.
pub const BUSY_CAPTION: &str = "Updating...";

/// Errors surfaced by a prediction round trip.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
	/// The endpoint answered with a non-success status.
	#[error("HTTP error! status: {status}, detail: {detail}")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Best-effort explanation extracted from the body.
		detail: String,
	},
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(#[from] reqwest::Error),
	/// A success response whose body was not a probability map.
	#[error("malformed response: {0}")]
	MalformedResponse(String),
}

/// Parse one evidence field, falling back to the default for anything that
/// is not a finite number.
pub fn parse_evidence(raw: Option<&str>) -> f64 {
	raw.and_then(|value| value.trim().parse::<f64>().ok())
		.filter(|value| value.is_finite())
		.unwrap_or(DEFAULT_EVIDENCE)
}

/// The seven evidence values sent to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputVector {
	#[serde(rename = "A1")]
	a1: f64,
	#[serde(rename = "A2")]
	a2: f64,
	#[serde(rename = "A3")]
	a3: f64,
	#[serde(rename = "A4")]
	a4: f64,
	#[serde(rename = "A5")]
	a5: f64,
	#[serde(rename = "UI")]
	ui: f64,
	#[serde(rename = "H")]
	h: f64,
}

impl Default for InputVector {
	fn default() -> Self {
		Self::from_fields(|_| None)
	}
}

impl InputVector {
	/// Build from raw form values, looked up per input node.
	pub fn from_fields(mut field: impl FnMut(NodeId) -> Option<String>) -> Self {
		let mut read = |id| parse_evidence(field(id).as_deref());
		Self {
			a1: read(NodeId::A1),
			a2: read(NodeId::A2),
			a3: read(NodeId::A3),
			a4: read(NodeId::A4),
			a5: read(NodeId::A5),
			ui: read(NodeId::UI),
			h: read(NodeId::H),
		}
	}

	/// Evidence for `id`; `None` for nodes that are not inputs.
	pub fn get(&self, id: NodeId) -> Option<f64> {
		match id {
			NodeId::A1 => Some(self.a1),
			NodeId::A2 => Some(self.a2),
			NodeId::A3 => Some(self.a3),
			NodeId::A4 => Some(self.a4),
			NodeId::A5 => Some(self.a5),
			NodeId::UI => Some(self.ui),
			NodeId::H => Some(self.h),
			_ => None,
		}
	}
}

/// Coarse reading of an evidence value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvidenceLevel {
	/// Below 0.33.
	Low,
	/// From 0.33 up to 0.66.
	Medium,
	/// 0.66 and above.
	High,
}

impl EvidenceLevel {
	/// Classify a probability.
	pub fn of(p: f64) -> Self {
		if p >= 0.66 {
			EvidenceLevel::High
		} else if p >= 0.33 {
			EvidenceLevel::Medium
		} else {
			EvidenceLevel::Low
		}
	}

	/// Short display name.
	pub fn label(self) -> &'static str {
		match self {
			EvidenceLevel::Low => "Low",
			EvidenceLevel::Medium => "Medium",
			EvidenceLevel::High => "High",
		}
	}
}

/// `null`, `false`, zero and the empty string carry no detail.
fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(flag) => !flag,
		Value::Number(n) => n.as_f64() == Some(0.0),
		Value::String(s) => s.is_empty(),
		Value::Array(_) | Value::Object(_) => false,
	}
}

/// Human-readable detail of a failed response body.
pub fn error_detail(body: &str) -> String {
	match serde_json::from_str::<Value>(body) {
		Ok(json) => match json.get("detail") {
			Some(detail) if !is_blank(detail) => match detail {
				Value::String(text) => text.clone(),
				other => other.to_string(),
			},
			_ => json.to_string(),
		},
		Err(_) => body.to_string(),
	}
}

#[derive(Deserialize)]
struct Pong {
	message: String,
}

/// Talks to the external inference backend.
#[derive(Clone, Debug)]
pub struct PredictionClient {
	http: reqwest::Client,
	predict_url: Url,
	ping_url: Url,
}

impl PredictionClient {
	/// Resolve the configured endpoints against `origin`.
	pub fn new(config: &AppConfig, origin: &str) -> Result<Self, ConfigError> {
		Ok(Self {
			http: reqwest::Client::new(),
			predict_url: resolve_endpoint(origin, &config.predict_endpoint)?,
			ping_url: resolve_endpoint(origin, &config.ping_endpoint)?,
		})
	}

	/// Client for the current page.
	pub fn for_page(config: &AppConfig) -> Result<Self, ConfigError> {
		let origin = AppConfig::page_origin().unwrap_or_default();
		Self::new(config, &origin)
	}

	/// POST `input` and return the posterior of every node.
	pub async fn predict(&self, input: &InputVector) -> Result<ProbabilityMap, PredictError> {
		debug!("POST {} with {input:?}", self.predict_url);
		let response = self
			.http
			.post(self.predict_url.clone())
			.json(input)
			.send()
			.await?;
		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(PredictError::Http {
				status: status.as_u16(),
				detail: error_detail(&body),
			});
		}
		let json: Value = serde_json::from_str(&body)
			.map_err(|e| PredictError::MalformedResponse(e.to_string()))?;
		let map = ProbabilityMap::try_from(json)
			.map_err(|e| PredictError::MalformedResponse(e.to_string()))?;
		info!("Received probabilities for {} nodes", map.len());
		Ok(map)
	}

	/// Health check; returns the backend's message.
	pub async fn ping(&self) -> Result<String, PredictError> {
		let response = self.http.get(self.ping_url.clone()).send().await?;
		let status = response.status();
		if !status.is_success() {
			let body = response.text().await?;
			return Err(PredictError::Http {
				status: status.as_u16(),
				detail: error_detail(&body),
			});
		}
		let pong: Pong = response.json().await?;
		Ok(pong.message)
	}
}

/// Blocking, user-visible notification.
pub trait Notifier {
	/// Show `message` to the user.
	fn notify(&self, message: &str);
}

/// `window.alert`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserAlert;

impl Notifier for BrowserAlert {
	fn notify(&self, message: &str) {
		let Some(window) = web_sys::window() else {
			warn!("No window to alert: {message}");
			return;
		};
		if let Err(e) = window.alert_with_message(message) {
			warn!("Alert failed: {e:?}");
		}
	}
}

/// Log `err` for operators and tell the user.
pub fn report_failure(err: &PredictError, notifier: &impl Notifier) {
	error!("Error fetching predictions: {err}");
	notifier.notify(&format!("Error fetching predictions: {err}"));
}

/// Run one prediction, reporting any failure. The caller applies the map.
pub async fn fetch_predictions(
	client: &PredictionClient,
	input: &InputVector,
	notifier: &impl Notifier,
) -> Option<ProbabilityMap> {
	match client.predict(input).await {
		Ok(map) => Some(map),
		Err(err) => {
			report_failure(&err, notifier);
			None
		}
	}
}

/// Marks the trigger busy for as long as it lives.
pub struct BusyGuard {
	busy: RwSignal<bool>,
}

impl BusyGuard {
	/// Mark `busy`, or `None` when a request is already in flight.
	pub fn acquire(busy: RwSignal<bool>) -> Option<Self> {
		if busy.get_untracked() {
			debug!("Prediction already in flight; ignoring trigger");
			return None;
		}
		busy.set(true);
		Some(Self { busy })
	}
}

impl Drop for BusyGuard {
	fn drop(&mut self) {
		self.busy.set(false);
	}
}

/// Caption for the trigger.
pub fn trigger_caption(busy: bool) -> &'static str {
	if busy { BUSY_CAPTION } else { IDLE_CAPTION }
}
