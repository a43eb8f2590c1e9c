//! Runtime settings, read once at startup.

use log::{debug, warn};
use reqwest::Url;
use wasm_bindgen::JsCast;
use web_sys::HtmlMetaElement;

/// Default path of the prediction endpoint, relative to the page origin.
pub const DEFAULT_PREDICT_PATH: &str = "/predict_openai_bn_single_call";
/// Default path of the backend health check.
pub const DEFAULT_PING_PATH: &str = "/api/ping";
/// Substituted for evidence fields that are empty or unparseable.
pub const DEFAULT_EVIDENCE: f64 = 0.5;

const PREDICT_META: &str = "bn-predict-endpoint";
const PING_META: &str = "bn-ping-endpoint";

/// Errors raised while resolving configured endpoints.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
	/// The page origin or an endpoint did not form a valid URL.
	#[error("invalid endpoint `{endpoint}`: {reason}")]
	InvalidEndpoint {
		/// Offending endpoint.
		endpoint: String,
		/// Parser message.
		reason: String,
	},
}

/// Endpoints and defaults used by the prediction client.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Path or absolute URL receiving the evidence POST.
	pub predict_endpoint: String,
	/// Path or absolute URL of the health check.
	pub ping_endpoint: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			predict_endpoint: DEFAULT_PREDICT_PATH.into(),
			ping_endpoint: DEFAULT_PING_PATH.into(),
		}
	}
}

impl AppConfig {
	/// Defaults, overridden by `<meta name="bn-predict-endpoint">` and
	/// `<meta name="bn-ping-endpoint">` when the page carries them.
	pub fn from_document() -> Self {
		let mut config = Self::default();
		if let Some(endpoint) = meta_content(PREDICT_META) {
			config.predict_endpoint = endpoint;
		}
		if let Some(endpoint) = meta_content(PING_META) {
			config.ping_endpoint = endpoint;
		}
		debug!("Using {config:?}");
		config
	}

	/// Page origin, e.g. `https://example.org`.
	pub fn page_origin() -> Option<String> {
		web_sys::window()?.location().origin().ok()
	}
}

fn meta_content(name: &str) -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document
		.query_selector(&format!("meta[name=\"{name}\"]"))
		.ok()??;
	let Ok(meta) = element.dyn_into::<HtmlMetaElement>() else {
		warn!("Element named {name} is not a <meta> tag");
		return None;
	};
	let content = meta.content();
	let content = content.trim();
	(!content.is_empty()).then(|| content.to_string())
}

/// Resolve `endpoint` against `origin`; absolute endpoints are kept as is.
pub fn resolve_endpoint(origin: &str, endpoint: &str) -> Result<Url, ConfigError> {
	match Url::parse(endpoint) {
		Ok(url) => Ok(url),
		Err(_) => Url::parse(origin)
			.and_then(|base| base.join(endpoint))
			.map_err(|e| ConfigError::InvalidEndpoint {
				endpoint: endpoint.to_string(),
				reason: e.to_string(),
			}),
	}
}
