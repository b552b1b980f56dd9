//! Layered process configuration for the `server` feature.
//!
//! Values are resolved once at start-up, in increasing precedence: built-in defaults, an optional
//! TOML file (`api-composer.toml` in the working directory unless a path is given), then
//! environment variables prefixed `API_COMPOSER__` with `__` between nested keys, e.g.
//! `API_COMPOSER__PRIMARY__BASE_URL`. The resulting [`ComposerConfig`] is validated and passed by
//! value into constructors; nothing reads it globally.

// std
use std::path::Path;
// crates.io
use config::{Environment, File, FileFormat};
// self
use crate::{
	_prelude::*,
	auth::{Algorithm, Credential, CredentialId, SecretKey, SourceId},
	compose::{Composer, FieldJoin, SourcePlan},
	error::ConfigError,
	http::ReqwestHttpClient,
	source::{
		BodyFields, DEFAULT_MAX_RESULTS, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT, FieldFilter,
		NotFoundPolicy, PagingPlacement, SourceDescriptor, StaticFields,
	},
};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "API_COMPOSER";
/// Configuration file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "api-composer.toml";

/// Complete process configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
	/// Inbound endpoint settings.
	pub server: ServerConfig,
	/// Logging settings.
	pub telemetry: TelemetryConfig,
	/// Pagination bounds and timeout shared by both sources.
	pub limits: LimitsConfig,
	/// Fields the join inspects.
	pub join: FieldJoin,
	/// Source whose records drive the output order.
	pub primary: SourceConfig,
	/// Source whose records point at primary records.
	pub secondary: SourceConfig,
}
impl ComposerConfig {
	/// Loads defaults, then the file at `path` (or the optional default file), then the
	/// environment.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let file = match path {
			Some(path) => File::from(path).required(true),
			None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
		};
		let builder = Self::defaults_builder()?.add_source(file).add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		);

		Self::finish(builder)
	}

	/// Loads defaults overlaid with an inline TOML document.
	pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
		let builder =
			Self::defaults_builder()?.add_source(File::from_str(document, FileFormat::Toml));

		Self::finish(builder)
	}

	/// Per-request timeout.
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.limits.timeout_secs)
	}

	/// Checks everything that would otherwise fail when building the composer.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.join.identifier.is_empty() || self.join.foreign_key.is_empty() {
			return Err(ConfigError::Message("join fields must not be empty".into()));
		}

		self.primary.plan(&self.limits)?;
		self.secondary.plan(&self.limits)?;

		Ok(())
	}

	/// Builds a reqwest-backed composer from this configuration.
	pub fn build_composer(&self) -> Result<Composer<ReqwestHttpClient>, ConfigError> {
		let client = ReqwestClient::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()?;

		Ok(Composer::new(
			ReqwestHttpClient::with_client(client),
			self.primary.plan(&self.limits)?,
			self.secondary.plan(&self.limits)?,
			self.join.clone(),
		))
	}

	fn defaults_builder()
	-> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
		let defaults = config::Config::try_from(&Self::default()).map_err(ConfigError::load)?;

		Ok(config::Config::builder().add_source(defaults))
	}

	fn finish(
		builder: config::ConfigBuilder<config::builder::DefaultState>,
	) -> Result<Self, ConfigError> {
		let config: Self = builder
			.build()
			.and_then(config::Config::try_deserialize)
			.map_err(ConfigError::load)?;

		config.validate()?;

		Ok(config)
	}
}
impl Default for ComposerConfig {
	fn default() -> Self {
		Self {
			server: ServerConfig::default(),
			telemetry: TelemetryConfig::default(),
			limits: LimitsConfig::default(),
			join: FieldJoin::new("id", "datahub_company_id"),
			primary: SourceConfig {
				id: "data-hub".into(),
				path: "/v4/public/search/company".into(),
				verify_response: false,
				query: QueryConfig::Static {
					fields: BodyFields::from_iter([("original_query".into(), "".into())]),
				},
				..SourceConfig::default()
			},
			secondary: SourceConfig {
				id: "data-science".into(),
				path: "/api/v1/company/search/".into(),
				not_found: NotFoundPolicy::EmptyPage,
				paging: PagingPlacement::Query,
				records_field: "result".into(),
				query: QueryConfig::FieldFilter { field: "market_of_interest".into() },
				..SourceConfig::default()
			},
		}
	}
}

/// Inbound endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
	/// Socket address the endpoint listens on.
	pub bind: String,
}
impl Default for ServerConfig {
	fn default() -> Self {
		Self { bind: "127.0.0.1:8000".into() }
	}
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
	/// Fallback filter directive when `RUST_LOG` is unset.
	pub log_level: String,
	/// Output format.
	pub log_format: LogFormat,
}
impl Default for TelemetryConfig {
	fn default() -> Self {
		Self { log_level: "info".into(), log_format: LogFormat::Pretty }
	}
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	/// One JSON object per line.
	Json,
	/// Human-readable multi-line output.
	Pretty,
}

/// Pagination bounds and timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
	/// Records requested per page.
	pub page_size: usize,
	/// Upper bound on records fetched per source.
	pub max_results: usize,
	/// Per-request timeout in seconds.
	pub timeout_secs: u64,
}
impl Default for LimitsConfig {
	fn default() -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
			max_results: DEFAULT_MAX_RESULTS,
			timeout_secs: DEFAULT_TIMEOUT.as_secs(),
		}
	}
}

/// How a source turns the caller's query into body fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryConfig {
	/// Fixed fields, query ignored.
	Static {
		/// Fields sent with every page.
		#[serde(default)]
		fields: BodyFields,
	},
	/// `{"filters": {<field>: [<query>]}}`.
	FieldFilter {
		/// Filtered field.
		field: String,
	},
}

/// One upstream source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
	/// Name used in errors and logs.
	pub id: String,
	/// Scheme, host, and optional path prefix.
	pub base_url: String,
	/// Search path appended to the base URL.
	pub path: String,
	/// Hawk id.
	pub credential_id: String,
	/// Hawk key. Never serialized.
	#[serde(default, skip_serializing)]
	pub credential_key: SecretKey,
	/// Hawk algorithm.
	pub algorithm: Algorithm,
	/// Whether successful responses must be signed.
	pub verify_response: bool,
	/// Treatment of `404 Not Found` pages.
	pub not_found: NotFoundPolicy,
	/// Placement of the paging parameters.
	pub paging: PagingPlacement,
	/// Response field holding the records.
	pub records_field: String,
	/// Body builder.
	pub query: QueryConfig,
}
impl SourceConfig {
	/// Validates this section and turns it into a [`SourcePlan`].
	pub fn plan(&self, limits: &LimitsConfig) -> Result<SourcePlan, ConfigError> {
		let id = SourceId::new(&self.id)?;

		if self.base_url.is_empty() {
			return Err(ConfigError::Message(format!("{id}.base_url must be set")));
		}
		if self.credential_key.is_empty() {
			return Err(ConfigError::Message(format!("{id}.credential_key must be set")));
		}

		let base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidUrl { url: self.base_url.clone(), source })?;
		let credential = Credential::new(
			CredentialId::new(&self.credential_id)?,
			self.credential_key.clone(),
			self.algorithm,
		);
		let source = SourceDescriptor::builder(id)
			.base_url(base_url)
			.path(&self.path)
			.credential(credential)
			.page_size(limits.page_size)
			.max_results(limits.max_results)
			.timeout(StdDuration::from_secs(limits.timeout_secs))
			.verify_response(self.verify_response)
			.not_found(self.not_found)
			.paging(self.paging)
			.records_field(&self.records_field)
			.build()?;

		Ok(match &self.query {
			QueryConfig::Static { fields } => SourcePlan::new(source, StaticFields(fields.clone())),
			QueryConfig::FieldFilter { field } => SourcePlan::new(source, FieldFilter::new(field)),
		})
	}
}
impl Default for SourceConfig {
	fn default() -> Self {
		Self {
			id: String::new(),
			base_url: String::new(),
			path: String::new(),
			credential_id: String::new(),
			credential_key: SecretKey::default(),
			algorithm: Algorithm::default(),
			verify_response: true,
			not_found: NotFoundPolicy::default(),
			paging: PagingPlacement::default(),
			records_field: "results".into(),
			query: QueryConfig::Static { fields: BodyFields::new() },
		}
	}
}
