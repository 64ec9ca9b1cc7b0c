//! Configuration sources for layered container settings
//!
//! Sources are merged in priority order (environment variables > TOML file >
//! defaults). Each source yields a flat key -> JSON value map.

use crate::settings::ContainerSettings;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// The built-in defaults of [`ContainerSettings`].
#[derive(Debug, Default)]
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let value = serde_json::to_value(ContainerSettings::default())?;
		let map = value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected object at root".to_string()))?;
		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Defaults".to_string()
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use autowire_conf::sources::TomlFileSource;
	///
	/// let source = TomlFileSource::new("autowire.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		parse_toml(&content)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Parse a TOML document into a flat key -> JSON value map.
pub(crate) fn parse_toml(content: &str) -> Result<IndexMap<String, Value>, SourceError> {
	let toml_value: toml::Value = toml::from_str(content)?;
	let json_value = serde_json::to_value(&toml_value)?;
	let map = json_value
		.as_object()
		.ok_or_else(|| SourceError::Parse("Expected object at root".to_string()))?;
	Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Environment variable configuration source
///
/// Only variables starting with the prefix (`AUTOWIRE_` by default) are read;
/// the prefix is stripped and the rest lowercased, so
/// `AUTOWIRE_MAX_RESOLUTION_DEPTH=50` sets `max_resolution_depth`.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	pub const DEFAULT_PREFIX: &'static str = "AUTOWIRE_";

	/// Read from the process environment.
	pub fn new() -> Self {
		Self {
			prefix: Self::DEFAULT_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Read from a fixed set of variables instead of the process environment.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_conf::sources::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::from_vars([("AUTOWIRE_MAX_RESOLUTION_DEPTH", "12")]);
	/// let loaded = source.load().unwrap();
	/// assert_eq!(loaded["max_resolution_depth"], 12);
	/// ```
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: Self::DEFAULT_PREFIX.to_string(),
			vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
		}
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let vars = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut config = IndexMap::new();
		for (key, value) in vars {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			config.insert(clean_key.to_lowercase(), parse_env_value(&value));
		}
		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

fn parse_env_value(value: &str) -> Value {
	let trimmed = value.trim();
	if let Ok(num) = trimmed.parse::<i64>() {
		return Value::Number(num.into());
	}
	match trimmed.to_lowercase().as_str() {
		"true" | "yes" | "on" => Value::Bool(true),
		"false" | "no" | "off" => Value::Bool(false),
		_ => Value::String(value.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	#[case("42", Value::from(42))]
	#[case("on", Value::Bool(true))]
	#[case("False", Value::Bool(false))]
	#[case("deep", Value::from("deep"))]
	fn env_values_are_typed(#[case] raw: &str, #[case] expected: Value) {
		assert_eq!(parse_env_value(raw), expected);
	}

	#[rstest]
	fn env_source_filters_by_prefix() {
		// Arrange
		let source = EnvSource::from_vars([
			("AUTOWIRE_FORGET_TRANSIENT_RECEIVERS", "false"),
			("PATH", "/usr/bin"),
		]);

		// Act
		let loaded = source.load().unwrap();

		// Assert
		assert_eq!(loaded.len(), 1);
		assert_eq!(loaded["forget_transient_receivers"], Value::Bool(false));
	}

	#[rstest]
	#[serial_test::serial(autowire_env)]
	fn env_source_reads_process_environment() {
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			std::env::set_var("AUTOWIRE_MAX_RESOLUTION_DEPTH", "33");
		}

		let loaded = EnvSource::new().load().unwrap();

		// SAFETY: See above.
		unsafe {
			std::env::remove_var("AUTOWIRE_MAX_RESOLUTION_DEPTH");
		}
		assert_eq!(loaded["max_resolution_depth"], Value::from(33));
	}

	#[rstest]
	fn missing_toml_file_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		let source = TomlFileSource::new(dir.path().join("absent.toml"));

		assert!(source.load().unwrap().is_empty());
	}

	#[rstest]
	fn toml_file_is_flattened() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "max_resolution_depth = 8").unwrap();

		let loaded = TomlFileSource::new(file.path()).load().unwrap();

		assert_eq!(loaded["max_resolution_depth"], Value::from(8));
	}

	#[rstest]
	fn malformed_toml_is_reported() {
		assert!(matches!(parse_toml("max_resolution_depth = "), Err(SourceError::Toml(_))));
	}

	#[rstest]
	fn defaults_cover_every_setting() {
		let loaded = DefaultSource.load().unwrap();

		assert_eq!(loaded["max_resolution_depth"], Value::from(100));
		assert_eq!(loaded["forget_transient_receivers"], Value::Bool(true));
	}
}
