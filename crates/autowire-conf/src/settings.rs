//! Container settings and the layered builder that produces them

use crate::sources::{ConfigSource, SourceError, parse_toml};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default ceiling on nested resolutions before a chain is rejected.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 100;

/// Tunables for a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
	/// Maximum number of nested resolutions in one chain.
	pub max_resolution_depth: usize,
	/// Remove the registration that a `(class-name, method)` call creates
	/// for its receiver once the call has its object.
	pub forget_transient_receivers: bool,
}

impl Default for ContainerSettings {
	fn default() -> Self {
		Self {
			max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
			forget_transient_receivers: true,
		}
	}
}

impl ContainerSettings {
	/// Check the settings for values the container cannot work with.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.max_resolution_depth == 0 {
			return Err(SettingsError::Invalid(
				"max_resolution_depth must be greater than zero".to_string(),
			));
		}
		Ok(())
	}

	/// Parse settings from a TOML document. Missing keys keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_conf::ContainerSettings;
	///
	/// let settings = ContainerSettings::from_toml_str("max_resolution_depth = 20").unwrap();
	/// assert_eq!(settings.max_resolution_depth, 20);
	/// assert!(settings.forget_transient_receivers);
	/// ```
	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(content)?;
		settings.validate()?;
		Ok(settings)
	}
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Source error: {0}")]
	Source(#[from] SourceError),

	#[error("Invalid settings: {0}")]
	Invalid(String),
}

/// Merges configuration sources into [`ContainerSettings`].
///
/// Sources are applied in ascending priority, so a key set by a
/// higher-priority source wins. Defaults always sit underneath.
///
/// # Examples
///
/// ```
/// use autowire_conf::{SettingsBuilder, sources::EnvSource};
///
/// let settings = SettingsBuilder::new()
///     .add_source(EnvSource::from_vars([("AUTOWIRE_MAX_RESOLUTION_DEPTH", "7")]))
///     .build()
///     .unwrap();
/// assert_eq!(settings.max_resolution_depth, 7);
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge a TOML document as if it came from a file source.
	pub fn add_toml_str(self, content: &str) -> Result<Self, SettingsError> {
		let values = parse_toml(content)?;
		Ok(self.add_source(StaticSource { values }))
	}

	pub fn build(mut self) -> Result<ContainerSettings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = serde_json::Map::new();
		if let serde_json::Value::Object(defaults) = serde_json::to_value(ContainerSettings::default())? {
			merged.extend(defaults);
		}
		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"merging settings source"
			);
			merged.extend(values);
		}

		let settings: ContainerSettings = serde_json::from_value(serde_json::Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}
}

struct StaticSource {
	values: IndexMap<String, serde_json::Value>,
}

impl ConfigSource for StaticSource {
	fn load(&self) -> Result<IndexMap<String, serde_json::Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		"Inline TOML".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::{DefaultSource, EnvSource, TomlFileSource};
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn defaults() {
		let settings = ContainerSettings::default();

		assert_eq!(settings.max_resolution_depth, 100);
		assert!(settings.forget_transient_receivers);
		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn zero_depth_is_rejected() {
		let result = ContainerSettings::from_toml_str("max_resolution_depth = 0");

		assert!(matches!(result, Err(SettingsError::Invalid(_))));
	}

	#[rstest]
	fn environment_overrides_file() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "max_resolution_depth = 30").unwrap();
		writeln!(file, "forget_transient_receivers = false").unwrap();

		// Act
		let settings = SettingsBuilder::new()
			.add_source(EnvSource::from_vars([("AUTOWIRE_MAX_RESOLUTION_DEPTH", "60")]))
			.add_source(TomlFileSource::new(file.path()))
			.add_source(DefaultSource)
			.build()
			.unwrap();

		// Assert
		assert_eq!(settings.max_resolution_depth, 60);
		assert!(!settings.forget_transient_receivers);
	}

	#[rstest]
	fn unknown_keys_are_ignored() {
		let settings = SettingsBuilder::new()
			.add_toml_str("unrelated = \"x\"")
			.unwrap()
			.build()
			.unwrap();

		assert_eq!(settings, ContainerSettings::default());
	}

	#[rstest]
	fn wrongly_typed_value_is_an_error() {
		let result = SettingsBuilder::new()
			.add_source(EnvSource::from_vars([("AUTOWIRE_MAX_RESOLUTION_DEPTH", "deep")]))
			.build();

		assert!(matches!(result, Err(SettingsError::Json(_))));
	}
}
