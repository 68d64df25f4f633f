//! Settings builders for tests.

use composer_config::ComposerConfig;

/// Fluent builder for [`ComposerConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .output_path("AGENTS.md")
///     .auto_commit(true)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: ComposerConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ComposerConfig::default(),
        }
    }

    pub fn repo_config_path(mut self, path: &str) -> Self {
        self.config.composer.repo_config_path = path.to_string();
        self
    }

    pub fn repo_sets_dir(mut self, dir: &str) -> Self {
        self.config.composer.repo_sets_dir = dir.to_string();
        self
    }

    pub fn output_path(mut self, path: &str) -> Self {
        self.config.composer.output_path = path.to_string();
        self
    }

    pub fn auto_commit(mut self, enabled: bool) -> Self {
        self.config.composer.auto_commit = enabled;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> ComposerConfig {
        self.config
    }

    /// The settings file contents for this configuration.
    pub fn to_toml(&self) -> String {
        self.config
            .to_toml()
            .expect("test config must be valid")
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
