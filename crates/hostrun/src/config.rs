//! Host configuration.

/// Settings applied when an [`ExecutionHost`](crate::host::ExecutionHost) is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Runtime version to start. `None` starts the engine's default.
    pub version: Option<String>,
    /// Largest module image `load` accepts, in bytes. Clamped to the
    /// engine's own addressable limit.
    pub max_module_size: u64,
}

impl HostConfig {
    pub fn new() -> Self {
        Self {
            version: None,
            max_module_size: u64::from(u32::MAX),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_max_module_size(mut self, max: u64) -> Self {
        self.max_module_size = max;
        self
    }

    /// Version to request, falling back to `default`.
    pub fn version_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.version.as_deref().unwrap_or(default)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}
