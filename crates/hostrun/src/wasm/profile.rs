//! Runtime versions the wasm backend knows how to start.

/// Version started when none is requested.
pub const DEFAULT_VERSION: &str = "wasm32";

/// Version that meters execution with fuel.
pub const METERED_VERSION: &str = "wasm32-metered";

/// Fuel granted to each construction under the metered profile.
pub const DEFAULT_FUEL: u64 = 10_000_000;

/// One installed runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeProfile {
    pub version: String,
    /// Fuel budget per construction. `None` disables metering.
    pub fuel: Option<u64>,
    /// Installed but refused by the loadability check when false.
    pub loadable: bool,
}

impl RuntimeProfile {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            fuel: None,
            loadable: true,
        }
    }

    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = Some(fuel);
        self
    }

    pub fn not_loadable(mut self) -> Self {
        self.loadable = false;
        self
    }

    pub(crate) fn wasmtime_config(&self) -> wasmtime::Config {
        let mut config = wasmtime::Config::new();
        config.consume_fuel(self.fuel.is_some());
        config
    }
}

/// Installed runtimes, searched in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WasmEngineConfig {
    pub profiles: Vec<RuntimeProfile>,
}

impl WasmEngineConfig {
    /// A config with no runtimes installed.
    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: RuntimeProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn find(&self, version: &str) -> Option<&RuntimeProfile> {
        self.profiles.iter().find(|p| p.version == version)
    }
}

impl Default for WasmEngineConfig {
    fn default() -> Self {
        Self::empty()
            .with_profile(RuntimeProfile::new(DEFAULT_VERSION))
            .with_profile(RuntimeProfile::new(METERED_VERSION).with_fuel(DEFAULT_FUEL))
    }
}
