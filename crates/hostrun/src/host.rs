//! # Execution Host
//!
//! Bootstraps a runtime engine and owns it until drop. Construction walks the
//! engine through meta-host, runtime lookup, loadability check, host control
//! interface and start; the first failing step aborts with an [`InitError`] and
//! no host is produced.
//!
//! The host also owns the buffer-retention list. Every buffer handed to the
//! engine stays here until the engine has been stopped, because the engine
//! never tells us when it stops reading from one.

use std::cell::RefCell;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::HostConfig;
use crate::engine::RuntimeEngine;
use crate::status::Status;

/// Strong type for retained buffer slots.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct BufferId(pub usize);

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "buffer-{}", self.0)
    }
}

/// Engine bootstrap failed. There is no host to recover.
#[derive(Debug)]
pub enum InitError {
    MetaHost(Status),
    Runtime { version: String, status: Status },
    LoadableQuery { version: String, status: Status },
    NotLoadable { version: String },
    HostControl(Status),
    Start(Status),
}

impl InitError {
    /// Name of the bootstrap step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            Self::MetaHost(_) => "meta-host",
            Self::Runtime { .. } => "runtime",
            Self::LoadableQuery { .. } | Self::NotLoadable { .. } => "loadable",
            Self::HostControl(_) => "host-control",
            Self::Start(_) => "start",
        }
    }

    /// Engine status behind the failure, if the engine reported one.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Self::MetaHost(s)
            | Self::Runtime { status: s, .. }
            | Self::LoadableQuery { status: s, .. }
            | Self::HostControl(s)
            | Self::Start(s) => Some(s),
            Self::NotLoadable { .. } => None,
        }
    }
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MetaHost(s) => write!(f, "Failed to obtain meta-host: {}", s),
            Self::Runtime { version, status } => {
                write!(f, "Runtime '{}' unavailable: {}", version, status)
            }
            Self::LoadableQuery { version, status } => {
                write!(f, "Could not query whether runtime '{}' is loadable: {}", version, status)
            }
            Self::NotLoadable { version } => write!(f, "Runtime '{}' is not loadable", version),
            Self::HostControl(s) => write!(f, "Failed to obtain host control interface: {}", s),
            Self::Start(s) => write!(f, "Host failed to start: {}", s),
        }
    }
}

impl std::error::Error for InitError {}

/// A started runtime engine plus everything that must outlive its references.
///
/// Not `Sync`: callers sharing a host across threads must serialize access.
pub struct ExecutionHost<E: RuntimeEngine> {
    pub(crate) engine: E,
    pub(crate) host: E::Host,
    pub(crate) retained: RefCell<Vec<E::Buffer>>,
    version: String,
    config: HostConfig,
}

impl<E: RuntimeEngine> ExecutionHost<E> {
    /// Starts the engine's default runtime version.
    pub fn create(engine: E) -> Result<Self, InitError> {
        Self::create_with(engine, HostConfig::default())
    }

    /// Starts the runtime described by `config`.
    pub fn create_with(engine: E, config: HostConfig) -> Result<Self, InitError> {
        let version = config.version_or(E::DEFAULT_VERSION).to_string();
        info!(%version, "runtime initialization started");

        let meta = engine.meta_host().map_err(|status| {
            error!(step = "meta-host", %status, "failed to obtain meta-host");
            InitError::MetaHost(status)
        })?;

        let runtime = engine.runtime(&meta, &version).map_err(|status| {
            error!(step = "runtime", %version, %status, "runtime lookup failed");
            InitError::Runtime {
                version: version.clone(),
                status,
            }
        })?;

        let loadable = engine.is_loadable(&runtime).map_err(|status| {
            error!(step = "loadable", %version, %status, "loadable query failed");
            InitError::LoadableQuery {
                version: version.clone(),
                status,
            }
        })?;
        if !loadable {
            error!(step = "loadable", %version, "runtime not loadable");
            return Err(InitError::NotLoadable { version });
        }

        let host = engine.host_control(&runtime).map_err(|status| {
            error!(step = "host-control", %status, "failed to obtain host control interface");
            InitError::HostControl(status)
        })?;

        engine.start(&host).map_err(|status| {
            error!(step = "start", %status, "host failed to start");
            InitError::Start(status)
        })?;

        info!(%version, "runtime initialization complete");
        Ok(Self {
            engine,
            host,
            retained: RefCell::new(Vec::new()),
            version,
            config,
        })
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runtime version this host was started with.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Number of buffers held for the engine.
    pub fn retained_buffers(&self) -> usize {
        self.retained.borrow().len()
    }

    /// Largest module image `load` accepts.
    pub fn max_module_len(&self) -> u64 {
        self.config.max_module_size.min(u64::from(E::MAX_BUFFER_LEN))
    }

    /// Parks a buffer until teardown.
    pub(crate) fn retain(&self, buffer: E::Buffer) -> BufferId {
        let mut retained = self.retained.borrow_mut();
        let id = BufferId(retained.len());
        retained.push(buffer);
        debug!(buffer = %id, "buffer retained");
        id
    }
}

impl<E: RuntimeEngine> Drop for ExecutionHost<E> {
    fn drop(&mut self) {
        if let Err(status) = self.engine.stop(&self.host) {
            warn!(version = %self.version, %status, "host failed to stop cleanly");
        }
        // Buffers go only once the engine can no longer reach them.
        let released = self.retained.get_mut().len();
        self.retained.get_mut().clear();
        debug!(released, "runtime stopped");
    }
}
