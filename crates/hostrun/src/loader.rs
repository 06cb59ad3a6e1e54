//! # Module Loader
//!
//! Injects an in-memory module image into the host's default domain. The image
//! is copied into an engine-managed buffer, the buffer is parked in the host's
//! retention list, and the engine loads the module from it.
//!
//! Once a buffer has been allocated it is retained whatever happens next: a
//! failed load may still have left the engine holding a pointer into it.

use tracing::debug;
use tracing::error;
use tracing::info;

use crate::context::ContextUnavailable;
use crate::engine::RuntimeEngine;
use crate::host::BufferId;
use crate::host::ExecutionHost;
use crate::status::Status;

#[derive(Debug)]
pub enum Error {
    /// The image is larger than the host accepts. The engine was not called.
    Oversized { len: usize, max: u64 },
    ContextUnavailable(ContextUnavailable),
    /// The engine could not provide or expose a buffer for the image.
    Allocation { step: &'static str, status: Status },
    /// The engine rejected the image.
    Load(Status),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oversized { len, max } => {
                write!(f, "Module too large: {} bytes (max {})", len, max)
            }
            Self::ContextUnavailable(e) => write!(f, "{}", e),
            Self::Allocation { step, status } => {
                write!(f, "Buffer {} failed: {}", step, status)
            }
            Self::Load(s) => write!(f, "Failed to load module: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ContextUnavailable(e) => Some(e),
            Self::Allocation { status, .. } | Self::Load(status) => Some(status),
            Self::Oversized { .. } => None,
        }
    }
}

impl From<ContextUnavailable> for Error {
    fn from(e: ContextUnavailable) -> Self {
        Self::ContextUnavailable(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A module living in the host's default domain.
///
/// Refers to engine-owned state plus the retention slot of the buffer it was
/// loaded from. Borrows the host, so it cannot outlive the engine.
pub struct LoadedModule<'h, E: RuntimeEngine> {
    pub(crate) host: &'h ExecutionHost<E>,
    pub(crate) module: E::Module,
    buffer: BufferId,
}

impl<'h, E: RuntimeEngine> LoadedModule<'h, E> {
    /// Wraps a module the engine already loaded from the retained `buffer`.
    pub fn from_parts(host: &'h ExecutionHost<E>, module: E::Module, buffer: BufferId) -> Self {
        Self {
            host,
            module,
            buffer,
        }
    }

    pub fn module(&self) -> &E::Module {
        &self.module
    }

    /// Retention slot of the image this module was loaded from.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }
}

impl<E: RuntimeEngine> ExecutionHost<E> {
    /// Loads `bytes` as a module in the default domain.
    pub fn load(&self, bytes: &[u8]) -> Result<LoadedModule<'_, E>> {
        let max = self.max_module_len();
        let len = match u32::try_from(bytes.len()) {
            Ok(len) if u64::from(len) <= max => len,
            _ => {
                error!(len = bytes.len(), max, "module too large");
                return Err(Error::Oversized {
                    len: bytes.len(),
                    max,
                });
            }
        };

        let context = self.get_default_context()?;

        let mut buffer = self.engine.alloc_buffer(len).map_err(|status| {
            error!(step = "allocate", len, %status, "failed to allocate module buffer");
            Error::Allocation {
                step: "allocate",
                status,
            }
        })?;

        let written = self.engine.write_buffer(&mut buffer, bytes);
        let id = self.retain(buffer);
        written.map_err(|status| {
            error!(step = "access", buffer = %id, %status, "failed to access module buffer");
            Error::Allocation {
                step: "access",
                status,
            }
        })?;
        debug!(buffer = %id, len, "module image copied");

        let module = {
            let retained = self.retained.borrow();
            self.engine.load_module(context.domain(), &retained[id.0])
        };
        let module = module.map_err(|status| {
            error!(buffer = %id, %status, "failed to load module");
            Error::Load(status)
        })?;

        info!(buffer = %id, len, "module loaded");
        Ok(LoadedModule::from_parts(self, module, id))
    }
}
