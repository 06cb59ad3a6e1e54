//! # Type Resolver
//!
//! Finds a type in a loaded module by fully-qualified name and asks the engine
//! for a default instance of it.
//!
//! Resolution is two-phase: the catalogue is enumerated and scanned first, and
//! construction is requested by the matched name afterwards. Nothing is cached;
//! every call enumerates again.

use tracing::debug;
use tracing::error;
use tracing::info;

use crate::engine::RuntimeEngine;
use crate::instance::Instance;
use crate::loader::LoadedModule;
use crate::status::Status;

#[derive(Debug)]
pub enum Error {
    /// The module's type catalogue could not be read.
    Enumeration(Status),
    /// No catalogue entry carries the requested name.
    NotFound { name: String },
    /// The type exists but the engine could not default-construct it.
    /// `status` is `None` when the engine reported success without an object.
    Construction { name: String, status: Option<Status> },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumeration(s) => write!(f, "Failed to get types: {}", s),
            Self::NotFound { name } => write!(f, "Type not found: {}", name),
            Self::Construction { name, status: Some(s) } => {
                write!(f, "Failed to construct {}: {}", name, s)
            }
            Self::Construction { name, status: None } => {
                write!(f, "Failed to construct {}: engine returned no object", name)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// The catalogue entry a resolution settled on.
struct TypeDescriptor {
    name: String,
}

impl<'h, E: RuntimeEngine> LoadedModule<'h, E> {
    /// Default-constructs the type named `full_name`.
    ///
    /// The name must match a catalogue entry exactly, case included. When the
    /// catalogue lists a name twice, the first entry wins.
    pub fn construct(&self, full_name: &str) -> Result<Instance<'h, E::Instance>> {
        let Some(descriptor) = self.find_type(full_name)? else {
            debug!(name = full_name, "type not in catalogue");
            return Err(Error::NotFound {
                name: full_name.to_string(),
            });
        };

        let engine = &self.host.engine;
        match engine.create_instance(&self.module, &descriptor.name) {
            Ok(Some(handle)) => {
                info!(name = %descriptor.name, "instance constructed");
                Ok(Instance::new(descriptor.name, handle))
            }
            Ok(None) => {
                error!(name = %descriptor.name, "engine returned no object");
                Err(Error::Construction {
                    name: descriptor.name,
                    status: None,
                })
            }
            Err(status) => {
                error!(name = %descriptor.name, %status, "failed to create class instance");
                Err(Error::Construction {
                    name: descriptor.name,
                    status: Some(status),
                })
            }
        }
    }

    /// Names in the module's catalogue, in engine order.
    pub fn type_names(&self) -> Result<Vec<String>> {
        let engine = &self.host.engine;
        self.enumerate()?
            .iter()
            .map(|ty| engine.type_name(ty).map_err(Error::Enumeration))
            .collect()
    }

    fn enumerate(&self) -> Result<Vec<E::Type>> {
        self.host.engine.types(&self.module).map_err(|status| {
            error!(%status, "failed to get types");
            Error::Enumeration(status)
        })
    }

    fn find_type(&self, full_name: &str) -> Result<Option<TypeDescriptor>> {
        let engine = &self.host.engine;
        for handle in self.enumerate()? {
            let name = match engine.type_name(&handle) {
                Ok(name) => name,
                Err(status) => {
                    // A broken entry ends the scan; later entries are not consulted.
                    error!(%status, "failed to query type name");
                    break;
                }
            };
            if name == full_name {
                return Ok(Some(TypeDescriptor { name }));
            }
        }
        Ok(None)
    }
}
