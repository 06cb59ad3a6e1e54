//! # Engine Capability Boundary
//!
//! The host never talks to a concrete runtime. Every step of bootstrap,
//! loading and construction goes through [`RuntimeEngine`], whose associated
//! types are the opaque handles the engine hands back.
//!
//! ## Philosophy
//!
//! - **Handle-Oriented**: The engine object is a dispatcher. State lives in
//!   the handles it returns (host, domain, buffer, module, type, instance), and
//!   each call names the handle it operates on.
//! - **Ordered**: Handles can only be obtained in bootstrap order. A domain
//!   needs a started host; a module needs a domain and a filled buffer.
//! - **Status, not panics**: Every call reports failure as a [`Status`]. The
//!   host layers turn those into typed errors with the step attached.

use crate::status::Status;

pub type Result<T> = std::result::Result<T, Status>;

/// The capability set of a hostable runtime engine.
///
/// # Invariants
/// - `start` is called at most once per host handle, and `stop` only after a
///   successful `start`.
/// - A buffer passed to `load_module` is kept alive by the caller until after
///   `stop` returns. The engine may keep pointing into it.
/// - `types` reports the catalogue in the engine's own order; the caller does
///   not sort it.
pub trait RuntimeEngine {
    /// Factory used to discover installed runtimes.
    type MetaHost;
    /// A discovered runtime, not yet started.
    type Runtime;
    /// Control interface of a runtime.
    type Host;
    /// Raw default-domain handle, before it is cast to a domain.
    type DomainThunk;
    /// The default execution context.
    type Domain;
    /// Engine-managed memory a module image is copied into.
    type Buffer;
    /// A module loaded into a domain.
    type Module;
    /// One entry of a module's type catalogue.
    type Type;
    /// A constructed object.
    type Instance;

    /// Version started when the caller does not ask for one.
    const DEFAULT_VERSION: &'static str;

    /// Largest buffer the engine API can address.
    const MAX_BUFFER_LEN: u32 = u32::MAX;

    fn meta_host(&self) -> Result<Self::MetaHost>;

    /// Looks up an installed runtime by exact version string.
    fn runtime(&self, meta: &Self::MetaHost, version: &str) -> Result<Self::Runtime>;

    fn is_loadable(&self, runtime: &Self::Runtime) -> Result<bool>;

    fn host_control(&self, runtime: &Self::Runtime) -> Result<Self::Host>;

    fn start(&self, host: &Self::Host) -> Result<()>;

    fn stop(&self, host: &Self::Host) -> Result<()>;

    fn default_domain(&self, host: &Self::Host) -> Result<Self::DomainThunk>;

    /// Casts the raw default-domain handle to its domain interface.
    fn as_domain(&self, thunk: Self::DomainThunk) -> Result<Self::Domain>;

    /// Allocates a zero-filled buffer of exactly `len` bytes.
    fn alloc_buffer(&self, len: u32) -> Result<Self::Buffer>;

    /// Copies `bytes` into the start of `buffer`.
    fn write_buffer(&self, buffer: &mut Self::Buffer, bytes: &[u8]) -> Result<()>;

    fn load_module(&self, domain: &Self::Domain, buffer: &Self::Buffer) -> Result<Self::Module>;

    fn types(&self, module: &Self::Module) -> Result<Vec<Self::Type>>;

    /// Fully-qualified name of a catalogue entry.
    fn type_name(&self, ty: &Self::Type) -> Result<String>;

    /// Default-constructs the type named `full_name`.
    ///
    /// `Ok(None)` means the engine reported success but produced no object.
    fn create_instance(
        &self,
        module: &Self::Module,
        full_name: &str,
    ) -> Result<Option<Self::Instance>>;
}
