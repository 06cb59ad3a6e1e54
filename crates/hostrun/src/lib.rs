//! Host a runtime engine in-process, load a module image straight from memory
//! and default-construct one of its types by name.
//!
//! ```no_run
//! use hostrun::ExecutionHost;
//! use hostrun::wasm::WasmEngine;
//!
//! # fn example(image: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let host = ExecutionHost::create(WasmEngine::new())?;
//! let module = host.load(image)?;
//! let instance = module.construct("Acme.Widgets.Gadget")?;
//! println!("{}", instance.handle().object());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod host;
pub mod instance;
pub mod loader;
pub mod resolver;
pub mod status;
pub mod wasm;

pub use config::HostConfig;
pub use context::ContextUnavailable;
pub use context::ExecutionContext;
pub use engine::RuntimeEngine;
pub use host::BufferId;
pub use host::ExecutionHost;
pub use host::InitError;
pub use instance::Instance;
pub use loader::LoadedModule;
pub use status::Status;

#[cfg(test)]
mod mock_engine;
