//! # Wasm backend
//!
//! A [`RuntimeEngine`](crate::engine::RuntimeEngine) built on wasmtime, so a
//! host can run without any external runtime installed.
//!
//! A core wasm module plays the part of the loaded module. Its type catalogue
//! is the set of exported functions named `<FullName>::new`, in export order.
//! Each such export is the type's default constructor: it takes no arguments
//! and returns an `i32` object reference, where `0` is null.
//!
//! ```text
//! (module
//!   (func (export "Acme.Widgets.Gadget::new") (result i32)
//!     i32.const 1))
//! ```
//!
//! Every construction instantiates the module in a fresh `Store`, so instances
//! do not share linear memory. Modules with imports cannot be instantiated.

pub mod engine;
pub mod profile;

pub use engine::WasmBuffer;
pub use engine::WasmDomain;
pub use engine::WasmEngine;
pub use engine::WasmHost;
pub use engine::WasmInstance;
pub use engine::WasmModule;
pub use engine::WasmType;
pub use engine::CTOR_SUFFIX;
pub use profile::RuntimeProfile;
pub use profile::WasmEngineConfig;
pub use profile::DEFAULT_VERSION;
pub use profile::METERED_VERSION;
