//! wasmtime implementation of the engine capability set.

use std::cell::RefCell;

use wasmtime::Engine;
use wasmtime::ExternType;
use wasmtime::Instance;
use wasmtime::Module;
use wasmtime::Store;

use crate::engine;
use crate::engine::RuntimeEngine;
use crate::status;
use crate::status::Status;
use crate::wasm::profile;
use crate::wasm::profile::RuntimeProfile;
use crate::wasm::profile::WasmEngineConfig;

/// Export-name suffix marking a type's default constructor.
pub const CTOR_SUFFIX: &str = "::new";

/// Control interface of one wasm runtime. Holds the wasmtime engine while
/// started.
pub struct WasmHost {
    profile: RuntimeProfile,
    engine: RefCell<Option<Engine>>,
}

impl WasmHost {
    pub fn is_started(&self) -> bool {
        self.engine.borrow().is_some()
    }
}

/// Default domain of a started wasm runtime.
#[derive(Clone)]
pub struct WasmDomain {
    engine: Engine,
    fuel: Option<u64>,
}

/// Heap memory holding a module image.
pub struct WasmBuffer {
    bytes: Vec<u8>,
}

impl WasmBuffer {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// A compiled module.
pub struct WasmModule {
    module: Module,
    fuel: Option<u64>,
}

/// A catalogue entry: a constructor export.
pub struct WasmType {
    name: String,
}

/// A constructed object: its own store and instance plus the reference the
/// constructor returned.
pub struct WasmInstance {
    type_name: String,
    store: Store<()>,
    instance: Instance,
    object: i32,
}

impl WasmInstance {
    /// Object reference returned by the constructor. Never `0`.
    pub fn object(&self) -> i32 {
        self.object
    }

    /// Fuel left after construction, when metered.
    pub fn fuel_remaining(&self) -> Option<u64> {
        self.store.get_fuel().ok()
    }

    /// Calls `<Type>::<method>` with the object reference as its only argument.
    pub fn call(&mut self, method: &str) -> engine::Result<i32> {
        let export = format!("{}::{}", self.type_name, method);
        let func = self
            .instance
            .get_typed_func::<i32, i32>(&mut self.store, &export)
            .map_err(|e| Status::new(status::MISSING_METHOD, format!("{}: {:#}", export, e)))?;
        func.call(&mut self.store, self.object)
            .map_err(|e| Status::new(status::TARGET_INVOCATION, format!("{}: {:#}", export, e)))
    }
}

impl std::fmt::Debug for WasmInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmInstance")
            .field("type_name", &self.type_name)
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

/// Meta-host for wasm runtimes described by a [`WasmEngineConfig`].
#[derive(Clone, Debug, Default)]
pub struct WasmEngine {
    config: WasmEngineConfig,
}

impl WasmEngine {
    /// Creates an engine with the default runtime profiles installed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WasmEngineConfig) -> Self {
        Self { config }
    }
}

impl RuntimeEngine for WasmEngine {
    type MetaHost = WasmEngineConfig;
    type Runtime = RuntimeProfile;
    type Host = WasmHost;
    type DomainThunk = WasmDomain;
    type Domain = WasmDomain;
    type Buffer = WasmBuffer;
    type Module = WasmModule;
    type Type = WasmType;
    type Instance = WasmInstance;

    const DEFAULT_VERSION: &'static str = profile::DEFAULT_VERSION;

    fn meta_host(&self) -> engine::Result<WasmEngineConfig> {
        Ok(self.config.clone())
    }

    fn runtime(&self, meta: &WasmEngineConfig, version: &str) -> engine::Result<RuntimeProfile> {
        meta.find(version).cloned().ok_or_else(|| {
            Status::new(
                status::RUNTIME_NOT_FOUND,
                format!("no runtime installed for version '{}'", version),
            )
        })
    }

    fn is_loadable(&self, runtime: &RuntimeProfile) -> engine::Result<bool> {
        Ok(runtime.loadable)
    }

    fn host_control(&self, runtime: &RuntimeProfile) -> engine::Result<WasmHost> {
        Ok(WasmHost {
            profile: runtime.clone(),
            engine: RefCell::new(None),
        })
    }

    fn start(&self, host: &WasmHost) -> engine::Result<()> {
        let mut slot = host.engine.borrow_mut();
        if slot.is_some() {
            return Err(Status::new(status::HOST_STATE, "host already started"));
        }
        *slot = Some(Engine::new(&host.profile.wasmtime_config())?);
        Ok(())
    }

    fn stop(&self, host: &WasmHost) -> engine::Result<()> {
        host.engine
            .borrow_mut()
            .take()
            .map(drop)
            .ok_or_else(|| Status::new(status::HOST_STATE, "host not started"))
    }

    fn default_domain(&self, host: &WasmHost) -> engine::Result<WasmDomain> {
        let engine = host
            .engine
            .borrow()
            .clone()
            .ok_or_else(|| Status::new(status::HOST_STATE, "host not started"))?;
        Ok(WasmDomain {
            engine,
            fuel: host.profile.fuel,
        })
    }

    fn as_domain(&self, thunk: WasmDomain) -> engine::Result<WasmDomain> {
        Ok(thunk)
    }

    fn alloc_buffer(&self, len: u32) -> engine::Result<WasmBuffer> {
        let len = usize::try_from(len)
            .map_err(|_| Status::new(status::OUT_OF_MEMORY, "buffer exceeds address space"))?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|e| Status::new(status::OUT_OF_MEMORY, e.to_string()))?;
        bytes.resize(len, 0);
        Ok(WasmBuffer { bytes })
    }

    fn write_buffer(&self, buffer: &mut WasmBuffer, bytes: &[u8]) -> engine::Result<()> {
        let capacity = buffer.bytes.len();
        let dst = buffer.bytes.get_mut(..bytes.len()).ok_or_else(|| {
            Status::new(
                status::INVALID_ARG,
                format!("{} bytes do not fit a {} byte buffer", bytes.len(), capacity),
            )
        })?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    fn load_module(&self, domain: &WasmDomain, buffer: &WasmBuffer) -> engine::Result<WasmModule> {
        // The text parser would read an empty image as an empty module.
        if buffer.bytes.is_empty() {
            return Err(Status::new(status::BAD_IMAGE_FORMAT, "empty module image"));
        }
        let module = Module::new(&domain.engine, buffer.as_slice())
            .map_err(|e| Status::new(status::BAD_IMAGE_FORMAT, format!("{:#}", e)))?;
        Ok(WasmModule {
            module,
            fuel: domain.fuel,
        })
    }

    fn types(&self, module: &WasmModule) -> engine::Result<Vec<WasmType>> {
        let types = module
            .module
            .exports()
            .filter_map(|export| {
                let name = export.name().strip_suffix(CTOR_SUFFIX)?;
                matches!(export.ty(), ExternType::Func(_)).then(|| WasmType {
                    name: name.to_string(),
                })
            })
            .collect();
        Ok(types)
    }

    fn type_name(&self, ty: &WasmType) -> engine::Result<String> {
        Ok(ty.name.clone())
    }

    fn create_instance(
        &self,
        module: &WasmModule,
        full_name: &str,
    ) -> engine::Result<Option<WasmInstance>> {
        let export = format!("{}{}", full_name, CTOR_SUFFIX);
        let mut store = Store::new(module.module.engine(), ());
        if let Some(fuel) = module.fuel {
            store.set_fuel(fuel)?;
        }

        let instance = Instance::new(&mut store, &module.module, &[])
            .map_err(|e| Status::new(status::TARGET_INVOCATION, format!("{:#}", e)))?;

        let ctor = instance
            .get_typed_func::<(), i32>(&mut store, &export)
            .map_err(|e| {
                Status::new(
                    status::MISSING_METHOD,
                    format!("{} has no default constructor: {:#}", full_name, e),
                )
            })?;

        let object = ctor
            .call(&mut store, ())
            .map_err(|e| Status::new(status::TARGET_INVOCATION, format!("{:#}", e)))?;
        if object == 0 {
            return Ok(None);
        }

        Ok(Some(WasmInstance {
            type_name: full_name.to_string(),
            store,
            instance,
            object,
        }))
    }
}
