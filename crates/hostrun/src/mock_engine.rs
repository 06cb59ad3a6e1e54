//! Scripted engine for testing.
//!
//! Records every call in order so tests can assert what the host did and did
//! not ask the engine for. Clones share state: keep one as a spy and hand
//! the other to the host.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::engine;
use crate::engine::RuntimeEngine;
use crate::status;
use crate::status::Status;

pub const MOCK_VERSION: &str = "v4.0.30319";

/// One engine call, as seen by the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    MetaHost,
    Runtime(String),
    IsLoadable,
    HostControl,
    Start,
    Stop,
    DefaultDomain,
    AsDomain,
    AllocBuffer(u32),
    WriteBuffer(usize),
    LoadModule(usize),
    Types,
    TypeName(String),
    CreateInstance(String),
    /// Not an engine call: a retained buffer was dropped.
    FreeBuffer(usize),
}

/// Engine calls that can be scripted to fail.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Step {
    MetaHost,
    Runtime,
    IsLoadable,
    HostControl,
    Start,
    Stop,
    DefaultDomain,
    AsDomain,
    AllocBuffer,
    WriteBuffer,
    LoadModule,
    Types,
}

/// What a type's default constructor does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ctor {
    Succeeds,
    Throws,
    ReturnsNull,
}

struct State {
    calls: RefCell<Vec<Call>>,
    failures: RefCell<HashSet<Step>>,
    versions: Vec<String>,
    loadable: bool,
    catalogue: RefCell<Vec<(String, Ctor)>>,
    broken_names: RefCell<HashSet<String>>,
    next_buffer: Cell<usize>,
    next_object: Cell<u64>,
}

/// `MAX` is the engine's own buffer limit, reported as
/// [`RuntimeEngine::MAX_BUFFER_LEN`].
#[derive(Clone)]
pub struct MockEngine<const MAX: u32 = { u32::MAX }> {
    state: Rc<State>,
}

pub struct MockBuffer {
    pub id: usize,
    pub bytes: Vec<u8>,
    state: Rc<State>,
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        self.state.calls.borrow_mut().push(Call::FreeBuffer(self.id));
    }
}

pub struct MockModule {
    pub buffer: usize,
    pub image: Vec<u8>,
}

pub struct MockType {
    name: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct MockInstance {
    pub type_name: String,
    pub object: u64,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::with_versions(&[MOCK_VERSION], true)
    }

    pub fn not_loadable() -> Self {
        Self::with_versions(&[MOCK_VERSION], false)
    }

    pub fn with_versions(versions: &[&str], loadable: bool) -> Self {
        Self {
            state: Rc::new(State {
                calls: RefCell::new(Vec::new()),
                failures: RefCell::new(HashSet::new()),
                versions: versions.iter().map(|v| v.to_string()).collect(),
                loadable,
                catalogue: RefCell::new(Vec::new()),
                broken_names: RefCell::new(HashSet::new()),
                next_buffer: Cell::new(0),
                next_object: Cell::new(1),
            }),
        }
    }
}

impl<const MAX: u32> MockEngine<MAX> {
    /// Same engine state behind a buffer limit of `M` bytes.
    pub fn with_max_buffer<const M: u32>(self) -> MockEngine<M> {
        MockEngine { state: self.state }
    }

    pub fn with_type(self, name: &str, ctor: Ctor) -> Self {
        self.state.catalogue.borrow_mut().push((name.to_string(), ctor));
        self
    }

    /// Makes every later call of `step` fail.
    pub fn fail_at(&self, step: Step) {
        self.state.failures.borrow_mut().insert(step);
    }

    pub fn heal(&self, step: Step) {
        self.state.failures.borrow_mut().remove(&step);
    }

    /// Makes the name query for `name` fail.
    pub fn break_name(&self, name: &str) {
        self.state.broken_names.borrow_mut().insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.state.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) {
        self.state.calls.borrow_mut().push(call);
    }

    fn check(&self, step: Step) -> engine::Result<()> {
        if self.state.failures.borrow().contains(&step) {
            Err(Status::fail(format!("scripted failure at {:?}", step)))
        } else {
            Ok(())
        }
    }
}

impl<const MAX: u32> RuntimeEngine for MockEngine<MAX> {
    type MetaHost = ();
    type Runtime = String;
    type Host = ();
    type DomainThunk = ();
    type Domain = ();
    type Buffer = MockBuffer;
    type Module = MockModule;
    type Type = MockType;
    type Instance = MockInstance;

    const DEFAULT_VERSION: &'static str = MOCK_VERSION;
    const MAX_BUFFER_LEN: u32 = MAX;

    fn meta_host(&self) -> engine::Result<()> {
        self.record(Call::MetaHost);
        self.check(Step::MetaHost)
    }

    fn runtime(&self, _meta: &(), version: &str) -> engine::Result<String> {
        self.record(Call::Runtime(version.to_string()));
        self.check(Step::Runtime)?;
        if self.state.versions.iter().any(|v| v == version) {
            Ok(version.to_string())
        } else {
            Err(Status::new(status::RUNTIME_NOT_FOUND, version))
        }
    }

    fn is_loadable(&self, _runtime: &String) -> engine::Result<bool> {
        self.record(Call::IsLoadable);
        self.check(Step::IsLoadable)?;
        Ok(self.state.loadable)
    }

    fn host_control(&self, _runtime: &String) -> engine::Result<()> {
        self.record(Call::HostControl);
        self.check(Step::HostControl)
    }

    fn start(&self, _host: &()) -> engine::Result<()> {
        self.record(Call::Start);
        self.check(Step::Start)
    }

    fn stop(&self, _host: &()) -> engine::Result<()> {
        self.record(Call::Stop);
        self.check(Step::Stop)
    }

    fn default_domain(&self, _host: &()) -> engine::Result<()> {
        self.record(Call::DefaultDomain);
        self.check(Step::DefaultDomain)
    }

    fn as_domain(&self, _thunk: ()) -> engine::Result<()> {
        self.record(Call::AsDomain);
        self.check(Step::AsDomain)
    }

    fn alloc_buffer(&self, len: u32) -> engine::Result<MockBuffer> {
        self.record(Call::AllocBuffer(len));
        self.check(Step::AllocBuffer)?;
        let id = self.state.next_buffer.get();
        self.state.next_buffer.set(id + 1);
        Ok(MockBuffer {
            id,
            bytes: vec![0; len as usize],
            state: self.state.clone(),
        })
    }

    fn write_buffer(&self, buffer: &mut MockBuffer, bytes: &[u8]) -> engine::Result<()> {
        self.record(Call::WriteBuffer(buffer.id));
        self.check(Step::WriteBuffer)?;
        buffer.bytes.copy_from_slice(bytes);
        Ok(())
    }

    fn load_module(&self, _domain: &(), buffer: &MockBuffer) -> engine::Result<MockModule> {
        self.record(Call::LoadModule(buffer.id));
        self.check(Step::LoadModule)?;
        Ok(MockModule {
            buffer: buffer.id,
            image: buffer.bytes.clone(),
        })
    }

    fn types(&self, _module: &MockModule) -> engine::Result<Vec<MockType>> {
        self.record(Call::Types);
        self.check(Step::Types)?;
        Ok(self
            .state
            .catalogue
            .borrow()
            .iter()
            .map(|(name, _)| MockType { name: name.clone() })
            .collect())
    }

    fn type_name(&self, ty: &MockType) -> engine::Result<String> {
        self.record(Call::TypeName(ty.name.clone()));
        if self.state.broken_names.borrow().contains(&ty.name) {
            return Err(Status::fail("name unavailable"));
        }
        Ok(ty.name.clone())
    }

    fn create_instance(
        &self,
        _module: &MockModule,
        full_name: &str,
    ) -> engine::Result<Option<MockInstance>> {
        self.record(Call::CreateInstance(full_name.to_string()));
        let ctor = self
            .state
            .catalogue
            .borrow()
            .iter()
            .find(|(name, _)| name == full_name)
            .map(|(_, ctor)| *ctor);
        match ctor {
            Some(Ctor::Succeeds) => {
                let object = self.state.next_object.get();
                self.state.next_object.set(object + 1);
                Ok(Some(MockInstance {
                    type_name: full_name.to_string(),
                    object,
                }))
            }
            Some(Ctor::ReturnsNull) => Ok(None),
            Some(Ctor::Throws) => Err(Status::new(status::TARGET_INVOCATION, "ctor threw")),
            None => Err(Status::new(status::MISSING_METHOD, full_name)),
        }
    }
}
