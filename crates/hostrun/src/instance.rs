//! Handle to an object constructed by the engine.

use std::marker::PhantomData;

/// An object the engine constructed.
///
/// The host neither inspects nor tracks it; whatever the handle means is up
/// to the engine that produced it. The instance borrows the host it came
/// from, so it cannot be used once that host has stopped its engine:
///
/// ```compile_fail
/// use hostrun::ExecutionHost;
/// use hostrun::wasm::WasmEngine;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut instance = {
///     let host = ExecutionHost::create(WasmEngine::new())?;
///     let module = host.load(br#"(module (func (export "A.G::new") (result i32) i32.const 1))"#)?;
///     module.construct("A.G")?
/// };
/// instance.handle_mut().call("bump")?;
/// # Ok(())
/// # }
/// ```
pub struct Instance<'h, I> {
    type_name: String,
    handle: I,
    _host: PhantomData<&'h ()>,
}

impl<'h, I> Instance<'h, I> {
    pub(crate) fn new(type_name: String, handle: I) -> Self {
        Self {
            type_name,
            handle,
            _host: PhantomData,
        }
    }

    /// Fully-qualified name of the constructed type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn handle(&self) -> &I {
        &self.handle
    }

    /// Gives mutable access to the engine handle.
    pub fn handle_mut(&mut self) -> &mut I {
        &mut self.handle
    }
}

impl<I: std::fmt::Debug> std::fmt::Debug for Instance<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("handle", &self.handle)
            .finish()
    }
}
