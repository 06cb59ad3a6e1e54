//! Default execution context ("domain") of a running host.

use std::marker::PhantomData;

use tracing::error;

use crate::engine::RuntimeEngine;
use crate::host::ExecutionHost;
use crate::status::Status;

/// Which half of the domain lookup failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContextStep {
    /// Asking the host for its default domain.
    DefaultDomain,
    /// Casting the returned handle to the domain interface.
    DomainInterface,
}

impl std::fmt::Display for ContextStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefaultDomain => write!(f, "default-domain"),
            Self::DomainInterface => write!(f, "domain-interface"),
        }
    }
}

/// The host could not hand out its default context.
#[derive(Debug)]
pub struct ContextUnavailable {
    pub step: ContextStep,
    pub status: Status,
}

impl std::fmt::Display for ContextUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Default context unavailable at {}: {}", self.step, self.status)
    }
}

impl std::error::Error for ContextUnavailable {}

/// Transient view of the default domain.
///
/// Borrows the host, so it cannot outlive the engine it came from.
pub struct ExecutionContext<'h, E: RuntimeEngine> {
    domain: E::Domain,
    _host: PhantomData<&'h ExecutionHost<E>>,
}

impl<'h, E: RuntimeEngine> ExecutionContext<'h, E> {
    pub fn domain(&self) -> &E::Domain {
        &self.domain
    }
}

impl<E: RuntimeEngine> ExecutionHost<E> {
    /// Queries the engine for its default domain.
    pub fn get_default_context(&self) -> Result<ExecutionContext<'_, E>, ContextUnavailable> {
        let thunk = self.engine.default_domain(&self.host).map_err(|status| {
            error!(step = %ContextStep::DefaultDomain, %status, "failed to get default domain");
            ContextUnavailable {
                step: ContextStep::DefaultDomain,
                status,
            }
        })?;

        let domain = self.engine.as_domain(thunk).map_err(|status| {
            error!(step = %ContextStep::DomainInterface, %status, "failed to get domain interface from thunk");
            ContextUnavailable {
                step: ContextStep::DomainInterface,
                status,
            }
        })?;

        Ok(ExecutionContext {
            domain,
            _host: PhantomData,
        })
    }
}
