//! Dispatch core: validate, resolve, build, execute, normalize.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::request;
use super::response::normalize;
use super::result::{ErrorKind, ToolFailure, ToolInvocation, ToolResult};
use super::transport::{HttpResponse, HttpTransport};
use crate::auth::{Credential, Resolution, TokenResolver};
use crate::tools::{apply_defaults, validate_arguments, ToolCatalog, ToolDefinition};
use crate::types::{CallerId, Error, Result};

/// Maps tool invocations to authenticated calendar API calls.
///
/// Shareable across tasks; invocations hold no state beyond the resolver's
/// credential cache.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    resolver: TokenResolver,
    transport: Arc<dyn HttpTransport>,
    base_url: reqwest::Url,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.catalog.len())
            .field("resolver", &self.resolver)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        resolver: TokenResolver,
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
    ) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid API base URL: {}", e)))?;
        Ok(Self {
            catalog,
            resolver,
            transport,
            base_url,
        })
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    /// Dispatch one invocation on behalf of `caller`.
    pub async fn dispatch(&self, invocation: &ToolInvocation, caller: &CallerId) -> ToolResult {
        self.dispatch_with_cancel(invocation, caller, &CancellationToken::new())
            .await
    }

    /// Like [`dispatch`](Self::dispatch), but never issues the post-401 retry
    /// once `cancel` has fired.
    pub async fn dispatch_with_cancel(
        &self,
        invocation: &ToolInvocation,
        caller: &CallerId,
        cancel: &CancellationToken,
    ) -> ToolResult {
        let span = tracing::debug_span!("dispatch", tool = %invocation.tool_name, caller = %caller);
        let result = self.run(invocation, caller, cancel).instrument(span).await;
        match &result {
            ToolResult::Success(_) => {
                tracing::debug!(tool = %invocation.tool_name, "tool call succeeded");
            }
            ToolResult::Failure(f) if f.kind == ErrorKind::AuthenticationRequired => {
                tracing::info!(tool = %invocation.tool_name, caller = %caller, "tool call awaiting authorization");
            }
            ToolResult::Failure(f) => {
                tracing::warn!(tool = %invocation.tool_name, kind = %f.kind, "tool call failed: {}", f.message);
            }
        }
        result
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        caller: &CallerId,
        cancel: &CancellationToken,
    ) -> ToolResult {
        // 1. Lookup
        let Some(definition) = self.catalog.get(&invocation.tool_name) else {
            return ToolResult::failure(
                ErrorKind::InvalidTool,
                format!("Unknown tool: {}", invocation.tool_name),
            );
        };

        // 2. Validate, then fill defaults
        let errors = validate_arguments(definition, &invocation.arguments);
        if !errors.is_empty() {
            return ToolResult::failure(ErrorKind::InvalidArguments, errors.join("; "));
        }
        let mut arguments = invocation.arguments.clone();
        apply_defaults(definition, &mut arguments);

        // 3. Resolve
        let credential = match self.resolver.resolve(caller).await {
            Ok(Resolution::Ready(credential)) => credential,
            Ok(Resolution::Pending(url)) => {
                return ToolResult::Failure(ToolFailure::authentication_required(url))
            }
            Err(e) => return infrastructure_failure(e),
        };

        // 4-6. Build, execute, normalize
        let response = match self.execute(definition, &arguments, &credential).await {
            Ok(response) => response,
            Err(failure) => return failure,
        };
        if response.status != 401 {
            return normalize(&response);
        }

        // 7. Exactly one re-entry after a provider 401
        if cancel.is_cancelled() {
            tracing::debug!("cancelled, not retrying after 401");
            self.resolver.invalidate(caller).await;
            return normalize(&response);
        }
        tracing::debug!("provider rejected credential, reauthorizing once");
        let credential = match self.resolver.reauthorize(caller).await {
            Ok(Resolution::Ready(credential)) => credential,
            Ok(Resolution::Pending(url)) => {
                return ToolResult::Failure(ToolFailure::authentication_required(url))
            }
            Err(e) => return infrastructure_failure(e),
        };
        let response = match self.execute(definition, &arguments, &credential).await {
            Ok(response) => response,
            Err(failure) => return failure,
        };
        if response.status != 401 {
            return normalize(&response);
        }

        // Second rejection: surface as an authorization problem, no further calls to the API.
        match self.resolver.connect_url(caller).await {
            Ok(url) => ToolResult::Failure(ToolFailure::authentication_required(url)),
            Err(e) => {
                tracing::warn!("could not obtain connect URL after repeated 401: {}", e);
                normalize(&response)
            }
        }
    }

    async fn execute(
        &self,
        definition: &ToolDefinition,
        arguments: &serde_json::Value,
        credential: &Credential,
    ) -> std::result::Result<HttpResponse, ToolResult> {
        if !credential.covers(definition.family.required_scope()) {
            tracing::warn!(
                tool = %definition.name,
                scope = definition.family.required_scope(),
                "credential does not list the required scope"
            );
        }

        let request = request::build(definition, arguments, credential, &self.base_url)
            .map_err(infrastructure_failure)?;
        tracing::debug!(method = %request.method, path = %request.url.path(), "calling calendar API");

        self.transport
            .send(request)
            .await
            .map_err(infrastructure_failure)
    }
}

/// Map an infrastructure error to a tool failure.
fn infrastructure_failure(e: Error) -> ToolResult {
    let kind = match &e {
        Error::BrokerUnavailable(_) | Error::Upstream(_) | Error::Timeout(_) => {
            ErrorKind::UpstreamUnavailable
        }
        Error::Validation(_) => ErrorKind::InvalidArguments,
        _ => ErrorKind::UpstreamProtocolError,
    };
    ToolResult::failure(kind, e.to_string())
}
