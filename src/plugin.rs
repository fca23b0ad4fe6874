use crate::host::{RootHost, StreamHost};
use crate::proto::Action;
use crate::Result;

/// Plugin-level context: one instance per configured plugin.
///
/// The host configures it, starts it, and asks it for a [`StreamContext`]
/// whenever a request/response exchange begins. Every method except
/// [`RootContext::new_stream_context`] has a default implementation.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stream_plugin_sdk::{Result, RootContext, RootHost, StreamContext};
///
/// struct Tagger {
///     tag: Arc<str>,
/// }
///
/// struct TaggerStream {
///     tag: Arc<str>,
/// }
///
/// impl StreamContext for TaggerStream {}
///
/// impl RootContext for Tagger {
///     fn on_configure(&mut self, host: &dyn RootHost) -> Result<()> {
///         let bytes = host.plugin_configuration().unwrap_or_default();
///         self.tag = String::from_utf8(bytes.to_vec())?.into();
///         Ok(())
///     }
///
///     fn new_stream_context(&self, _context_id: u32) -> Box<dyn StreamContext> {
///         Box::new(TaggerStream { tag: Arc::clone(&self.tag) })
///     }
/// }
/// ```
pub trait RootContext: Send + 'static {
    /// Called when the host delivers configuration.
    ///
    /// Returning an error fails the configuration; the host sees
    /// `InvalidArgument` and the context keeps its previous state.
    fn on_configure(&mut self, _host: &dyn RootHost) -> Result<()> {
        Ok(())
    }

    /// Called once the plugin instance becomes active.
    fn on_start(&mut self, _host: &dyn RootHost) -> Result<()> {
        Ok(())
    }

    /// Creates the context for a new exchange.
    ///
    /// Anything the stream needs from the plugin should be handed over as a
    /// shared read-only handle.
    fn new_stream_context(&self, context_id: u32) -> Box<dyn StreamContext>;

    /// Called before the host unloads the plugin instance.
    fn on_delete(&mut self, _host: &dyn RootHost) {}
}

/// Request-level context: one instance per request/response exchange.
///
/// Events arrive in order: create, request headers, request body chunks,
/// response headers, response body chunks, done, log, delete. All handlers
/// default to doing nothing and continuing.
pub trait StreamContext: Send + 'static {
    fn on_create(&mut self, _host: &mut dyn StreamHost) {}

    fn on_request_headers(
        &mut self,
        _host: &mut dyn StreamHost,
        _header_count: usize,
        _end_of_stream: bool,
    ) -> Action {
        Action::Continue
    }

    fn on_request_body(
        &mut self,
        _host: &mut dyn StreamHost,
        _body_size: usize,
        _end_of_stream: bool,
    ) -> Action {
        Action::Continue
    }

    fn on_response_headers(
        &mut self,
        _host: &mut dyn StreamHost,
        _header_count: usize,
        _end_of_stream: bool,
    ) -> Action {
        Action::Continue
    }

    fn on_response_body(
        &mut self,
        _host: &mut dyn StreamHost,
        _body_size: usize,
        _end_of_stream: bool,
    ) -> Action {
        Action::Continue
    }

    /// The host finished processing the exchange.
    fn on_done(&mut self, _host: &mut dyn StreamHost) {}

    /// The host logged the exchange.
    fn on_log(&mut self, _host: &mut dyn StreamHost) {}

    /// Final hook before the context is dropped.
    fn on_delete(&mut self, _host: &mut dyn StreamHost) {}
}
