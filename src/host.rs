//! Primitives the host runtime offers to plugin contexts.
//!
//! Contexts never talk to the proxy directly. They read configuration, log and
//! request header changes through these traits; the dispatcher hands them an
//! implementation that records the changes and ships them back to the host in
//! the [`FilterResult`](crate::proto::FilterResult) of the current event.

use crate::proto::{HeaderMutation, HeaderOp, HeaderTarget};
use tracing::{debug, error, info, trace, warn};

/// Severity of a message logged through a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Host primitives available to a plugin-level context.
pub trait RootHost {
    /// Identifier the plugin was registered under.
    fn root_id(&self) -> &str;

    /// Configuration bytes supplied by the host, if any.
    fn plugin_configuration(&self) -> Option<&[u8]>;

    fn log(&self, level: LogLevel, message: &str);
}

/// Host primitives available to a request-level context.
pub trait StreamHost {
    fn context_id(&self) -> u32;

    fn add_request_header(&mut self, name: &str, value: &str);
    fn replace_request_header(&mut self, name: &str, value: &str);
    fn remove_request_header(&mut self, name: &str);

    fn add_response_header(&mut self, name: &str, value: &str);
    fn replace_response_header(&mut self, name: &str, value: &str);
    fn remove_response_header(&mut self, name: &str);

    fn log(&self, level: LogLevel, message: &str);
}

fn emit(level: LogLevel, root_id: &str, context_id: u32, message: &str) {
    match level {
        LogLevel::Trace => trace!(root_id, context_id, "{}", message),
        LogLevel::Debug => debug!(root_id, context_id, "{}", message),
        LogLevel::Info => info!(root_id, context_id, "{}", message),
        LogLevel::Warn => warn!(root_id, context_id, "{}", message),
        LogLevel::Error => error!(root_id, context_id, "{}", message),
    }
}

/// [`RootHost`] backed by the configuration the host last delivered.
pub struct RootCalls<'a> {
    root_id: &'a str,
    root_context_id: u32,
    configuration: Option<&'a [u8]>,
}

impl<'a> RootCalls<'a> {
    pub fn new(root_id: &'a str, root_context_id: u32, configuration: Option<&'a [u8]>) -> Self {
        Self {
            root_id,
            root_context_id,
            configuration,
        }
    }
}

impl RootHost for RootCalls<'_> {
    fn root_id(&self) -> &str {
        self.root_id
    }

    fn plugin_configuration(&self) -> Option<&[u8]> {
        self.configuration
    }

    fn log(&self, level: LogLevel, message: &str) {
        emit(level, self.root_id, self.root_context_id, message);
    }
}

/// [`StreamHost`] that records header mutations in call order.
pub struct StreamCalls<'a> {
    root_id: &'a str,
    context_id: u32,
    mutations: Vec<HeaderMutation>,
}

impl<'a> StreamCalls<'a> {
    pub fn new(root_id: &'a str, context_id: u32) -> Self {
        Self {
            root_id,
            context_id,
            mutations: Vec::new(),
        }
    }

    /// Mutations recorded so far.
    pub fn mutations(&self) -> &[HeaderMutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<HeaderMutation> {
        self.mutations
    }

    fn push(&mut self, target: HeaderTarget, op: HeaderOp, name: &str, value: &str) {
        self.mutations.push(HeaderMutation {
            target: target as i32,
            op: op as i32,
            name: name.to_string(),
            value: value.to_string(),
        });
    }
}

impl StreamHost for StreamCalls<'_> {
    fn context_id(&self) -> u32 {
        self.context_id
    }

    fn add_request_header(&mut self, name: &str, value: &str) {
        self.push(HeaderTarget::Request, HeaderOp::Add, name, value);
    }

    fn replace_request_header(&mut self, name: &str, value: &str) {
        self.push(HeaderTarget::Request, HeaderOp::Replace, name, value);
    }

    fn remove_request_header(&mut self, name: &str) {
        self.push(HeaderTarget::Request, HeaderOp::Remove, name, "");
    }

    fn add_response_header(&mut self, name: &str, value: &str) {
        self.push(HeaderTarget::Response, HeaderOp::Add, name, value);
    }

    fn replace_response_header(&mut self, name: &str, value: &str) {
        self.push(HeaderTarget::Response, HeaderOp::Replace, name, value);
    }

    fn remove_response_header(&mut self, name: &str) {
        self.push(HeaderTarget::Response, HeaderOp::Remove, name, "");
    }

    fn log(&self, level: LogLevel, message: &str) {
        emit(level, self.root_id, self.context_id, message);
    }
}
