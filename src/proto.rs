//! Wire messages of the stream plugin host boundary.
//!
//! The service code is generated by `build.rs`; the messages are declared
//! here with `prost` derives so the crate builds without `protoc`.

/// Empty message for calls that carry nothing.
pub type Unit = ();

/// Outcome of a header or body event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Action {
    /// Let the proxy continue with the next filter.
    Continue = 0,
    /// Hold the stream at this filter.
    StopIteration = 1,
}

/// Which header map a mutation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HeaderTarget {
    Request = 0,
    Response = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HeaderOp {
    /// Append a value, keeping existing ones.
    Add = 0,
    /// Set a value, dropping existing ones.
    Replace = 1,
    Remove = 2,
}

/// Identifiers of the plugins this process can instantiate.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PluginList {
    #[prost(string, repeated, tag = "1")]
    pub root_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// Configuration delivered to a plugin-level context.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PluginConfig {
    /// Identifier the plugin was registered under.
    #[prost(string, tag = "1")]
    pub root_id: ::prost::alloc::string::String,
    /// Host-chosen id of the plugin-level context.
    #[prost(uint32, tag = "2")]
    pub root_context_id: u32,
    /// Raw configuration payload; unset when the host has none.
    #[prost(bytes = "vec", optional, tag = "3")]
    pub configuration: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RootRef {
    #[prost(uint32, tag = "1")]
    pub root_context_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamCreate {
    #[prost(uint32, tag = "1")]
    pub root_context_id: u32,
    #[prost(uint32, tag = "2")]
    pub context_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamRef {
    #[prost(uint32, tag = "1")]
    pub context_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeadersEvent {
    #[prost(uint32, tag = "1")]
    pub context_id: u32,
    #[prost(uint32, tag = "2")]
    pub header_count: u32,
    #[prost(bool, tag = "3")]
    pub end_of_stream: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BodyEvent {
    #[prost(uint32, tag = "1")]
    pub context_id: u32,
    #[prost(uint64, tag = "2")]
    pub body_size: u64,
    #[prost(bool, tag = "3")]
    pub end_of_stream: bool,
}

/// A single header change requested by a stream context.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct HeaderMutation {
    #[prost(enumeration = "HeaderTarget", tag = "1")]
    pub target: i32,
    #[prost(enumeration = "HeaderOp", tag = "2")]
    pub op: i32,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub value: ::prost::alloc::string::String,
}

/// Result of a header or body event: the action plus the header mutations
/// the context asked for, in call order.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterResult {
    #[prost(enumeration = "Action", tag = "1")]
    pub action: i32,
    #[prost(message, repeated, tag = "2")]
    pub header_mutations: ::prost::alloc::vec::Vec<HeaderMutation>,
}

// Generated gRPC service code.
#[allow(clippy::all)]
#[allow(missing_docs)]
mod service {
    include!(concat!(env!("OUT_DIR"), "/streamplugin.v1.StreamPlugin.rs"));
}

pub use service::*;
