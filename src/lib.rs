//! # stream-plugin-sdk
//!
//! Rust SDK for building HTTP stream plugins that a proxy drives over gRPC.
//!
//! The proxy (the host) owns the connection and decides when things happen. A
//! plugin only reacts: it is configured once, then gets one callback per event
//! of every request/response exchange that passes through it, and answers with
//! a [`proto::Action`] plus the header changes it wants the host to apply.
//!
//! ## Contexts
//!
//! - [`RootContext`]: one per configured plugin instance. Receives the
//!   configuration bytes and creates stream contexts.
//! - [`StreamContext`]: one per exchange. Sees, in order, create, request
//!   headers, request body chunks, response headers, response body chunks,
//!   done, log and delete.
//!
//! Contexts talk to the host through [`RootHost`] and [`StreamHost`].
//!
//! ## Serving
//!
//! Plugins are registered in a [`Registry`] under a fixed identifier, and the
//! registry is handed to [`serve()`]:
//!
//! ```rust,no_run
//! use stream_plugin_sdk::{serve, Registry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     serve(Registry::builtin(), None).await?;
//!     Ok(())
//! }
//! ```
//!
//! Run it with:
//!
//! ```bash
//! cargo run --example add_header -- --address /tmp/add-header.sock --network unix
//! ```
//!
//! ## Built-in plugins
//!
//! [`plugins::add_header`], registered as `add_header`, adds `example-header`
//! with the configured value to every response and rewrites `location`.

pub mod proto;

mod adapter;
mod constants;
mod dispatcher;
mod error;
mod host;
mod plugin;
pub mod plugins;
mod registry;
mod server;

// Re-export public API.
pub use adapter::PluginAdapter;
pub use constants::{ADD_HEADER_ROOT_ID, EXAMPLE_HEADER, LOCATION_HEADER, LOCATION_VALUE};
pub use dispatcher::{Dispatcher, RootState, StreamEvent, StreamPhase};
pub use error::{PluginError, Result};
pub use host::{LogLevel, RootCalls, RootHost, StreamCalls, StreamHost};
pub use plugin::{RootContext, StreamContext};
pub use proto::{Action, FilterResult, HeaderMutation, HeaderOp, HeaderTarget};
pub use registry::{Registry, RootFactory};
pub use server::{serve, service};
