//! Plugin that stamps every response with a configured header value.
//!
//! The configuration payload is taken verbatim as the value of
//! `example-header`. Each response additionally has its `location` header
//! replaced with `envoy-wasm`. Request headers and bodies pass untouched.

use crate::constants::{EXAMPLE_HEADER, LOCATION_HEADER, LOCATION_VALUE};
use crate::host::{LogLevel, RootHost, StreamHost};
use crate::plugin::{RootContext, StreamContext};
use crate::proto::Action;
use crate::{PluginError, Result};
use std::sync::Arc;

/// Plugin-level context of the add-header plugin.
#[derive(Debug, Default)]
pub struct AddHeaderRoot {
    header_value: Arc<str>,
}

impl AddHeaderRoot {
    /// Value injected into `example-header`.
    pub fn header_value(&self) -> &str {
        &self.header_value
    }
}

impl RootContext for AddHeaderRoot {
    fn on_configure(&mut self, host: &dyn RootHost) -> Result<()> {
        let bytes = host.plugin_configuration().ok_or_else(|| {
            PluginError::Configuration(format!("no configuration supplied to {}", host.root_id()))
        })?;
        let value = String::from_utf8(bytes.to_vec())?;
        host.log(LogLevel::Info, &format!("configured header value: {}", value));
        self.header_value = value.into();
        Ok(())
    }

    fn new_stream_context(&self, context_id: u32) -> Box<dyn StreamContext> {
        Box::new(AddHeaderStream {
            context_id,
            header_value: Arc::clone(&self.header_value),
        })
    }
}

/// Request-level context of the add-header plugin.
#[derive(Debug)]
pub struct AddHeaderStream {
    context_id: u32,
    header_value: Arc<str>,
}

impl StreamContext for AddHeaderStream {
    fn on_create(&mut self, host: &mut dyn StreamHost) {
        host.log(LogLevel::Info, &format!("on_create {}", self.context_id));
    }

    fn on_request_headers(
        &mut self,
        host: &mut dyn StreamHost,
        header_count: usize,
        end_of_stream: bool,
    ) -> Action {
        host.log(
            LogLevel::Info,
            &format!(
                "on_request_headers {} headers={} end_of_stream={}",
                self.context_id, header_count, end_of_stream
            ),
        );
        Action::Continue
    }

    fn on_request_body(
        &mut self,
        host: &mut dyn StreamHost,
        body_size: usize,
        end_of_stream: bool,
    ) -> Action {
        host.log(
            LogLevel::Info,
            &format!(
                "on_request_body {} size={} end_of_stream={}",
                self.context_id, body_size, end_of_stream
            ),
        );
        Action::Continue
    }

    fn on_response_headers(
        &mut self,
        host: &mut dyn StreamHost,
        _header_count: usize,
        _end_of_stream: bool,
    ) -> Action {
        host.log(
            LogLevel::Info,
            &format!("on_response_headers {}", self.context_id),
        );
        host.add_response_header(EXAMPLE_HEADER, &self.header_value);
        host.replace_response_header(LOCATION_HEADER, LOCATION_VALUE);
        Action::Continue
    }

    fn on_done(&mut self, host: &mut dyn StreamHost) {
        host.log(LogLevel::Info, &format!("on_done {}", self.context_id));
    }

    fn on_log(&mut self, host: &mut dyn StreamHost) {
        host.log(LogLevel::Info, &format!("on_log {}", self.context_id));
    }

    fn on_delete(&mut self, host: &mut dyn StreamHost) {
        host.log(LogLevel::Info, &format!("on_delete {}", self.context_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{RootCalls, StreamCalls};
    use crate::proto::{HeaderOp, HeaderTarget};
    use tracing_test::traced_test;

    fn configured(payload: &[u8]) -> AddHeaderRoot {
        let mut root = AddHeaderRoot::default();
        root.on_configure(&RootCalls::new("add_header", 1, Some(payload)))
            .unwrap();
        root
    }

    #[test]
    fn stores_payload_verbatim() {
        for payload in ["custom-value", "", "  spaced  ", "ünïcödé", "a;b=c, d"] {
            assert_eq!(configured(payload.as_bytes()).header_value(), payload);
        }
    }

    #[test]
    fn rejects_invalid_utf8_and_keeps_previous_value() {
        let mut root = configured(b"first");
        let result = root.on_configure(&RootCalls::new("add_header", 1, Some(&[0xc3, 0x28])));
        assert!(matches!(result, Err(PluginError::InvalidUtf8(_))));
        assert_eq!(root.header_value(), "first");
    }

    #[test]
    fn rejects_missing_configuration() {
        let mut root = AddHeaderRoot::default();
        let result = root.on_configure(&RootCalls::new("add_header", 1, None));
        assert!(matches!(result, Err(PluginError::Configuration(_))));
    }

    #[test]
    fn request_events_always_continue() {
        let root = configured(b"v");
        let mut stream = root.new_stream_context(2);
        let mut host = StreamCalls::new("add_header", 2);

        for (count, eos) in [(0, true), (5, false), (0, false), (5, true)] {
            assert_eq!(
                stream.on_request_headers(&mut host, count, eos),
                Action::Continue
            );
            assert_eq!(stream.on_request_body(&mut host, count, eos), Action::Continue);
        }
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn response_headers_inject_and_rewrite() {
        let root = configured(b"custom-value");
        let mut stream = root.new_stream_context(2);
        let mut host = StreamCalls::new("add_header", 2);

        stream.on_request_headers(&mut host, 3, false);
        stream.on_request_body(&mut host, 128, true);
        let action = stream.on_response_headers(&mut host, 4, false);
        assert_eq!(action, Action::Continue);

        let effects: Vec<_> = host
            .into_mutations()
            .into_iter()
            .map(|m| (m.target(), m.op(), m.name, m.value))
            .collect();
        assert_eq!(
            effects,
            vec![
                (
                    HeaderTarget::Response,
                    HeaderOp::Add,
                    "example-header".to_string(),
                    "custom-value".to_string()
                ),
                (
                    HeaderTarget::Response,
                    HeaderOp::Replace,
                    "location".to_string(),
                    "envoy-wasm".to_string()
                ),
            ]
        );
    }

    #[test]
    fn streams_keep_the_value_they_were_created_with() {
        let mut root = configured(b"old");
        let mut early = root.new_stream_context(2);
        root.on_configure(&RootCalls::new("add_header", 1, Some(b"new")))
            .unwrap();
        let mut late = root.new_stream_context(3);

        let mut host = StreamCalls::new("add_header", 2);
        early.on_response_headers(&mut host, 0, true);
        assert_eq!(host.mutations()[0].value, "old");

        let mut host = StreamCalls::new("add_header", 3);
        late.on_response_headers(&mut host, 0, true);
        assert_eq!(host.mutations()[0].value, "new");
    }

    #[traced_test]
    #[test]
    fn configure_logs_decoded_value() {
        configured(b"logged-value");
        assert!(logs_contain("configured header value: logged-value"));
    }
}
