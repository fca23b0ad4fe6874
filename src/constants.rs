/// Identifier the add-header plugin is registered under.
pub const ADD_HEADER_ROOT_ID: &str = "add_header";

/// Response header carrying the configured value.
pub const EXAMPLE_HEADER: &str = "example-header";

/// Response header rewritten on every exchange.
pub const LOCATION_HEADER: &str = "location";

/// Literal written into the `location` response header.
pub const LOCATION_VALUE: &str = "envoy-wasm";
