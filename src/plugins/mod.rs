//! Plugins shipped with the SDK.

pub mod add_header;
