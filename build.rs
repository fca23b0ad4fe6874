use tonic_build::manual::{Builder, Method, Service};

/// Describes one unary RPC of the stream plugin service.
fn unary(name: &str, route_name: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route_name)
        .input_type(input)
        .output_type(output)
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Messages are declared by hand in src/proto.rs, so no protoc is needed here.
    let service = Service::builder()
        .name("StreamPlugin")
        .package("streamplugin.v1")
        .method(unary("list_plugins", "ListPlugins", "crate::proto::Unit", "crate::proto::PluginList"))
        .method(unary("check_health", "CheckHealth", "crate::proto::Unit", "crate::proto::Unit"))
        .method(unary(
            "configure_plugin",
            "ConfigurePlugin",
            "crate::proto::PluginConfig",
            "crate::proto::Unit",
        ))
        .method(unary("start_plugin", "StartPlugin", "crate::proto::RootRef", "crate::proto::Unit"))
        .method(unary("delete_plugin", "DeletePlugin", "crate::proto::RootRef", "crate::proto::Unit"))
        .method(unary(
            "create_stream",
            "CreateStream",
            "crate::proto::StreamCreate",
            "crate::proto::Unit",
        ))
        .method(unary(
            "request_headers",
            "RequestHeaders",
            "crate::proto::HeadersEvent",
            "crate::proto::FilterResult",
        ))
        .method(unary(
            "request_body",
            "RequestBody",
            "crate::proto::BodyEvent",
            "crate::proto::FilterResult",
        ))
        .method(unary(
            "response_headers",
            "ResponseHeaders",
            "crate::proto::HeadersEvent",
            "crate::proto::FilterResult",
        ))
        .method(unary(
            "response_body",
            "ResponseBody",
            "crate::proto::BodyEvent",
            "crate::proto::FilterResult",
        ))
        .method(unary("stream_done", "StreamDone", "crate::proto::StreamRef", "crate::proto::Unit"))
        .method(unary("stream_log", "StreamLog", "crate::proto::StreamRef", "crate::proto::Unit"))
        .method(unary(
            "stream_delete",
            "StreamDelete",
            "crate::proto::StreamRef",
            "crate::proto::Unit",
        ))
        .build();

    Builder::new()
        .build_server(true)
        .build_client(true)
        .compile(&[service]);
}
