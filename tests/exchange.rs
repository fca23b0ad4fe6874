//! Drives the add-header plugin through the gRPC boundary, the way a proxy would.

use std::net::SocketAddr;
use stream_plugin_sdk::proto::stream_plugin_client::StreamPluginClient;
use stream_plugin_sdk::proto::{
    BodyEvent, HeadersEvent, PluginConfig, RootRef, StreamCreate, StreamRef,
};
use stream_plugin_sdk::{service, Action, HeaderOp, HeaderTarget, Registry, ADD_HEADER_ROOT_ID};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};
use tonic::Code;

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .add_service(service(Registry::builtin()))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    addr
}

async fn client() -> StreamPluginClient<Channel> {
    let addr = start_server().await;
    StreamPluginClient::connect(format!("http://{}", addr))
        .await
        .unwrap()
}

async fn configure(
    client: &mut StreamPluginClient<Channel>,
    root_context_id: u32,
    payload: &[u8],
) -> Result<(), tonic::Status> {
    client
        .configure_plugin(PluginConfig {
            root_id: ADD_HEADER_ROOT_ID.to_string(),
            root_context_id,
            configuration: Some(payload.to_vec()),
        })
        .await?;
    client.start_plugin(RootRef { root_context_id }).await?;
    Ok(())
}

async fn response_headers(
    client: &mut StreamPluginClient<Channel>,
    context_id: u32,
) -> Vec<(HeaderTarget, HeaderOp, String, String)> {
    let result = client
        .response_headers(HeadersEvent {
            context_id,
            header_count: 3,
            end_of_stream: false,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(result.action(), Action::Continue);
    result
        .header_mutations
        .into_iter()
        .map(|m| (m.target(), m.op(), m.name, m.value))
        .collect()
}

async fn finish(client: &mut StreamPluginClient<Channel>, context_id: u32) {
    client.stream_done(StreamRef { context_id }).await.unwrap();
    client.stream_log(StreamRef { context_id }).await.unwrap();
    client.stream_delete(StreamRef { context_id }).await.unwrap();
}

#[tokio::test]
async fn custom_value_exchange() {
    let mut client = client().await;

    let plugins = client.list_plugins(()).await.unwrap().into_inner();
    assert_eq!(plugins.root_ids, vec![ADD_HEADER_ROOT_ID]);

    configure(&mut client, 1, b"custom-value").await.unwrap();
    client
        .create_stream(StreamCreate {
            root_context_id: 1,
            context_id: 2,
        })
        .await
        .unwrap();

    let request = client
        .request_headers(HeadersEvent {
            context_id: 2,
            header_count: 0,
            end_of_stream: true,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(request.action(), Action::Continue);
    assert!(request.header_mutations.is_empty());

    let body = client
        .request_body(BodyEvent {
            context_id: 2,
            body_size: 1024,
            end_of_stream: true,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(body.action(), Action::Continue);
    assert!(body.header_mutations.is_empty());

    assert_eq!(
        response_headers(&mut client, 2).await,
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

    finish(&mut client, 2).await;
    client
        .delete_plugin(RootRef { root_context_id: 1 })
        .await
        .unwrap();
}

#[tokio::test]
async fn latest_configuration_applies_to_new_streams() {
    let mut client = client().await;
    configure(&mut client, 1, b"first").await.unwrap();
    configure(&mut client, 1, b"second").await.unwrap();

    client
        .create_stream(StreamCreate {
            root_context_id: 1,
            context_id: 5,
        })
        .await
        .unwrap();
    let effects = response_headers(&mut client, 5).await;
    assert_eq!(effects[0].3, "second");
    finish(&mut client, 5).await;
}

#[tokio::test]
async fn malformed_configuration_fails_startup() {
    let mut client = client().await;
    let status = configure(&mut client, 1, &[0xf0, 0x28, 0x8c, 0x28])
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .create_stream(StreamCreate {
            root_context_id: 1,
            context_id: 2,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn lifecycle_violations_are_rejected() {
    let mut client = client().await;
    configure(&mut client, 1, b"v").await.unwrap();

    let status = client
        .stream_done(StreamRef { context_id: 9 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    client
        .create_stream(StreamCreate {
            root_context_id: 1,
            context_id: 9,
        })
        .await
        .unwrap();
    let status = client
        .stream_delete(StreamRef { context_id: 9 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);

    let status = client
        .delete_plugin(RootRef { root_context_id: 1 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);

    finish(&mut client, 9).await;
    client
        .delete_plugin(RootRef { root_context_id: 1 })
        .await
        .unwrap();
}
