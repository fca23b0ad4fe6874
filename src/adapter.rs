use crate::dispatcher::{Dispatcher, StreamEvent};
use crate::proto::{
    stream_plugin_server::StreamPlugin, BodyEvent, FilterResult, HeadersEvent, PluginConfig,
    PluginList, RootRef, StreamCreate, StreamRef,
};
use crate::registry::Registry;
use tokio::sync::Mutex;
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

/// Adapter that implements the generated gRPC service on top of a [`Dispatcher`].
///
/// Every call takes the dispatcher lock for the duration of one synchronous
/// callback, so events for a stream are applied in arrival order.
pub struct PluginAdapter {
    dispatcher: Mutex<Dispatcher>,
}

impl PluginAdapter {
    pub fn new(registry: Registry) -> Self {
        Self {
            dispatcher: Mutex::new(Dispatcher::new(registry)),
        }
    }

    async fn filter(
        &self,
        context_id: u32,
        event: StreamEvent,
    ) -> Result<Response<FilterResult>, Status> {
        let result = self
            .dispatcher
            .lock()
            .await
            .stream_event(context_id, event)
            .map_err(|err| {
                warn!("Rejected {:?} for stream {}: {}", event, context_id, err);
                Status::from(err)
            })?;
        Ok(Response::new(result))
    }
}

fn body_size(event: &BodyEvent) -> usize {
    usize::try_from(event.body_size).unwrap_or(usize::MAX)
}

#[tonic::async_trait]
impl StreamPlugin for PluginAdapter {
    async fn list_plugins(&self, _request: Request<()>) -> Result<Response<PluginList>, Status> {
        let root_ids = self.dispatcher.lock().await.registry().root_ids();
        Ok(Response::new(PluginList { root_ids }))
    }

    async fn check_health(&self, _request: Request<()>) -> Result<Response<()>, Status> {
        Ok(Response::new(()))
    }

    async fn configure_plugin(
        &self,
        request: Request<PluginConfig>,
    ) -> Result<Response<()>, Status> {
        let config = request.into_inner();
        debug!(
            "Configuring {} ({}) with {:?} bytes",
            config.root_context_id,
            config.root_id,
            config.configuration.as_ref().map(Vec::len)
        );

        self.dispatcher
            .lock()
            .await
            .configure(&config.root_id, config.root_context_id, config.configuration)
            .map_err(|err| {
                warn!(
                    "Configuration of {} ({}) failed: {}",
                    config.root_context_id, config.root_id, err
                );
                Status::from(err)
            })?;
        Ok(Response::new(()))
    }

    async fn start_plugin(&self, request: Request<RootRef>) -> Result<Response<()>, Status> {
        let root = request.into_inner();
        self.dispatcher.lock().await.start(root.root_context_id)?;
        Ok(Response::new(()))
    }

    async fn delete_plugin(&self, request: Request<RootRef>) -> Result<Response<()>, Status> {
        let root = request.into_inner();
        self.dispatcher
            .lock()
            .await
            .delete_root(root.root_context_id)?;
        Ok(Response::new(()))
    }

    async fn create_stream(
        &self,
        request: Request<StreamCreate>,
    ) -> Result<Response<()>, Status> {
        let create = request.into_inner();
        self.dispatcher
            .lock()
            .await
            .create_stream(create.root_context_id, create.context_id)?;
        Ok(Response::new(()))
    }

    async fn request_headers(
        &self,
        request: Request<HeadersEvent>,
    ) -> Result<Response<FilterResult>, Status> {
        let event = request.into_inner();
        self.filter(
            event.context_id,
            StreamEvent::RequestHeaders {
                header_count: event.header_count as usize,
                end_of_stream: event.end_of_stream,
            },
        )
        .await
    }

    async fn request_body(
        &self,
        request: Request<BodyEvent>,
    ) -> Result<Response<FilterResult>, Status> {
        let event = request.into_inner();
        self.filter(
            event.context_id,
            StreamEvent::RequestBody {
                body_size: body_size(&event),
                end_of_stream: event.end_of_stream,
            },
        )
        .await
    }

    async fn response_headers(
        &self,
        request: Request<HeadersEvent>,
    ) -> Result<Response<FilterResult>, Status> {
        let event = request.into_inner();
        self.filter(
            event.context_id,
            StreamEvent::ResponseHeaders {
                header_count: event.header_count as usize,
                end_of_stream: event.end_of_stream,
            },
        )
        .await
    }

    async fn response_body(
        &self,
        request: Request<BodyEvent>,
    ) -> Result<Response<FilterResult>, Status> {
        let event = request.into_inner();
        self.filter(
            event.context_id,
            StreamEvent::ResponseBody {
                body_size: body_size(&event),
                end_of_stream: event.end_of_stream,
            },
        )
        .await
    }

    async fn stream_done(&self, request: Request<StreamRef>) -> Result<Response<()>, Status> {
        let stream = request.into_inner();
        self.dispatcher.lock().await.done(stream.context_id)?;
        Ok(Response::new(()))
    }

    async fn stream_log(&self, request: Request<StreamRef>) -> Result<Response<()>, Status> {
        let stream = request.into_inner();
        self.dispatcher.lock().await.log(stream.context_id)?;
        Ok(Response::new(()))
    }

    async fn stream_delete(&self, request: Request<StreamRef>) -> Result<Response<()>, Status> {
        let stream = request.into_inner();
        self.dispatcher
            .lock()
            .await
            .delete_stream(stream.context_id)?;
        Ok(Response::new(()))
    }
}
