//! Live plugin and stream contexts, and the lifecycle rules between them.
//!
//! The dispatcher owns every context the host has created. Root contexts are
//! keyed by their root context id, stream contexts by their context id. Each
//! stream remembers the root it was created under, and a root cannot be
//! deleted while any of its streams is alive.

use crate::host::{RootCalls, StreamCalls};
use crate::plugin::{RootContext, StreamContext};
use crate::proto::{Action, FilterResult};
use crate::registry::Registry;
use crate::{PluginError, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Lifecycle state of a plugin-level context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootState {
    Unconfigured,
    Configured,
    Active,
}

/// Position of a stream in its exchange. Events only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StreamPhase {
    Created,
    RequestHeaders,
    RequestBody,
    ResponseHeaders,
    ResponseBody,
    Done,
    Logged,
}

impl StreamPhase {
    fn repeats(self) -> bool {
        matches!(self, StreamPhase::RequestBody | StreamPhase::ResponseBody)
    }
}

struct RootSlot {
    root_id: String,
    state: RootState,
    configuration: Option<Vec<u8>>,
    context: Box<dyn RootContext>,
}

struct StreamSlot {
    root_context_id: u32,
    phase: StreamPhase,
    context: Box<dyn StreamContext>,
}

/// Header and body events carried to a stream context.
#[derive(Clone, Copy, Debug)]
pub enum StreamEvent {
    RequestHeaders { header_count: usize, end_of_stream: bool },
    RequestBody { body_size: usize, end_of_stream: bool },
    ResponseHeaders { header_count: usize, end_of_stream: bool },
    ResponseBody { body_size: usize, end_of_stream: bool },
}

impl StreamEvent {
    fn phase(self) -> StreamPhase {
        match self {
            StreamEvent::RequestHeaders { .. } => StreamPhase::RequestHeaders,
            StreamEvent::RequestBody { .. } => StreamPhase::RequestBody,
            StreamEvent::ResponseHeaders { .. } => StreamPhase::ResponseHeaders,
            StreamEvent::ResponseBody { .. } => StreamPhase::ResponseBody,
        }
    }
}

pub struct Dispatcher {
    registry: Registry,
    roots: HashMap<u32, RootSlot>,
    streams: HashMap<u32, StreamSlot>,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            roots: HashMap::new(),
            streams: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn root_state(&self, root_context_id: u32) -> Option<RootState> {
        self.roots.get(&root_context_id).map(|slot| slot.state)
    }

    pub fn stream_phase(&self, context_id: u32) -> Option<StreamPhase> {
        self.streams.get(&context_id).map(|slot| slot.phase)
    }

    pub fn live_streams(&self) -> usize {
        self.streams.len()
    }

    /// Delivers configuration, creating the root context on first use.
    ///
    /// A root created by this call is dropped again if its first configuration
    /// fails, so the id stays free for another plugin.
    pub fn configure(
        &mut self,
        root_id: &str,
        root_context_id: u32,
        configuration: Option<Vec<u8>>,
    ) -> Result<()> {
        if let Some(slot) = self.roots.get(&root_context_id) {
            if slot.root_id != root_id {
                return Err(PluginError::lifecycle(
                    root_context_id,
                    format!("bound to plugin {}, not {}", slot.root_id, root_id),
                ));
            }
        }

        let created = !self.roots.contains_key(&root_context_id);
        if created {
            let context = self.registry.instantiate(root_id, root_context_id)?;
            info!("Created plugin context {} ({})", root_context_id, root_id);
            self.roots.insert(
                root_context_id,
                RootSlot {
                    root_id: root_id.to_string(),
                    state: RootState::Unconfigured,
                    configuration: None,
                    context,
                },
            );
        }

        let slot = self
            .roots
            .get_mut(&root_context_id)
            .ok_or(PluginError::UnknownContext(root_context_id))?;
        let host = RootCalls::new(&slot.root_id, root_context_id, configuration.as_deref());
        if let Err(err) = slot.context.on_configure(&host) {
            if created {
                self.roots.remove(&root_context_id);
            }
            return Err(err);
        }

        slot.configuration = configuration;
        if slot.state == RootState::Unconfigured {
            slot.state = RootState::Configured;
        }
        debug!("Configured plugin context {}", root_context_id);
        Ok(())
    }

    pub fn start(&mut self, root_context_id: u32) -> Result<()> {
        let slot = self
            .roots
            .get_mut(&root_context_id)
            .ok_or(PluginError::UnknownContext(root_context_id))?;
        match slot.state {
            RootState::Unconfigured => Err(PluginError::lifecycle(
                root_context_id,
                "started before configuration",
            )),
            RootState::Active => Ok(()),
            RootState::Configured => {
                let host = RootCalls::new(
                    &slot.root_id,
                    root_context_id,
                    slot.configuration.as_deref(),
                );
                slot.context.on_start(&host)?;
                slot.state = RootState::Active;
                info!("Started plugin context {} ({})", root_context_id, slot.root_id);
                Ok(())
            }
        }
    }

    /// Drops a root context. Fails while streams created under it are alive.
    pub fn delete_root(&mut self, root_context_id: u32) -> Result<()> {
        let live = self
            .streams
            .values()
            .filter(|stream| stream.root_context_id == root_context_id)
            .count();
        if live > 0 {
            return Err(PluginError::lifecycle(
                root_context_id,
                format!("{} streams still alive", live),
            ));
        }

        let mut slot = self
            .roots
            .remove(&root_context_id)
            .ok_or(PluginError::UnknownContext(root_context_id))?;
        let host = RootCalls::new(&slot.root_id, root_context_id, slot.configuration.as_deref());
        slot.context.on_delete(&host);
        info!("Deleted plugin context {} ({})", root_context_id, slot.root_id);
        Ok(())
    }

    pub fn create_stream(&mut self, root_context_id: u32, context_id: u32) -> Result<()> {
        if self.streams.contains_key(&context_id) {
            return Err(PluginError::DuplicateContext(context_id));
        }
        let root = self
            .roots
            .get(&root_context_id)
            .ok_or(PluginError::UnknownContext(root_context_id))?;
        if root.state != RootState::Active {
            return Err(PluginError::lifecycle(
                root_context_id,
                "stream created under an inactive plugin",
            ));
        }

        let mut context = root.context.new_stream_context(context_id);
        let mut host = StreamCalls::new(&root.root_id, context_id);
        context.on_create(&mut host);

        self.streams.insert(
            context_id,
            StreamSlot {
                root_context_id,
                phase: StreamPhase::Created,
                context,
            },
        );
        debug!("Created stream {} under {}", context_id, root_context_id);
        Ok(())
    }

    /// Runs a header or body event and collects the resulting mutations.
    pub fn stream_event(&mut self, context_id: u32, event: StreamEvent) -> Result<FilterResult> {
        let (root_id, slot) = self.stream_slot(context_id)?;
        let next = event.phase();
        if next < slot.phase || (next == slot.phase && !next.repeats()) {
            return Err(PluginError::lifecycle(
                context_id,
                format!("{:?} after {:?}", next, slot.phase),
            ));
        }

        let mut host = StreamCalls::new(root_id, context_id);
        let context = &mut slot.context;
        let action: Action = match event {
            StreamEvent::RequestHeaders {
                header_count,
                end_of_stream,
            } => context.on_request_headers(&mut host, header_count, end_of_stream),
            StreamEvent::RequestBody {
                body_size,
                end_of_stream,
            } => context.on_request_body(&mut host, body_size, end_of_stream),
            StreamEvent::ResponseHeaders {
                header_count,
                end_of_stream,
            } => context.on_response_headers(&mut host, header_count, end_of_stream),
            StreamEvent::ResponseBody {
                body_size,
                end_of_stream,
            } => context.on_response_body(&mut host, body_size, end_of_stream),
        };
        slot.phase = next;

        Ok(FilterResult {
            action: action as i32,
            header_mutations: host.into_mutations(),
        })
    }

    pub fn done(&mut self, context_id: u32) -> Result<()> {
        let (root_id, slot) = self.stream_slot(context_id)?;
        if slot.phase >= StreamPhase::Done {
            return Err(PluginError::lifecycle(context_id, "done reported twice"));
        }
        slot.context.on_done(&mut StreamCalls::new(root_id, context_id));
        slot.phase = StreamPhase::Done;
        Ok(())
    }

    pub fn log(&mut self, context_id: u32) -> Result<()> {
        let (root_id, slot) = self.stream_slot(context_id)?;
        if slot.phase != StreamPhase::Done {
            return Err(PluginError::lifecycle(
                context_id,
                format!("log in phase {:?}", slot.phase),
            ));
        }
        slot.context.on_log(&mut StreamCalls::new(root_id, context_id));
        slot.phase = StreamPhase::Logged;
        Ok(())
    }

    /// Drops a stream context. Only allowed once the exchange is done.
    pub fn delete_stream(&mut self, context_id: u32) -> Result<()> {
        let (root_id, slot) = self.stream_slot(context_id)?;
        if slot.phase < StreamPhase::Done {
            return Err(PluginError::lifecycle(context_id, "delete before done"));
        }
        slot.context.on_delete(&mut StreamCalls::new(root_id, context_id));
        self.streams.remove(&context_id);
        debug!("Deleted stream {}", context_id);
        Ok(())
    }

    fn stream_slot(&mut self, context_id: u32) -> Result<(&str, &mut StreamSlot)> {
        let slot = self
            .streams
            .get_mut(&context_id)
            .ok_or(PluginError::UnknownContext(context_id))?;
        // Roots cannot be deleted under live streams, so the lookup only
        // misses if the maps were corrupted.
        let root_id = self
            .roots
            .get(&slot.root_context_id)
            .map(|root| root.root_id.as_str())
            .ok_or(PluginError::UnknownContext(slot.root_context_id))?;
        Ok((root_id, slot))
    }
}
