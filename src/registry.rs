use crate::constants::ADD_HEADER_ROOT_ID;
use crate::plugin::RootContext;
use crate::plugins::add_header::AddHeaderRoot;
use crate::{PluginError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a plugin-level context for a host-chosen root context id.
pub type RootFactory = Arc<dyn Fn(u32) -> Box<dyn RootContext> + Send + Sync>;

/// Maps plugin identifiers to the constructors of their plugin-level contexts.
///
/// A registry is built once at startup and handed to [`serve`](crate::serve);
/// there is no process-wide registration.
#[derive(Clone, Default)]
pub struct Registry {
    factories: BTreeMap<String, RootFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the plugins shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ADD_HEADER_ROOT_ID, |_| AddHeaderRoot::default());
        registry
    }

    /// Registers `factory` under `root_id`, replacing any earlier registration.
    pub fn register<F, R>(&mut self, root_id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(u32) -> R + Send + Sync + 'static,
        R: RootContext,
    {
        let factory: RootFactory = Arc::new(move |root_context_id| -> Box<dyn RootContext> {
            Box::new(factory(root_context_id))
        });
        self.factories.insert(root_id.into(), factory);
        self
    }

    pub fn contains(&self, root_id: &str) -> bool {
        self.factories.contains_key(root_id)
    }

    /// Registered identifiers in sorted order.
    pub fn root_ids(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub(crate) fn instantiate(
        &self,
        root_id: &str,
        root_context_id: u32,
    ) -> Result<Box<dyn RootContext>> {
        let factory = self
            .factories
            .get(root_id)
            .ok_or_else(|| PluginError::UnknownPlugin(root_id.to_string()))?;
        Ok(factory(root_context_id))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("root_ids", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
