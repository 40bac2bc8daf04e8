//! Named provider registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::{MEMORY_PROVIDER, MemoryProvider};
use crate::provider::Provider;

/// Maps provider names to provider instances.
///
/// Built once by the process bootstrap and handed to every
/// [`Manager`](crate::Manager) it constructs. Each name can be registered
/// only once.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the in-memory provider registered as `"memory"`.
    pub fn with_builtin() -> Self {
        let mut providers: HashMap<String, Arc<dyn Provider>> = HashMap::new();
        providers.insert(MEMORY_PROVIDER.to_string(), Arc::new(MemoryProvider::new()));
        Self { providers }
    }

    /// Register `provider` under `name`.
    ///
    /// Fails if the name is blank or already taken. Either is a startup
    /// configuration mistake.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidProviderName(name));
        }
        if self.providers.contains_key(&name) {
            return Err(Error::DuplicateProvider(name));
        }

        debug!(provider = %name, "Session provider registered");
        self.providers.insert(name, provider);
        Ok(())
    }

    /// Look up a provider by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))
    }

    /// Whether a provider is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
