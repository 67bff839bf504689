//! Class-type resolution: turns a token into a fresh classifier instance

use crate::classifier::Classifier;
use crate::config::PluginConfig;
use crate::plugin::{BuiltinClassifiers, ClassifierPlugin};
use mlregistry_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Constructor for a single class type
pub type ClassifierFactory = Arc<dyn Fn() -> Result<Box<dyn Classifier>> + Send + Sync>;

#[derive(Clone)]
enum Provider {
    Factory(ClassifierFactory),
    Plugin(Arc<dyn ClassifierPlugin>),
}

/// Resolves class-type tokens to newly constructed classifiers.
///
/// Tokens go through the alias table first, then are looked up among the
/// registered factories and plugins. Resolution either yields a usable
/// instance or a `PluginResolution` error; it never hands back a placeholder.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    providers: HashMap<String, Provider>,
    aliases: HashMap<String, String>,
    disabled: HashSet<String>,
}

impl PluginRegistry {
    /// Create an empty registry that resolves nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a registry
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::new()
    }

    /// Build a registry from configuration
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let mut builder = Self::builder();
        if config.builtins {
            builder = builder.with_builtins();
        }
        for (alias, target) in &config.aliases {
            builder = builder.with_alias(alias.clone(), target.clone());
        }
        for class_type in &config.disabled {
            builder = builder.disable(class_type.clone());
        }
        builder.build()
    }

    /// Register every class type offered by `plugin`
    pub fn register_plugin(&mut self, plugin: Arc<dyn ClassifierPlugin>) {
        let class_types = plugin.class_types();
        info!(
            "Registering plugin '{}' with {} class types",
            plugin.name(),
            class_types.len()
        );
        for class_type in class_types {
            self.insert(class_type, Provider::Plugin(Arc::clone(&plugin)));
        }
    }

    /// Register a constructor for a single class type
    pub fn register_factory<F>(&mut self, class_type: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Classifier>> + Send + Sync + 'static,
    {
        self.insert(class_type.into(), Provider::Factory(Arc::new(factory)));
    }

    /// Make `alias` resolve to `target`
    pub fn add_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Refuse to resolve `class_type` (and every alias pointing to it)
    pub fn disable(&mut self, class_type: impl Into<String>) {
        self.disabled.insert(class_type.into());
    }

    fn insert(&mut self, class_type: String, provider: Provider) {
        if self.providers.insert(class_type.clone(), provider).is_some() {
            warn!("Class type '{}' registered twice, keeping the latest", class_type);
        }
    }

    /// The canonical class type a token resolves to
    pub fn canonical_name<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Whether `token` would resolve (ignoring construction failures)
    pub fn contains(&self, token: &str) -> bool {
        let canonical = self.canonical_name(token);
        self.providers.contains_key(canonical) && !self.disabled.contains(canonical)
    }

    /// Sorted list of resolvable canonical class types
    pub fn class_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .providers
            .keys()
            .filter(|t| !self.disabled.contains(*t))
            .cloned()
            .collect();
        types.sort();
        types
    }

    /// Construct a fresh instance for `token`
    pub fn resolve(&self, token: &str) -> Result<Box<dyn Classifier>> {
        let canonical = self.canonical_name(token);

        if self.disabled.contains(canonical) {
            return Err(Error::plugin_resolution(format!(
                "class type '{canonical}' is disabled"
            )));
        }

        let provider = self.providers.get(canonical).ok_or_else(|| {
            Error::plugin_resolution(format!(
                "unknown class type '{token}' (available: {})",
                self.class_types().join(", ")
            ))
        })?;

        let created = match provider {
            Provider::Factory(factory) => factory(),
            Provider::Plugin(plugin) => plugin.create(canonical),
        };

        match created {
            Ok(classifier) => {
                debug!("Resolved class type '{}'", canonical);
                Ok(classifier)
            }
            Err(Error::PluginResolution(msg)) => Err(Error::PluginResolution(msg)),
            Err(e) => Err(Error::plugin_resolution(format!(
                "failed to construct '{canonical}': {e}"
            ))),
        }
    }
}

/// Builder for [`PluginRegistry`]
#[derive(Default)]
pub struct PluginRegistryBuilder {
    builtins: bool,
    plugins: Vec<Arc<dyn ClassifierPlugin>>,
    factories: Vec<(String, ClassifierFactory)>,
    aliases: Vec<(String, String)>,
    disabled: Vec<String>,
}

impl PluginRegistryBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the built-in classifiers and their long-form aliases
    pub fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Register a plugin
    pub fn with_plugin(mut self, plugin: Arc<dyn ClassifierPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Register a constructor for one class type
    pub fn with_factory<F>(mut self, class_type: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Classifier>> + Send + Sync + 'static,
    {
        self.factories.push((class_type.into(), Arc::new(factory)));
        self
    }

    /// Add an alias
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    /// Disable a class type
    pub fn disable(mut self, class_type: impl Into<String>) -> Self {
        self.disabled.push(class_type.into());
        self
    }

    /// Build the registry, rejecting aliases that point nowhere
    pub fn build(self) -> Result<PluginRegistry> {
        let mut registry = PluginRegistry::new();

        if self.builtins {
            registry.register_plugin(Arc::new(BuiltinClassifiers));
            for (alias, target) in BuiltinClassifiers::aliases() {
                registry.add_alias(alias, target);
            }
        }
        for plugin in self.plugins {
            registry.register_plugin(plugin);
        }
        for (class_type, factory) in self.factories {
            registry.insert(class_type, Provider::Factory(factory));
        }

        for (alias, target) in self.aliases {
            if !registry.providers.contains_key(&target) {
                return Err(Error::config(format!(
                    "alias '{alias}' points to unknown class type '{target}'"
                )));
            }
            registry.add_alias(alias, target);
        }
        for class_type in self.disabled {
            registry.disable(class_type);
        }

        info!(
            "Plugin registry ready with class types: {}",
            registry.class_types().join(", ")
        );
        Ok(registry)
    }
}
