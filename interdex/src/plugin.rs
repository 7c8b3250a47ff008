//! Extension protocol.
//!
//! A [PackingPlugin] is configured once before packing, consulted while
//! packing, and cleaned up once afterwards. Plugins are created by an
//! explicit [PluginRegistry] handed to the pass by its driver, and
//! borrowed by a [PluginHost] for the duration of one invocation.

use crate::helpe::*;

/// What a plugin wants done with the class about to be committed.
#[derive(Debug, Clone, Default)]
pub struct PlacementHint {
    /// Classes to commit into the same dex, right after the class.
    pub companions: ClassSet,
    /// Close the open dex and start the class in a fresh one.
    pub fresh_dex:  bool,
}

impl PlacementHint {
    pub fn companions(companions: ClassSet) -> Self {
        Self { companions, fresh_dex: false }
    }

    pub fn fresh_dex() -> Self {
        Self { companions: vec![], fresh_dex: true }
    }

    fn absorb(&mut self, other: PlacementHint) {
        self.companions.extend(other.companions);
        self.fresh_dex |= other.fresh_dex;
    }
}

pub trait PackingPlugin {
    fn name(&self) -> &str;

    fn configure(&mut self, scope: &ClassScope, config: &PassConfig) -> Result<(), PluginError>;

    /// Called right before `cls` is committed to `dex`. Companions are
    /// subject to the same capacity check as the class itself.
    fn on_place(&mut self, _cls: &DexClass, _dex: &Dex) -> PlacementHint {
        PlacementHint::default()
    }

    /// Classes to pack after the whole input has been placed.
    fn leftover_classes(&mut self) -> ClassSet {
        vec![]
    }

    fn cleanup(&mut self, scope: &ClassScope) -> Result<(), PluginError>;
}

pub type PluginFactory = Box<dyn Fn() -> Box<dyn PackingPlugin>>;

/// Knows how to create every registered plugin, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    factories: Vec<(String, PluginFactory)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where F: Fn() -> Box<dyn PackingPlugin> + 'static {
        self.factories.push((name.into(), Box::new(factory)));
    }

    /// Spawns one fresh instance of every registered plugin.
    pub fn create_plugins(&self) -> Vec<Box<dyn PackingPlugin>> {
        self.factories
            .iter()
            .map(|(name, factory)| {
                trace!(plugin = %name, "creating plugin");
                factory()
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Drives the lifecycle of an ordered list of plugins.
pub struct PluginHost {
    plugins: Vec<Box<dyn PackingPlugin>>,
}

impl PluginHost {
    pub fn new(plugins: Vec<Box<dyn PackingPlugin>>) -> Self {
        Self { plugins }
    }

    /// Configures every plugin in order. On the first failure, the
    /// plugins configured so far are cleaned up and the error returned.
    pub fn configure(&mut self, scope: &ClassScope, config: &PassConfig) -> Result<(), InterDexError> {
        for idx in 0..self.plugins.len() {
            if let Err(source) = self.plugins[idx].configure(scope, config) {
                let plugin = self.plugins[idx].name().to_string();
                for p in self.plugins[..idx].iter_mut() {
                    if let Err(e) = p.cleanup(scope) {
                        warn!(plugin = p.name(), error = %e, "cleanup after failed configuration failed");
                    }
                }
                return Err(InterDexError::PluginConfigure { plugin, source });
            }
            debug!(plugin = self.plugins[idx].name(), "plugin configured");
        }

        Ok(())
    }

    /// Asks every plugin about `cls`. Companions are concatenated in
    /// registration order; one fresh-dex request is enough.
    pub fn on_place(&mut self, cls: &DexClass, dex: &Dex) -> PlacementHint {
        let mut res = PlacementHint::default();
        for p in self.plugins.iter_mut() {
            res.absorb(p.on_place(cls, dex));
        }

        res
    }

    pub fn leftover_classes(&mut self) -> ClassSet {
        self.plugins
            .iter_mut()
            .flat_map(|p| p.leftover_classes())
            .collect()
    }

    /// Cleans every plugin up, in order. Failures are logged and
    /// counted; whatever has been packed stays packed.
    pub fn cleanup(&mut self, scope: &ClassScope) -> usize {
        let mut failures = 0;
        for p in self.plugins.iter_mut() {
            if let Err(e) = p.cleanup(scope) {
                warn!(plugin = p.name(), error = %e, "plugin cleanup failed");
                failures += 1;
            }
        }

        failures
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
