pub mod assign;
pub mod canary;

use crate::{
    helpe::*,
    mixed::{self, MixedModeSelection},
    plugin::{PluginHost, PluginRegistry},
};
use self::assign::{DexAssignmentEngine, Packing, PackingPolicy};

/// One repacked root store.
#[derive(Debug, Clone)]
pub struct StoreReport {
    pub store:  String,
    pub dexen:  Vec<Dex>,
    pub stats:  PackingStats,
}

/// Outcome of one pass invocation.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Set when the pass had nothing to do.
    pub skipped:    bool,
    pub stores:     Vec<StoreReport>,
    /// Summed over all root stores.
    pub stats:      PackingStats,
}

impl PassReport {
    pub fn skipped() -> Self {
        Self { skipped: true, ..Default::default() }
    }
}

/// A configured InterDex pass. Configuration errors surface from
/// [`InterDexPass::configure`]; by the time a pass exists, its options
/// are known to be consistent.
pub struct InterDexPass {
    config:     PassConfig,
    statuses:   HashSet<DexStatus>,
    model:      Box<dyn CostModel>,
}

impl InterDexPass {
    pub fn configure(config: PassConfig) -> Result<Self, ConfigError> {
        let statuses = config.validate()?;
        debug!(?config, "InterDex configured");

        Ok(Self {
            config,
            statuses,
            model: Box::new(DeclaredCost),
        })
    }

    /// Swaps the linear-allocation estimator.
    pub fn with_cost_model(mut self, model: impl CostModel + 'static) -> Self {
        self.model = Box::new(model);
        self
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    pub fn policy(&self) -> PackingPolicy {
        PackingPolicy::from_config(&self.config)
    }

    /// Repacks every root store in `stores`, in place.
    ///
    /// Without keep rules (`rules_present == false`) the pass is a
    /// no-op. All fatal conditions (duplicate classes, a duplicate in the
    /// mixed-mode list, a plugin that fails to configure) are raised
    /// before the first class is moved, so on `Err` the stores are
    /// exactly as they were handed in.
    pub fn run(
        &self,
        stores:         &mut [Store],
        registry:       &PluginRegistry,
        metrics:        &mut dyn MetricsSink,
        rules_present:  bool,
    ) -> Result<PassReport, InterDexError> {
        if !rules_present {
            info!("InterDex not run because no keep rule configuration was provided");
            return Ok(PassReport::skipped());
        }

        // Measure total pass time.
        let total_start = Instant::now();
        let scope = ClassScope::build(stores)?;
        debug!(
            classes = scope.len(),
            coldstart = scope.iter().filter(|c| c.is_coldstart()).count(),
            plugins = %registry.names().join(","),
            "class scope built"
        );

        // Everything that can fail happens here, for all root stores,
        // before anything is packed.
        let mut prepared: Vec<(usize, MixedModeSelection, PluginHost)> = vec![];
        for (idx, store) in stores.iter().enumerate().filter(|(_, s)| s.root) {
            let selected = mixed::select(
                &self.statuses,
                self.config.scroll_classes_path(),
                &store.dexen,
                &scope,
            );
            let selection = match selected {
                Ok(v)   => v,
                Err(e)  => {
                    Self::unwind(&mut prepared, &scope);
                    return Err(e.into());
                }
            };
            let mut host = PluginHost::new(registry.create_plugins());
            if let Err(e) = host.configure(&scope, &self.config) {
                Self::unwind(&mut prepared, &scope);
                return Err(e);
            }
            prepared.push((idx, selection, host));
        }

        let mut report = PassReport::default();
        for (idx, selection, mut host) in prepared {
            let store = &mut stores[idx];
            let packing = self.run_store(store, &selection, &mut host);
            host.cleanup(&scope);
            report.stats.merge(&packing.stats);
            report.stores.push(StoreReport {
                store:  store.name.clone(),
                dexen:  packing.dexen,
                stats:  packing.stats,
            });
        }
        report.stats.report(metrics);

        info!(
            stores = report.stores.len(),
            dexes = report.stats.dexes,
            coldstart_dexes = report.stats.coldstart_dexes,
            scroll_dexes = report.stats.scroll_dexes,
            elapsed_us = total_start.elapsed().as_micros() as u64,
            "InterDex done"
        );

        Ok(report)
    }

    fn run_store(
        &self,
        store:      &mut Store,
        selection:  &MixedModeSelection,
        host:       &mut PluginHost,
    ) -> Packing {
        debug!(
            store = %store.name,
            classes = store.num_classes(),
            mixed_mode_classes = selection.num_classes(),
            plugins = host.len(),
            "packing store"
        );
        let dexen = std::mem::take(&mut store.dexen);
        let packing = DexAssignmentEngine::new(
            self.policy(),
            selection,
            host,
            self.model.as_ref(),
        ).run(dexen);
        store.dexen = packing.dexen
            .iter()
            .map(|d| d.classes().clone())
            .collect();

        packing
    }

    /// Cleans up the plugins of stores prepared before a fatal error.
    fn unwind(prepared: &mut Vec<(usize, MixedModeSelection, PluginHost)>, scope: &ClassScope) {
        for (_, _, host) in prepared.iter_mut() {
            host.cleanup(scope);
        }
        prepared.clear();
    }
}
