use crate::{
    helpe::*,
    algo::canary::CanaryEmitter,
    mixed::MixedModeSelection,
    plugin::{PlacementHint, PluginHost},
};

/// The knobs the engine cares about, distilled from an already
/// validated [PassConfig].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingPolicy {
    pub limit:                          Cost,
    pub static_prune:                   bool,
    pub emit_canaries:                  bool,
    pub normal_primary_dex:             bool,
    pub can_touch_coldstart:            bool,
    pub can_touch_coldstart_extended:   bool,
}

impl PackingPolicy {
    pub fn from_config(cfg: &PassConfig) -> Self {
        Self {
            limit:                          cfg.linear_alloc_limit,
            static_prune:                   cfg.static_prune,
            emit_canaries:                  cfg.emit_canaries,
            normal_primary_dex:             cfg.normal_primary_dex,
            can_touch_coldstart:            cfg.can_touch_coldstart_cls,
            can_touch_coldstart_extended:   cfg.can_touch_coldstart_extended_cls,
        }
    }

    /// Returns `true` if classes carrying `label` must keep their place
    /// in the priority order, i.e. mixed-mode boundaries may not move
    /// them around.
    #[inline(always)]
    pub fn is_protected(&self, label: PriorityLabel) -> bool {
        match label {
            PriorityLabel::Coldstart            => !self.can_touch_coldstart,
            PriorityLabel::ColdstartExtended    => !self.can_touch_coldstart_extended,
            _                                   => false,
        }
    }
}

/// What the engine hands back for one store.
#[derive(Debug, Clone)]
pub struct Packing {
    pub dexen:  Vec<Dex>,
    pub stats:  PackingStats,
}

/// All mutable state of a packing run. Exactly one exists per run and
/// it is threaded through every step by `&mut`.
struct PackingContext {
    open:               Dex,
    closed:             Vec<Dex>,
    // Names of every class committed so far.
    emitted:            HashSet<String>,
    // Mixed-mode classes met inside the protected prefix.
    deferred:           ClassSet,
    in_prefix:          bool,
    canaries:           CanaryEmitter,
    stats:              PackingStats,
    coldstart_tagged:   bool,
    extended_tagged:    bool,
}

impl PackingContext {
    fn new(emit_canaries: bool) -> Self {
        Self {
            open:               Dex::new(0, DexKind::Ordinary),
            closed:             vec![],
            emitted:            HashSet::new(),
            deferred:           vec![],
            in_prefix:          false,
            canaries:           CanaryEmitter::new(emit_canaries),
            stats:              PackingStats::default(),
            coldstart_tagged:   false,
            extended_tagged:    false,
        }
    }
}

/// Greedy, single-pass, left-to-right assignment of priority-ordered
/// classes to dexes.
pub struct DexAssignmentEngine<'a> {
    policy: PackingPolicy,
    mixed:  &'a MixedModeSelection,
    host:   &'a mut PluginHost,
    model:  &'a dyn CostModel,
}

impl<'a> DexAssignmentEngine<'a> {
    pub fn new(
        policy: PackingPolicy,
        mixed:  &'a MixedModeSelection,
        host:   &'a mut PluginHost,
        model:  &'a dyn CostModel,
    ) -> Self {
        Self { policy, mixed, host, model }
    }

    /// Packs `dexen` (dex 0 being the primary dex) into a new sequence
    /// of dexes. Every class that is not pruned ends up in exactly one
    /// of them.
    pub fn run(mut self, mut dexen: Vec<ClassSet>) -> Packing {
        let mut ctx = PackingContext::new(self.policy.emit_canaries);
        let mut sequence: ClassSet = vec![];

        if !dexen.is_empty() {
            let primary = dexen.remove(0);
            if self.policy.normal_primary_dex {
                sequence.extend(primary);
            } else {
                // The primary dex is fixed, except that mixed-mode classes
                // never live there: they lead the packed sequence instead.
                let (moved, kept): (ClassSet, ClassSet) = primary
                    .into_iter()
                    .partition(|c| self.mixed.is_mixed_mode_class(c));
                for c in &moved {
                    debug!(class = %c.name, "moving mixed mode class out of the primary dex");
                }
                self.emit_primary(&mut ctx, kept);
                sequence.extend(moved);
            }
        }
        sequence.extend(dexen.into_iter().flatten());

        let boundary = self.protected_boundary(&sequence);
        ctx.in_prefix = boundary.is_some();
        for (idx, cls) in sequence.into_iter().enumerate() {
            self.visit(&mut ctx, cls);
            if boundary == Some(idx) {
                self.flush_deferred(&mut ctx);
            }
        }
        self.flush_deferred(&mut ctx);

        for cls in self.host.leftover_classes() {
            if cls.is_canary() { continue; }
            trace!(class = %cls.name, "placing plugin leftover");
            self.place(&mut ctx, cls, DexKind::Ordinary, false);
        }
        self.close_open(&mut ctx, DexKind::Ordinary);

        info!(
            dexes = ctx.stats.dexes,
            coldstart_dexes = ctx.stats.coldstart_dexes,
            scroll_dexes = ctx.stats.scroll_dexes,
            mixed_mode_dexes = ctx.stats.mixed_mode_dexes,
            pruned = ctx.stats.pruned_classes,
            over_budget = ctx.stats.over_budget_dexes,
            "dex assignment done"
        );

        Packing {
            dexen:  ctx.closed,
            stats:  ctx.stats,
        }
    }

    /// Emits the primary dex as-is: no pruning, no capacity check.
    fn emit_primary(&mut self, ctx: &mut PackingContext, classes: ClassSet) {
        let mut dex = Dex::new(0, DexKind::Primary);
        for cls in classes {
            if cls.is_canary() {
                debug!(class = %cls.name, "dropping stale canary from the primary dex");
                continue;
            }
            if ctx.emitted.insert(cls.name.clone()) {
                let cost = self.model.linear_alloc(&cls);
                dex.push(cls, cost);
            }
        }
        // No primary dex at all: the first secondary dex takes ordinal 0
        // and its canary names it so.
        if dex.is_empty() { return; }
        self.seal(ctx, dex);
        ctx.open = Dex::new(ctx.closed.len(), DexKind::Ordinary);
    }

    /// Index of the last class whose label is protected. Mixed-mode
    /// classes met up to there wait until it has been committed.
    fn protected_boundary(&self, sequence: &[Arc<DexClass>]) -> Option<usize> {
        sequence.iter()
            .rposition(|c| !c.is_canary() && self.policy.is_protected(c.label))
    }

    fn visit(&mut self, ctx: &mut PackingContext, cls: Arc<DexClass>) {
        if cls.is_canary() {
            debug!(class = %cls.name, "dropping stale canary");
            return;
        }
        if ctx.emitted.contains(&cls.name) {
            // Already pulled in by a plugin.
            trace!(class = %cls.name, "skipping already placed class");
            return;
        }
        if self.policy.static_prune && !cls.referenced {
            debug!(class = %cls.name, "pruning unreferenced class");
            ctx.stats.pruned_classes += 1;
            return;
        }

        if self.mixed.is_mixed_mode_class(&cls) {
            if self.policy.is_protected(cls.label) {
                debug!(class = %cls.name, label = %cls.label, "mixed mode class kept in place, its label cannot be touched");
            } else if ctx.in_prefix {
                debug!(class = %cls.name, "deferring mixed mode class past the protected prefix");
                ctx.deferred.push(cls);
                return;
            } else {
                self.place(ctx, cls, DexKind::MixedMode, true);
                return;
            }
        }

        self.place(ctx, cls, DexKind::Ordinary, true);
    }

    fn flush_deferred(&mut self, ctx: &mut PackingContext) {
        ctx.in_prefix = false;
        if ctx.deferred.is_empty() { return; }
        let deferred = std::mem::take(&mut ctx.deferred);
        debug!(classes = deferred.len(), "placing deferred mixed mode classes");
        for cls in deferred {
            self.place(ctx, cls, DexKind::MixedMode, true);
        }
    }

    /// Commits `cls` (and whatever companions plugins attach to it) to
    /// a dex of the given `kind`, opening fresh dexes as needed.
    fn place(
        &mut self,
        ctx:                &mut PackingContext,
        cls:                Arc<DexClass>,
        kind:               DexKind,
        consult_plugins:    bool,
    ) {
        if ctx.emitted.contains(&cls.name) { return; }
        let limit = self.policy.limit;

        // Mixed-mode and ordinary classes never share a dex.
        if ctx.open.kind() != kind {
            self.close_open(ctx, kind);
        }
        let cost = self.model.linear_alloc(&cls);
        if !ctx.open.is_empty() && !ctx.open.fits(cost, limit) {
            self.close_open(ctx, kind);
        }

        let hint = if consult_plugins {
            self.host.on_place(&cls, &ctx.open)
        } else {
            PlacementHint::default()
        };
        let mut group: ClassSet = vec![cls];
        for c in hint.companions {
            let misplaced = c.is_canary()
                || self.mixed.is_mixed_mode_class(&c) != (kind == DexKind::MixedMode);
            if misplaced || ctx.emitted.contains(&c.name) || group.iter().any(|g| g.name == c.name) {
                debug!(companion = %c.name, "ignoring companion class");
            } else {
                group.push(c);
            }
        }

        let group_cost = get_total_cost(&group, self.model);
        if !ctx.open.is_empty() && (hint.fresh_dex || !ctx.open.fits(group_cost, limit)) {
            self.close_open(ctx, kind);
        }

        // A group that fits nowhere is split: each companion takes the
        // ordinary capacity check, so only a lone class overshoots.
        ctx.stats.injected_classes += group.len() - 1;
        for (idx, c) in group.into_iter().enumerate() {
            let cost = self.model.linear_alloc(&c);
            if idx > 0 && !ctx.open.is_empty() && !ctx.open.fits(cost, limit) {
                debug!(companion = %c.name, "companion spills over into a fresh dex");
                self.close_open(ctx, kind);
            }
            ctx.emitted.insert(c.name.clone());
            trace!(class = %c.name, dex = ctx.open.ordinal(), cost, "committing class");
            ctx.open.push(c, cost);
        }
    }

    /// Closes the open dex, if it holds anything, and opens a fresh one
    /// of `next_kind`.
    fn close_open(&mut self, ctx: &mut PackingContext, next_kind: DexKind) {
        if ctx.open.is_empty() {
            ctx.open.set_kind(next_kind);
            return;
        }
        let next = Dex::new(ctx.closed.len() + 1, next_kind);
        let dex = std::mem::replace(&mut ctx.open, next);
        self.seal(ctx, dex);
    }

    /// Freezes `dex`: tags, canary, statistics.
    fn seal(&self, ctx: &mut PackingContext, mut dex: Dex) {
        debug_assert!(dex.ordinal() == ctx.closed.len(), "Dex ordinals out of step!");
        if dex.kind() != DexKind::Primary {
            if !ctx.coldstart_tagged && dex.has_label(PriorityLabel::Coldstart) {
                dex.add_status(DexStatus::FirstColdstartDex);
                ctx.coldstart_tagged = true;
            }
            if !ctx.extended_tagged && dex.has_label(PriorityLabel::ColdstartExtended) {
                dex.add_status(DexStatus::FirstExtendedDex);
                ctx.extended_tagged = true;
            }
            if dex.has_label(PriorityLabel::Scroll) {
                dex.add_status(DexStatus::ScrollDex);
            }
            if dex.cost() > self.policy.limit {
                warn!(
                    dex = dex.ordinal(),
                    cost = dex.cost(),
                    limit = self.policy.limit,
                    "dex exceeds the linear alloc limit on its own"
                );
                dex.mark_over_budget();
            }
            ctx.canaries.emit(&mut dex);
        }
        if dex.kind() == DexKind::MixedMode
            || dex.statuses().iter().any(|s| self.mixed.has_status(*s)) {
            dex.mark_mixed_mode();
        }

        debug!(
            dex = dex.ordinal(),
            kind = dex.kind().as_str(),
            classes = dex.len(),
            cost = dex.cost(),
            "dex closed"
        );
        ctx.stats.record_dex(&dex);
        ctx.closed.push(dex);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::plugin::{PackingPlugin, PluginRegistry};
    use super::*;

    fn policy(limit: Cost) -> PackingPolicy {
        PackingPolicy {
            limit,
            static_prune:                   false,
            emit_canaries:                  false,
            normal_primary_dex:             true,
            can_touch_coldstart:            false,
            can_touch_coldstart_extended:   false,
        }
    }

    fn cls(name: &str, cost: Cost, label: PriorityLabel) -> Arc<DexClass> {
        Arc::new(DexClass::new(name, cost).with_label(label))
    }

    fn plain(name: &str, cost: Cost) -> Arc<DexClass> {
        cls(name, cost, PriorityLabel::None)
    }

    fn mixed(names: &[&str]) -> MixedModeSelection {
        MixedModeSelection::Classes(names.iter().map(|n| n.to_string()).collect())
    }

    fn pack(dexen: Vec<ClassSet>, policy: PackingPolicy, sel: &MixedModeSelection) -> Packing {
        let mut host = PluginHost::new(vec![]);
        DexAssignmentEngine::new(policy, sel, &mut host, &DeclaredCost).run(dexen)
    }

    fn layout(p: &Packing) -> Vec<Vec<String>> {
        p.dexen.iter()
            .map(|d| d.classes().iter().map(|c| c.name.clone()).collect())
            .collect()
    }

    fn names(groups: &[&[&str]]) -> Vec<Vec<String>> {
        groups.iter()
            .map(|g| g.iter().map(|n| n.to_string()).collect())
            .collect()
    }

    #[test]
    fn greedy_fill_respects_the_limit() {
        let classes: ClassSet = (0..10).map(|i| plain(&format!("LC{i};"), 3)).collect();
        let p = pack(vec![classes], policy(10), &MixedModeSelection::Nothing);

        assert_eq!(p.dexen.iter().map(Dex::len).collect::<Vec<_>>(), vec![3, 3, 3, 1]);
        assert!(p.dexen.iter().all(|d| d.cost() <= 10));
        assert_eq!(p.stats.dexes, 4);
    }

    #[test]
    fn fixed_primary_is_exempt_and_loses_mixed_mode_classes() {
        let primary = vec![plain("LMain;", 8), plain("LMix;", 1), plain("LApp;", 8)];
        let secondary = vec![plain("LA;", 2)];
        let p = pack(
            vec![primary, secondary],
            PackingPolicy { normal_primary_dex: false, ..policy(10) },
            &mixed(&["LMix;"]),
        );

        assert_eq!(layout(&p), names(&[&["LMain;", "LApp;"], &["LMix;"], &["LA;"]]));
        assert_eq!(p.dexen[0].kind(), DexKind::Primary);
        assert!(!p.dexen[0].is_over_budget());
        assert_eq!(p.dexen[1].kind(), DexKind::MixedMode);
        assert!(p.dexen[1].is_mixed_mode());
    }

    #[test]
    fn mixed_mode_classes_get_their_own_dexes() {
        let input = vec![plain("LA;", 1), plain("LM1;", 1), plain("LM2;", 1), plain("LB;", 1)];
        let p = pack(vec![input], policy(10), &mixed(&["LM1;", "LM2;"]));

        assert_eq!(layout(&p), names(&[&["LA;"], &["LM1;", "LM2;"], &["LB;"]]));
        assert_eq!(p.stats.mixed_mode_dexes, 1);
    }

    #[test]
    fn mixed_mode_waits_for_the_protected_prefix() {
        let input = || vec![
            cls("LC1;", 1, PriorityLabel::Coldstart),
            plain("LM;", 1),
            cls("LC2;", 1, PriorityLabel::Coldstart),
            plain("LX;", 1),
        ];

        let p = pack(vec![input()], policy(10), &mixed(&["LM;"]));
        assert_eq!(layout(&p), names(&[&["LC1;", "LC2;"], &["LM;"], &["LX;"]]));

        let touchy = PackingPolicy { can_touch_coldstart: true, can_touch_coldstart_extended: true, ..policy(10) };
        let p = pack(vec![input()], touchy, &mixed(&["LM;"]));
        assert_eq!(layout(&p), names(&[&["LC1;"], &["LM;"], &["LC2;", "LX;"]]));
    }

    #[test]
    fn extended_prefix_is_protected_separately() {
        let input = || vec![
            cls("LC1;", 1, PriorityLabel::Coldstart),
            cls("LME;", 1, PriorityLabel::ColdstartExtended),
            cls("LE;", 1, PriorityLabel::ColdstartExtended),
            cls("LC2;", 1, PriorityLabel::Coldstart),
        ];

        // Extended classes may be isolated, but not ahead of coldstart ones.
        let p = pack(
            vec![input()],
            PackingPolicy { can_touch_coldstart_extended: true, ..policy(10) },
            &mixed(&["LME;"]),
        );
        assert_eq!(layout(&p), names(&[&["LC1;", "LE;", "LC2;"], &["LME;"]]));

        let p = pack(vec![input()], policy(10), &mixed(&["LME;"]));
        assert_eq!(layout(&p), names(&[&["LC1;", "LME;", "LE;", "LC2;"]]));
    }

    #[test]
    fn protected_mixed_mode_classes_stay_in_place() {
        let input = || vec![
            cls("LC1;", 1, PriorityLabel::Coldstart),
            cls("LMC;", 1, PriorityLabel::Coldstart),
            cls("LC2;", 1, PriorityLabel::Coldstart),
        ];

        let p = pack(vec![input()], policy(10), &mixed(&["LMC;"]));
        assert_eq!(layout(&p), names(&[&["LC1;", "LMC;", "LC2;"]]));
        assert_eq!(p.stats.mixed_mode_dexes, 0);

        let touchy = PackingPolicy { can_touch_coldstart: true, can_touch_coldstart_extended: true, ..policy(10) };
        let p = pack(vec![input()], touchy, &mixed(&["LMC;"]));
        assert_eq!(layout(&p), names(&[&["LC1;"], &["LMC;"], &["LC2;"]]));
    }

    #[test]
    fn oversized_class_gets_a_flagged_dex() {
        let p = pack(
            vec![vec![plain("LA;", 4), plain("LBig;", 15), plain("LB;", 4)]],
            policy(10),
            &MixedModeSelection::Nothing,
        );

        assert_eq!(layout(&p), names(&[&["LA;"], &["LBig;"], &["LB;"]]));
        assert!(p.dexen[1].is_over_budget());
        assert_eq!(p.stats.over_budget_dexes, 1);
    }

    #[test]
    fn static_prune_drops_unreferenced_classes() {
        let dead = Arc::new(DexClass::new("LDead;", 1).with_referenced(false));
        let input = || vec![plain("LA;", 1), dead.clone(), plain("LB;", 1)];

        let p = pack(vec![input()], PackingPolicy { static_prune: true, ..policy(10) }, &MixedModeSelection::Nothing);
        assert_eq!(layout(&p), names(&[&["LA;", "LB;"]]));
        assert_eq!(p.stats.pruned_classes, 1);

        let p = pack(vec![input()], policy(10), &MixedModeSelection::Nothing);
        assert_eq!(layout(&p), names(&[&["LA;", "LDead;", "LB;"]]));
    }

    #[test]
    fn canaries_seal_every_secondary_dex() {
        let input = || vec![
            vec![plain("LMain;", 50)],
            (0..5).map(|i| plain(&format!("LC{i};"), 4)).collect(),
            vec![plain("Lsecondary/dex09/Canary;", 0)],
        ];
        let on = PackingPolicy { emit_canaries: true, normal_primary_dex: false, ..policy(10) };

        let first = pack(input(), on, &MixedModeSelection::Nothing);
        let second = pack(input(), on, &MixedModeSelection::Nothing);
        let canaries = |p: &Packing| -> Vec<Option<String>> {
            p.dexen.iter().map(|d| d.canary().map(|c| c.name.clone())).collect()
        };

        assert_eq!(canaries(&first), vec![
            None,
            Some(String::from("Lsecondary/dex01/Canary;")),
            Some(String::from("Lsecondary/dex02/Canary;")),
            Some(String::from("Lsecondary/dex03/Canary;")),
        ]);
        assert_eq!(canaries(&first), canaries(&second));
        assert_eq!(first.stats.canaries, 3);
        assert!(first.dexen.iter().all(|d| d.cost() <= 10 || d.kind() == DexKind::Primary));
    }

    #[test]
    fn label_statistics_need_uniform_dexes() {
        let input = vec![
            cls("LC1;", 5, PriorityLabel::Coldstart),
            cls("LC2;", 5, PriorityLabel::Coldstart),
            cls("LC3;", 5, PriorityLabel::Coldstart),
            cls("LS1;", 5, PriorityLabel::Scroll),
            cls("LS2;", 5, PriorityLabel::Scroll),
            cls("LS3;", 5, PriorityLabel::Scroll),
            plain("LX;", 5),
        ];
        let p = pack(vec![input], policy(10), &MixedModeSelection::Nothing);

        // [C1 C2] [C3 S1] [S2 S3] [X]
        assert_eq!(p.stats.coldstart_dexes, 1);
        assert_eq!(p.stats.scroll_dexes, 1);
        assert_eq!(p.dexen[0].statuses(), &[DexStatus::FirstColdstartDex]);
        assert_eq!(p.dexen[1].statuses(), &[DexStatus::ScrollDex]);
    }

    #[test]
    fn dex_statuses_mark_whole_dexes() {
        let input = vec![
            cls("LC;", 5, PriorityLabel::Coldstart),
            cls("LE;", 6, PriorityLabel::ColdstartExtended),
            cls("LS;", 6, PriorityLabel::Scroll),
        ];
        let sel = MixedModeSelection::DexStatuses(HashSet::from([DexStatus::FirstExtendedDex]));
        let p = pack(vec![input], policy(10), &sel);

        assert_eq!(p.dexen.iter().map(Dex::is_mixed_mode).collect::<Vec<_>>(), vec![false, true, false]);
        assert!(p.dexen.iter().all(|d| d.kind() == DexKind::Ordinary));
    }

    struct Sidekick;

    impl PackingPlugin for Sidekick {
        fn name(&self) -> &str {
            "sidekick"
        }

        fn configure(&mut self, _: &ClassScope, _: &PassConfig) -> Result<(), PluginError> {
            Ok(())
        }

        fn on_place(&mut self, cls: &DexClass, _: &Dex) -> PlacementHint {
            match cls.name.as_str() {
                "LA;"   => PlacementHint::companions(vec![plain("LA$Gen;", 5), plain("LLater;", 1)]),
                "LB;"   => PlacementHint::fresh_dex(),
                _       => PlacementHint::default(),
            }
        }

        fn leftover_classes(&mut self) -> ClassSet {
            vec![plain("LTail;", 1)]
        }

        fn cleanup(&mut self, _: &ClassScope) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[test]
    fn plugins_inject_companions_under_capacity() {
        let mut registry = PluginRegistry::new();
        registry.register("sidekick", || -> Box<dyn PackingPlugin> { Box::new(Sidekick) });
        let mut host = PluginHost::new(registry.create_plugins());
        let sel = MixedModeSelection::Nothing;

        let input = vec![plain("LX;", 4), plain("LA;", 3), plain("LLater;", 1), plain("LB;", 1), plain("LY;", 1)];
        let p = DexAssignmentEngine::new(policy(10), &sel, &mut host, &DeclaredCost).run(vec![input]);

        // A plus companions (9 units) does not fit next to X.
        assert_eq!(layout(&p), names(&[
            &["LX;"],
            &["LA;", "LA$Gen;", "LLater;"],
            &["LB;", "LY;", "LTail;"],
        ]));
        assert_eq!(p.stats.injected_classes, 2);
    }

    struct Entourage;

    impl PackingPlugin for Entourage {
        fn name(&self) -> &str {
            "entourage"
        }

        fn configure(&mut self, _: &ClassScope, _: &PassConfig) -> Result<(), PluginError> {
            Ok(())
        }

        fn on_place(&mut self, cls: &DexClass, _: &Dex) -> PlacementHint {
            if cls.name == "LA;" {
                PlacementHint::companions(vec![plain("LA$1;", 6), plain("LA$2;", 6)])
            } else {
                PlacementHint::default()
            }
        }

        fn cleanup(&mut self, _: &ClassScope) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[test]
    fn oversized_groups_are_split_not_overfilled() {
        let plugins: Vec<Box<dyn PackingPlugin>> = vec![Box::new(Entourage)];
        let mut host = PluginHost::new(plugins);
        let sel = MixedModeSelection::Nothing;
        let input = vec![plain("LA;", 2), plain("LB;", 1)];
        let p = DexAssignmentEngine::new(policy(10), &sel, &mut host, &DeclaredCost).run(vec![input]);

        assert_eq!(layout(&p), names(&[&["LA;", "LA$1;"], &["LA$2;", "LB;"]]));
        assert!(p.dexen.iter().all(|d| d.cost() <= 10 && !d.is_over_budget()));
        assert_eq!(p.stats.injected_classes, 2);
    }

    #[test]
    fn stale_canaries_leave_the_fixed_primary() {
        let on = PackingPolicy { emit_canaries: true, normal_primary_dex: false, ..policy(10) };
        let p = pack(
            vec![vec![plain("LMain;", 1), plain("Lsecondary/dex01/Canary;", 0)], vec![plain("LA;", 1)]],
            on,
            &MixedModeSelection::Nothing,
        );

        assert_eq!(layout(&p), names(&[&["LMain;"], &["LA;", "Lsecondary/dex01/Canary;"]]));
        assert!(p.dexen[0].canary().is_none());
    }

    #[test]
    fn empty_fixed_primary_shifts_ordinals_down() {
        let on = PackingPolicy { emit_canaries: true, normal_primary_dex: false, ..policy(10) };
        let p = pack(vec![vec![], vec![plain("LA;", 1)]], on, &MixedModeSelection::Nothing);

        assert_eq!(layout(&p), names(&[&["LA;", "Lsecondary/dex00/Canary;"]]));
        assert_eq!(p.dexen[0].kind(), DexKind::Ordinary);
        assert_eq!(p.dexen[0].ordinal(), 0);
    }
}
