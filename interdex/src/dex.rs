use crate::helpe::*;

/// Why a [Dex] was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexKind {
    /// The input primary dex, emitted as-is.
    Primary,
    Ordinary,
    /// Dedicated to mixed-mode classes.
    MixedMode,
}

impl DexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DexKind::Primary    => "primary",
            DexKind::Ordinary   => "ordinary",
            DexKind::MixedMode  => "mixed-mode",
        }
    }
}

/// Positional tags a closed [Dex] can earn. A configured subset of
/// them marks whole dexes as mixed-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DexStatus {
    /// First dex holding a coldstart class.
    FirstColdstartDex,
    /// First dex holding a coldstart-extended class.
    FirstExtendedDex,
    /// Any dex holding a scroll class.
    ScrollDex,
}

impl DexStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DexStatus::FirstColdstartDex    => "first_coldstart_dex",
            DexStatus::FirstExtendedDex     => "first_extended_dex",
            DexStatus::ScrollDex            => "scroll_dex",
        }
    }
}

impl FromStr for DexStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_coldstart_dex"   => Ok(DexStatus::FirstColdstartDex),
            "first_extended_dex"    => Ok(DexStatus::FirstExtendedDex),
            "scroll_dex"            => Ok(DexStatus::ScrollDex),
            other                   => Err(ConfigError::UnknownDexStatus(other.to_string())),
        }
    }
}

impl Dex {
    /// Opens an empty [Dex] at position `ordinal` of the output.
    #[inline(always)]
    pub fn new(ordinal: usize, kind: DexKind) -> Self {
        Self {
            classes:        vec![],
            cost:           0,
            ordinal,
            kind,
            statuses:       vec![],
            mixed_mode:     false,
            over_budget:    false,
        }
    }

    /// Appends `cls`, charging `cost` against the dex. Canaries are
    /// appended for free whatever `cost` says.
    #[inline(always)]
    pub fn push(&mut self, cls: Arc<DexClass>, cost: Cost) {
        if !cls.is_canary() {
            self.cost += cost;
        }
        self.classes.push(cls);
    }

    /// Returns `true` if `extra` more units fit under `limit`.
    #[inline(always)]
    pub fn fits(&self, extra: Cost, limit: Cost) -> bool {
        self.cost.saturating_add(extra) <= limit
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    /// Accumulated cost, canary excluded.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn kind(&self) -> DexKind {
        self.kind
    }

    pub fn statuses(&self) -> &[DexStatus] {
        &self.statuses
    }

    pub fn is_mixed_mode(&self) -> bool {
        self.mixed_mode
    }

    pub fn is_over_budget(&self) -> bool {
        self.over_budget
    }

    /// Iterates over real classes, i.e. skipping the canary.
    pub fn real_classes(&self) -> impl Iterator<Item = &Arc<DexClass>> {
        self.classes.iter().filter(|c| !c.is_canary())
    }

    /// Returns `true` if no real class has been committed yet.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.real_classes().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.real_classes().count()
    }

    pub fn canary(&self) -> Option<&Arc<DexClass>> {
        self.classes.last().filter(|c| c.is_canary())
    }

    pub fn has_label(&self, label: PriorityLabel) -> bool {
        self.real_classes().any(|c| c.label == label)
    }

    /// Returns `true` if the dex is non-empty and every real class in it
    /// carries `label`.
    pub fn all_labeled(&self, label: PriorityLabel) -> bool {
        !self.is_empty() && self.real_classes().all(|c| c.label == label)
    }

    pub(crate) fn set_kind(&mut self, kind: DexKind) {
        debug_assert!(self.is_empty(), "Kind of a non-empty dex changed!");
        self.kind = kind;
    }

    pub(crate) fn add_status(&mut self, status: DexStatus) {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
    }

    pub(crate) fn mark_mixed_mode(&mut self) {
        self.mixed_mode = true;
    }

    pub(crate) fn mark_over_budget(&mut self) {
        self.over_budget = true;
    }
}
