use crate::helpe::*;
use crate::algo::canary::is_canary_name;

/// How early upstream ranking says a class is needed. Consumed, never
/// computed, by `interdex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PriorityLabel {
    #[default]
    None,
    /// Needed during application startup.
    Coldstart,
    /// Needed right after startup.
    ColdstartExtended,
    /// A separate, later set (e.g. needed while scrolling a feed).
    Scroll,
}

impl PriorityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLabel::None                 => "none",
            PriorityLabel::Coldstart            => "coldstart",
            PriorityLabel::ColdstartExtended    => "extended",
            PriorityLabel::Scroll               => "scroll",
        }
    }
}

impl FromStr for PriorityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none"                                 => Ok(PriorityLabel::None),
            "coldstart"                                 => Ok(PriorityLabel::Coldstart),
            "extended" | "coldstart_extended"           => Ok(PriorityLabel::ColdstartExtended),
            "scroll"                                    => Ok(PriorityLabel::Scroll),
            other                                       => Err(format!("unknown priority label `{other}`")),
        }
    }
}

impl std::fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DexClass {
    /// Creates an unlabeled, referenced, non-mixed-mode class.
    pub fn new(name: impl Into<String>, cost: Cost) -> Self {
        let name = name.into();
        let canary = is_canary_name(&name);
        Self {
            name,
            cost,
            label:      PriorityLabel::None,
            mixed_mode: false,
            referenced: true,
            canary,
        }
    }

    /// Spawns a marker class. Carries no content and costs nothing.
    pub(crate) fn new_canary(name: String) -> Self {
        Self {
            name,
            cost:       0,
            label:      PriorityLabel::None,
            mixed_mode: false,
            referenced: true,
            canary:     true,
        }
    }

    pub fn with_label(mut self, label: PriorityLabel) -> Self {
        self.label = label;
        self
    }

    pub fn with_mixed_mode(mut self, mixed_mode: bool) -> Self {
        self.mixed_mode = mixed_mode;
        self
    }

    pub fn with_referenced(mut self, referenced: bool) -> Self {
        self.referenced = referenced;
        self
    }

    #[inline(always)]
    pub fn is_canary(&self) -> bool {
        self.canary
    }

    #[inline(always)]
    pub fn is_coldstart(&self) -> bool {
        self.label == PriorityLabel::Coldstart
    }
}

/*
   Two classes are the same class iff they share a name. This is what
   lets us keep `Arc<DexClass>` in hash sets while packing, and what the
   scope gatekeeper relies on when it rejects duplicates.
*/
impl PartialEq for DexClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DexClass {}

impl std::hash::Hash for DexClass {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
