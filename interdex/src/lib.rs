//! Welcome to `interdex`!
//!
//! `interdex` re-partitions the classes of an already-compiled
//! application into an ordered sequence of capacity-bounded dexes, so
//! that whatever the application needs during startup is packed early
//! and contiguously. The heavy lifting lives in [`algo`]; the entry
//! point is [`algo::InterDexPass`].

mod class;
mod dex;
mod scope;
mod cost;
mod stats;

pub mod algo;
pub mod config;
pub mod error;
pub mod mixed;
pub mod plugin;
pub mod helpe;

pub use crate::helpe::*;

/// Our fundamental unit of interest. A [`DexClass`] is everything the
/// packer needs to know about a compiled class:
///
/// 1. its fully-qualified [`name`](DexClass::name), unique across the
///    whole input,
/// 2. the linear-allocation [`cost`](DexClass::cost) it adds to whichever
///    dex ends up holding it,
/// 3. the [`label`](DexClass::label) upstream ranking gave it,
/// 4. the [`mixed_mode`](DexClass::mixed_mode) flag set by earlier passes,
/// 5. whether the retained class graph still
///    [`referenced`](DexClass::referenced) it.
///
/// > ***ATTENTION:*** `interdex` never computes labels or flags. It
/// > only decides *where* already-labeled classes go.
///
/// Classes are shared as `Arc<DexClass>` and never duplicated: moving a
/// class between dexes moves the pointer.
#[derive(Debug, Clone)]
pub struct DexClass {
    pub name:       String,
    pub cost:       Cost,
    pub label:      PriorityLabel,
    pub mixed_mode: bool,
    pub referenced: bool,
    // Only the canary emitter spawns these. Input classes whose names
    // look like canaries are flagged too, so that stale markers from an
    // earlier run can be recognized and replaced.
    canary:         bool,
}

/// A container under construction, and once closed, a frozen one.
///
/// The packer keeps exactly one [`Dex`] open at a time. Classes are
/// appended to it until capacity, a mixed-mode boundary or a plugin
/// says otherwise; then it is closed and a fresh one is opened.
#[derive(Debug, Clone)]
pub struct Dex {
    classes:        ClassSet,
    // Canaries are not accounted for.
    cost:           Cost,
    ordinal:        usize,
    kind:           DexKind,
    statuses:       Vec<DexStatus>,
    mixed_mode:     bool,
    over_budget:    bool,
}
