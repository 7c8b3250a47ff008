use crate::helpe::*;

pub const CANARY_PREFIX: &str = "Lsecondary/dex";
pub const CANARY_SUFFIX: &str = "/Canary;";

/// Name of the canary marking the dex at `ordinal`. At least two
/// digits, so names sort the way dexes do up to dex 99.
#[inline(always)]
pub fn canary_name(ordinal: usize) -> String {
    format!("{CANARY_PREFIX}{ordinal:02}{CANARY_SUFFIX}")
}

/// Returns `true` if `name` is shaped like something [canary_name]
/// could have produced.
pub fn is_canary_name(name: &str) -> bool {
    name.strip_prefix(CANARY_PREFIX)
        .and_then(|rest| rest.strip_suffix(CANARY_SUFFIX))
        .is_some_and(|digits| digits.len() >= 2 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Seals closed dexes with a marker class that tells the runtime which
/// dex it is looking at.
#[derive(Debug, Clone)]
pub struct CanaryEmitter {
    enabled:    bool,
    emitted:    usize,
}

impl CanaryEmitter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            emitted: 0,
        }
    }

    /// Appends the canary for `dex` as its last entry. Returns `false`
    /// if canaries are disabled. The canary's name only depends on the
    /// dex's ordinal, so identical runs produce identical canaries.
    pub fn emit(&mut self, dex: &mut Dex) -> bool {
        if !self.enabled { return false; }
        debug_assert!(dex.canary().is_none(), "Dex sealed twice!");
        let name = canary_name(dex.ordinal());
        trace!(canary = %name, "emitting canary");
        dex.push(Arc::new(DexClass::new_canary(name)), 0);
        self.emitted += 1;

        true
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}
