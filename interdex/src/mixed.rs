//! Works out which classes (or which dexes) are mixed-mode.
//!
//! Exactly one source is authoritative, in order of priority:
//!
//! 1. pre-defined dex statuses (`mixed_mode_dexes`),
//! 2. an explicit class list (`scroll_classes_file`), if it names anything,
//! 3. the per-class `mixed_mode` flags set by earlier passes.

use crate::helpe::*;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MixedModeSelection {
    #[default]
    Nothing,
    /// Classes to be isolated in dedicated dexes, by name.
    Classes(IndexSet<String>),
    /// Whole dexes earning one of these statuses are mixed-mode.
    DexStatuses(HashSet<DexStatus>),
}

impl MixedModeSelection {
    #[inline(always)]
    pub fn is_mixed_mode_class(&self, cls: &DexClass) -> bool {
        match self {
            MixedModeSelection::Classes(names)  => names.contains(&cls.name),
            _                                   => false,
        }
    }

    #[inline(always)]
    pub fn has_status(&self, status: DexStatus) -> bool {
        match self {
            MixedModeSelection::DexStatuses(s)  => s.contains(&status),
            _                                   => false,
        }
    }

    /// Number of classes selected for isolation.
    pub fn num_classes(&self) -> usize {
        match self {
            MixedModeSelection::Classes(names)  => names.len(),
            _                                   => 0,
        }
    }
}

/// Produces the [MixedModeSelection] for one store.
///
/// Fails only on a duplicate name in the explicit list, which aborts
/// the pass before anything is moved. Names that do not resolve against
/// `scope` are logged and skipped.
pub fn select(
    statuses:       &HashSet<DexStatus>,
    classes_file:   Option<&Path>,
    dexen:          &[ClassSet],
    scope:          &ClassScope,
) -> Result<MixedModeSelection, ConfigError> {
    if !statuses.is_empty() {
        debug!(statuses = ?statuses, "will compile pre-defined mixed mode dex(es)");
        return Ok(MixedModeSelection::DexStatuses(statuses.clone()));
    }

    let listed = match classes_file {
        Some(path)  => read_class_list(path),
        None        => vec![],
    };
    let classes = if listed.is_empty() {
        classes_from_flags(dexen)
    } else {
        classes_from_list(listed, scope)?
    };

    if classes.is_empty() {
        Ok(MixedModeSelection::Nothing)
    } else {
        info!(classes = classes.len(), "pre-computed mixed mode classes");
        Ok(MixedModeSelection::Classes(classes))
    }
}

/// Reads whitespace-separated class names. Blank lines and lines
/// starting with `#` are skipped. A missing file reads as an empty list.
pub fn read_class_list(path: &Path) -> Vec<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(v)   => v,
        Err(e)  => {
            warn!(path = %path.display(), error = %e, "mixed mode class file not found");
            return vec![];
        }
    };

    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(String::from)
        .collect()
}

/// Resolves an explicit list against the scope.
pub fn classes_from_list(
    names: Vec<String>,
    scope: &ClassScope,
) -> Result<IndexSet<String>, ConfigError> {
    // Duplicates are fatal whether or not they resolve.
    if let Some(dup) = names.iter().duplicates().next() {
        return Err(ConfigError::DuplicateMixedModeClass(dup.clone()));
    }

    let mut res = IndexSet::new();
    for name in names {
        match scope.get(&name) {
            Some(cls)   => {
                trace!(class = %cls.name, "adding class to the mixed mode list");
                res.insert(name);
            },
            None        => {
                warn!(class = %name, "couldn't find class listed as mixed mode");
            }
        }
    }

    Ok(res)
}

/// Collects the classes whose `mixed_mode` flag is set, in input order.
pub fn classes_from_flags(dexen: &[ClassSet]) -> IndexSet<String> {
    let flagged: Vec<String> = dexen
        .par_iter()
        .flat_map_iter(|dex| {
            dex.iter()
                .filter(|c| c.mixed_mode)
                .map(|c| c.name.clone())
        })
        .collect();
    for name in &flagged {
        trace!(class = %name, "adding flagged class to the mixed mode list");
    }

    flagged.into_iter().collect()
}
