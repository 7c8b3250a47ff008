pub use std::{
    sync::Arc,
    io::{BufRead, BufReader},
    collections::{HashMap, HashSet, BTreeMap},
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use indexmap::{IndexMap, IndexSet};
pub use clap::Parser;
pub use tracing::{debug, info, trace, warn};

pub use crate::{Dex, DexClass,
    class::PriorityLabel,
    dex::{DexKind, DexStatus},
    scope::*,
    cost::*,
    stats::*,
    error::*,
    config::PassConfig,
};

/// The unit in which linear-allocation footprints and dex budgets
/// are measured. `interdex` does not care what a unit stands for,
/// as long as the per-class costs and the limit agree.
pub type Cost = u64;

/// An ordered group of classes. The order is meaningful everywhere:
/// within a dex it is the emission order, within a store it is the
/// priority order handed down by upstream ranking.
pub type ClassSet = Vec<Arc<DexClass>>;

/// Defines the interface for reading a [Store] of classes.
///
/// For example: we ship a type that implements [StoreGen] and reads
/// a plain CSV dump of a build's dexes. Build-system integrations are
/// expected to write their own.
pub trait StoreGen<T> {
    fn new(path: PathBuf) -> Self;
    /// Either a whole store is successfully returned, or the first
    /// problem met while reading it.
    fn read_store(&self) -> Result<Store, InputError>;
    /// Uses one record of input to spawn a [DexClass], along with the
    /// index of the input dex it belongs to.
    fn gen_single(&self, d: T, line: usize) -> Result<(usize, DexClass), InputError>;
}

//---START EXTERNAL INTERFACES
/// Reads a CSV laid out as
///
/// `dex,name,cost,label[,mixed_mode[,referenced]]`
///
/// with a header line. `dex` is the zero-based index of the input dex
/// the class currently lives in (dex 0 is the primary dex). Rows may
/// come in any dex order but rows of the same dex keep their relative
/// order. `mixed_mode` defaults to false, `referenced` to true.
pub struct ClassCSVParser {
    pub path: PathBuf,
}

impl<'a> StoreGen<&'a str> for ClassCSVParser {
    fn new(path: PathBuf) -> Self {
        Self {
            path
        }
    }

    fn read_store(&self) -> Result<Store, InputError> {
        let fd = std::fs::File::open(&self.path)
            .map_err(|source| InputError::Io { path: self.path.clone(), source })?;
        let reader = BufReader::new(fd);
        let mut dexen: Vec<ClassSet> = vec![];

        // First line is the header!
        for (idx, line) in reader.lines().enumerate().skip(1) {
            let line = line.map_err(|source| InputError::Io { path: self.path.clone(), source })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') { continue; }
            let (dex_idx, cls) = self.gen_single(trimmed, idx + 1)?;
            if dexen.len() <= dex_idx {
                dexen.resize_with(dex_idx + 1, Vec::new);
            }
            dexen[dex_idx].push(Arc::new(cls));
        }

        let name = self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("classes"));

        Ok(Store::root(name, dexen))
    }

    fn gen_single(&self, d: &'a str, line: usize) -> Result<(usize, DexClass), InputError> {
        let fields: Vec<&str> = d.split(',').map(str::trim).collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(InputError::Malformed {
                line,
                message: format!("expected 4 to 6 columns, found {}", fields.len()),
            });
        }
        let dex_idx = fields[0].parse::<usize>()
            .map_err(|e| InputError::Malformed { line, message: format!("bad dex index: {e}") })?;
        if fields[1].is_empty() {
            return Err(InputError::Malformed { line, message: String::from("empty class name") });
        }
        let cost = fields[2].parse::<Cost>()
            .map_err(|e| InputError::Malformed { line, message: format!("bad cost: {e}") })?;
        let label = fields[3].parse::<PriorityLabel>()
            .map_err(|message| InputError::Malformed { line, message })?;
        let mixed_mode = match fields.get(4) {
            Some(v) => parse_flag(v).ok_or_else(|| InputError::Malformed {
                line,
                message: format!("bad mixed_mode flag `{v}`"),
            })?,
            None    => false,
        };
        let referenced = match fields.get(5) {
            Some(v) => parse_flag(v).ok_or_else(|| InputError::Malformed {
                line,
                message: format!("bad referenced flag `{v}`"),
            })?,
            None    => true,
        };

        Ok((
            dex_idx,
            DexClass::new(fields[1], cost)
                .with_label(label)
                .with_mixed_mode(mixed_mode)
                .with_referenced(referenced),
        ))
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v {
        "1" | "true" | "yes"    => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _                       => None,
    }
}
//---END EXTERNAL INTERFACES

pub fn read_from_path<T, B>(file_path: PathBuf) -> Result<Store, InputError>
where T: StoreGen<B> {
    let parser = T::new(file_path);
    let store = parser.read_store()?;
    debug!(store = %store.name, dexes = store.dexen.len(), "store read");

    Ok(store)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use pretty_assertions::assert_eq;
    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn csv_rows_land_in_their_dexes() {
        let f = write_csv(
            "dex,name,cost,label,mixed_mode,referenced\n\
             0,LMain;,10,none\n\
             1,LA;,3,coldstart,0,1\n\
             # comment\n\
             1,LB;,4,scroll,1\n\
             2,LC;,5,extended,false,false\n",
        );
        let store = read_from_path::<ClassCSVParser, &str>(f.path().to_path_buf()).unwrap();

        assert!(store.root);
        assert_eq!(store.dexen.len(), 3);
        assert_eq!(store.dexen[1].iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["LA;", "LB;"]);
        assert_eq!(store.dexen[1][1].label, PriorityLabel::Scroll);
        assert!(store.dexen[1][1].mixed_mode);
        assert!(!store.dexen[2][0].referenced);
        assert_eq!(store.dexen[2][0].cost, 5);
    }

    #[test]
    fn malformed_row_reports_its_line() {
        let f = write_csv("dex,name,cost,label\n0,LA;,3,none\n0,LB;,lots,none\n");
        let err = read_from_path::<ClassCSVParser, &str>(f.path().to_path_buf()).unwrap_err();

        match err {
            InputError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_from_path::<ClassCSVParser, &str>(PathBuf::from("/nonexistent/classes.csv")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
