use crate::helpe::*;

/// An ordered collection of dexes as produced by the compiler. Only
/// root stores are repacked; the others pass through untouched.
#[derive(Debug, Clone)]
pub struct Store {
    pub name:   String,
    pub root:   bool,
    /// Dex 0 is the primary dex.
    pub dexen:  Vec<ClassSet>,
}

impl Store {
    pub fn root(name: impl Into<String>, dexen: Vec<ClassSet>) -> Self {
        Self {
            name:   name.into(),
            root:   true,
            dexen,
        }
    }

    pub fn non_root(name: impl Into<String>, dexen: Vec<ClassSet>) -> Self {
        Self {
            name:   name.into(),
            root:   false,
            dexen,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.dexen.iter().map(Vec::len).sum()
    }
}

/// The "original scope": every class of every root store, in input
/// order, indexed by name. Built once per invocation and read-only
/// afterwards; plugins get to see it at configure and cleanup time.
#[derive(Debug, Clone, Default)]
pub struct ClassScope {
    classes: IndexMap<String, Arc<DexClass>>,
}

impl ClassScope {
    /// Initializes a [ClassScope] from the root stores among `stores`.
    /// A successfully returned scope is guaranteed to be compliant with
    /// `interdex`'s assumptions:
    /// - no class name occurs twice across root stores
    ///
    /// This function is the gatekeeper to the rest of the library.
    pub fn build(stores: &[Store]) -> Result<Self, InputError> {
        let mut classes = IndexMap::new();
        for store in stores.iter().filter(|s| s.root) {
            for cls in store.dexen.iter().flatten() {
                if classes.insert(cls.name.clone(), cls.clone()).is_some() {
                    return Err(InputError::DuplicateClass {
                        name:   cls.name.clone(),
                        store:  store.name.clone(),
                    });
                }
            }
        }

        Ok(Self { classes })
    }

    /// Resolves a fully-qualified class name.
    pub fn get(&self, name: &str) -> Option<&Arc<DexClass>> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DexClass>> {
        self.classes.values()
    }
}
