use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::ir::MethodIdentity;

/// Correlation entry for one method: facts from the source-level extractor
/// and from the dynamic-analysis tool, either of which may be absent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodEntry<D, Y> {
    pub declared: Option<D>,
    pub dynamic: Option<Y>,
}

impl<D, Y> Default for MethodEntry<D, Y> {
    fn default() -> Self {
        Self {
            declared: None,
            dynamic: None,
        }
    }
}

/// Failure distinct from "not found": the queried state violates a
/// construction invariant of the index.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum IndexError {
    /// The identity has a correlation entry but was never indexed for
    /// usages. Only entries first observed through `update` can be in this
    /// state; construction always indexes declared identities.
    #[error("usages were never indexed for {identity}")]
    UsagesNotIndexed { identity: MethodIdentity },
}

/// A method's own entry together with the entries of its callers.
#[derive(Debug)]
pub struct Association<'a, D, Y> {
    pub entry: &'a MethodEntry<D, Y>,
    /// Caller identity to its entry. `None` marks an uncatalogued caller,
    /// observed only in compiled form; it is kept rather than dropped.
    pub callers: BTreeMap<&'a MethodIdentity, Option<&'a MethodEntry<D, Y>>>,
}

/// Read-mostly index correlating declared methods, compiled call edges, and
/// dynamic-analysis facts.
///
/// Declared facts and the usage index are fixed at construction; dynamic
/// facts may be merged in afterwards with [`MethodIndex::update`]. Nothing
/// is ever deleted.
#[derive(Clone, Debug)]
pub struct MethodIndex<D, Y> {
    methods: BTreeMap<MethodIdentity, MethodEntry<D, Y>>,
    usages: BTreeMap<MethodIdentity, BTreeSet<MethodIdentity>>,
}

impl<D, Y> Default for MethodIndex<D, Y> {
    fn default() -> Self {
        Self {
            methods: BTreeMap::new(),
            usages: BTreeMap::new(),
        }
    }
}

impl<D, Y> MethodIndex<D, Y> {
    /// Build an index from source-level declarations alone. Every declared
    /// identity gets an empty usage set.
    pub fn from_declarations(declared: impl IntoIterator<Item = (MethodIdentity, D)>) -> Self {
        Self::build(declared, std::iter::empty())
    }

    /// Build an index from declarations plus compiled-level call edges.
    ///
    /// The usage index is keyed by every identity ever seen as a callee,
    /// declared or not; a callee can be library code never declared in the
    /// analyzed sources.
    pub fn with_call_edges(
        declared: impl IntoIterator<Item = (MethodIdentity, D)>,
        edges: impl IntoIterator<Item = (MethodIdentity, MethodIdentity)>,
    ) -> Self {
        Self::build(declared, edges)
    }

    fn build(
        declared: impl IntoIterator<Item = (MethodIdentity, D)>,
        edges: impl IntoIterator<Item = (MethodIdentity, MethodIdentity)>,
    ) -> Self {
        let mut methods = BTreeMap::new();
        let mut usages: BTreeMap<MethodIdentity, BTreeSet<MethodIdentity>> = BTreeMap::new();
        for (identity, facts) in declared {
            usages.entry(identity.clone()).or_default();
            methods.insert(
                identity,
                MethodEntry {
                    declared: Some(facts),
                    dynamic: None,
                },
            );
        }
        for (caller, callee) in edges {
            usages.entry(callee).or_default().insert(caller);
        }
        tracing::debug!(
            methods = methods.len(),
            usage_keys = usages.len(),
            "built method index"
        );
        Self { methods, usages }
    }

    /// Entry for an identity, if any source ever observed it.
    pub fn lookup(&self, identity: &MethodIdentity) -> Option<&MethodEntry<D, Y>> {
        self.methods.get(identity)
    }

    /// All correlation entries, keyed by identity. Distinct identities with
    /// equal entries stay distinct.
    pub fn entries(&self) -> impl Iterator<Item = (&MethodIdentity, &MethodEntry<D, Y>)> {
        self.methods.iter()
    }

    /// Identities whose compiled form contains a call targeting `identity`.
    pub fn usages(&self, identity: &MethodIdentity) -> Option<&BTreeSet<MethodIdentity>> {
        self.usages.get(identity)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Resolve an identity's entry together with the entries of its callers.
    ///
    /// `Ok(None)` means the identity was never observed, a non-error
    /// outcome. `Err(UsagesNotIndexed)` means the entry exists but was never
    /// populated by construction, which only happens for entries created by
    /// [`MethodIndex::update`].
    pub fn associate(
        &self,
        identity: &MethodIdentity,
    ) -> Result<Option<Association<'_, D, Y>>, IndexError> {
        let Some(entry) = self.methods.get(identity) else {
            return Ok(None);
        };
        let usages =
            self.usages
                .get(identity)
                .ok_or_else(|| IndexError::UsagesNotIndexed {
                    identity: identity.clone(),
                })?;
        let callers = usages
            .iter()
            .map(|caller| (caller, self.methods.get(caller)))
            .collect();
        Ok(Some(Association { entry, callers }))
    }

    /// Attach or replace dynamic-analysis facts.
    ///
    /// May be invoked repeatedly as batches arrive; the last write per
    /// identity wins and declared facts are never disturbed. Identities
    /// without an entry get one with declared facts absent.
    pub fn update(&mut self, facts: impl IntoIterator<Item = (MethodIdentity, Y)>) {
        for (identity, dynamic) in facts {
            self.methods.entry(identity).or_default().dynamic = Some(dynamic);
        }
    }
}
