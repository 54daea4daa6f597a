//! Tree builder.
//!
//! Resolves parent links between step records with a depth stack: every
//! record closes the open steps at its own depth or deeper, hangs under the
//! deepest step still open, then becomes open itself.
//!
//! The whole build is a fold over the records. The accumulator holds the
//! stack, the node map and the conflicts seen so far; nothing outlives a call
//! to [`build`].

use indexmap::IndexMap;
use serde::Serialize;

use super::{KeyError, KeyResult, KeyStore, Node, StepId, StepRecord};

/// A step id that appeared more than once. The first occurrence is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub id: StepId,
    pub kept: String,
    pub discarded: String,
}

/// A `goto` pointing at a step that never appears in the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    pub from: StepId,
    pub target: StepId,
}

/// Problems found while building. None of them stop the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub conflicts: Vec<Conflict>,
    pub dangling: Vec<DanglingRef>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.dangling.is_empty()
    }

    /// Fail with [`KeyError::Rejected`] unless the report is clean.
    pub fn ensure_clean(&self) -> KeyResult<()> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(KeyError::Rejected { conflicts: self.conflicts.len(), dangling: self.dangling.len() })
        }
    }
}

/// Result of a build: the resolved key and what went wrong along the way.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub store: KeyStore,
    pub report: BuildReport,
}

impl BuildOutput {
    /// Keep the store only if the report is clean.
    pub fn into_strict(self) -> KeyResult<KeyStore> {
        self.report.ensure_clean()?;
        Ok(self.store)
    }
}

#[derive(Debug, Default)]
struct Fold {
    /// Open steps, shallowest first, with their levels
    stack: Vec<(u32, StepId)>,
    nodes: IndexMap<StepId, Node>,
    conflicts: Vec<Conflict>,
}

impl Fold {
    fn step(mut self, record: StepRecord) -> Self {
        if let Some(existing) = self.nodes.get(&record.id) {
            tracing::warn!(id = %record.id, kept = %existing.text, discarded = %record.text, "Duplicate step id");
            self.conflicts.push(Conflict {
                id: record.id,
                kept: existing.text.clone(),
                discarded: record.text,
            });
            return self;
        }

        let level = record.id.level();
        while self.stack.last().is_some_and(|(open, _)| *open >= level) {
            self.stack.pop();
        }
        let parent = self.stack.last().map(|(_, id)| id.clone());

        tracing::debug!(id = %record.id, level, parent = ?parent.as_ref().map(StepId::as_str), "Resolved step");
        self.stack.push((level, record.id.clone()));
        self.nodes.insert(record.id.clone(), Node::from_record(record, parent));
        self
    }

    fn finish(self) -> BuildOutput {
        let dangling: Vec<_> = self
            .nodes
            .values()
            .filter_map(|node| {
                let target = node.goto.step()?;
                (!self.nodes.contains_key(target))
                    .then(|| DanglingRef { from: node.id.clone(), target: target.clone() })
            })
            .collect();

        for d in &dangling {
            tracing::warn!(from = %d.from, target = %d.target, "Dangling goto reference");
        }

        BuildOutput {
            store: KeyStore::new(self.nodes),
            report: BuildReport { conflicts: self.conflicts, dangling },
        }
    }
}

/// Build a key from step records in document order.
pub fn build<I>(records: I) -> BuildOutput
where
    I: IntoIterator<Item = StepRecord>,
{
    records.into_iter().fold(Fold::default(), Fold::step).finish()
}
