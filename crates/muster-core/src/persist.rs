//! Persisted unit-state records.
//!
//! The engine does no I/O of its own; the application layer hands records
//! to and from whatever store it uses. The record format is tolerant on
//! the way in: legacy scalar fields widen to `[value, 0]` pairs, malformed
//! fields degrade to their defaults one at a time, and unknown critical
//! keys are dropped silently. The one fatal condition is a template name
//! that cannot be resolved: that means the upstream catalog lost data,
//! and the unit cannot be reconstructed.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::ledger::crits::{CritKey, CritLedger, CritRecord};
use crate::ledger::damage::DamageLedger;
use crate::ledger::Tracked;
use crate::template::UnitTemplate;
use crate::unit::AlphaStrikeState;

/// Resolves unit templates by catalog name.
///
/// Catalog loading lives outside this crate; restores only need lookup.
pub trait TemplateSource {
    /// Returns the template registered under `name`.
    fn template(&self, name: &str) -> Option<UnitTemplate>;
}

impl TemplateSource for BTreeMap<String, UnitTemplate> {
    fn template(&self, name: &str) -> Option<UnitTemplate> {
        self.get(name).cloned()
    }
}

/// Errors restoring a persisted record.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The record names a template the catalog no longer has. This is
    /// unrecoverable: it indicates upstream data-integrity loss.
    #[error("unknown unit template: {0:?}")]
    UnknownTemplate(String),
}

/// Deserializes a field, degrading to the default on malformed input
/// instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// One persisted critical-hit record. The key stays a raw string here;
/// unknown keys are skipped at restore time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCrit {
    /// Wire form of the critical key.
    pub key: String,
    /// Signed sequence number.
    pub seq: i64,
}

/// Persisted Alpha Strike unit state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedUnit {
    /// Template catalog name. Resolution failure is fatal.
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Whether the committed state deviates from pristine.
    #[serde(default, deserialize_with = "lenient")]
    pub modified: bool,
    /// Destroyed flag cached at the last commit.
    #[serde(default, deserialize_with = "lenient")]
    pub destroyed: bool,
    /// Shutdown flag.
    #[serde(default, deserialize_with = "lenient")]
    pub shutdown: bool,
    /// Heat as `[committed, pendingDelta]`.
    #[serde(default, deserialize_with = "lenient")]
    pub heat: Tracked,
    /// Armor damage as `[committed, pendingDelta]`.
    #[serde(default, deserialize_with = "lenient")]
    pub armor: Tracked,
    /// Structure damage as `[committed, pendingDelta]`.
    #[serde(default, deserialize_with = "lenient")]
    pub internal: Tracked,
    /// Committed critical-hit records.
    #[serde(default, deserialize_with = "lenient")]
    pub crits: Vec<SavedCrit>,
    /// Pending critical-hit records.
    #[serde(rename = "pCrits", default, deserialize_with = "lenient")]
    pub p_crits: Vec<SavedCrit>,
    /// Limited-use ability counters, when any exist.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub consumed: Option<BTreeMap<String, Tracked>>,
    /// `[committed, pendingExhaust, pendingRestore]` ability sets, when
    /// any are non-empty.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<(BTreeSet<String>, BTreeSet<String>, BTreeSet<String>)>,
}

fn to_saved(records: &[CritRecord]) -> Vec<SavedCrit> {
    records
        .iter()
        .map(|record| SavedCrit {
            key: record.key.to_string(),
            seq: record.seq,
        })
        .collect()
}

fn from_saved(records: &[SavedCrit]) -> Vec<CritRecord> {
    records
        .iter()
        .filter_map(|saved| {
            CritKey::from_wire(&saved.key).map(|key| CritRecord { key, seq: saved.seq })
        })
        .collect()
}

impl SavedUnit {
    /// Captures a unit's full state into a persistable record.
    #[must_use]
    pub fn capture(state: &AlphaStrikeState) -> Self {
        let damage = state.damage_ledger();
        let crits = state.crit_ledger();
        let consumed = damage.consumed_counters();
        let (exhausted, pending_exhaust, pending_restore) = damage.exhausted_sets();

        Self {
            name: state.template().name.clone(),
            modified: state.is_modified(),
            destroyed: state.is_destroyed(),
            shutdown: state.is_shutdown(),
            heat: damage.heat(),
            armor: damage.armor(),
            internal: damage.structure(),
            crits: to_saved(crits.committed_ordered()),
            p_crits: to_saved(crits.pending_records()),
            consumed: (!consumed.is_empty()).then(|| consumed.clone()),
            exhausted: (!exhausted.is_empty()
                || !pending_exhaust.is_empty()
                || !pending_restore.is_empty())
            .then(|| {
                (
                    exhausted.clone(),
                    pending_exhaust.clone(),
                    pending_restore.clone(),
                )
            }),
        }
    }

    /// Rebuilds unit state against a template catalog.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownTemplate`] when the record's template
    /// name cannot be resolved.
    pub fn restore(&self, source: &impl TemplateSource) -> Result<AlphaStrikeState, LoadError> {
        let template = source
            .template(&self.name)
            .ok_or_else(|| LoadError::UnknownTemplate(self.name.clone()))?;

        let mut damage = DamageLedger::new(template.max_armor, template.max_structure);
        damage.load_counters(self.armor, self.internal, self.heat);
        let (exhausted, pending_exhaust, pending_restore) =
            self.exhausted.clone().unwrap_or_default();
        damage.load_abilities(
            self.consumed.clone().unwrap_or_default(),
            exhausted,
            pending_exhaust,
            pending_restore,
        );

        let crits = CritLedger::restore(from_saved(&self.crits), from_saved(&self.p_crits));

        Ok(AlphaStrikeState::restore_parts(
            template,
            damage,
            crits,
            self.shutdown,
            self.destroyed,
        ))
    }
}
