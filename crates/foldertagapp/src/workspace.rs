//! In-memory working state: rules, settings, ledger and history together.

use crate::history::{OperationHistory, HISTORY_LIMIT};
use crate::ledger::ProvenanceLedger;
use crate::model::Settings;
use crate::rules::{FolderAliases, FolderRules};
use crate::store::PersistedState;
use crate::tagger::PathTagger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub settings: Settings,
    pub rules: FolderRules,
    pub aliases: FolderAliases,
    pub ledger: ProvenanceLedger,
    pub history: OperationHistory,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::from_persisted(PersistedState::default(), HISTORY_LIMIT)
    }
}

impl Workspace {
    pub fn from_persisted(state: PersistedState, history_limit: usize) -> Self {
        Self {
            settings: state.settings,
            rules: state.folder_rules,
            aliases: state.folder_aliases,
            ledger: state.tag_tracking,
            history: OperationHistory::from_entries(state.operation_history, history_limit),
        }
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            settings: self.settings.clone(),
            tag_tracking: self.ledger.clone(),
            operation_history: self.history.to_vec(),
            folder_rules: self.rules.clone(),
            folder_aliases: self.aliases.clone(),
        }
    }

    pub fn tagger(&self) -> PathTagger<'_> {
        PathTagger::new(
            &self.rules,
            &self.aliases,
            &self.settings.ignore_paths,
            self.settings.inherit_depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FolderRule, OperationKind};

    #[test]
    fn test_persisted_round_trip() {
        let mut ws = Workspace::default();
        ws.rules
            .insert("Work".to_string(), FolderRule::new(["work"]));
        ws.history.record(OperationKind::Apply, "apply", Vec::new());

        let restored = Workspace::from_persisted(ws.to_persisted(), HISTORY_LIMIT);
        assert_eq!(restored, ws);
        assert_eq!(restored.tagger().resolve("Work/x.md"), vec!["work"]);
    }
}
