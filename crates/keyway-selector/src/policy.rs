//! Auto-selection policy applied after every successful fetch.

use keyway_types::Credential;
use serde::Serialize;

/// Which rule decided the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// The current selection is still present in the list.
    Kept,
    /// Exactly one credential is flagged default.
    SoleDefault,
    /// The list holds a single credential.
    OnlyCredential,
    /// No rule applied; the selection is empty.
    Cleared,
}

/// Outcome of [`auto_select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSelection {
    pub selected: Option<String>,
    pub reason: SelectionReason,
}

/// Pick the selection for a freshly fetched credential list.
///
/// The result is always `None` or the id of an entry in `credentials`.
pub fn auto_select(current: Option<&str>, credentials: &[Credential]) -> AutoSelection {
    if let Some(current) = current.filter(|c| !c.is_empty())
        && credentials.iter().any(|c| c.id == current)
    {
        return AutoSelection {
            selected: Some(current.to_string()),
            reason: SelectionReason::Kept,
        };
    }

    let mut defaults = credentials.iter().filter(|c| c.is_default);
    if let (Some(default), None) = (defaults.next(), defaults.next()) {
        return AutoSelection {
            selected: Some(default.id.clone()),
            reason: SelectionReason::SoleDefault,
        };
    }

    if let [only] = credentials {
        return AutoSelection {
            selected: Some(only.id.clone()),
            reason: SelectionReason::OnlyCredential,
        };
    }

    AutoSelection {
        selected: None,
        reason: SelectionReason::Cleared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred(id: &str, is_default: bool) -> Credential {
        Credential::new(id, format!("{id}@example.com"), "google-sheets").with_default(is_default)
    }

    #[test]
    fn test_sole_default_wins() {
        let creds = [cred("a", false), cred("b", true)];
        let pick = auto_select(None, &creds);
        assert_eq!(pick.selected.as_deref(), Some("b"));
        assert_eq!(pick.reason, SelectionReason::SoleDefault);
    }

    #[test]
    fn test_current_is_kept_over_default() {
        let creds = [cred("a", false), cred("b", true)];
        let pick = auto_select(Some("a"), &creds);
        assert_eq!(pick.selected.as_deref(), Some("a"));
        assert_eq!(pick.reason, SelectionReason::Kept);
    }

    #[test]
    fn test_vanished_current_falls_through() {
        let pick = auto_select(Some("gone"), &[cred("x", false)]);
        assert_eq!(pick.selected.as_deref(), Some("x"));
        assert_eq!(pick.reason, SelectionReason::OnlyCredential);
    }

    #[test]
    fn test_multiple_defaults_are_ambiguous() {
        let creds = [cred("a", true), cred("b", true)];
        let pick = auto_select(None, &creds);
        assert_eq!(pick.selected, None);
        assert_eq!(pick.reason, SelectionReason::Cleared);
    }

    #[test]
    fn test_empty_list_clears() {
        let pick = auto_select(Some("a"), &[]);
        assert_eq!(pick.selected, None);
        assert_eq!(pick.reason, SelectionReason::Cleared);
    }

    #[test]
    fn test_empty_current_is_not_a_selection() {
        let creds = [cred("", false), cred("b", false)];
        let pick = auto_select(Some(""), &creds);
        assert_eq!(pick.selected, None);
    }

    #[test]
    fn test_single_default_credential() {
        let pick = auto_select(None, &[cred("only", true)]);
        assert_eq!(pick.selected.as_deref(), Some("only"));
        assert_eq!(pick.reason, SelectionReason::SoleDefault);
    }

    #[test]
    fn test_result_is_always_a_listed_id() {
        let lists: Vec<Vec<Credential>> = vec![
            vec![],
            vec![cred("a", false)],
            vec![cred("a", true)],
            vec![cred("a", false), cred("b", false)],
            vec![cred("a", true), cred("b", false), cred("c", false)],
            vec![cred("a", true), cred("b", true), cred("c", false)],
        ];
        let currents = [None, Some(""), Some("a"), Some("c"), Some("zzz")];

        for list in &lists {
            for current in currents {
                let pick = auto_select(current, list);
                if let Some(id) = &pick.selected {
                    assert!(list.iter().any(|c| &c.id == id), "{id} not in list");
                }
                // Applying the policy to its own output is stable.
                let again = auto_select(pick.selected.as_deref(), list);
                assert_eq!(again.selected, pick.selected);
            }
        }
    }
}
