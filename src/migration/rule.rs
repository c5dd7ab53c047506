//! Migration rules: one legacy key, one deterministic outcome.

use std::fmt;

use super::action::MigrationAction;
use super::errors::MigrationResult;

/// Reshapes a legacy raw value into the current encoding.
pub type Reshape = fn(&str) -> MigrationResult<String>;

/// What a rule does with the entry it matches.
#[derive(Clone, Copy)]
pub enum RuleAction {
    /// Move the value to a new key unchanged
    Rename { to: &'static str },
    /// Move to a new key with a reshaped value
    Rewrite { to: &'static str, reshape: Reshape },
    /// Delete the entry
    Reset,
}

impl fmt::Debug for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Rename { to } => f.debug_struct("Rename").field("to", to).finish(),
            RuleAction::Rewrite { to, .. } => f.debug_struct("Rewrite").field("to", to).finish(),
            RuleAction::Reset => write!(f, "Reset"),
        }
    }
}

/// A rule matching exactly one legacy key.
#[derive(Debug, Clone, Copy)]
pub struct MigrationRule {
    from: &'static str,
    action: RuleAction,
    keep_until: Option<&'static str>,
}

impl MigrationRule {
    pub const fn rename(from: &'static str, to: &'static str) -> Self {
        Self {
            from,
            action: RuleAction::Rename { to },
            keep_until: None,
        }
    }

    pub const fn rewrite(from: &'static str, to: &'static str, reshape: Reshape) -> Self {
        Self {
            from,
            action: RuleAction::Rewrite { to, reshape },
            keep_until: None,
        }
    }

    pub const fn reset(from: &'static str) -> Self {
        Self {
            from,
            action: RuleAction::Reset,
            keep_until: None,
        }
    }

    /// Records the release cycle after which the rule may be dropped.
    pub const fn keep_until(mut self, cycle: &'static str) -> Self {
        self.keep_until = Some(cycle);
        self
    }

    /// The legacy key this rule matches
    pub fn from(&self) -> &'static str {
        self.from
    }

    pub fn action(&self) -> RuleAction {
        self.action
    }

    /// The key this rule writes, if it keeps the entry
    pub fn target(&self) -> Option<&'static str> {
        match self.action {
            RuleAction::Rename { to } | RuleAction::Rewrite { to, .. } => Some(to),
            RuleAction::Reset => None,
        }
    }

    pub fn keep_until_cycle(&self) -> Option<&'static str> {
        self.keep_until
    }

    /// Runs the rule against a raw value.
    pub fn execute(&self, raw_value: &str) -> MigrationResult<MigrationAction> {
        match self.action {
            RuleAction::Rename { to } => Ok(MigrationAction::rename(to)),
            RuleAction::Rewrite { to, reshape } => {
                let reshaped = reshape(raw_value)?;
                Ok(MigrationAction::rewrite(to, reshaped))
            }
            RuleAction::Reset => Ok(MigrationAction::Reset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::MigrationError;

    fn upper(raw: &str) -> MigrationResult<String> {
        if raw.is_empty() {
            return Err(MigrationError::corrupt("x__y", "empty"));
        }
        Ok(raw.to_uppercase())
    }

    #[test]
    fn test_rename_rule() {
        let rule = MigrationRule::rename("a__old", "a__new").keep_until("0.7");
        assert_eq!(rule.target(), Some("a__new"));
        assert_eq!(rule.keep_until_cycle(), Some("0.7"));
        assert_eq!(rule.execute("1").unwrap(), MigrationAction::rename("a__new"));
    }

    #[test]
    fn test_rewrite_rule_propagates_reshape_error() {
        let rule = MigrationRule::rewrite("x__y", "x__z", upper);
        assert_eq!(rule.execute("abc").unwrap(), MigrationAction::rewrite("x__z", "ABC"));
        assert!(rule.execute("").is_err());
    }

    #[test]
    fn test_reset_rule_has_no_target() {
        let rule = MigrationRule::reset("smartbar__action_arrangement");
        assert_eq!(rule.target(), None);
        assert_eq!(rule.execute("anything").unwrap(), MigrationAction::Reset);
    }
}
