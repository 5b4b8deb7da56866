//! Per-run evaluation state.

use crate::comparator::ComparatorManager;
use crate::engine::registry::Registry;
use crate::error::Result;

/// Script-wide flags consulted and updated by commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandState {
    pub in_prolog: bool,
    pub rejected: bool,
    pub implicit_keep: bool,
    pub has_actions: bool,
    pub vacation_processed: bool,
}

impl Default for CommandState {
    fn default() -> Self {
        Self {
            in_prolog: true,
            rejected: false,
            implicit_keep: true,
            has_actions: false,
            vacation_processed: false,
        }
    }
}

/// State of the if/elsif/else chain at one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionState {
    pub else_allowed: bool,
    pub test_result: bool,
}

impl Default for ConditionState {
    fn default() -> Self {
        Self {
            else_allowed: false,
            test_result: true,
        }
    }
}

impl ConditionState {
    pub fn is_elsif_allowed(&self) -> bool {
        self.else_allowed
    }

    pub fn is_elsif_runnable(&self) -> bool {
        self.else_allowed && !self.test_result
    }

    pub fn is_else_allowed(&self) -> bool {
        self.else_allowed
    }

    pub fn is_else_runnable(&self) -> bool {
        self.else_allowed && !self.test_result
    }

    pub fn set_if_test_result(&mut self, result: bool) {
        self.else_allowed = true;
        self.test_result = result;
    }

    pub fn set_elsif_test_result(&mut self, result: bool) {
        self.else_allowed = true;
        self.test_result = result;
    }

    pub fn set_else_test_result(&mut self) {
        self.else_allowed = false;
        self.test_result = true;
    }

    /// Closes the chain after any non-conditional command.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything one script run reads and mutates, threaded by reference
/// through every command and test.
pub struct EvaluationContext<'r> {
    registry: &'r Registry,
    pub state: CommandState,
    conditions: Vec<ConditionState>,
}

impl<'r> EvaluationContext<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            state: CommandState::default(),
            conditions: vec![ConditionState::default()],
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn comparators(&self) -> &'r ComparatorManager {
        &self.registry.comparators
    }

    pub fn condition(&self) -> &ConditionState {
        // The root scope is never popped
        &self.conditions[self.conditions.len() - 1]
    }

    pub fn condition_mut(&mut self) -> &mut ConditionState {
        let last = self.conditions.len() - 1;
        &mut self.conditions[last]
    }

    pub fn depth(&self) -> usize {
        self.conditions.len()
    }

    /// Runs `f` inside a fresh condition scope. The previous scope is
    /// restored whether `f` succeeds or fails.
    pub fn with_condition_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.conditions.push(ConditionState::default());
        let result = f(self);
        self.conditions.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SieveError;

    #[test]
    fn test_condition_transitions() {
        let mut c = ConditionState::default();
        assert!(!c.is_elsif_allowed());
        assert!(!c.is_else_allowed());

        c.set_if_test_result(false);
        assert!(c.is_elsif_runnable());
        c.set_elsif_test_result(true);
        assert!(c.is_else_allowed());
        assert!(!c.is_else_runnable());

        c.set_else_test_result();
        assert!(!c.is_else_allowed());
        assert!(!c.is_elsif_allowed());
    }

    #[test]
    fn test_scope_is_restored_after_error() {
        let registry = Registry::default();
        let mut ctx = EvaluationContext::new(&registry);
        ctx.condition_mut().set_if_test_result(false);

        let result: Result<()> = ctx.with_condition_scope(|inner| {
            assert_eq!(inner.depth(), 2);
            assert!(!inner.condition().is_else_allowed());
            inner.condition_mut().set_if_test_result(true);
            Err(SieveError::command("boom"))
        });

        assert!(result.is_err());
        assert_eq!(ctx.depth(), 1);
        assert!(ctx.condition().is_else_runnable());
    }
}
