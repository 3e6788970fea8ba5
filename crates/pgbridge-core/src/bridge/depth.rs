//! Nesting guard for type resolution.

use crate::catalog::TypeDescriptor;
use crate::error::{Error, Result};

/// Nesting level of the resolution in progress.
///
/// A copy is handed to each nested call, so returning from a call (by any
/// path) restores the caller's level.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth {
    level: usize,
    limit: usize,
}

impl Depth {
    pub(crate) fn root(limit: usize) -> Self {
        Self { level: 0, limit }
    }

    /// Enter `descriptor`, failing once the nesting exceeds the limit.
    pub(crate) fn enter(self, descriptor: &TypeDescriptor) -> Result<Depth> {
        let level = self.level + 1;
        if level > self.limit {
            return Err(Error::RecursionLimit {
                type_name: descriptor.display_name(),
                kind: descriptor.kind,
                limit: self.limit,
            });
        }
        Ok(Depth { level, ..self })
    }

    pub(crate) fn level(&self) -> usize {
        self.level
    }
}
