//! Checker configuration for Metrica
//!
//! The defaults reproduce the base contract: nominal schema subtyping, no numeric widening, lookup keys unchecked,
//! pipeline steps checked individually but not against each other. The stricter checks are opt-in.

use crate::frontend::types::SubtypeOptions;

/// Type checker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Accept `Int` where `Float` is expected in mapping targets
    pub numeric_widening: bool,
    /// Check `lookup(...)` key count and key types against the table declaration
    pub strict_lookup_keys: bool,
    /// Require each pipeline step's target to flow into the next step's source
    pub check_pipeline_chaining: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            numeric_widening: false,
            strict_lookup_keys: false,
            check_pipeline_chaining: false,
        }
    }
}

impl CheckerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable `Int ⊑ Float` at assignment sites
    pub fn with_numeric_widening(mut self, enabled: bool) -> Self {
        self.numeric_widening = enabled;
        self
    }

    /// Enable or disable lookup key checking
    pub fn with_strict_lookup_keys(mut self, enabled: bool) -> Self {
        self.strict_lookup_keys = enabled;
        self
    }

    /// Enable or disable the consecutive-step pipeline check
    pub fn with_pipeline_chaining(mut self, enabled: bool) -> Self {
        self.check_pipeline_chaining = enabled;
        self
    }

    /// Subtyping options derived from this config.
    pub fn subtype_options(&self) -> SubtypeOptions {
        SubtypeOptions {
            numeric_widening: self.numeric_widening,
        }
    }
}
