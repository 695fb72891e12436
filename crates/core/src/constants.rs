//! Constants used throughout the rollbackctx workspace

// Environment variable names
pub const ROLLBACKCTX_LABEL_VAR: &str = "ROLLBACKCTX_LABEL";
pub const ROLLBACKCTX_CATCH_UNDO_PANICS_VAR: &str = "ROLLBACKCTX_CATCH_UNDO_PANICS";
pub const ROLLBACKCTX_DROP_OUTCOME_VAR: &str = "ROLLBACKCTX_DROP_OUTCOME";

// Defaults
pub const DEFAULT_LABEL: &str = "rollback";
