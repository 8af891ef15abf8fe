/// Content items and scripts are keyed by SQLite `INTEGER` rowids.
pub type DbId = i32;

/// Script registry key.
pub type ScriptId = DbId;
