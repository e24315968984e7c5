// ABOUTME: Command implementations for each pipeline phase
// ABOUTME: Exports backup, restore, tables, and verify commands

pub mod backup;
pub mod restore;
pub mod tables;
pub mod verify;

pub use backup::backup;
pub use restore::{restore, RestorePhase};
pub use tables::tables;
pub use verify::verify;
