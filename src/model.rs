mod config;
mod mode;
mod records;

pub use self::config::{
    ConsoleConfig, DEFAULT_API_BASE, DEFAULT_AUTO_REFRESH_SECS, MIN_AUTO_REFRESH_SECS,
};
pub use self::mode::{FileStatus, MarkerColor, Mode, STATUS_MARKERS, StatusMarker};
pub use self::records::{
    ApplyResult, CheckResult, CommitInfo, DiffRecord, DriftState, GitStatus, GroupSummary,
    GroupsListing, HostSummary, NginxCheck, PrepareResult, SyncStats, TreeListing, UpdateResult,
};

#[cfg(test)]
#[path = "tests/model/config_tests.rs"]
mod config_tests;
