//! Orphan cleanup for registry entries left behind by dead servers.

use std::path::Path;

use fluentest_core::{RegistryError, ServerStatus};
use tracing::{debug, info, warn};

use super::io::{EntryRead, list_entry_files, read_entry, remove_entry_file};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SweepReport {
    /// Entries whose process is no longer alive.
    pub dead: usize,
    /// Entries that could not be parsed.
    pub corrupt: usize,
    /// Orphaned entries whose file could not be removed.
    pub failed: usize,
}

impl SweepReport {
    pub(crate) const fn removed(self) -> usize {
        self.dead + self.corrupt
    }
}

/// Remove every entry in `dir` whose process is gone, plus unreadable entries.
///
/// Entries without a PID (servers owned by someone else) are kept. A file
/// that cannot be removed is logged and skipped; the rest are still swept.
pub(crate) fn sweep_orphans(
    dir: &Path,
    is_live: impl Fn(&ServerStatus) -> bool,
) -> Result<SweepReport, RegistryError> {
    sweep_with(dir, is_live, remove_entry_file)
}

fn sweep_with(
    dir: &Path,
    is_live: impl Fn(&ServerStatus) -> bool,
    remove: impl Fn(&Path) -> Result<(), RegistryError>,
) -> Result<SweepReport, RegistryError> {
    let paths = list_entry_files(dir)?;

    if paths.is_empty() {
        debug!("No registry entries to sweep");
        return Ok(SweepReport::default());
    }

    let mut report = SweepReport::default();

    for path in paths {
        match read_entry(&path) {
            EntryRead::Missing => {}
            EntryRead::Corrupt(reason) => {
                debug!(path = %path.display(), %reason, "Removing unreadable registry entry");
                match remove(&path) {
                    Ok(()) => report.corrupt += 1,
                    Err(e) => {
                        warn!(error = %e, "Failed to remove unreadable registry entry");
                        report.failed += 1;
                    }
                }
            }
            EntryRead::Found(status) => {
                let Some(pid) = status.pid else {
                    continue;
                };
                if !is_live(&status) {
                    debug!(
                        pid,
                        hash = %status.config_hash.short(),
                        url = %status.base_url,
                        "Removing registry entry for dead server"
                    );
                    match remove(&path) {
                        Ok(()) => report.dead += 1,
                        Err(e) => {
                            warn!(pid, error = %e, "Failed to remove registry entry");
                            report.failed += 1;
                        }
                    }
                }
            }
        }
    }

    if report.removed() > 0 || report.failed > 0 {
        info!(
            dead = report.dead,
            corrupt = report.corrupt,
            failed = report.failed,
            "Orphan sweep complete"
        );
    }

    Ok(report)
}
