//! Reconciler — keeps markdown ID markers and the registry in agreement.
//!
//! One run is a straight line: load -> scan -> reconcile -> assign -> save.
//! Any failure aborts the remaining steps, so the registry on disk is only
//! ever replaced by the result of a complete run. Markers inserted before a
//! failure are picked up again as untracked IDs on the next run.

use crate::config::Config;
use crate::error::{IdsError, Result};
use crate::identifier::generate_identifier;
use crate::marker;
use crate::registry::{self, Registry};
use crate::scan::{self, PendingFile};
use rand::Rng;
use rand::rngs::ThreadRng;
use std::collections::BTreeMap;
use std::path::Path;

/// A tracked file that was found under a different path than recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub id: String,
    pub from: String,
    pub to: String,
}

/// An ID found on disk that the registry did not know about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adoption {
    pub id: String,
    pub rel_path: String,
}

/// Non-fatal outcome of cross-checking the registry against a scan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub moved: Vec<PathChange>,
    pub adopted: Vec<Adoption>,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        !self.moved.is_empty() || !self.adopted.is_empty()
    }
}

/// A fresh ID written into a previously unmarked file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    pub rel_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    MissingFile,
    MarkerMismatch,
}

/// A registry entry whose recorded path would not resolve to its own marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub id: String,
    pub rel_path: String,
    pub reason: StaleReason,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub report: ReconcileReport,
    pub assigned: Vec<Assignment>,
    /// Check mode only: unmarked files that a real run would assign IDs to
    pub pending: Vec<PendingFile>,
    /// Check mode only: entries of the persisted registry that point nowhere useful
    pub stale: Vec<StaleEntry>,
    pub tracked: usize,
}

impl RunSummary {
    /// True when a real run would have nothing to change
    pub fn is_clean(&self) -> bool {
        !self.report.has_changes()
            && self.assigned.is_empty()
            && self.pending.is_empty()
            && self.stale.is_empty()
    }
}

/// Cross-check `registry` against the IDs `found` on disk.
///
/// Moved files get their path updated; IDs on disk but missing from the
/// registry are adopted. A registry ID that no scanned file carries fails the
/// whole run, and in that case the registry is left untouched.
pub fn reconcile(registry: &mut Registry, found: &BTreeMap<String, String>) -> Result<ReconcileReport> {
    let orphans: Vec<(&String, &String)> = registry
        .iter()
        .filter(|(id, _)| !found.contains_key(id.as_str()))
        .collect();
    for (id, path) in &orphans {
        log::error!("[IDS] ID {} not found in any files (was {})", id, path);
    }
    if let Some((id, path)) = orphans.first() {
        return Err(IdsError::OrphanedIdentifier {
            id: id.to_string(),
            path: path.to_string(),
        });
    }

    let mut report = ReconcileReport::default();

    for (id, found_path) in found {
        match registry.get(id) {
            Some(recorded) if recorded == found_path.as_str() => {}
            Some(recorded) => {
                log::info!(
                    "[IDS] Updating rel path for ID {} from {} to {}",
                    id,
                    recorded,
                    found_path
                );
                report.moved.push(PathChange {
                    id: id.clone(),
                    from: recorded.to_string(),
                    to: found_path.clone(),
                });
            }
            None => {
                log::warn!("[IDS] Adding untracked ID {} from {}", id, found_path);
                report.adopted.push(Adoption {
                    id: id.clone(),
                    rel_path: found_path.clone(),
                });
            }
        }
    }

    for change in &report.moved {
        registry.insert(change.id.clone(), change.to.clone());
    }
    for adoption in &report.adopted {
        registry.insert(adoption.id.clone(), adoption.rel_path.clone());
    }

    Ok(report)
}

/// Give every queued file a new ID, marking the file and recording it in the registry.
///
/// Each ID is registered as soon as it is written, so later generations in the
/// same run treat it as taken. Generation happens before the file is touched.
pub fn assign_identifiers<R: Rng + ?Sized>(
    queue: &[PendingFile],
    registry: &mut Registry,
    rng: &mut R,
    length: usize,
    max_attempts: usize,
) -> Result<Vec<Assignment>> {
    let mut assigned = Vec::with_capacity(queue.len());

    for pending in queue {
        let id = generate_identifier(rng, |candidate| registry.contains(candidate), length, max_attempts)?;
        log::info!("[IDS] Adding new ID {} to {}", id, pending.rel_path);
        marker::prepend_marker(&pending.path, &id)?;
        registry.insert(id.clone(), pending.rel_path.clone());
        assigned.push(Assignment {
            id,
            rel_path: pending.rel_path.clone(),
        });
    }

    Ok(assigned)
}

/// Resolve every registry entry the way a reader of the registry would:
/// the recorded file must exist and its first line must carry the same ID.
pub fn verify_registry(root: &Path, registry: &Registry) -> Result<Vec<StaleEntry>> {
    let mut stale = Vec::new();

    for (id, rel_path) in registry {
        let path = root.join(rel_path);
        let reason = if !path.is_file() {
            Some(StaleReason::MissingFile)
        } else if marker::read_identifier(&path)?.as_deref() != Some(id.as_str()) {
            Some(StaleReason::MarkerMismatch)
        } else {
            None
        };

        if let Some(reason) = reason {
            stale.push(StaleEntry {
                id: id.clone(),
                rel_path: rel_path.clone(),
                reason,
            });
        }
    }

    Ok(stale)
}

/// One ID update run over a content tree
pub struct Reconciler<R: Rng = ThreadRng> {
    config: Config,
    rng: R,
}

impl Reconciler<ThreadRng> {
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> Reconciler<R> {
    pub fn with_rng(config: Config, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        let registry_path = self.config.registry_path();
        let mut registry = registry::load_registry(&registry_path)?;

        let scanned = scan::collect_scan(scan::scan_tree(&self.config.root))?;
        log::debug!(
            "[IDS] Scan found {} marked and {} unmarked files",
            scanned.found.len(),
            scanned.queue.len()
        );

        if self.config.check_only {
            return self.check(registry, scanned);
        }

        let report = reconcile(&mut registry, &scanned.found)?;
        let assigned = assign_identifiers(
            &scanned.queue,
            &mut registry,
            &mut self.rng,
            self.config.id_length,
            self.config.max_attempts,
        )?;

        registry::save_registry(&registry_path, &registry)?;

        Ok(RunSummary {
            report,
            assigned,
            pending: Vec::new(),
            stale: Vec::new(),
            tracked: registry.len(),
        })
    }

    fn check(&self, registry: Registry, scanned: scan::ScanResult) -> Result<RunSummary> {
        let stale = verify_registry(&self.config.root, &registry)?;
        for entry in &stale {
            log::warn!(
                "[IDS] ID {} does not resolve: {} ({:?})",
                entry.id,
                entry.rel_path,
                entry.reason
            );
        }

        let mut preview = registry;
        let report = reconcile(&mut preview, &scanned.found)?;
        for pending in &scanned.queue {
            log::warn!("[IDS] {} has no ID marker", pending.rel_path);
        }

        Ok(RunSummary {
            report,
            assigned: Vec::new(),
            pending: scanned.queue,
            stale,
            tracked: preview.len(),
        })
    }
}
