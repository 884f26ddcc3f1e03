//! update-ids — keeps a persistent `<!-- ID: TOKEN -->` marker at the top of
//! every markdown file in a content tree, and the `.github/ids.json`
//! registry mapping those IDs to their current paths.
//!
//! Scans from the current directory unless UPDATE_IDS_ROOT says otherwise.
//! Exits non-zero when an ID cannot be generated or a registered ID has
//! disappeared from the tree.

mod config;
mod error;
mod identifier;
mod marker;
mod reconciler;
mod registry;
mod scan;

use config::Config;
use dotenv::dotenv;
use reconciler::Reconciler;

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    log::debug!("[IDS] Config: {:?}", config);

    let mut reconciler = Reconciler::new(config);
    let summary = match reconciler.run() {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("[IDS] {}", e);
            std::process::exit(1);
        }
    };

    if reconciler.config().check_only {
        if summary.is_clean() {
            log::info!("[IDS] All {} IDs are up to date", summary.tracked);
        } else {
            log::error!(
                "[IDS] IDs out of date: {} moved, {} untracked, {} unmarked files, {} stale entries",
                summary.report.moved.len(),
                summary.report.adopted.len(),
                summary.pending.len(),
                summary.stale.len()
            );
            std::process::exit(1);
        }
        return;
    }

    log::info!(
        "[IDS] Successfully validated/updated all IDs ({} tracked, {} moved, {} adopted, {} new)",
        summary.tracked,
        summary.report.moved.len(),
        summary.report.adopted.len(),
        summary.assigned.len()
    );
}
