pub mod stats;
pub mod walker;

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use crate::config::{BuildConfig, Location};
use self::stats::TreeStats;
use self::walker::scan_tree;

/// Outcome for a single (source, target) location.
#[derive(Debug)]
pub struct PairReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub source_stats: TreeStats,
    pub target_stats: TreeStats,
    pub stale: bool,
}

/// Overall staleness decision plus the per-pair diagnostics behind it.
#[derive(Debug)]
pub struct BuildDecision {
    pub build_required: bool,
    /// The output directory did not exist at all, so no pair was scanned.
    pub missing_build_dir: bool,
    pub pairs: Vec<PairReport>,
}

/// Decide whether the stylesheet build must run.
///
/// A missing output directory is the first-ever-build fast path: the answer
/// is yes before any tree is looked at. Otherwise every configured location
/// is scanned (all of them, even once the answer is already yes, so the
/// per-pair counts stay available for logging) and the per-pair outcomes are
/// OR-ed together. Any scan failure aborts the whole check.
pub fn evaluate(build: &BuildConfig) -> Result<BuildDecision> {
    if !build.directory.exists() {
        info!(
            "Output directory {:?} does not exist, full build required",
            build.directory
        );
        return Ok(BuildDecision {
            build_required: true,
            missing_build_dir: true,
            pairs: Vec::new(),
        });
    }

    let pairs = build
        .locations
        .iter()
        .map(check_pair)
        .collect::<Result<Vec<_>>>()?;
    let build_required = pairs.iter().any(|pair| pair.stale);

    Ok(BuildDecision {
        build_required,
        missing_build_dir: false,
        pairs,
    })
}

/// Apply the staleness rule to one location.
///
/// An empty source or empty target always rebuilds; otherwise only the
/// newest-change edge of each tree matters.
fn check_pair(location: &Location) -> Result<PairReport> {
    // The two sides are independent, walk them concurrently.
    let (source_stats, target_stats) = rayon::join(
        || scan_tree(&location.source),
        || scan_tree(&location.target),
    );
    let source_stats = source_stats?;
    let target_stats = target_stats?;

    info!(
        "Checked {} files in {:?}",
        source_stats.count, location.source
    );
    info!(
        "Checked {} files in {:?}",
        target_stats.count, location.target
    );

    let stale = if source_stats.count == 0 || target_stats.count == 0 {
        true
    } else {
        match (source_stats.youngest, target_stats.youngest) {
            (Some(source), Some(target)) => source > target,
            // Unreachable for existing roots, but never silently fresh.
            _ => true,
        }
    };

    Ok(PairReport {
        source: location.source.clone(),
        target: location.target.clone(),
        source_stats,
        target_stats,
        stale,
    })
}
