use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::matcher::PatternSet;

/// How a traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    /// Every reachable entry was visited.
    Completed,
    /// The cancellation predicate fired and the walk returned early.
    Cancelled,
}

/// Counters accumulated over one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries whose metadata was inspected (files and directories).
    pub entries_examined: u64,
    /// Matches handed to the `on_match` callback.
    pub matches_reported: u64,
    /// Subtrees abandoned because they could not be opened or sat below the
    /// depth guard.
    pub subtrees_skipped: u64,
}

/// Result of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    pub status: WalkStatus,
    pub stats: WalkStats,
}

/// Recursive depth-first traversal applying a [`PatternSet`] to every
/// non-directory entry's base name.
///
/// Entries are visited in the filesystem's native enumeration order, which
/// is unordered with respect to name; callers must not assume any ordering.
/// `std::fs::read_dir` never yields `.` or `..`, so neither is processed.
/// Metadata is read with `symlink_metadata`: links are never dereferenced,
/// and a symlink to a directory is treated as a non-directory entry.
///
/// Failures are recoverable by contract. A directory that cannot be opened
/// and an entry whose metadata cannot be read are skipped with a
/// verbose-gated warning; siblings and ancestors are unaffected, and nothing
/// is retried until the next full scan.
#[derive(Debug)]
pub struct Walker<'a> {
    patterns: &'a PatternSet,
    verbose: bool,
    max_depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(patterns: &'a PatternSet, verbose: bool, max_depth: usize) -> Self {
        Self {
            patterns,
            verbose,
            max_depth,
        }
    }

    /// Walks the subtree under `root`.
    ///
    /// The cancellation predicate is polled before each directory listing is
    /// opened and again after every processed entry; once it returns true
    /// the walk unwinds within one entry-processing step. It cannot preempt
    /// a blocking filesystem call already in flight.
    pub fn walk<C, F>(&self, root: &Path, cancel: &C, on_match: &mut F) -> WalkOutcome
    where
        C: Fn() -> bool,
        F: FnMut(&Path, &str),
    {
        let mut stats = WalkStats::default();
        let status = self.walk_dir(root, 0, cancel, on_match, &mut stats);
        WalkOutcome { status, stats }
    }

    fn walk_dir<C, F>(
        &self,
        dir: &Path,
        depth: usize,
        cancel: &C,
        on_match: &mut F,
        stats: &mut WalkStats,
    ) -> WalkStatus
    where
        C: Fn() -> bool,
        F: FnMut(&Path, &str),
    {
        if cancel() {
            return WalkStatus::Cancelled;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => {
                // Permission or transient failure: abandon this subtree only.
                if self.verbose {
                    warn!("Can't open folder: {}", dir.display());
                }
                stats.subtrees_skipped += 1;
                return WalkStatus::Completed;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => {
                    if self.verbose {
                        warn!("Can't obtain information about file: {}", dir.display());
                    }
                    continue;
                }
            };

            let full_path = dir.join(entry.file_name());
            let metadata = match fs::symlink_metadata(&full_path) {
                Ok(metadata) => metadata,
                Err(_) => {
                    if self.verbose {
                        warn!("Can't obtain information about file: {}", full_path.display());
                    }
                    continue;
                }
            };
            stats.entries_examined += 1;

            if metadata.is_dir() {
                if depth >= self.max_depth {
                    warn!(
                        "Max depth {} reached, skipping subtree: {}",
                        self.max_depth,
                        full_path.display()
                    );
                    stats.subtrees_skipped += 1;
                } else if self.walk_dir(&full_path, depth + 1, cancel, on_match, stats)
                    == WalkStatus::Cancelled
                {
                    return WalkStatus::Cancelled;
                }
            } else {
                let name = entry.file_name();
                if self.verbose {
                    debug!("Matching patterns with {:?}", name);
                }
                // A name that is not valid UTF-8 cannot contain a UTF-8
                // pattern, so it is a non-match.
                match name.to_str().and_then(|n| self.patterns.first_match(n)) {
                    Some(index) => {
                        stats.matches_reported += 1;
                        on_match(&full_path, self.patterns.get(index));
                    }
                    None => {
                        if self.verbose {
                            debug!("Patterns don't match");
                        }
                    }
                }
            }

            if cancel() {
                return WalkStatus::Cancelled;
            }
        }

        WalkStatus::Completed
    }
}
