//! Corpus regression harness
//!
//! Drives [`model_loader::load_scene`] across every supported file in a
//! pinned repository snapshot and records what happened. The point is to
//! catch format-parsing regressions against real-world data: thousands of
//! third-party sample files, including fixtures that are intentionally
//! broken.
//!
//! Outcome classification follows one rule: a load may succeed, may report
//! an unimplemented format variant, or may fail *only if the file announces
//! itself as a broken fixture* (its path contains one of
//! [`EXPECTED_FAILURE_MARKERS`]). Anything else aborts the run, because it
//! is exactly the regression this harness exists to catch.

#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, error, info};

use model_loader::resolver::{GithubResolver, Resolver, ZipResolver};
use model_loader::{Result, Scene, load_scene, native_load_extensions};

/// Path substrings marking fixtures that are supposed to fail to load.
///
/// Corpora name their intentionally-broken files this way; `pond.0.ply` is a
/// specific sample whose header lies about its contents.
pub const EXPECTED_FAILURE_MARKERS: &[&str] = &[
    "malformed",
    "empty",
    "outofmemory",
    "bad",
    "incorrect",
    "missing",
    "failures",
    "pond.0.ply",
];

/// Whether `path` names a fixture that is expected to fail to load
pub fn expected_to_fail(path: &str) -> bool {
    let check = path.to_lowercase();
    EXPECTED_FAILURE_MARKERS
        .iter()
        .any(|marker| check.contains(marker))
}

/// The report key for `path`: the suffix following `commit`.
///
/// Snapshot archives prefix every member with `{name}-{commit}/`; stripping
/// through the commit leaves a stable, human-readable repo-relative path.
/// A path without the commit is returned whole.
pub fn report_key<'a>(path: &'a str, commit: &str) -> &'a str {
    match path.find(commit) {
        Some(index) => &path[index + commit.len()..],
        None => path,
    }
}

/// Classify one load outcome into the text recorded for it.
///
/// Returns `Err` only for the aborting case: a failure other than
/// "not implemented" on a file that was not expected to fail. A fixture that
/// was expected to fail but didn't is annotated rather than fatal.
pub fn classify_outcome(
    outcome: Result<Scene>,
    expected_failure: bool,
) -> Result<String> {
    let mut raised = false;
    let mut value = match outcome {
        Ok(scene) => scene.to_string(),
        Err(err) if err.is_not_implemented() => err.to_string(),
        Err(err) => {
            raised = true;
            if !expected_failure {
                return Err(err);
            }
            err.to_string()
        }
    };
    if expected_failure && !raised {
        value.push_str(" SHOULD HAVE RAISED");
    }
    Ok(value)
}

/// One corpus pass: an ordered map from repo-relative path to outcome text
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: BTreeMap<String, String>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a path
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up the outcome recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of recorded outcomes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: Report) {
        self.entries.extend(other.entries);
    }

    /// Iterate over `(path, outcome)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "# {key}")?;
            writeln!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Attempt every supported file in an opened snapshot.
///
/// Each archive member whose lowercase extension has a built-in loader is
/// attempted exactly once, with a sub-resolver rooted at the member's
/// directory so sibling references (materials, buffers) resolve. Report
/// keys are the member paths with the `{name}-{commit}` archive prefix
/// stripped.
pub fn scan(snapshot: &ZipResolver, commit: &str) -> Result<Report> {
    let attempt = native_load_extensions();
    let paths: Vec<String> = snapshot
        .keys()
        .into_iter()
        .filter(|path| {
            let lower = path.to_lowercase();
            attempt.contains(lower.rsplit('.').next().unwrap_or(""))
        })
        .collect();
    info!(candidates = paths.len(), commit, "scanning snapshot");

    let mut report = Report::new();
    for path in &paths {
        let (directory, name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
        let resolver = snapshot.namespaced(directory)?;
        let expected_failure = expected_to_fail(path);

        let outcome = resolver
            .get(name)
            .and_then(|bytes| load_scene(&bytes, name, Some(&resolver)));
        match &outcome {
            Ok(scene) => debug!(path = path.as_str(), %scene, "loaded"),
            Err(err) if err.is_not_implemented() => info!(path = path.as_str(), "{err}"),
            Err(_) => {}
        }

        match classify_outcome(outcome, expected_failure) {
            Ok(value) => report.insert(report_key(path, commit), value),
            Err(err) => {
                error!(path = path.as_str(), error = %err, "unexpected failure");
                return Err(err);
            }
        }
    }
    Ok(report)
}

/// Try loading all supported files in a GitHub repository.
///
/// `slug` is a GitHub `owner/name` pair and `commit` the full hash of the
/// snapshot to check; the archive is cached under `cache_dir` across runs.
pub fn on_repo(slug: &str, commit: &str, cache_dir: &Path) -> Result<Report> {
    let repo = GithubResolver::new(slug, commit, cache_dir)?;
    debug!(archive = %repo.archive_path().display(), "snapshot ready");
    scan(repo.as_zip(), commit)
}
