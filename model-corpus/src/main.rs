//! Check the loaders against large corpora of test data from GitHub:
//! expect more than a gigabyte in the cache directory after a full run.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use model_corpus::{Report, on_repo};

/// Corpora pinned by commit so runs are reproducible.
const CORPORA: &[(&str, &str)] = &[
    // assimp's test models, about 50 MB
    ("assimp/assimp", "c2967cf79acdc4cd48ecb0729e2733bf45b38a6f"),
    // the glTF sample models, about 1 GB
    (
        "KhronosGroup/glTF-Sample-Models",
        "8e9a5a6ad1a2790e2333e3eb48a1ee39f9e0e31b",
    ),
];

fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MODEL_CORPUS_CACHE") {
        return PathBuf::from(dir);
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".model-corpus-cache"),
        Err(_) => PathBuf::from(".model-corpus-cache"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cache = cache_dir();
    let total = Instant::now();
    let mut report = Report::new();

    for &(slug, commit) in CORPORA {
        let started = Instant::now();
        let pass = on_repo(slug, commit, &cache)
            .with_context(|| format!("corpus pass over {slug}@{commit} failed"))?;
        info!(
            repo = slug,
            files = pass.len(),
            elapsed = ?started.elapsed(),
            "corpus pass finished"
        );
        report.merge(pass);
    }

    info!(
        files = report.len(),
        elapsed = ?total.elapsed(),
        "all corpora checked"
    );

    // The formatted report of everything we loaded.
    println!("{report}");
    Ok(())
}
