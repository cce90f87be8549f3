//! Byte resolvers
//!
//! Loaders frequently need more than the file they were handed: an OBJ pulls
//! in material libraries, a glTF references binary buffers and textures by
//! relative path. A [`Resolver`] answers those lookups from whatever root the
//! caller chose: an in-memory map, a directory, a zip archive, or a cached
//! GitHub commit snapshot.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Trait for named byte lookup against a fixed root
pub trait Resolver: Send + Sync + fmt::Debug {
    /// Retrieve the contents of `name`, resolved against the root.
    ///
    /// `name` may contain `./` and `../` segments; they are normalized before
    /// lookup, and escaping above the root is an error.
    fn get(&self, name: &str) -> Result<Vec<u8>>;

    /// Check whether `name` resolves to an entry
    fn exists(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }
}

/// Join `name` onto `namespace`, collapsing `.` and `..` segments.
///
/// Backslashes are treated as separators since archive members authored on
/// Windows reference siblings that way.
pub(crate) fn join_namespaced(namespace: &str, name: &str) -> Result<String> {
    let mut parts: Vec<&str> = namespace
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    let name = name.replace('\\', "/");
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(Error::file_not_found(format!(
                        "{name} escapes the resolver root"
                    )));
                }
            }
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Decode `%XX` escapes; glTF buffer and image URIs are percent-encoded.
pub(crate) fn percent_decode(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// In-memory resolver for tests and embedded fixtures
#[derive(Debug, Default)]
pub struct MemoryResolver {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemoryResolver {
    /// Create a new empty memory resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to the resolver
    pub fn add_file<S: Into<String>>(&mut self, name: S, data: Vec<u8>) {
        self.files.insert(name.into(), Arc::from(data));
    }

    /// Number of entries
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl Resolver for MemoryResolver {
    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let key = join_namespaced("", name)?;
        self.files
            .get(&key)
            .or_else(|| self.files.get(&percent_decode(&key)))
            .map(|data| data.to_vec())
            .ok_or_else(|| Error::file_not_found(name))
    }

    fn exists(&self, name: &str) -> bool {
        join_namespaced("", name)
            .map(|key| self.files.contains_key(&key) || self.files.contains_key(&percent_decode(&key)))
            .unwrap_or(false)
    }
}

/// Resolver rooted at a local directory
#[derive(Debug, Clone)]
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    /// Create a resolver rooted at `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl Resolver for DirResolver {
    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let relative = join_namespaced("", name)?;
        let path = self.root.join(&relative);
        if !path.is_file() {
            let decoded = self.root.join(percent_decode(&relative));
            if decoded.is_file() {
                return fs::read(&decoded).map_err(Error::from);
            }
            return Err(Error::file_not_found(name));
        }
        fs::read(&path).map_err(Error::from)
    }

    fn exists(&self, name: &str) -> bool {
        join_namespaced("", name)
            .map(|relative| self.root.join(relative).is_file())
            .unwrap_or(false)
    }
}

/// Resolver rooted inside a zip archive.
///
/// The archive handle is shared, so re-rooting with [`ZipResolver::namespaced`]
/// is cheap and sub-resolvers can outlive the original.
#[derive(Clone)]
pub struct ZipResolver {
    archive: Arc<Mutex<ZipArchive<File>>>,
    names: Arc<Vec<String>>,
    namespace: String,
}

impl fmt::Debug for ZipResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipResolver")
            .field("namespace", &self.namespace)
            .field("members", &self.names.len())
            .finish()
    }
}

impl ZipResolver {
    /// Open the archive at `path` and root the resolver at its top level
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::io_error(format!("{}: {}", path.display(), e)))?;
        let archive = ZipArchive::new(file)
            .map_err(|e| Error::archive(format!("{}: {}", path.display(), e)))?;

        let names: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(String::from)
            .collect();
        debug!(members = names.len(), path = %path.display(), "opened archive");

        Ok(Self {
            archive: Arc::new(Mutex::new(archive)),
            names: Arc::new(names),
            namespace: String::new(),
        })
    }

    /// Member paths visible from this resolver's root
    pub fn keys(&self) -> Vec<String> {
        if self.namespace.is_empty() {
            return self.names.as_ref().clone();
        }
        let prefix = format!("{}/", self.namespace);
        self.names
            .iter()
            .filter_map(|name| name.strip_prefix(&prefix))
            .map(String::from)
            .collect()
    }

    /// A resolver sharing this archive, rooted at `directory` below the
    /// current root
    pub fn namespaced(&self, directory: &str) -> Result<Self> {
        Ok(Self {
            archive: Arc::clone(&self.archive),
            names: Arc::clone(&self.names),
            namespace: join_namespaced(&self.namespace, directory)?,
        })
    }

    fn read_member(&self, member: &str) -> Result<Vec<u8>> {
        use std::io::Read;

        let mut archive = self
            .archive
            .lock()
            .map_err(|_| Error::other("archive lock poisoned"))?;
        let mut file = archive
            .by_name(member)
            .map_err(|_| Error::file_not_found(member))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)
            .map_err(|e| Error::archive(format!("{member}: {e}")))?;
        Ok(data)
    }
}

impl Resolver for ZipResolver {
    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let member = join_namespaced(&self.namespace, name)?;
        match self.read_member(&member) {
            Ok(data) => Ok(data),
            // Retry with percent-escapes decoded before giving up.
            Err(Error::FileNotFound { .. }) => {
                let decoded = percent_decode(&member);
                if decoded != member {
                    self.read_member(&decoded)
                } else {
                    Err(Error::file_not_found(name))
                }
            }
            Err(other) => Err(other),
        }
    }

    fn exists(&self, name: &str) -> bool {
        join_namespaced(&self.namespace, name)
            .map(|member| {
                self.names.contains(&member) || self.names.contains(&percent_decode(&member))
            })
            .unwrap_or(false)
    }
}

/// Resolver over a GitHub repository snapshot at a specific commit.
///
/// The commit archive is downloaded once into `cache_dir` and opened as a
/// [`ZipResolver`]; later runs reuse the cached file. Archive members are
/// prefixed `{name}-{commit}/` by GitHub, so keys returned here carry that
/// prefix too.
pub struct GithubResolver {
    slug: String,
    commit: String,
    archive_path: PathBuf,
    zip: ZipResolver,
}

impl fmt::Debug for GithubResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubResolver")
            .field("slug", &self.slug)
            .field("commit", &self.commit)
            .field("archive", &self.archive_path)
            .finish()
    }
}

impl GithubResolver {
    /// Resolve `slug` (e.g. `"assimp/assimp"`) at `commit`, downloading the
    /// snapshot archive into `cache_dir` if it is not already there
    pub fn new(slug: &str, commit: &str, cache_dir: &Path) -> Result<Self> {
        if !slug.contains('/') {
            return Err(Error::other(format!(
                "repository slug must be owner/name, got {slug:?}"
            )));
        }
        if commit.is_empty() || !commit.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::other(format!(
                "commit must be a full hex hash, got {commit:?}"
            )));
        }

        fs::create_dir_all(cache_dir)
            .map_err(|e| Error::io_error(format!("{}: {}", cache_dir.display(), e)))?;

        let archive_path = cache_dir.join(format!("{}-{}.zip", slug.replace('/', "-"), commit));
        if !archive_path.exists() {
            let url = format!("https://github.com/{slug}/archive/{commit}.zip");
            download(&url, &archive_path)?;
        } else {
            debug!(archive = %archive_path.display(), "using cached snapshot");
        }

        let zip = ZipResolver::open(&archive_path)?;
        Ok(Self {
            slug: slug.to_string(),
            commit: commit.to_string(),
            archive_path,
            zip,
        })
    }

    /// The repository slug this resolver serves
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The pinned commit hash
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Where the snapshot archive lives on disk
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// The archive resolver backing this snapshot
    pub fn as_zip(&self) -> &ZipResolver {
        &self.zip
    }

    /// Archive member paths, including GitHub's `{name}-{commit}/` prefix
    pub fn keys(&self) -> Vec<String> {
        self.zip.keys()
    }

    /// A resolver rooted at `directory` inside the snapshot
    pub fn namespaced(&self, directory: &str) -> Result<ZipResolver> {
        self.zip.namespaced(directory)
    }
}

impl Resolver for GithubResolver {
    fn get(&self, name: &str) -> Result<Vec<u8>> {
        self.zip.get(name)
    }

    fn exists(&self, name: &str) -> bool {
        self.zip.exists(name)
    }
}

/// Download `url` to `dst` through a temp file so partial downloads never
/// land under the final name.
fn download(url: &str, dst: &Path) -> Result<()> {
    info!(url, dst = %dst.display(), "downloading snapshot archive");

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(600)))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let resp = agent
        .get(url)
        .call()
        .map_err(|e| Error::download(format!("{e} for {url}")))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::download(format!("HTTP {status} for {url}")));
    }

    let tmp = dst.with_extension("tmp");
    let mut reader = resp.into_body().into_reader();
    let mut file = File::create(&tmp)
        .map_err(|e| Error::io_error(format!("{}: {}", tmp.display(), e)))?;
    std::io::copy(&mut reader, &mut file)
        .map_err(|e| Error::download(format!("{url} into {}: {}", tmp.display(), e)))?;
    file.sync_all()
        .map_err(|e| Error::io_error(format!("{}: {}", tmp.display(), e)))?;
    drop(file);
    fs::rename(&tmp, dst).map_err(|e| {
        Error::io_error(format!(
            "{} -> {}: {}",
            tmp.display(),
            dst.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_join_namespaced() {
        assert_eq!(join_namespaced("a/b", "c.bin").unwrap(), "a/b/c.bin");
        assert_eq!(join_namespaced("a/b", "../c.bin").unwrap(), "a/c.bin");
        assert_eq!(join_namespaced("", "./x/./y").unwrap(), "x/y");
        assert_eq!(join_namespaced("a", "b\\c").unwrap(), "a/b/c");
        assert!(join_namespaced("a", "../../escape").is_err());
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("Box%20With%20Spaces.bin"), "Box With Spaces.bin");
        assert_eq!(percent_decode("plain.bin"), "plain.bin");
        assert_eq!(percent_decode("broken%2"), "broken%2");
    }

    #[test]
    fn test_memory_resolver() {
        let mut resolver = MemoryResolver::new();
        resolver.add_file("models/cube.obj", b"v 0 0 0".to_vec());

        assert_eq!(resolver.file_count(), 1);
        assert!(resolver.exists("models/cube.obj"));
        assert!(resolver.exists("models/sub/../cube.obj"));
        assert!(!resolver.exists("missing.obj"));
        assert_eq!(resolver.get("models/cube.obj").unwrap(), b"v 0 0 0");
        assert!(matches!(
            resolver.get("missing.obj"),
            Err(Error::FileNotFound { .. })
        ));
    }

    fn fixture_archive() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::with_suffix(".zip").unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        let options = zip::write::SimpleFileOptions::default();

        writer.start_file("repo-abc/models/cube.obj", options).unwrap();
        writer.write_all(b"v 0 0 0\n").unwrap();
        writer
            .start_file("repo-abc/textures/checker.png", options)
            .unwrap();
        writer.write_all(b"not-a-real-png").unwrap();
        writer.add_directory("repo-abc/empty", options).unwrap();
        writer.finish().unwrap();
        file
    }

    #[test]
    fn test_zip_resolver_keys_and_get() {
        let file = fixture_archive();
        let resolver = ZipResolver::open(file.path()).unwrap();

        let mut keys = resolver.keys();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "repo-abc/models/cube.obj".to_string(),
                "repo-abc/textures/checker.png".to_string(),
            ]
        );

        assert_eq!(
            resolver.get("repo-abc/models/cube.obj").unwrap(),
            b"v 0 0 0\n"
        );
    }

    #[test]
    fn test_zip_resolver_namespaced() {
        let file = fixture_archive();
        let resolver = ZipResolver::open(file.path()).unwrap();
        let sub = resolver.namespaced("repo-abc/models").unwrap();

        assert_eq!(sub.keys(), vec!["cube.obj".to_string()]);
        assert_eq!(sub.get("cube.obj").unwrap(), b"v 0 0 0\n");
        // Sibling directory through a parent reference.
        assert_eq!(
            sub.get("../textures/checker.png").unwrap(),
            b"not-a-real-png"
        );
        assert!(sub.get("../../../outside").is_err());
    }

    #[test]
    fn test_dir_resolver() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.xyz"), b"0 0 0\n").unwrap();

        let resolver = DirResolver::new(dir.path());
        assert!(resolver.exists("a.xyz"));
        assert_eq!(resolver.get("a.xyz").unwrap(), b"0 0 0\n");
        assert!(resolver.get("b.xyz").is_err());
    }

    #[test]
    fn test_github_resolver_rejects_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GithubResolver::new("no-slash", "abc123", dir.path()).is_err());
        assert!(GithubResolver::new("a/b", "not-hex!", dir.path()).is_err());
    }

    #[test]
    fn test_github_resolver_reuses_cached_archive() {
        // A pre-seeded cache file must short-circuit the download entirely.
        let dir = tempfile::tempdir().unwrap();
        let commit = "aa".repeat(20);
        let cached = dir.path().join(format!("owner-repo-{commit}.zip"));

        let mut writer = zip::ZipWriter::new(File::create(&cached).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        writer
            .start_file(format!("repo-{commit}/box.off"), options)
            .unwrap();
        writer.write_all(b"OFF\n1 0 0\n0 0 0\n").unwrap();
        writer.finish().unwrap();

        let resolver = GithubResolver::new("owner/repo", &commit, dir.path()).unwrap();
        assert_eq!(resolver.keys().len(), 1);
        assert_eq!(resolver.archive_path(), cached.as_path());
        assert!(resolver.exists(&format!("repo-{commit}/box.off")));
    }
}
