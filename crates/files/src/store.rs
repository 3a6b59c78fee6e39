//! The version store.
//!
//! [`VersionStore`] commits uploads as `<stem>_v<N><ext>` artifacts and answers "latest" and
//! "specific version" queries by re-reading the directory. It keeps no state between calls apart
//! from the lock table used to serialise commits of the same logical file, so a restart loses
//! nothing.
//!
//! # Commit protocol
//!
//! 1. Validate the original name and split it into stem and extension
//! 2. Create the target directory if missing
//! 3. Take the per-key lock for `(directory, stem, extension)`: first the in-process table, then
//!    the `.lock-<stem><ext>` file lock shared with other processes
//! 4. Scan the directory for exact `<stem>_v<digits><ext>` matches and pick `max + 1`
//! 5. Stream the content into a hidden temporary file in the same directory and fsync it
//! 6. Hard-link the temporary file to its final name, then remove the temporary name. The link
//!    fails if the final name exists, so an artifact is never replaced
//! 7. Release both locks (guard drop, on every exit path)
//!
//! Readers never lock. Because the final name only appears through the link in step 6, a reader
//! either sees a complete artifact or none at all.

use crate::constants::{COPY_BUFFER_LEN, SNIFF_LEN};
use crate::lock::{FileLock, LockKey, LockTable};
use crate::naming::{is_lock_file_name, is_temp_file_name, temp_file_name, LogicalName};
use crate::{FilesError, FilesResult};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Upload policy applied by [`VersionStore::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Whether zero-byte uploads are committed (`true`) or rejected as `InvalidUpload`.
    pub allow_empty_uploads: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            allow_empty_uploads: true,
        }
    }
}

/// Description of one committed artifact.
///
/// `sha256` and `media_type` are only known at commit time, since resolves do not read content.
/// For resolves, `committed_at` is the artifact's modification time, which equals its commit time
/// because artifacts are never rewritten.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    /// On-disk name, e.g. `report_v2.pdf`
    pub file_name: String,

    /// Absolute path of the artifact
    pub full_path: PathBuf,

    /// Version token parsed from (or assigned to) the name
    pub version: u64,

    /// UTC commit time
    pub committed_at: DateTime<Utc>,

    /// Size of the artifact in bytes
    pub size_bytes: u64,

    /// Hexadecimal SHA-256 digest of the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Detected media type. Best effort, not authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Sequentially versioned artifact storage rooted at one directory.
///
/// Cloning is cheap and clones share the same lock table, so one store can be handed to many
/// request handlers.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    options: StoreOptions,
    locks: Arc<LockTable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScannedArtifact {
    file_name: String,
    version: u64,
}

struct WrittenContent {
    size_bytes: u64,
    sha256: String,
    head: Vec<u8>,
}

impl VersionStore {
    /// Opens the store, creating the storage root (and parents) if it does not exist.
    ///
    /// This is the one-time "ensure root exists" step and should run before any request is
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if the root exists but is not a directory, or
    /// cannot be created or canonicalised.
    pub fn open(root: &Path, options: StoreOptions) -> FilesResult<Self> {
        if root.exists() && !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        fs::create_dir_all(root).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create {}: {}",
                root.display(),
                e
            ))
        })?;

        let root = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        tracing::info!("storage root ready at {}", root.display());

        Ok(Self {
            root,
            options,
            locks: Arc::default(),
        })
    }

    /// The canonicalised storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Commits `content` as the next version of `original_file_name` in `directory`.
    ///
    /// # Errors
    ///
    /// - `FilesError::InvalidUpload` if the name is empty or unsafe, or the content is empty and
    ///   empty uploads are disabled
    /// - `FilesError::InvalidPath` if `directory` is outside the storage root
    /// - `FilesError::StorageIo` if the directory cannot be created or the artifact cannot be
    ///   written or renamed into place
    pub fn commit<R: Read>(
        &self,
        directory: &Path,
        original_file_name: &str,
        content: R,
    ) -> FilesResult<ArtifactDescriptor> {
        if original_file_name.trim().is_empty() {
            return Err(FilesError::InvalidUpload(
                "original file name is empty".into(),
            ));
        }
        let name = LogicalName::parse(original_file_name)
            .map_err(|e| FilesError::InvalidUpload(e.to_string()))?;
        self.ensure_within_root(directory)?;

        fs::create_dir_all(directory).map_err(|e| {
            io_context(
                e,
                format!("Failed to create directory {}", directory.display()),
            )
        })?;

        let _guard = self.locks.acquire(LockKey::new(directory, &name));
        let _file_lock = FileLock::acquire(directory, &name).map_err(|e| {
            io_context(e, format!("Failed to lock {name} in {}", directory.display()))
        })?;

        let next_version = match scan(directory, &name)?.iter().map(|a| a.version).max() {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                FilesError::InvalidUpload(format!("no versions left for {name}"))
            })?,
        };
        let file_name = name.artifact_name(next_version);
        let full_path = directory.join(&file_name);

        if fs::symlink_metadata(&full_path).is_ok() {
            return Err(FilesError::StorageIo(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Refusing to overwrite {}", full_path.display()),
            )));
        }

        let temp_path = directory.join(temp_file_name());
        let written = match write_temp(&temp_path, content) {
            Ok(written) => written,
            Err(e) => {
                discard_temp(&temp_path);
                return Err(e);
            }
        };

        if written.size_bytes == 0 && !self.options.allow_empty_uploads {
            discard_temp(&temp_path);
            return Err(FilesError::InvalidUpload(
                "empty uploads are not accepted".into(),
            ));
        }

        if let Err(e) = publish(&temp_path, &full_path) {
            discard_temp(&temp_path);
            return Err(e);
        }
        sync_directory(directory);

        tracing::info!(
            file = %file_name,
            version = next_version,
            size_bytes = written.size_bytes,
            "committed artifact"
        );

        Ok(ArtifactDescriptor {
            file_name,
            full_path,
            version: next_version,
            committed_at: Utc::now(),
            size_bytes: written.size_bytes,
            media_type: infer::get(&written.head).map(|t| t.mime_type().to_string()),
            sha256: Some(written.sha256),
        })
    }

    /// Returns the highest version of `<stem><extension>` in `directory`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotFound` if the directory does not exist or holds no version.
    pub fn resolve_latest(
        &self,
        directory: &Path,
        stem: &str,
        extension: &str,
    ) -> FilesResult<ArtifactDescriptor> {
        let name = LogicalName::from_parts(stem, extension)?;
        self.ensure_within_root(directory)?;

        let scanned = scan(directory, &name)?;
        let latest = pick_latest(&scanned).ok_or_else(|| {
            FilesError::NotFound(format!(
                "no versions of {} in {}",
                name,
                directory.display()
            ))
        })?;

        describe(directory, &latest.file_name, latest.version)
    }

    /// Returns version `version` of `<stem><extension>` in `directory`.
    ///
    /// This is an exact-name lookup and does not scan the directory.
    pub fn resolve_version(
        &self,
        directory: &Path,
        stem: &str,
        extension: &str,
        version: u64,
    ) -> FilesResult<ArtifactDescriptor> {
        let name = LogicalName::from_parts(stem, extension)?;
        self.ensure_within_root(directory)?;

        describe(directory, &name.artifact_name(version), version)
    }

    /// Returns every version of `<stem><extension>` in `directory`, oldest first.
    pub fn versions(
        &self,
        directory: &Path,
        stem: &str,
        extension: &str,
    ) -> FilesResult<Vec<ArtifactDescriptor>> {
        let name = LogicalName::from_parts(stem, extension)?;
        self.ensure_within_root(directory)?;

        let mut scanned = scan(directory, &name)?;
        scanned.sort_by(|a, b| {
            a.version
                .cmp(&b.version)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });

        scanned
            .iter()
            .map(|a| describe(directory, &a.file_name, a.version))
            .collect()
    }

    /// Lists the entry names of `directory`, sorted, without in-flight temporary files or lock
    /// files.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotFound` if the directory does not exist.
    pub fn list(&self, directory: &Path) -> FilesResult<Vec<String>> {
        self.ensure_within_root(directory)?;

        let mut names = Vec::new();
        for entry in read_dir(directory)? {
            let entry = entry.map_err(|e| {
                io_context(e, format!("Failed to list {}", directory.display()))
            })?;
            match entry.file_name().into_string() {
                Ok(name) if is_temp_file_name(&name) || is_lock_file_name(&name) => {}
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!("skipping non UTF-8 entry {:?} in {}", raw, directory.display())
                }
            }
        }
        names.sort();

        Ok(names)
    }

    /// Opens a committed artifact for reading.
    pub fn open_artifact(&self, descriptor: &ArtifactDescriptor) -> FilesResult<File> {
        self.ensure_within_root(&descriptor.full_path)?;

        File::open(&descriptor.full_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FilesError::NotFound(descriptor.file_name.clone())
            } else {
                io_context(
                    e,
                    format!("Failed to open {}", descriptor.full_path.display()),
                )
            }
        })
    }

    fn ensure_within_root(&self, path: &Path) -> FilesResult<()> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir));
        if escapes || !path.starts_with(&self.root) {
            return Err(FilesError::InvalidPath(format!(
                "{} is outside the storage root",
                path.display()
            )));
        }
        Ok(())
    }
}

fn read_dir(directory: &Path) -> FilesResult<fs::ReadDir> {
    fs::read_dir(directory).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            FilesError::NotFound(format!("Directory does not exist: {}", directory.display()))
        } else {
            io_context(e, format!("Failed to list {}", directory.display()))
        }
    })
}

/// Collects every entry of `directory` that is an artifact of `name`.
///
/// Entries whose token matches the pattern but does not fit a `u64` are skipped with a warning.
fn scan(directory: &Path, name: &LogicalName) -> FilesResult<Vec<ScannedArtifact>> {
    let mut found = Vec::new();

    for entry in read_dir(directory)? {
        let entry = entry
            .map_err(|e| io_context(e, format!("Failed to list {}", directory.display())))?;
        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };
        let Some(token) = name.match_token(&file_name) else {
            continue;
        };
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            tracing::warn!("skipping directory {} that looks like an artifact", file_name);
            continue;
        }

        match token.parse::<u64>() {
            Ok(version) => found.push(ScannedArtifact {
                version,
                file_name: file_name.clone(),
            }),
            Err(_) => tracing::warn!(
                "skipping {} in {}: version token is not a valid number",
                file_name,
                directory.display()
            ),
        }
    }

    Ok(found)
}

/// Highest version; on a duplicated token the lexicographically last name wins.
fn pick_latest(scanned: &[ScannedArtifact]) -> Option<&ScannedArtifact> {
    let latest = scanned
        .iter()
        .max_by(|a, b| a.version.cmp(&b.version).then_with(|| a.file_name.cmp(&b.file_name)))?;

    let duplicates = scanned.iter().filter(|a| a.version == latest.version).count();
    if duplicates > 1 {
        tracing::warn!(
            "{} artifacts share version {}; using {}",
            duplicates,
            latest.version,
            latest.file_name
        );
    }

    Some(latest)
}

fn describe(directory: &Path, file_name: &str, version: u64) -> FilesResult<ArtifactDescriptor> {
    let full_path = directory.join(file_name);

    let metadata = match fs::metadata(&full_path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(FilesError::NotFound(file_name.to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FilesError::NotFound(file_name.to_string()))
        }
        Err(e) => {
            return Err(io_context(
                e,
                format!("Failed to read metadata of {}", full_path.display()),
            ))
        }
    };

    let committed_at = metadata.modified().map(DateTime::<Utc>::from).map_err(|e| {
        io_context(
            e,
            format!("Failed to read modification time of {}", full_path.display()),
        )
    })?;

    Ok(ArtifactDescriptor {
        file_name: file_name.to_string(),
        full_path,
        version,
        committed_at,
        size_bytes: metadata.len(),
        sha256: None,
        media_type: None,
    })
}

fn write_temp<R: Read>(temp_path: &Path, mut content: R) -> FilesResult<WrittenContent> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| io_context(e, format!("Failed to create {}", temp_path.display())))?;

    let mut hasher = Sha256::new();
    let mut head = Vec::new();
    let mut buffer = vec![0u8; COPY_BUFFER_LEN];
    let mut size_bytes = 0u64;

    loop {
        let read = match content.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_context(e, "Failed to read upload content".into())),
        };
        let chunk = &buffer[..read];

        hasher.update(chunk);
        if head.len() < SNIFF_LEN {
            let take = (SNIFF_LEN - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }
        file.write_all(chunk)
            .map_err(|e| io_context(e, format!("Failed to write {}", temp_path.display())))?;
        size_bytes += read as u64;
    }

    file.sync_all()
        .map_err(|e| io_context(e, format!("Failed to sync {}", temp_path.display())))?;

    Ok(WrittenContent {
        size_bytes,
        sha256: hex::encode(hasher.finalize()),
        head,
    })
}

/// Gives the written temporary file its final name without ever replacing an existing file.
fn publish(temp_path: &Path, full_path: &Path) -> FilesResult<()> {
    fs::hard_link(temp_path, full_path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            FilesError::StorageIo(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Refusing to overwrite {}", full_path.display()),
            ))
        } else {
            io_context(
                e,
                format!("Failed to move upload into {}", full_path.display()),
            )
        }
    })?;

    discard_temp(temp_path);
    Ok(())
}

fn discard_temp(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("failed to remove {}: {}", temp_path.display(), e);
        }
    }
}

/// Persists the new directory entries. Best effort: not every platform can open a directory.
#[cfg(unix)]
fn sync_directory(directory: &Path) {
    if let Err(e) = File::open(directory).and_then(|d| d.sync_all()) {
        tracing::debug!("failed to sync directory {}: {}", directory.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_directory(_directory: &Path) {}

fn io_context(e: io::Error, message: String) -> FilesError {
    FilesError::StorageIo(io::Error::new(e.kind(), format!("{message}: {e}")))
}
