//! The store service: namespace resolution in front of the version store.
//!
//! Every entry point (REST handlers, CLI) goes through [`StoreService`], so uploads and lookups run
//! the same pipeline: resolve the namespace directory, split the logical file name, then call the
//! matching [`VersionStore`] operation.

use crate::config::CoreConfig;
use crate::namespace::Namespace;
use crate::StoreResult;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use vstore_files::{ArtifactDescriptor, LogicalName, VersionStore};

#[derive(Debug, Clone)]
pub struct StoreService {
    store: VersionStore,
}

impl StoreService {
    /// Ensures the configured storage root exists and opens the store on it.
    ///
    /// Run once at startup, before accepting requests.
    pub fn initialise(cfg: &CoreConfig) -> StoreResult<Self> {
        let store = VersionStore::open(cfg.storage_root(), cfg.store_options())?;
        Ok(Self { store })
    }

    pub fn storage_root(&self) -> &Path {
        self.store.root()
    }

    pub fn directory(&self, namespace: &Namespace) -> PathBuf {
        namespace.directory(self.store.root())
    }

    /// Commits `content` as the next version of `original_file_name` in `namespace`.
    pub fn commit<R: Read>(
        &self,
        namespace: &Namespace,
        original_file_name: &str,
        content: R,
    ) -> StoreResult<ArtifactDescriptor> {
        let descriptor =
            self.store
                .commit(&self.directory(namespace), original_file_name, content)?;

        tracing::debug!(
            namespace = %namespace,
            file = %descriptor.file_name,
            "upload stored"
        );

        Ok(descriptor)
    }

    /// Latest version of `file_name` (e.g. `report.pdf`) in `namespace`.
    pub fn latest(&self, namespace: &Namespace, file_name: &str) -> StoreResult<ArtifactDescriptor> {
        let name = LogicalName::parse(file_name)?;
        Ok(self
            .store
            .resolve_latest(&self.directory(namespace), name.stem(), name.extension())?)
    }

    /// Version `version` of `file_name` in `namespace`.
    pub fn version(
        &self,
        namespace: &Namespace,
        file_name: &str,
        version: u64,
    ) -> StoreResult<ArtifactDescriptor> {
        let name = LogicalName::parse(file_name)?;
        Ok(self.store.resolve_version(
            &self.directory(namespace),
            name.stem(),
            name.extension(),
            version,
        )?)
    }

    /// Every version of `file_name` in `namespace`, oldest first.
    pub fn history(
        &self,
        namespace: &Namespace,
        file_name: &str,
    ) -> StoreResult<Vec<ArtifactDescriptor>> {
        let name = LogicalName::parse(file_name)?;
        Ok(self
            .store
            .versions(&self.directory(namespace), name.stem(), name.extension())?)
    }

    /// Raw listing of the namespace directory.
    pub fn list(&self, namespace: &Namespace) -> StoreResult<Vec<String>> {
        Ok(self.store.list(&self.directory(namespace))?)
    }

    pub fn open_artifact(&self, descriptor: &ArtifactDescriptor) -> StoreResult<File> {
        Ok(self.store.open_artifact(descriptor)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, StoreError};
    use std::fs;
    use tempfile::TempDir;

    fn service(temp: &TempDir) -> StoreService {
        let cfg = CoreConfig::new(temp.path().join("uploads"), true, 1024 * 1024).unwrap();
        StoreService::initialise(&cfg).unwrap()
    }

    #[test]
    fn test_initialise_creates_root() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);

        assert!(svc.storage_root().is_dir());
        assert!(svc.storage_root().ends_with("uploads"));
    }

    #[test]
    fn test_invoice_walkthrough() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);
        let alice = Namespace::new("alice", "invoices").unwrap();

        svc.commit(&alice, "report.pdf", &b"january"[..]).unwrap();
        svc.commit(&alice, "report.pdf", &b"february"[..]).unwrap();

        let latest = svc.latest(&alice, "report.pdf").unwrap();
        assert_eq!(latest.file_name, "report_v2.pdf");
        assert_eq!(
            latest.full_path,
            svc.storage_root()
                .join("alice")
                .join("invoices")
                .join("report_v2.pdf")
        );

        let first = svc.version(&alice, "report.pdf", 1).unwrap();
        assert_eq!(first.file_name, "report_v1.pdf");
        assert_eq!(fs::read(&first.full_path).unwrap(), b"january");

        assert_eq!(
            svc.list(&alice).unwrap(),
            vec!["report_v1.pdf", "report_v2.pdf"]
        );

        let history: Vec<u64> = svc
            .history(&alice, "report.pdf")
            .unwrap()
            .into_iter()
            .map(|d| d.version)
            .collect();
        assert_eq!(history, vec![1, 2]);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);
        let alice = Namespace::new("alice", "invoices").unwrap();
        let bob = Namespace::new("bob", "invoices").unwrap();

        svc.commit(&alice, "report.pdf", &b"a"[..]).unwrap();
        let bobs = svc.commit(&bob, "report.pdf", &b"b"[..]).unwrap();

        assert_eq!(bobs.version, 1);
        assert_eq!(svc.latest(&alice, "report.pdf").unwrap().version, 1);
    }

    #[test]
    fn test_default_namespace_layout() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);
        let ns = Namespace::with_defaults(None, None).unwrap();

        let descriptor = svc.commit(&ns, "notes.txt", &b"hi"[..]).unwrap();

        assert!(descriptor
            .full_path
            .ends_with("defaultUser/uncategorized/notes_v1.txt"));
    }

    #[test]
    fn test_error_kinds_surface() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);
        let ns = Namespace::new("alice", "invoices").unwrap();

        let missing = svc.latest(&ns, "report.pdf").unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let bad_name = svc.latest(&ns, "../report.pdf").unwrap_err();
        assert_eq!(bad_name.kind(), ErrorKind::InvalidUpload);

        let empty_name = svc.commit(&ns, "", &b"x"[..]).unwrap_err();
        assert_eq!(empty_name.kind(), ErrorKind::InvalidUpload);

        let no_namespace = svc.list(&ns).unwrap_err();
        assert!(matches!(no_namespace, StoreError::Files(_)));
        assert_eq!(no_namespace.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_open_artifact_reads_content() {
        let temp = TempDir::new().unwrap();
        let svc = service(&temp);
        let ns = Namespace::new("alice", "invoices").unwrap();

        svc.commit(&ns, "report.pdf", &b"contents"[..]).unwrap();
        let latest = svc.latest(&ns, "report.pdf").unwrap();

        let mut read_back = String::new();
        svc.open_artifact(&latest)
            .unwrap()
            .read_to_string(&mut read_back)
            .unwrap();
        assert_eq!(read_back, "contents");
    }
}
