//! Request and response types shared by the vstore APIs.
//!
//! Field names are camelCase on the wire (`userId`, `fileName`, `latestFile`, ...).

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use vstore_core::ArtifactDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One committed artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRes {
    pub file_name: String,
    pub full_path: String,
    pub version: u64,
    /// RFC 3339 UTC timestamp
    pub committed_at: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl From<&ArtifactDescriptor> for ArtifactRes {
    fn from(d: &ArtifactDescriptor) -> Self {
        Self {
            file_name: d.file_name.clone(),
            full_path: d.full_path.display().to_string(),
            version: d.version,
            committed_at: d.committed_at.to_rfc3339(),
            size_bytes: d.size_bytes,
            sha256: d.sha256.clone(),
            media_type: d.media_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestFileRes {
    pub latest_file: String,
    pub path: String,
    pub version: u64,
}

impl From<&ArtifactDescriptor> for LatestFileRes {
    fn from(d: &ArtifactDescriptor) -> Self {
        Self {
            latest_file: d.file_name.clone(),
            path: d.full_path.display().to_string(),
            version: d.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileVersionRes {
    pub file: String,
    pub path: String,
    pub version: u64,
}

impl From<&ArtifactDescriptor> for FileVersionRes {
    fn from(d: &ArtifactDescriptor) -> Self {
        Self {
            file: d.file_name.clone(),
            path: d.full_path.display().to_string(),
            version: d.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListFilesRes {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRes {
    pub versions: Vec<ArtifactRes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Multipart body of `POST /upload`. Documentation only; the handler reads the parts directly.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    /// Defaults to `defaultUser`
    pub user_id: Option<String>,
    /// Defaults to `uncategorized`
    pub category: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Query selecting a namespace.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NamespaceQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
}

/// Query selecting a logical file, optionally at a given version.
///
/// Every field is optional at the type level so missing parameters are reported with the API's own
/// error body rather than the extractor's.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
    /// Logical name, e.g. `report.pdf`
    pub file_name: Option<String>,
    pub version: Option<String>,
}
