//! File assets referenced by Lambda code.
//!
//! An asset is identified by the fingerprint of its contents. The template
//! refers to an asset only through three parameters (bucket, version key and
//! artifact hash) that the deployment tooling fills in after uploading.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::intrinsics;
use crate::template::Parameter;

/// Separator between the object key prefix and name inside the version key
/// parameter.
pub const KEY_SEPARATOR: &str = "||";

/// A local asset and the fingerprint of its contents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssetSource {
    pub path: String,
    pub fingerprint: String,
}

impl AssetSource {
    pub fn new(path: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fingerprint: fingerprint.into(),
        }
    }

    pub fn bucket_parameter(&self) -> String {
        format!("AssetParameters{}S3Bucket", self.fingerprint)
    }

    pub fn version_key_parameter(&self) -> String {
        format!("AssetParameters{}S3VersionKey", self.fingerprint)
    }

    pub fn artifact_hash_parameter(&self) -> String {
        format!("AssetParameters{}ArtifactHash", self.fingerprint)
    }

    /// Template parameters declared for this asset.
    pub fn parameters(&self) -> Vec<(String, Parameter)> {
        vec![
            (
                self.bucket_parameter(),
                string_parameter(format!("S3 bucket for asset \"{}\"", self.fingerprint)),
            ),
            (
                self.version_key_parameter(),
                string_parameter(format!("S3 key for asset version \"{}\"", self.fingerprint)),
            ),
            (
                self.artifact_hash_parameter(),
                string_parameter(format!("Artifact hash for asset \"{}\"", self.fingerprint)),
            ),
        ]
    }

    pub fn s3_bucket(&self) -> Value {
        intrinsics::reference(&self.bucket_parameter())
    }

    /// The S3 object key: both halves of the version key parameter, joined.
    pub fn s3_key(&self) -> Value {
        let version_key = || {
            intrinsics::split(
                KEY_SEPARATOR,
                intrinsics::reference(&self.version_key_parameter()),
            )
        };
        intrinsics::join(
            "",
            vec![
                intrinsics::select(0, version_key()),
                intrinsics::select(1, version_key()),
            ],
        )
    }

    pub fn manifest_entry(&self) -> AssetManifestEntry {
        AssetManifestEntry {
            id: self.fingerprint.clone(),
            path: self.path.clone(),
            packaging: "zip".to_string(),
            source_hash: self.fingerprint.clone(),
            s3_bucket_parameter: self.bucket_parameter(),
            s3_key_parameter: self.version_key_parameter(),
            artifact_hash_parameter: self.artifact_hash_parameter(),
        }
    }
}

fn string_parameter(description: String) -> Parameter {
    Parameter {
        parameter_type: "String".to_string(),
        description,
    }
}

/// One entry of `assets.json`, consumed by the upload tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifestEntry {
    pub id: String,
    pub path: String,
    pub packaging: String,
    pub source_hash: String,
    pub s3_bucket_parameter: String,
    pub s3_key_parameter: String,
    pub artifact_hash_parameter: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_names_embed_fingerprint() {
        let asset = AssetSource::new("lambda", "abc123");
        assert_eq!(asset.bucket_parameter(), "AssetParametersabc123S3Bucket");
        assert_eq!(
            asset.version_key_parameter(),
            "AssetParametersabc123S3VersionKey"
        );
        assert_eq!(
            asset.artifact_hash_parameter(),
            "AssetParametersabc123ArtifactHash"
        );
        assert_eq!(asset.parameters().len(), 3);
    }

    #[test]
    fn test_s3_key_joins_both_halves() {
        let asset = AssetSource::new("lambda", "abc123");
        let split = json!({"Fn::Split": ["||", {"Ref": "AssetParametersabc123S3VersionKey"}]});
        assert_eq!(
            asset.s3_key(),
            json!({"Fn::Join": ["", [
                {"Fn::Select": [0, split.clone()]},
                {"Fn::Select": [1, split]}
            ]]})
        );
    }

    #[test]
    fn test_manifest_entry_serializes_camel_case() {
        let entry = AssetSource::new("lambda", "abc123").manifest_entry();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["packaging"], "zip");
        assert_eq!(value["s3BucketParameter"], "AssetParametersabc123S3Bucket");
        assert_eq!(value["sourceHash"], "abc123");
    }
}
