//! Chart archive handling: digests and unpacking

use std::path::{Component, Path};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tar::Archive;

use crate::error::{RepoError, Result};

/// Compute SHA256 digest of data
pub fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Check if two digests match, ignoring case and an algorithm prefix
pub fn digest_matches(expected: &str, actual: &str) -> bool {
    normalize_digest(expected) == normalize_digest(actual)
}

fn normalize_digest(digest: &str) -> String {
    let digest = digest.trim().to_lowercase();
    digest
        .strip_prefix("sha256:")
        .or_else(|| digest.strip_prefix("sha256-"))
        .unwrap_or(&digest)
        .to_string()
}

/// Unpack a gzipped tarball into `dest`
///
/// Entries with absolute paths or `..` components are refused rather than
/// skipped.
pub fn extract_archive(data: &[u8], dest: &Path) -> Result<()> {
    let extract_err = |message: String| RepoError::Extract {
        path: dest.display().to_string(),
        message,
    };

    std::fs::create_dir_all(dest)?;

    let mut archive = Archive::new(GzDecoder::new(data));
    let entries = archive.entries().map_err(|e| extract_err(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| extract_err(e.to_string()))?;
        let path = entry
            .path()
            .map_err(|e| extract_err(e.to_string()))?
            .into_owned();

        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(extract_err(format!(
                "entry {} escapes the destination",
                path.display()
            )));
        }

        entry
            .unpack_in(dest)
            .map_err(|e| extract_err(format!("{}: {}", path.display(), e)))?;
    }

    Ok(())
}
