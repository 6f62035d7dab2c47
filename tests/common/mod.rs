//! Common test utilities for astc-dl integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base path the mock store serves blobs under
pub const STORE_PATH: &str = "/IconCDN/android/";

/// Start a mock store serving `blobs` as `{id}_rgb.astc`; everything else is a 404
pub async fn mock_store(blobs: &[(&str, &str)]) -> MockServer {
    let server = MockServer::start().await;
    for (id, blob) in blobs {
        Mock::given(method("GET"))
            .and(path(format!("{STORE_PATH}{id}_rgb.astc")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(blob.as_bytes().to_vec()))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(u8::MAX)
        .mount(&server)
        .await;
    server
}

/// Base URL of the mock store, suitable for `ServerConfig`
pub fn store_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), STORE_PATH)
}

/// Write an executable stand-in for astcenc.
///
/// It writes `PNG:` followed by the input blob to the output path, and fails with a
/// message on stderr when the blob contains `corrupt`.
#[cfg(unix)]
pub fn fake_astcenc(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = r#"#!/bin/sh
if grep -q corrupt "$2"; then
    echo "ERROR: corrupt block data" >&2
    exit 1
fi
{ printf 'PNG:'; cat "$2"; } > "$3"
"#;
    let path = dir.join("astcenc");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Scratch space kept alive for the duration of a test
pub fn workdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Names of the entries in a zip archive, in archive order
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}
