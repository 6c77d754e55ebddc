// src/extension/mod.rs
// =============================================================================
// This module packages the companion browser extension.
//
// The extension is two files:
// - manifest.json: declares the bookmarks permission and the toolbar button
// - background.js: on click, posts every bookmark URL to our ingest endpoint
//
// Copies of both are compiled into the binary (see assets/extension/). A
// directory with replacements can be configured with `extension_dir`.
//
// The files as written talk to localhost:5000. pointed_at() rewrites that to
// wherever the ingest endpoint is actually listening.
// =============================================================================

use crate::error::{Error, Result};
use std::fs;
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name users get when they download the extension
pub const ARCHIVE_NAME: &str = "bookmark_analyzer_extension.zip";

/// Host and port the extension files are written against
const DEFAULT_LOCALHOST: &str = "localhost:5000";
const DEFAULT_LOOPBACK: &str = "127.0.0.1:5000";

/// The files that make up the extension, in archive order
pub const EXTENSION_FILES: [&str; 2] = ["manifest.json", "background.js"];

const BUNDLED_MANIFEST: &[u8] = include_bytes!("../../assets/extension/manifest.json");
const BUNDLED_BACKGROUND: &[u8] = include_bytes!("../../assets/extension/background.js");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionBundle {
    files: Vec<(String, Vec<u8>)>,
}

impl ExtensionBundle {
    /// The copies compiled into the binary
    pub fn bundled() -> Self {
        Self {
            files: vec![
                (EXTENSION_FILES[0].to_string(), BUNDLED_MANIFEST.to_vec()),
                (EXTENSION_FILES[1].to_string(), BUNDLED_BACKGROUND.to_vec()),
            ],
        }
    }

    /// Reads both files from `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let files = EXTENSION_FILES
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::read(&path)
                    .map(|bytes| (name.to_string(), bytes))
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { files })
    }

    /// Uses `dir` when configured, the bundled copies otherwise
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::bundled()),
        }
    }

    /// Rewrites the endpoint and host permissions for an ingest endpoint
    /// bound to `bind_addr`
    ///
    /// An unspecified or loopback IP (0.0.0.0, 127.0.0.1, ::1) is reached by
    /// the browser as `localhost`; any other host is used as written.
    pub fn pointed_at(mut self, bind_addr: &str) -> Self {
        let Some((host, port)) = extension_host(bind_addr) else {
            log::warn!(
                "bind_addr '{}' has no port, the extension keeps posting to {}",
                bind_addr,
                DEFAULT_LOCALHOST
            );
            return self;
        };

        let endpoint = format!("{}:{}", host, port);
        let loopback = format!("127.0.0.1:{}", port);

        for (name, bytes) in &mut self.files {
            // Only text files can carry the address
            let Ok(text) = std::str::from_utf8(bytes) else {
                continue;
            };
            let rewritten = text
                .replace(DEFAULT_LOCALHOST, &endpoint)
                .replace(DEFAULT_LOOPBACK, &loopback);
            if rewritten != text {
                log::debug!("Pointed {} at {}", name, endpoint);
                *bytes = rewritten.into_bytes();
            }
        }

        self
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
    }

    /// Builds the zip archive in memory
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in self.files() {
            zip.start_file(name, options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Builds the archive and writes it to `path`
    pub fn write_zip(&self, path: &Path) -> Result<()> {
        let bytes = self.to_zip()?;
        fs::write(path, &bytes)?;
        log::info!("Wrote extension archive ({} bytes) to {}", bytes.len(), path.display());
        Ok(())
    }
}

// The (host, port) a browser should use to reach something bound to `bind_addr`
fn extension_host(bind_addr: &str) -> Option<(String, u16)> {
    if let Ok(addr) = bind_addr.parse::<SocketAddr>() {
        let ip = addr.ip();
        let host = if ip.is_unspecified() || ip.is_loopback() {
            "localhost".to_string()
        } else if addr.is_ipv6() {
            format!("[{}]", ip)
        } else {
            ip.to_string()
        };
        return Some((host, addr.port()));
    }

    // A host name such as "localhost:8080" or "my-box.lan:5000"
    let (host, port) = bind_addr.rsplit_once(':')?;
    let port = port.parse().ok()?;
    Some((host.to_string(), port))
}
