// src/harvest/path.rs
// Where a harvested file lands: <output_dir>/<host>/<extension>/<basename>

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use url::Url;

/// File name used when the URL path has no final segment (e.g. "https://a.test/").
pub const PLACEHOLDER_NAME: &str = "download";

const UNKNOWN_EXTENSION: &str = "unknown";
const UNKNOWN_HOST: &str = "unknown-host";

pub fn save_path(output_dir: &Path, url: &Url) -> PathBuf {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}_{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => UNKNOWN_HOST.to_string(),
    };

    let basename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(PLACEHOLDER_NAME);

    let extension = Path::new(basename)
        .extension()
        .and_then(OsStr::to_str)
        .filter(|ext| !ext.is_empty())
        .unwrap_or(UNKNOWN_EXTENSION);

    output_dir.join(host).join(extension).join(basename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_for(url: &str) -> PathBuf {
        save_path(Path::new("out"), &Url::parse(url).unwrap())
    }

    #[test]
    fn test_host_extension_basename() {
        assert_eq!(path_for("http://a.test/docs/doc.pdf"), Path::new("out/a.test/pdf/doc.pdf"));
    }

    #[test]
    fn test_query_is_not_part_of_basename() {
        assert_eq!(
            path_for("https://w3.org/TR/PNG/iso_8859-1.txt?raw=1"),
            Path::new("out/w3.org/txt/iso_8859-1.txt")
        );
    }

    #[test]
    fn test_empty_basename_uses_placeholder() {
        assert_eq!(path_for("https://a.test/files/"), Path::new("out/a.test/unknown/download"));
    }

    #[test]
    fn test_port_is_kept_apart_from_host() {
        assert_eq!(
            path_for("http://localhost:8080/data.csv"),
            Path::new("out/localhost_8080/csv/data.csv")
        );
    }
}
