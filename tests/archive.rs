// ABOUTME: Integration tests for archive extraction.
// ABOUTME: Builds zip and gzip-tar fixtures on the fly and extracts them to temp dirs.

mod support;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use support::{sample_files, tgz_bytes, zip_bytes};
use webapp_deploy::archive::{ArchiveError, ArchiveKind, extract};
use webapp_deploy::types::ExcludePattern;

fn files_under(dir: &Path) -> BTreeSet<String> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn extract_fixture(
    name: &str,
    bytes: &[u8],
    exclude: Option<&str>,
) -> (tempfile::TempDir, Result<webapp_deploy::archive::ExtractReport, ArchiveError>) {
    support::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join(name);
    fs::write(&source, bytes).unwrap();
    let dest = dir.path().join("out");
    fs::create_dir(&dest).unwrap();

    let pattern = exclude.map(|p| ExcludePattern::new(p).unwrap());
    let kind = ArchiveKind::from_name(name).unwrap();
    let report = extract(&source, kind, &dest, pattern.as_ref());
    (dir, report)
}

mod zip_archives {
    use super::*;

    #[test]
    fn extracts_every_file_without_pattern() {
        let (dir, report) = extract_fixture("app.zip", &zip_bytes(&sample_files()), None);
        let report = report.unwrap();

        assert_eq!(
            files_under(&dir.path().join("out")),
            set(&["README.md", "index.js", "index.js.map"])
        );
        assert_eq!(report.extracted.len(), 3);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn exclude_pattern_skips_source_maps() {
        let (dir, report) =
            extract_fixture("app.zip", &zip_bytes(&sample_files()), Some(r"\.map$"));
        let report = report.unwrap();

        assert_eq!(
            files_under(&dir.path().join("out")),
            set(&["README.md", "index.js"])
        );
        assert_eq!(report.skipped, vec!["index.js.map".to_string()]);
    }

    #[test]
    fn nested_entries_create_parent_directories() {
        let files: Vec<(&str, &[u8])> = vec![
            ("index.html", b"<html></html>"),
            ("assets/css/site.css", b"body{}"),
        ];
        let (dir, report) = extract_fixture("site.zip", &zip_bytes(&files), None);
        report.unwrap();

        let css = fs::read_to_string(dir.path().join("out/assets/css/site.css")).unwrap();
        assert_eq!(css, "body{}");
    }

    #[test]
    fn leading_dot_slash_is_stripped() {
        let files: Vec<(&str, &[u8])> = vec![("./index.html", b"<html></html>")];
        let (dir, report) = extract_fixture("app.zip", &zip_bytes(&files), None);
        let report = report.unwrap();

        assert_eq!(report.extracted, vec!["index.html".to_string()]);
        assert!(dir.path().join("out/index.html").is_file());
    }

    #[test]
    fn traversal_entry_is_rejected() {
        let files: Vec<(&str, &[u8])> = vec![("../escape.txt", b"nope")];
        let (dir, report) = extract_fixture("evil.zip", &zip_bytes(&files), None);

        assert!(matches!(report, Err(ArchiveError::UnsafeEntryPath(_))));
        assert!(!dir.path().join("escape.txt").exists());
    }
}

mod gzip_tar_archives {
    use super::*;

    #[test]
    fn extracts_every_file_without_pattern() {
        let (dir, report) = extract_fixture("app.tgz", &tgz_bytes(&sample_files()), None);
        report.unwrap();

        assert_eq!(
            files_under(&dir.path().join("out")),
            set(&["README.md", "index.js", "index.js.map"])
        );
    }

    #[test]
    fn exclude_pattern_skips_source_maps() {
        let (dir, report) =
            extract_fixture("app.tar.gz", &tgz_bytes(&sample_files()), Some(r"\.map$"));
        report.unwrap();

        assert_eq!(
            files_under(&dir.path().join("out")),
            set(&["README.md", "index.js"])
        );
    }

    #[test]
    fn entry_contents_survive_extraction_by_offset() {
        let big = vec![b'x'; 70_000];
        let small = b"tiny".to_vec();
        let files: Vec<(&str, &[u8])> = vec![
            ("js/big.js", big.as_slice()),
            ("small.txt", small.as_slice()),
            ("index.html", b"<html></html>".as_slice()),
        ];
        let (dir, report) = extract_fixture("app.tgz", &tgz_bytes(&files), None);
        report.unwrap();

        let out = dir.path().join("out");
        assert_eq!(fs::read(out.join("js/big.js")).unwrap(), big);
        assert_eq!(fs::read(out.join("small.txt")).unwrap(), small);
        assert_eq!(fs::read(out.join("index.html")).unwrap(), b"<html></html>");
    }

    #[test]
    fn decompressed_copy_does_not_outlive_extraction() {
        let (dir, report) = extract_fixture("app.tgz", &tgz_bytes(&sample_files()), None);
        report.unwrap();

        let beside_archive: BTreeSet<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(beside_archive, set(&["app.tgz", "out"]));
    }

    #[test]
    fn corrupt_archive_fails() {
        let (_dir, report) = extract_fixture("app.tgz", b"definitely not gzip", None);
        assert!(report.is_err());
    }
}

#[test]
fn unsupported_extension_is_rejected_before_reading() {
    let err = ArchiveKind::from_name("app.rar").unwrap_err();
    assert!(matches!(err, ArchiveError::UnsupportedArchiveFormat(_)));
}
