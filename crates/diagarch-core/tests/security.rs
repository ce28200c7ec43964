//! Hostile archive tests: every attack must stay inside the work directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use diagarch_core::CategoryPathResolver;
use diagarch_core::CategorySpec;
use diagarch_core::Compression;
use diagarch_core::IngestConfig;
use diagarch_core::IngestError;
use diagarch_core::QuotaResource;
use diagarch_core::extract_bundle;
use diagarch_core::test_utils::TarTestBuilder;
use diagarch_core::test_utils::write_archive;
use diagarch_core::validate_archive;
use diagarch_core::types::DestDir;
use diagarch_core::types::SafePath;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Extracts `data` into `<temp>/work`, with a canary file next to it.
fn extract_hostile(
    data: &[u8],
    config: &IngestConfig,
) -> (TempDir, diagarch_core::Result<diagarch_core::ExtractedBundle>) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("canary"), "untouched").unwrap();
    let archive = write_archive(temp.path(), "hostile.tar.gz", data, Compression::Gzip);
    let handle = validate_archive(&archive).unwrap();
    let result = extract_bundle(&handle, temp.path().join("work"), config);
    (temp, result)
}

fn assert_canary(temp: &Path) {
    assert_eq!(fs::read_to_string(temp.join("canary")).unwrap(), "untouched");
}

#[test]
fn test_parent_traversal_members() {
    let data = TarTestBuilder::new()
        .add_file("sos/ok", b"ok")
        .add_raw_file(b"../canary", b"overwritten")
        .add_raw_file(b"sos/../../canary", b"overwritten")
        .add_raw_file(b"./../canary", b"overwritten")
        .build();

    let (temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_eq!(extracted.report.entries_skipped, 3);
    assert_canary(temp.path());
}

#[test]
#[cfg(unix)]
fn test_symlink_to_parent_then_write_through() {
    // The link is rejected, so the file is written into a real directory.
    let data = TarTestBuilder::new()
        .add_directory("sos/")
        .add_symlink("sos/out", "../..")
        .add_file("sos/out/canary", b"overwritten")
        .build();

    let (temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_canary(temp.path());
    assert!(extracted.root.join("out").is_dir());
    assert_eq!(
        fs::read_to_string(extracted.root.join("out/canary")).unwrap(),
        "overwritten"
    );
}

#[test]
#[cfg(unix)]
fn test_symlink_chain_escape() {
    // `l2` is a valid link to a sibling directory; `l1` then tries to climb
    // out through it. Lexically `sos/l2/../../x` stays inside, but on disk
    // `l2/..` is the parent of the link's target.
    let data = TarTestBuilder::new()
        .add_directory("sos/")
        .add_directory("sos/a/b/")
        .add_symlink("sos/l2", "a/b")
        .add_symlink("sos/l1", "l2/../../../canary")
        .build();

    let (temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_eq!(extracted.report.symlinks_created, 1);
    assert!(fs::symlink_metadata(extracted.root.join("l1")).is_err());
    assert_canary(temp.path());
}

#[test]
#[cfg(unix)]
fn test_symlink_parent_is_symlink() {
    let data = TarTestBuilder::new()
        .add_directory("sos/")
        .add_directory("sos/real/")
        .add_symlink("sos/alias", "real")
        .add_symlink("sos/alias/link", "../x")
        .build();

    let (_temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_eq!(extracted.report.symlinks_created, 1);
    assert_eq!(extracted.report.entries_skipped, 1);
    assert!(fs::symlink_metadata(extracted.root.join("real/link")).is_err());
}

#[test]
#[cfg(unix)]
fn test_existing_symlink_not_written_through() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("canary"), "untouched").unwrap();
    let work = temp.path().join("work");
    fs::create_dir_all(work.join("sos")).unwrap();
    std::os::unix::fs::symlink(temp.path().join("canary"), work.join("sos/hostname")).unwrap();

    let data = TarTestBuilder::new().add_file("sos/hostname", b"web01").build();
    let archive = write_archive(temp.path(), "b.tar", &data, Compression::None);
    let handle = validate_archive(&archive).unwrap();
    let extracted = extract_bundle(&handle, &work, &IngestConfig::default()).unwrap();

    assert_canary(temp.path());
    let meta = fs::symlink_metadata(extracted.root.join("hostname")).unwrap();
    assert!(meta.is_file());
}

#[test]
#[cfg(unix)]
fn test_planted_directory_symlink_blocks_members() {
    let temp = TempDir::new().unwrap();
    let outside = temp.path().join("outside");
    fs::create_dir(&outside).unwrap();
    let work = temp.path().join("work");
    fs::create_dir_all(work.join("sos")).unwrap();
    std::os::unix::fs::symlink(&outside, work.join("sos/etc")).unwrap();

    let dest = DestDir::new(&work).unwrap();
    let result = SafePath::validate(Path::new("sos/etc/fstab"), &dest, &IngestConfig::default());
    assert!(matches!(result, Err(IngestError::PathTraversal { .. })));

    let data = TarTestBuilder::new()
        .add_file("sos/etc/fstab", b"planted")
        .add_file("sos/hostname", b"web01")
        .build();
    let archive = write_archive(temp.path(), "b.tar", &data, Compression::None);
    let handle = validate_archive(&archive).unwrap();
    let extracted = extract_bundle(&handle, &work, &IngestConfig::default()).unwrap();

    assert_eq!(extracted.report.entries_skipped, 1);
    assert!(!outside.join("fstab").exists());
}

#[test]
fn test_hardlink_outside_rejected() {
    let data = TarTestBuilder::new()
        .add_file("sos/ok", b"ok")
        .add_hardlink("sos/passwd", "../../etc/passwd")
        .add_hardlink("sos/canary", "/canary")
        .build();

    let (temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_eq!(extracted.report.hardlinks_created, 0);
    assert_eq!(extracted.report.entries_skipped, 2);
    assert!(!extracted.root.join("passwd").exists());
    assert!(!extracted.root.join("canary").exists());
    assert_canary(temp.path());
}

#[test]
#[cfg(unix)]
fn test_hardlink_to_symlink_rejected() {
    // `up` climbs exactly to dest from its own directory. A hardlink copies
    // the link inode into `sos/`, where the same target lands on the host.
    let escape = format!("{}etc/passwd", "../".repeat(10));
    let data = TarTestBuilder::new()
        .add_directory("sos/")
        .add_directory("sos/a/b/c/d/e/f/g/h/i/")
        .add_symlink("sos/a/b/c/d/e/f/g/h/i/up", &escape)
        .add_hardlink("sos/passwd", "sos/a/b/c/d/e/f/g/h/i/up")
        .build();

    let (temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_eq!(extracted.report.symlinks_created, 1);
    assert_eq!(extracted.report.hardlinks_created, 0);
    assert_eq!(extracted.report.entries_skipped, 1);
    assert!(extracted.report.warnings[0].contains("hardlink"));
    assert!(fs::symlink_metadata(extracted.root.join("passwd")).is_err());
    assert_canary(temp.path());

    let resolver = CategoryPathResolver::new(extracted.root);
    let passwd = resolver.resolve(&CategorySpec::new("passwd").exact("passwd"));
    assert!(passwd.is_empty());
}

#[test]
fn test_path_depth_bomb() {
    let deep = (0..80).map(|i| format!("d{i}")).collect::<Vec<_>>().join("/");
    let data = TarTestBuilder::new()
        .add_file("sos/ok", b"ok")
        .add_file(&format!("sos/{deep}/f"), b"deep")
        .build();

    let (_temp, result) = extract_hostile(&data, &IngestConfig::default());
    let extracted = result.unwrap();
    assert_eq!(extracted.report.entries_skipped, 1);
    assert!(extracted.report.warnings[0].contains("depth"));
}

#[test]
fn test_compression_bomb_hits_total_quota() {
    // Highly compressible payload: small on disk, large once inflated.
    let block = vec![0u8; 256 * 1024];
    let builder = (0..8).fold(TarTestBuilder::new(), |b, i| {
        b.add_file(&format!("sos/zeros{i}"), &block)
    });
    let data = builder.build();
    let config = IngestConfig::default().with_max_total_size(1024 * 1024);

    let (_temp, result) = extract_hostile(&data, &config);
    match result {
        Err(IngestError::QuotaExceeded {
            resource: QuotaResource::TotalSize { max, .. },
        }) => assert_eq!(max, 1024 * 1024),
        other => panic!("expected total size quota, got {other:?}"),
    }
}

#[test]
fn test_file_count_quota() {
    let builder = (0..20).fold(TarTestBuilder::new(), |b, i| {
        b.add_file(&format!("sos/f{i}"), b"x")
    });
    let config = IngestConfig::default().with_max_file_count(10);

    let (_temp, result) = extract_hostile(&builder.build(), &config);
    assert!(matches!(
        result,
        Err(IngestError::QuotaExceeded {
            resource: QuotaResource::FileCount { max: 10, .. }
        })
    ));
}

#[test]
fn test_directory_flood_counts_against_quota() {
    let builder = (0..20).fold(TarTestBuilder::new(), |b, i| {
        b.add_directory(&format!("sos/d{i}/"))
    });
    let config = IngestConfig::default().with_max_file_count(10);

    let (_temp, result) = extract_hostile(&builder.build(), &config);
    assert!(matches!(
        result,
        Err(IngestError::QuotaExceeded {
            resource: QuotaResource::FileCount { max: 10, .. }
        })
    ));
}
