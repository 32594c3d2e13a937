use std::fs::File;
use std::io::Write;
use std::path::Path;
use blendget::error::Error;
use blendget::extract::{extract, locate_executable};
use blendget::platform::Platform;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::tempdir;

fn make_targz(path: &Path, entries: &[(&str, &[u8], u32)]) {
    let file = File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, *name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

fn make_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, data) in entries {
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn tarball_extraction_finds_the_executable() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("blender-9.9.9-linux64.tar.gz");
    make_targz(
        &archive,
        &[
            ("blender-9.9.9-linux64/blender", b"#!/bin/true".as_slice(), 0o755),
            ("blender-9.9.9-linux64/readme.html", b"<html/>".as_slice(), 0o644),
        ],
    );

    let root = extract(&archive, true).unwrap();
    // the single top-level directory becomes the root
    assert!(root.ends_with("blender-9.9.9-linux64"));

    let executable = locate_executable(&root, Platform::Linux).unwrap();
    assert_eq!(executable, root.join("blender"));
    assert!(executable.is_file());
}

#[test]
fn archive_without_executable_is_an_error() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("blender-9.9.9-linux64.tar.gz");
    make_targz(
        &archive,
        &[("blender-9.9.9-linux64/readme.html", b"<html/>".as_slice(), 0o644)],
    );

    let root = extract(&archive, true).unwrap();
    let err = locate_executable(&root, Platform::Linux).unwrap_err();
    match err {
        Error::ExecutableNotFound { root: reported } => assert_eq!(reported, root),
        other => panic!("expected ExecutableNotFound, got {other:?}"),
    }
}

#[test]
fn zip_extraction_finds_the_windows_executable() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("blender-9.9.9-windows64.zip");
    make_zip(
        &archive,
        &[
            ("blender-9.9.9-windows64/blender.exe", b"MZ".as_slice()),
            ("blender-9.9.9-windows64/license.txt", b"GPL".as_slice()),
        ],
    );

    let root = extract(&archive, true).unwrap();
    let executable = locate_executable(&root, Platform::Windows).unwrap();
    assert!(executable.ends_with("blender.exe"));
}

#[test]
fn extraction_is_idempotent_for_cached_archives() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("blender-9.9.9-linux64.tar.gz");
    make_targz(
        &archive,
        &[("blender-9.9.9-linux64/blender", b"#!/bin/true".as_slice(), 0o755)],
    );

    let first = extract(&archive, true).unwrap();
    let second = extract(&archive, true).unwrap();
    assert_eq!(first, second);
    assert!(locate_executable(&second, Platform::Linux).is_ok());
}

#[test]
fn installer_formats_are_rejected() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("blender-9.9.9-windows64.msi");
    std::fs::write(&archive, b"not really an msi").unwrap();

    let err = extract(&archive, true).unwrap_err();
    match err {
        Error::Unsupported(message) => assert!(message.contains(".msi")),
        other => panic!("expected Unsupported, got {other:?}"),
    }
}

#[cfg(not(target_os = "macos"))]
#[test]
fn disk_images_cannot_be_mounted_off_macos() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("blender-9.9.9-macOS.dmg");
    std::fs::write(&archive, b"not really a dmg").unwrap();

    let err = extract(&archive, true).unwrap_err();
    match err {
        Error::Unsupported(message) => assert!(message.contains("macOS")),
        other => panic!("expected Unsupported, got {other:?}"),
    }
}
