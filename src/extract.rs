use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use bzip2::read::BzDecoder;
use colored::Colorize;
use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;
use xz2::read::XzDecoder;
use zip::ZipArchive;
use crate::error::Error;
use crate::listing::archive_extension;
use crate::platform::Platform;

/// Fixed relative paths tried, in order, to find the executable inside an
/// extracted tree or a mounted disk image.
pub fn executable_candidates(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Linux => &["blender"],
        Platform::Windows => &["blender.exe"],
        Platform::MacOs => &[
            "Blender.app/Contents/MacOS/Blender",
            "Blender.app/Contents/MacOS/blender",
            "Contents/MacOS/Blender",
        ],
        Platform::Unknown => &[],
    }
}

/// Unpacks or mounts a downloaded archive and returns the resulting root.
///
/// Zip and tar archives extract to a sibling directory named after the
/// archive; disk images mount there on macOS. A destination that already
/// has content is returned as-is, so re-running against a cached archive
/// does no work. Formats this host cannot handle fail instead of silently
/// falling back.
pub fn extract(archive: &Path, quiet: bool) -> Result<PathBuf, Error> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Unsupported(format!("invalid archive path {}", archive.display())))?;
    let extension = archive_extension(name)
        .ok_or_else(|| Error::Unsupported(format!("'{name}' is not a recognized archive")))?;

    let dest = archive
        .parent()
        .unwrap_or(Path::new("."))
        .join(name.strip_suffix(extension).unwrap_or(name));
    if dest.is_dir() && !dir_is_empty(&dest)? {
        debug!("reusing existing extraction at {}", dest.display());
        return Ok(normalize_root(dest));
    }

    if !quiet {
        eprintln!("{} '{}'", "Extracting".blue().bold(), name);
    }

    match extension {
        ".zip" => extract_zip(archive, &dest)?,
        ".tar.gz" => unpack_tar(GzDecoder::new(File::open(archive)?), &dest)?,
        ".tar.xz" => unpack_tar(XzDecoder::new(File::open(archive)?), &dest)?,
        ".tar.bz2" => unpack_tar(BzDecoder::new(File::open(archive)?), &dest)?,
        ".dmg" => return mount_dmg(archive, &dest),
        other => {
            return Err(Error::Unsupported(format!(
                "extraction is not supported for '{other}' archives"
            )));
        }
    }

    Ok(normalize_root(dest))
}

/// Finds the platform executable under an extraction root by the fixed
/// candidate list; the first existing file wins.
pub fn locate_executable(root: &Path, platform: Platform) -> Result<PathBuf, Error> {
    for candidate in executable_candidates(platform) {
        let path = root.join(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(Error::ExecutableNotFound {
        root: root.to_path_buf(),
    })
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), Error> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| Error::Unsupported(format!("unreadable zip {}: {e}", archive.display())))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::Unsupported(format!("corrupt zip entry: {e}")))?;
        let Some(rel) = entry.enclosed_name() else {
            continue;
        };
        let out = dest.join(rel);
        if entry.is_dir() {
            std::fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&out)?;
        std::io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}

fn unpack_tar<R: std::io::Read>(decoder: R, dest: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(dest)?;
    let mut archive = Archive::new(decoder);
    archive.unpack(dest)?;
    Ok(())
}

/// Mounts a disk image at the sibling directory and returns the mount
/// point. Only macOS can do this; anywhere else is a hard error rather
/// than a silent fallback to extraction.
fn mount_dmg(archive: &Path, mount_point: &Path) -> Result<PathBuf, Error> {
    if !cfg!(target_os = "macos") {
        return Err(Error::Unsupported(format!(
            "mounting '{}' requires macOS",
            archive.display()
        )));
    }
    if mount_point.is_dir() && !dir_is_empty(mount_point)? {
        debug!("reusing mounted image at {}", mount_point.display());
        return Ok(mount_point.to_path_buf());
    }
    std::fs::create_dir_all(mount_point)?;
    let output = Command::new("hdiutil")
        .arg("attach")
        .arg(archive)
        .arg("-nobrowse")
        .arg("-quiet")
        .arg("-mountpoint")
        .arg(mount_point)
        .output()?;
    if !output.status.success() {
        return Err(Error::Io(std::io::Error::other(format!(
            "hdiutil attach failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))));
    }
    Ok(mount_point.to_path_buf())
}

/// Archives usually hold one top-level directory; when they do, that
/// directory is the tree the caller cares about.
fn normalize_root(dest: PathBuf) -> PathBuf {
    let entries: Vec<PathBuf> = match std::fs::read_dir(&dest) {
        Ok(iter) => iter.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => return dest,
    };
    match entries.as_slice() {
        [single] if single.is_dir() => single.clone(),
        _ => dest,
    }
}

fn dir_is_empty(dir: &Path) -> Result<bool, Error> {
    Ok(std::fs::read_dir(dir)?.next().is_none())
}
