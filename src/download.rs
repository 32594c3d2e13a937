use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use reqwest::blocking::Client;
use tempfile::NamedTempFile;
use crate::error::Error;
use crate::global::cache::{target_dir, CacheIndex};
use crate::listing::ReleaseEntry;

/// A resolved entry together with the cache path its archive belongs at.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub entry: ReleaseEntry,
    pub local_cache_path: PathBuf,
}

impl ResolvedTarget {
    pub fn new(entry: ReleaseEntry, cache_root: &Path) -> ResolvedTarget {
        let local_cache_path = target_dir(cache_root, &entry.source_url).join(&entry.raw_name);
        ResolvedTarget {
            entry,
            local_cache_path,
        }
    }
}

/// Downloads a resolved target into the cache, or skips entirely on a hit.
///
/// The archive is streamed to a temporary file in the target directory and
/// renamed into place only after the byte count matches the announced
/// length, so concurrent readers see either no file or a complete one. The
/// index is updated last; an interrupted download leaves neither.
pub fn download(
    client: &Client,
    target: &ResolvedTarget,
    index: &mut CacheIndex,
    quiet: bool,
) -> Result<PathBuf, Error> {
    let url = &target.entry.source_url;

    if let Some(cached) = index.lookup(url) {
        info!("cache hit for {url}");
        return Ok(cached);
    }
    // a complete archive can exist without an index entry when a previous
    // run was interrupted between rename and index write; adopt it
    if target.local_cache_path.is_file() {
        info!("adopting existing archive {}", target.local_cache_path.display());
        index.insert(url, &target.local_cache_path)?;
        return Ok(target.local_cache_path.clone());
    }

    let mut response = client.get(url).send().map_err(|e| Error::Network {
        url: url.to_string(),
        detail: e.to_string(),
    })?;
    if let Some(err) = Error::from_status(url, response.status()) {
        return Err(err);
    }
    let expected = response.content_length();

    let dest_dir = target
        .local_cache_path
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let progress = progress_bar(expected, &target.entry.raw_name, quiet);
    let path = stream_into(
        &mut response,
        &dest_dir,
        &target.entry.raw_name,
        expected,
        url,
        &progress,
    )?;
    progress.finish_and_clear();

    index.insert(url, &path)?;
    Ok(path)
}

/// Streams `reader` to `dest_dir/file_name` through a temporary file in the
/// same directory, verifying the expected length before the atomic rename.
/// On any failure the temporary file is removed and nothing exists at the
/// final path.
pub fn stream_into(
    reader: &mut dyn Read,
    dest_dir: &Path,
    file_name: &str,
    expected: Option<u64>,
    source: &str,
    progress: &ProgressBar,
) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(dest_dir)?;
    let mut temp = NamedTempFile::new_in(dest_dir)?;
    let temp_path = temp.path().to_path_buf();

    let mut buf = [0u8; 8192];
    let mut written: u64 = 0;
    loop {
        let n = reader.read(&mut buf).map_err(|e| Error::Network {
            url: source.to_string(),
            detail: format!("connection lost after {written} bytes: {e}"),
        })?;
        if n == 0 {
            break;
        }
        temp.as_file_mut().write_all(&buf[..n]).map_err(|e| {
            if e.kind() == std::io::ErrorKind::StorageFull {
                Error::DiskFull {
                    path: temp_path.clone(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        written += n as u64;
        progress.inc(n as u64);
        if let Some(total) = expected {
            if written >= total {
                break;
            }
        }
    }

    if let Some(total) = expected {
        if written != total {
            return Err(Error::Network {
                url: source.to_string(),
                detail: format!("expected {total} bytes, received {written}"),
            });
        }
    }

    let final_path = dest_dir.join(file_name);
    temp.persist(&final_path).map_err(|e| Error::Io(e.error))?;
    Ok(final_path)
}

fn progress_bar(len: Option<u64>, name: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    // 10 redraws per second at most, so slow terminals don't drown
    let pb = ProgressBar::with_draw_target(len, ProgressDrawTarget::stderr_with_hz(10));
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:32.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    pb.set_message(name.to_string());
    pb
}
