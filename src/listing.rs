use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use chrono::NaiveDateTime;
use log::debug;
use regex::Regex;
use reqwest::blocking::Client;
use semver::Version;
use crate::error::Error;
use crate::platform::{Bits, Platform};
use crate::version::parse_file_version;

/// Official release tree, one directory per `major.minor` family.
pub const RELEASES_URL: &str = "https://download.blender.org/release/";
/// Daily-build archive listing.
pub const DAILY_URL: &str = "https://builder.blender.org/download/daily/archive/";

/// Archive extensions recognized as installable releases, longest first so
/// `.tar.xz` wins over a bare `.xz` suffix check.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.xz", ".tar.bz2", ".tar.gz", ".zip", ".dmg", ".msi", ".exe", ".snap", ".deb", ".rpm",
];

/// Returns the recognized archive extension of a filename, if any.
pub fn archive_extension(name: &str) -> Option<&'static str> {
    ARCHIVE_EXTENSIONS.iter().find(|ext| name.ends_with(*ext)).copied()
}

/// One installable archive parsed from a channel listing. Immutable once
/// parsed; `version` stays `None` for names with no parseable version so
/// they remain visible in listing mode without ever being selected.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseEntry {
    pub raw_name: String,
    pub version: Option<Version>,
    pub platform: Platform,
    pub bits: Bits,
    pub extension: String,
    pub source_url: String,
    pub modified: Option<NaiveDateTime>,
}

/// Outcome of parsing one listing line. Non-archive lines (checksum files,
/// readmes, subdirectories, markup) are skipped by decision, not by error.
#[derive(Debug)]
pub enum ParsedLine {
    Entry(ReleaseEntry),
    Skipped,
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<a href="([^"]+)""#).unwrap())
}

fn modified_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}-[A-Za-z]{3}-\d{4})\s+(\d{2}:\d{2})").unwrap())
}

fn family_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<a href="Blender(\d+\.\d+)/""#).unwrap())
}

/// Parses one listing line into an entry or a skip decision.
pub fn parse_line(base_url: &str, line: &str) -> ParsedLine {
    let Some(caps) = anchor_re().captures(line) else {
        return ParsedLine::Skipped;
    };
    let href = &caps[1];
    if href.ends_with('/') {
        return ParsedLine::Skipped;
    }

    let source_url = if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base_url, href)
    };
    let raw_name = match source_url.split('?').next().and_then(|u| u.rsplit('/').next()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return ParsedLine::Skipped,
    };
    let Some(extension) = archive_extension(&raw_name) else {
        return ParsedLine::Skipped;
    };

    let rest = &line[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
    let modified = modified_re().captures(rest).and_then(|m| {
        NaiveDateTime::parse_from_str(&format!("{} {}", &m[1], &m[2]), "%d-%b-%Y %H:%M").ok()
    });

    ParsedLine::Entry(ReleaseEntry {
        version: parse_file_version(&raw_name),
        platform: Platform::from_archive_name(&raw_name),
        bits: Bits::from_archive_name(&raw_name),
        extension: extension.to_string(),
        source_url,
        modified,
        raw_name,
    })
}

/// Parses a whole listing document, keeping only installable entries.
pub fn parse_listing(base_url: &str, body: &str) -> Vec<ReleaseEntry> {
    body.lines()
        .filter_map(|line| match parse_line(base_url, line) {
            ParsedLine::Entry(entry) => Some(entry),
            ParsedLine::Skipped => None,
        })
        .collect()
}

/// Extracts the `major.minor` family directories from the release index,
/// newest first.
pub fn parse_release_families(body: &str) -> Vec<String> {
    let mut families: Vec<(u64, u64)> = family_re()
        .captures_iter(body)
        .filter_map(|caps| {
            let mut parts = caps[1].splitn(2, '.');
            let major = parts.next()?.parse().ok()?;
            let minor = parts.next()?.parse().ok()?;
            Some((major, minor))
        })
        .collect();
    families.sort_unstable();
    families.dedup();
    families
        .into_iter()
        .rev()
        .map(|(major, minor)| format!("{}.{}", major, minor))
        .collect()
}

/// Fetches channel listings, memoizing each URL for the lifetime of one
/// invocation. Listings are never cached on disk; they change daily.
pub struct ListingFetcher {
    client: Client,
    memo: RefCell<HashMap<String, String>>,
}

impl ListingFetcher {
    pub fn new() -> Result<ListingFetcher, Error> {
        let client = Client::builder()
            .user_agent(concat!("blendget/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Config(format!("could not build HTTP client: {e}")))?;
        Ok(ListingFetcher {
            client,
            memo: RefCell::new(HashMap::new()),
        })
    }

    /// The underlying HTTP client, shared with the downloader.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a listing document, surfacing the first failure unretried.
    pub fn fetch(&self, url: &str) -> Result<String, Error> {
        if let Some(body) = self.memo.borrow().get(url) {
            return Ok(body.clone());
        }
        debug!("GET {url}");
        let response = self.client.get(url).send().map_err(|e| Error::Network {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        if let Some(err) = Error::from_status(url, response.status()) {
            return Err(err);
        }
        let body = response.text().map_err(|e| Error::Network {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        self.memo.borrow_mut().insert(url.to_string(), body.clone());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://download.blender.org/release/Blender2.93/";

    #[test]
    fn archive_lines_become_entries() {
        let line = r#"<a href="blender-2.93.4-linux-x64.tar.xz">blender-2.93.4-linux-x64.tar.xz</a> 31-Aug-2021 10:09  129M"#;
        match parse_line(BASE, line) {
            ParsedLine::Entry(entry) => {
                assert_eq!(entry.raw_name, "blender-2.93.4-linux-x64.tar.xz");
                assert_eq!(entry.extension, ".tar.xz");
                assert_eq!(entry.platform, Platform::Linux);
                assert_eq!(entry.bits, Bits::Bits64);
                assert_eq!(entry.version, Some(Version::new(2, 93, 4)));
                assert_eq!(
                    entry.source_url,
                    format!("{BASE}blender-2.93.4-linux-x64.tar.xz")
                );
                let modified = entry.modified.unwrap();
                assert_eq!(modified.format("%Y-%m-%d %H:%M").to_string(), "2021-08-31 10:09");
            }
            ParsedLine::Skipped => panic!("expected an entry"),
        }
    }

    #[test]
    fn checksum_and_directory_lines_are_skipped() {
        for line in [
            r#"<a href="blender-2.93.4.md5">blender-2.93.4.md5</a>"#,
            r#"<a href="release-notes.txt">release-notes.txt</a>"#,
            r#"<a href="Blender2.93/">Blender2.93/</a>"#,
            "<html><body><pre>",
        ] {
            assert!(matches!(parse_line(BASE, line), ParsedLine::Skipped));
        }
    }

    #[test]
    fn absolute_hrefs_keep_their_url() {
        let line = r#"<a href="https://builder.blender.org/download/daily/archive/blender-4.1.0-alpha+main.f8b1c2d9-darwin.arm64-release.dmg">daily</a>"#;
        match parse_line("https://builder.blender.org/download/daily/archive/", line) {
            ParsedLine::Entry(entry) => {
                assert!(entry.source_url.starts_with("https://builder.blender.org/"));
                assert_eq!(entry.platform, Platform::MacOs);
                assert_eq!(entry.extension, ".dmg");
            }
            ParsedLine::Skipped => panic!("expected an entry"),
        }
    }

    #[test]
    fn malformed_versions_are_kept_unparsed() {
        let line = r#"<a href="blender-benchmark-linux64.tar.gz">blender-benchmark-linux64.tar.gz</a>"#;
        match parse_line(BASE, line) {
            ParsedLine::Entry(entry) => assert!(entry.version.is_none()),
            ParsedLine::Skipped => panic!("archive extensions are kept even without a version"),
        }
    }

    #[test]
    fn families_come_back_newest_first() {
        let body = r#"
<a href="Blender2.83/">Blender2.83/</a>
<a href="Blender2.93/">Blender2.93/</a>
<a href="Blender3.6/">Blender3.6/</a>
<a href="Blender2.90/">Blender2.90/</a>
<a href="source/">source/</a>
"#;
        assert_eq!(parse_release_families(body), vec!["3.6", "2.93", "2.90", "2.83"]);
    }
}
