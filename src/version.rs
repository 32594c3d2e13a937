use std::sync::OnceLock;
use regex::Regex;
use semver::{Prerelease, Version};

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // numeric triplet (patch optional) with an optional rc/alpha/beta marker
        Regex::new(r"(?i)(\d+)\.(\d+)(?:\.(\d+))?(?:[-.]?((?:rc|alpha|beta)\d*))?").unwrap()
    })
}

/// Extracts the release version encoded in an archive filename.
///
/// `blender-2.93.4-linux64.tar.xz` yields `2.93.4`; a missing patch
/// component is padded with zero (`blender-2.90-win64.zip` yields `2.90.0`);
/// daily markers become prerelease identifiers
/// (`blender-4.1.0-alpha+main...` yields `4.1.0-alpha`). Filenames with no
/// version at all yield `None`.
pub fn parse_file_version(name: &str) -> Option<Version> {
    let caps = version_re().captures(name)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let mut version = Version::new(major, minor, patch);
    if let Some(pre) = caps.get(4) {
        version.pre = Prerelease::new(&pre.as_str().to_ascii_lowercase()).ok()?;
    }
    Some(version)
}

/// Lowercases a token and strips a leading `v`.
pub fn normalize_token(token: &str) -> String {
    token.trim().trim_start_matches(['v', 'V']).to_ascii_lowercase()
}

/// The `major.minor` release family a version belongs to.
pub fn family_of(version: &Version) -> String {
    format!("{}.{}", version.major, version.minor)
}

/// Whether a version satisfies an explicit version token.
///
/// A full `x.y.z` token matches exactly. Anything shorter is a trailing
/// wildcard on the `major.minor` rendering, so `2.9` matches 2.90 and 2.91
/// but not 2.83, and the caller picks the highest match.
pub fn matches_token(version: &Version, token: &str) -> bool {
    if let Ok(exact) = Version::parse(token) {
        return *version == exact;
    }
    family_of(version).starts_with(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_triplet() {
        let v = parse_file_version("blender-2.93.4-linux64.tar.xz").unwrap();
        assert_eq!(v, Version::new(2, 93, 4));
    }

    #[test]
    fn pads_missing_patch() {
        let v = parse_file_version("blender-2.90-windows64.zip").unwrap();
        assert_eq!(v, Version::new(2, 90, 0));
    }

    #[test]
    fn keeps_candidate_markers() {
        let v = parse_file_version("blender-2.80rc3-win64.zip").unwrap();
        assert_eq!((v.major, v.minor), (2, 80));
        assert_eq!(v.pre.as_str(), "rc3");
    }

    #[test]
    fn keeps_daily_markers() {
        let v =
            parse_file_version("blender-4.1.0-alpha+main.f8b1c2d9-linux.x86_64-release.tar.xz")
                .unwrap();
        assert_eq!(v.pre.as_str(), "alpha");
    }

    #[test]
    fn rejects_versionless_names() {
        assert!(parse_file_version("release-notes.zip").is_none());
    }

    #[test]
    fn exact_token_matching() {
        let v = Version::new(2, 93, 4);
        assert!(matches_token(&v, "2.93.4"));
        assert!(!matches_token(&v, "2.93.5"));
    }

    #[test]
    fn family_token_matching() {
        assert!(matches_token(&Version::new(2, 90, 0), "2.9"));
        assert!(matches_token(&Version::new(2, 91, 0), "2.9"));
        assert!(!matches_token(&Version::new(2, 83, 0), "2.9"));
        assert!(matches_token(&Version::new(2, 93, 1), "2.93"));
    }

    #[test]
    fn token_normalization() {
        assert_eq!(normalize_token(" v2.93.4 "), "2.93.4");
        assert_eq!(normalize_token("STABLE"), "stable");
    }
}
