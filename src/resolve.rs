use std::path::Path;
use log::{debug, info};
use semver::Version;
use crate::config::Config;
use crate::download::ResolvedTarget;
use crate::error::Error;
use crate::listing::{parse_listing, parse_release_families, ListingFetcher, ReleaseEntry};
use crate::platform::{Bits, Platform};
use crate::version::{family_of, matches_token, normalize_token};

/// What the user asked for, with platform/bits already defaulted to the
/// host by the CLI driver.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub token: String,
    pub platform: Platform,
    pub bits: Bits,
}

/// Parsed form of the version token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Stable,
    Lts,
    Nightly,
    Exact(String),
}

impl Token {
    pub fn parse(raw: &str) -> Token {
        match normalize_token(raw).as_str() {
            "stable" => Token::Stable,
            "lts" => Token::Lts,
            "nightly" | "daily" => Token::Nightly,
            other => Token::Exact(other.to_string()),
        }
    }
}

/// Archive-format preference per target platform: the first extension in
/// this order that the platform's entries actually offer wins, everything
/// else is dropped.
fn extension_preference(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Windows => &[".zip", ".msi", ".exe"],
        Platform::Linux => &[".tar.xz", ".tar.bz2", ".tar.gz", ".snap", ".deb", ".rpm"],
        Platform::MacOs => &[".dmg", ".tar.gz", ".zip"],
        Platform::Unknown => &[],
    }
}

/// Picks the best entry for a request out of a candidate sequence.
///
/// Filtering order: versionless entries out, platform/bits exact match,
/// single best archive format, then the token rule. Ties are broken by the
/// lexicographically last source URL so resolution never becomes
/// nondeterministic.
pub fn select(
    entries: &[ReleaseEntry],
    token: &Token,
    request: &ResolutionRequest,
    lts_minors: &[String],
) -> Result<ReleaseEntry, Error> {
    let not_found = || Error::VersionNotFound {
        token: request.token.clone(),
        platform: request.platform,
        bits: request.bits,
    };

    let matching: Vec<&ReleaseEntry> = entries
        .iter()
        .filter(|e| e.version.is_some())
        .filter(|e| e.platform == request.platform && e.bits == request.bits)
        .collect();

    let best_ext = extension_preference(request.platform)
        .iter()
        .find(|ext| matching.iter().any(|e| e.extension == **ext))
        .copied()
        .ok_or_else(not_found)?;

    let candidates = matching.into_iter().filter(|e| e.extension == best_ext);

    let chosen = match token {
        Token::Exact(wanted) => candidates
            .filter(|e| matches_token(e.version.as_ref().unwrap(), wanted))
            .max_by_key(|e| (e.version.clone(), e.source_url.clone())),
        Token::Stable => candidates.max_by_key(|e| (e.version.clone(), e.source_url.clone())),
        Token::Lts => candidates
            .filter(|e| lts_minors.contains(&family_of(e.version.as_ref().unwrap())))
            .max_by_key(|e| (e.version.clone(), e.source_url.clone())),
        Token::Nightly => {
            candidates.max_by_key(|e| (e.modified, e.version.clone(), e.source_url.clone()))
        }
    };

    chosen.cloned().ok_or_else(not_found)
}

/// Resolves tokens against the live channels. Listing fetches are memoized
/// by the fetcher for the duration of the invocation, so repeated channel
/// walks cost one request per URL.
pub struct Resolver<'a> {
    pub fetcher: &'a ListingFetcher,
    pub config: &'a Config,
}

impl<'a> Resolver<'a> {
    pub fn resolve(&self, request: &ResolutionRequest) -> Result<ReleaseEntry, Error> {
        let token = Token::parse(&request.token);
        let entry = match &token {
            Token::Nightly => select(
                &self.daily_entries()?,
                &token,
                request,
                &self.config.lts_minors,
            )?,
            Token::Stable => self.walk_families(&self.release_families()?, &token, request)?,
            Token::Lts => {
                let families: Vec<String> = self
                    .release_families()?
                    .into_iter()
                    .filter(|f| self.config.lts_minors.contains(f))
                    .collect();
                self.walk_families(&families, &token, request)?
            }
            Token::Exact(wanted) => self.resolve_exact(wanted, &token, request)?,
        };
        info!("resolved '{}' to {}", request.token, entry.source_url);
        Ok(entry)
    }

    /// Resolves and pairs the entry with its cache location. The entry's
    /// source URL always comes from the listing fetched moments ago, never
    /// from stale or synthesized state.
    pub fn resolve_target(
        &self,
        request: &ResolutionRequest,
        cache_root: &Path,
    ) -> Result<ResolvedTarget, Error> {
        let entry = self.resolve(request)?;
        Ok(ResolvedTarget::new(entry, cache_root))
    }

    /// Releases channel first; some versions only ever existed as daily
    /// builds, so an absent token falls through to the daily channel.
    fn resolve_exact(
        &self,
        wanted: &str,
        token: &Token,
        request: &ResolutionRequest,
    ) -> Result<ReleaseEntry, Error> {
        let released = self.release_families().and_then(|families| {
            let mut pool = Vec::new();
            for family in families_matching(&families, wanted) {
                pool.extend(self.family_entries(&family)?);
            }
            select(&pool, token, request, &self.config.lts_minors)
        });
        match released {
            Ok(entry) => Ok(entry),
            Err(Error::VersionNotFound { .. }) | Err(Error::NotFound { .. }) => {
                debug!("'{}' not in the release tree, trying daily builds", wanted);
                select(
                    &self.daily_entries()?,
                    token,
                    request,
                    &self.config.lts_minors,
                )
            }
            Err(other) => Err(other),
        }
    }

    /// Walks families newest-first and returns the first hit. The release
    /// tree only holds released builds, so the first family with a match
    /// holds the highest one.
    fn walk_families(
        &self,
        families: &[String],
        token: &Token,
        request: &ResolutionRequest,
    ) -> Result<ReleaseEntry, Error> {
        for family in families {
            match select(
                &self.family_entries(family)?,
                token,
                request,
                &self.config.lts_minors,
            ) {
                Ok(entry) => return Ok(entry),
                Err(Error::VersionNotFound { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(Error::VersionNotFound {
            token: request.token.clone(),
            platform: request.platform,
            bits: request.bits,
        })
    }

    pub fn release_families(&self) -> Result<Vec<String>, Error> {
        let body = self.fetcher.fetch(self.config.releases_url())?;
        Ok(parse_release_families(&body))
    }

    pub fn family_entries(&self, family: &str) -> Result<Vec<ReleaseEntry>, Error> {
        let url = format!("{}Blender{}/", self.config.releases_url(), family);
        let body = self.fetcher.fetch(&url)?;
        Ok(parse_listing(&url, &body))
    }

    pub fn daily_entries(&self) -> Result<Vec<ReleaseEntry>, Error> {
        let url = self.config.daily_url();
        let body = self.fetcher.fetch(url)?;
        Ok(parse_listing(url, &body))
    }
}

/// Families that can contain a match for an explicit token: the exact
/// `major.minor` for a full triplet, a textual prefix otherwise.
fn families_matching(families: &[String], token: &str) -> Vec<String> {
    if let Ok(exact) = Version::parse(token) {
        let family = format!("{}.{}", exact.major, exact.minor);
        families.iter().filter(|f| **f == family).cloned().collect()
    } else {
        families.iter().filter(|f| f.starts_with(token)).cloned().collect()
    }
}
