use std::path::PathBuf;
use anyhow::{bail, Result};
use colored::Colorize;
use blendget::config::Config;
use blendget::download::download;
use blendget::extract::{extract, locate_executable};
use blendget::global::cache::{clean_cache, CacheIndex};
use blendget::global::utils::get_global_cache_dir;
use blendget::listing::ListingFetcher;
use blendget::platform::{Bits, Host, NativeHost, Platform};
use blendget::resolve::{ResolutionRequest, Resolver};
use crate::cli::CLI;

pub fn execute(cli: CLI) -> Result<()> {
    let config = Config::load_or_default()?;
    let cache_root = cache_root(&cli.cache_dir, &config)?;

    if cli.clear_cache {
        let removed = clean_cache(&cache_root)?;
        println!("Removed {} cached files", removed);
        return Ok(());
    }

    if cli.remove_compressed && !cli.extract {
        bail!("the option '--remove-compressed' only makes sense passed along with '--extract'");
    }
    if cli.print_executable && !cli.extract {
        bail!("the option '--print-executable' only makes sense passed along with '--extract'");
    }

    let bits = match cli.bits {
        Some(raw) => match Bits::from_raw(raw) {
            Some(bits) => Some(bits),
            None => bail!("invalid bits '{}'. Must be either 32 or 64.", raw),
        },
        None => None,
    };

    let fetcher = ListingFetcher::new()?;
    let resolver = Resolver {
        fetcher: &fetcher,
        config: &config,
    };

    if let Some(max) = cli.list {
        return execute_list(&resolver, &config, cli.os, bits, max);
    }

    let Some(token) = cli.version.clone() else {
        bail!(
            "a version token is required: a version number ('2.93.4', '2.9'), \
             'stable', 'lts' or 'nightly'"
        );
    };
    execute_download(&cli, token, bits, &resolver, &cache_root)
}

fn cache_root(override_dir: &Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = &config.cache_dir {
        return Ok(dir.clone());
    }
    Ok(get_global_cache_dir()?)
}

pub fn execute_list(
    resolver: &Resolver,
    config: &Config,
    platform: Option<Platform>,
    bits: Option<Bits>,
    max: usize,
) -> Result<()> {
    let unlimited = max == 0;
    let mut shown = 0usize;
    let mut stable_marked = false;

    for family in resolver.release_families()? {
        let mut entries = resolver.family_entries(&family)?;
        entries.retain(|e| {
            platform.is_none_or(|p| e.platform == p) && bits.is_none_or(|b| e.bits == b)
        });
        entries.sort_by(|a, b| {
            b.version
                .cmp(&a.version)
                .then_with(|| b.raw_name.cmp(&a.raw_name))
        });

        for entry in entries {
            let version = entry
                .version
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            let marker = if entry.version.is_some() && !stable_marked {
                stable_marked = true;
                " (stable)".green()
            } else if config.lts_minors.contains(&family) {
                " (lts)".yellow()
            } else {
                "".normal()
            };
            println!("{:<12} {}{}", version, entry.raw_name, marker);
            shown += 1;
            if !unlimited && shown >= max {
                return Ok(());
            }
        }
    }
    Ok(())
}

fn execute_download(
    cli: &CLI,
    token: String,
    bits: Option<Bits>,
    resolver: &Resolver,
    cache_root: &PathBuf,
) -> Result<()> {
    let host = NativeHost;
    let request = ResolutionRequest {
        token,
        platform: cli.os.unwrap_or_else(|| host.platform()),
        bits: bits.unwrap_or_else(|| host.bits()),
    };

    let target = resolver.resolve_target(&request, cache_root)?;
    if !cli.quiet {
        eprintln!("{} {}", "Resolved".green().bold(), target.entry.raw_name);
    }

    let mut index = CacheIndex::load_or_default(cache_root);
    let archive = download(resolver.fetcher.client(), &target, &mut index, cli.quiet)?;

    if cli.extract {
        let root = extract(&archive, cli.quiet)?;
        if cli.remove_compressed {
            std::fs::remove_file(&archive)?;
        }
        if cli.print_executable {
            let executable = locate_executable(&root, request.platform)?;
            println!("{}", executable.display());
        } else {
            println!("{}", root.display());
        }
    } else {
        println!("{}", archive.display());
    }
    Ok(())
}
