use std::path::PathBuf;
use directories::ProjectDirs;
use crate::error::Error;

pub fn get_global_config_file() -> Result<PathBuf, Error> {
    let (config_dir, _) = get_global_dirs()?;
    Ok(config_dir.join("config.toml"))
}

pub fn get_global_cache_dir() -> Result<PathBuf, Error> {
    let (_, cache_dir) = get_global_dirs()?;
    Ok(cache_dir)
}

pub fn get_global_dirs() -> Result<(PathBuf, PathBuf), Error> {
    let proj_dirs = ProjectDirs::from("org", "blendget", "blendget")
        .ok_or_else(|| Error::Config("could not determine platform directories".to_string()))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    let cache_dir = proj_dirs.cache_dir().to_path_buf();

    Ok((config_dir, cache_dir))
}
