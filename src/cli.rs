use std::path::PathBuf;
use clap::Parser;
use blendget::platform::Platform;

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None, disable_version_flag = true)]
pub struct CLI {
    /// Blender version to download: a version number ("2.93.4", "2.9"), or
    /// one of "stable", "lts" and "nightly"/"daily"
    #[clap(value_name = "VERSION")]
    pub version: Option<String>,

    /// Target operating system, defaulting to the one running this tool
    #[clap(short = 'o', long = "os", value_name = "OS")]
    pub os: Option<Platform>,

    /// Target bit width (32 or 64), defaulting to this machine's
    #[clap(long, value_name = "BITS")]
    pub bits: Option<u32>,

    /// Extract the downloaded archive (mounts disk images on macOS)
    #[clap(short, long)]
    pub extract: bool,

    /// Remove the compressed archive after extraction. Only takes effect
    /// together with '--extract'
    #[clap(short, long)]
    pub remove_compressed: bool,

    /// Print the location of the Blender executable inside the extracted
    /// tree. Requires '--extract'
    #[clap(short = 'b', long = "print-executable")]
    pub print_executable: bool,

    /// List available versions instead of downloading, newest first. Pass a
    /// number to limit how many are printed
    #[clap(short, long, value_name = "MAX", num_args = 0..=1, default_missing_value = "0")]
    pub list: Option<usize>,

    /// Cache/output directory override
    #[clap(short = 'd', long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Remove every cached download and exit
    #[clap(short, long)]
    pub clear_cache: bool,

    /// Don't print progress or status output
    #[clap(short, long)]
    pub quiet: bool,
}
