use std::fmt;
use clap::ValueEnum;

/// Operating system a release archive was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Windows,
    Linux,
    #[value(name = "macos")]
    MacOs,
    #[value(skip)]
    Unknown,
}

/// Bit width of a release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bits {
    Bits32,
    Bits64,
    Unknown,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bits::Bits32 => "32",
            Bits::Bits64 => "64",
            Bits::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl Platform {
    /// Infers the platform from an archive filename using the fixed
    /// vocabulary of the release listings. `darwin` must be checked before
    /// the `win` substring.
    pub fn from_archive_name(name: &str) -> Platform {
        let name = name.to_ascii_lowercase();
        if name.contains("linux") {
            Platform::Linux
        } else if name.contains("macos") || name.contains("darwin") || name.contains("osx") {
            Platform::MacOs
        } else if name.contains("win") {
            Platform::Windows
        } else {
            Platform::Unknown
        }
    }
}

impl Bits {
    /// Infers the bit width from an archive filename. Absence of any marker
    /// means 64 on modern entries.
    pub fn from_archive_name(name: &str) -> Bits {
        let name = name.to_ascii_lowercase();
        if name.contains("32") || name.contains("i686") || name.contains("i386") {
            Bits::Bits32
        } else {
            Bits::Bits64
        }
    }

    /// Parses a user-supplied `--bits` value.
    pub fn from_raw(raw: u32) -> Option<Bits> {
        match raw {
            32 => Some(Bits::Bits32),
            64 => Some(Bits::Bits64),
            _ => None,
        }
    }
}

/// Host introspection seam, so resolution targets can be injected in tests
/// instead of depending on the machine the tests run on.
pub trait Host {
    fn platform(&self) -> Platform;
    fn bits(&self) -> Bits;
}

/// The machine this process runs on.
pub struct NativeHost;

impl Host for NativeHost {
    fn platform(&self) -> Platform {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    fn bits(&self) -> Bits {
        if cfg!(target_pointer_width = "64") {
            Bits::Bits64
        } else {
            Bits::Bits32
        }
    }
}
