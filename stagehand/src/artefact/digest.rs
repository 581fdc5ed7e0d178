//! Streaming content digests for package archives.
//!
//! Archives are hashed in fixed-size chunks so memory use stays bounded
//! regardless of archive size. Digests are always rendered as lowercase hex.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

/// Default number of bytes fed to the hash context per read.
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024;

/// Hash algorithms compiled into this build.
///
/// # Examples
///
/// ```
/// use stagehand::artefact::digest::HashAlgorithm;
///
/// let algorithm = HashAlgorithm::from_name("xxh128").expect("built in");
/// assert_eq!(algorithm.hex_len(), 32);
/// assert!(HashAlgorithm::from_name("crc32").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// 128-bit XXH3; fast, not suitable for adversarial settings.
    Xxh128,
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Every algorithm this build can compute.
    pub const ALL: &'static [Self] = &[Self::Xxh128, Self::Sha256];

    /// Look up an algorithm by its configuration identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|algorithm| algorithm.name() == name)
    }

    /// Return the configuration identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Xxh128 => "xxh128",
            Self::Sha256 => "sha256",
        }
    }

    /// Number of hex characters in a rendered digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Xxh128 => 32,
            Self::Sha256 => 64,
        }
    }

    /// Start a fresh streaming context.
    #[must_use]
    pub fn context(self) -> DigestContext {
        match self {
            Self::Xxh128 => DigestContext::Xxh128(Box::new(Xxh3::new())),
            Self::Sha256 => DigestContext::Sha256(Sha256::new()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An in-progress digest computation.
pub enum DigestContext {
    /// XXH3 128-bit state.
    Xxh128(Box<Xxh3>),
    /// SHA-256 state.
    Sha256(Sha256),
}

impl DigestContext {
    /// Feed bytes into the context.
    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Xxh128(state) => state.update(bytes),
            Self::Sha256(state) => state.update(bytes),
        }
    }

    /// Consume the context and render the digest as lowercase hex.
    #[must_use]
    pub fn finalize_hex(self) -> String {
        match self {
            // Canonical XXH128 form: high 64 bits first, big-endian.
            Self::Xxh128(state) => format!("{:032x}", state.digest128()),
            Self::Sha256(state) => format!("{:x}", state.finalize()),
        }
    }
}

/// Hash everything `reader` yields, `chunk_size` bytes at a time.
///
/// A `chunk_size` of zero is treated as one byte.
///
/// # Errors
///
/// Returns any I/O error raised by `reader`.
pub fn digest_reader<R: Read>(
    mut reader: R,
    algorithm: HashAlgorithm,
    chunk_size: usize,
) -> io::Result<String> {
    let mut context = algorithm.context();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        context.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(context.finalize_hex())
}

/// Hash the file at `path` in chunks of `chunk_size` bytes.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm, chunk_size: usize) -> io::Result<String> {
    let file = File::open(path)?;
    digest_reader(file, algorithm, chunk_size)
}
