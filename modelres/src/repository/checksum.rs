//! Checksums published next to repository resources.
//!
//! Maven repositories publish `<resource>.sha1` and `<resource>.md5` files.
//! SHA-1 is preferred; MD5 is only consulted when no SHA-1 file exists.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::Md5;
use sha1::digest::Output;
use sha1::{Digest, Sha1};

/// Buffer size for streaming file digests (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Supported checksum algorithms, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Sha1,
    Md5,
}

impl ChecksumAlgorithm {
    /// All algorithms, most preferred first.
    pub const PREFERENCE: [ChecksumAlgorithm; 2] =
        [ChecksumAlgorithm::Sha1, ChecksumAlgorithm::Md5];

    /// File extension of the checksum sidecar.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }

    /// Length of the hex digest.
    fn hex_len(self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Md5 => 32,
        }
    }

    /// Hex digest of `data`.
    pub fn digest_bytes(self, data: &[u8]) -> String {
        match self {
            Self::Sha1 => format!("{:x}", Sha1::digest(data)),
            Self::Md5 => format!("{:x}", Md5::digest(data)),
        }
    }

    /// Hex digest of the file at `path`, read in chunks.
    pub fn digest_file(self, path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        Ok(match self {
            Self::Sha1 => format!("{:x}", digest_reader::<Sha1>(file)?),
            Self::Md5 => format!("{:x}", digest_reader::<Md5>(file)?),
        })
    }

    /// Extract the digest from the contents of a checksum file.
    ///
    /// Accepts the bare digest as well as the `<digest>  <filename>` form
    /// written by `sha1sum`. Returns `None` if no well-formed digest is found.
    pub fn parse_checksum_file(self, contents: &[u8]) -> Option<String> {
        let text = std::str::from_utf8(contents).ok()?;
        let token = text.split_whitespace().next()?;
        let valid = token.len() == self.hex_len() && token.chars().all(|c| c.is_ascii_hexdigit());
        valid.then(|| token.to_ascii_lowercase())
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => f.write_str("SHA-1"),
            Self::Md5 => f.write_str("MD5"),
        }
    }
}

fn digest_reader<D: Digest>(mut reader: impl Read) -> io::Result<Output<D>> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}
