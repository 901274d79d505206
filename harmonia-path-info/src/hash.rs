// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! NAR hashes as stored in the metadata index, and their renderings.

use std::str::FromStr;

use data_encoding::BASE64;
use derive_more::Display;
use thiserror::Error;

use crate::base32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Algorithm {
    #[display("md5")]
    Md5,
    #[display("sha1")]
    Sha1,
    #[display("sha256")]
    Sha256,
    #[display("sha512")]
    Sha512,
}

impl Algorithm {
    /// Digest size in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
            Algorithm::Sha512 => 64,
        }
    }
}

impl FromStr for Algorithm {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Algorithm::Md5),
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            _ => Err(ParseHashError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

/// How a hash is rendered in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum HashFormat {
    /// `sha256:<hex>`
    #[display("base16")]
    Base16,
    /// `sha256:<nix-base32>`
    #[display("nix32")]
    Nix32,
    /// `sha256:<base64>`
    #[display("base64")]
    Base64,
    /// `sha256-<base64>`
    #[default]
    #[display("sri")]
    Sri,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseHashError {
    #[error("unknown hash algorithm '{0}'")]
    UnknownAlgorithm(String),
    #[error("hash '{0}' has no algorithm prefix")]
    MissingAlgorithm(String),
    #[error("hash '{hash}' has wrong length for {algorithm}")]
    WrongLength { hash: String, algorithm: Algorithm },
    #[error("hash '{0}' is not correctly encoded")]
    BadEncoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    algorithm: Algorithm,
    digest: Vec<u8>,
}

impl Hash {
    pub fn new(algorithm: Algorithm, digest: &[u8]) -> Result<Hash, ParseHashError> {
        if digest.len() != algorithm.size() {
            return Err(ParseHashError::WrongLength {
                hash: hex::encode(digest),
                algorithm,
            });
        }
        Ok(Hash {
            algorithm,
            digest: digest.to_vec(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    pub fn render(&self, format: HashFormat) -> String {
        let algo = self.algorithm;
        match format {
            HashFormat::Base16 => format!("{algo}:{}", hex::encode(&self.digest)),
            HashFormat::Nix32 => format!("{algo}:{}", base32::encode(&self.digest)),
            HashFormat::Base64 => format!("{algo}:{}", BASE64.encode(&self.digest)),
            HashFormat::Sri => format!("{algo}-{}", BASE64.encode(&self.digest)),
        }
    }
}

impl FromStr for Hash {
    type Err = ParseHashError;

    /// Accepts `<algo>:<digest>` with the digest in base16, nix-base32 or
    /// base64 (told apart by length), and SRI `<algo>-<base64>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad_encoding = || ParseHashError::BadEncoding(s.to_owned());

        if let Some((algo, rest)) = s.split_once(':') {
            let algorithm: Algorithm = algo.parse()?;
            let size = algorithm.size();
            let digest = if rest.len() == 2 * size {
                hex::decode(rest).map_err(|_| bad_encoding())?
            } else if rest.len() == base32::encode_len(size) {
                base32::decode(rest.as_bytes()).map_err(|_| bad_encoding())?
            } else if rest.len() == BASE64.encode_len(size) {
                BASE64.decode(rest.as_bytes()).map_err(|_| bad_encoding())?
            } else {
                return Err(ParseHashError::WrongLength {
                    hash: s.to_owned(),
                    algorithm,
                });
            };
            return Hash::new(algorithm, &digest);
        }

        if let Some((algo, rest)) = s.split_once('-') {
            let algorithm: Algorithm = algo.parse()?;
            let digest = BASE64.decode(rest.as_bytes()).map_err(|_| bad_encoding())?;
            return Hash::new(algorithm, &digest).map_err(|_| ParseHashError::WrongLength {
                hash: s.to_owned(),
                algorithm,
            });
        }

        Err(ParseHashError::MissingAlgorithm(s.to_owned()))
    }
}
