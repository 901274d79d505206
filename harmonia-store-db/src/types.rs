// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Row types of the store metadata index.

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A row of the ValidPaths table together with its references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPathInfo {
    /// Database row ID
    pub id: i64,
    /// Full store path (e.g., /nix/store/xxx-name)
    pub path: String,
    /// NAR hash as stored by Nix, `<algo>:<base16>`
    pub hash: String,
    /// When this path was registered
    pub registration_time: SystemTime,
    /// Store path of the derivation that produced this (if any)
    pub deriver: Option<String>,
    /// Size of the NAR serialization
    pub nar_size: Option<u64>,
    /// Built locally rather than substituted
    pub ultimate: bool,
    /// Space-separated signatures
    pub sigs: Option<String>,
    /// Content address assertion, already rendered
    pub ca: Option<String>,
    /// Direct references (runtime dependencies)
    pub references: BTreeSet<String>,
}

impl ValidPathInfo {
    /// Signatures in the order they were stored.
    pub fn signatures(&self) -> Vec<&str> {
        self.sigs
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Seconds since the epoch; zero for paths registered without a time.
    pub fn registration_unix_time(&self) -> i64 {
        system_time_to_unix(self.registration_time)
    }
}

pub(crate) fn unix_to_system_time(timestamp: i64) -> SystemTime {
    if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(timestamp.unsigned_abs())
    }
}

pub(crate) fn system_time_to_unix(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
