// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Nix base32: a custom alphabet, least significant bits first, output
//! reversed.

use std::sync::LazyLock;

use data_encoding::{BitOrder, DecodeError, Encoding, Specification};

pub const ALPHABET: &str = "0123456789abcdfghijklmnpqrsvwxyz";

static NIX_BASE32: LazyLock<Encoding> = LazyLock::new(|| {
    let mut spec = Specification::new();
    spec.symbols.push_str(ALPHABET);
    spec.bit_order = BitOrder::LeastSignificantFirst;
    spec.encoding().expect("valid nix-base32 specification")
});

pub const fn encode_len(len: usize) -> usize {
    (8 * len).div_ceil(5)
}

pub fn encode(input: &[u8]) -> String {
    NIX_BASE32.encode(input).chars().rev().collect()
}

pub fn decode(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let reversed: Vec<u8> = input.iter().rev().copied().collect();
    NIX_BASE32.decode(&reversed)
}
