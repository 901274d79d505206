// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Size columns of the tabular report.

/// Unit suffixes, one per power of 1024. The first is a space so that
/// unscaled values keep the column width.
pub const SUFFIXES: [char; 9] = [' ', 'K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Scale `value` down by powers of 1024 while it exceeds 1024, stopping at
/// the last suffix.
pub fn scale(value: f64) -> (f64, char) {
    let mut power = 0;
    let mut res = value;
    while res > 1024.0 && power < SUFFIXES.len() - 1 {
        power += 1;
        res /= 1024.0;
    }
    (res, SUFFIXES[power])
}

/// A tab followed by the size column: the decimal value right-justified in
/// 11 characters, or a scaled `%6.1f` value and its suffix.
pub fn format_size(value: u64, human_readable: bool) -> String {
    if !human_readable {
        return format!("\t{value:>11}");
    }
    let (res, suffix) = scale(value as f64);
    format!("\t{res:6.1}{suffix}")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::zero(0, "\t          0")]
    #[case::small(2048, "\t       2048")]
    #[case::eleven_digits(12_345_678_901, "\t12345678901")]
    #[case::wider_than_field(u64::MAX, "\t18446744073709551615")]
    fn test_fixed(#[case] value: u64, #[case] expected: &str) {
        assert_eq!(format_size(value, false), expected);
    }

    #[rstest]
    #[case::zero(0, "\t   0.0 ")]
    #[case::one(1, "\t   1.0 ")]
    #[case::exactly_1024(1024, "\t1024.0 ")]
    #[case::just_above_1024(1025, "\t   1.0K")]
    #[case::two_k(2048, "\t   2.0K")]
    #[case::five_gb(5_000_000_000, "\t   4.7G")]
    #[case::one_and_half_m(1536 * 1024, "\t   1.5M")]
    #[case::max(u64::MAX, "\t  16.0E")]
    fn test_human_readable(#[case] value: u64, #[case] expected: &str) {
        assert_eq!(format_size(value, true), expected);
    }

    #[test]
    fn test_scaling_stops_at_last_suffix() {
        assert_eq!(scale(1024f64.powi(8)), (1024.0, 'Z'));
        assert_eq!(scale(2.0 * 1024f64.powi(8)), (2.0, 'Y'));
        assert_eq!(scale(1024f64.powi(10)), (1024f64.powi(2), 'Y'));
    }

    proptest! {
        #[test]
        fn prop_fixed_is_right_justified(value in any::<u64>()) {
            let s = format_size(value, false);
            let field = s.strip_prefix('\t').unwrap();
            prop_assert!(field.len() >= 11);
            prop_assert_eq!(field.trim_start().parse::<u64>().unwrap(), value);
        }

        #[test]
        fn prop_human_readable_is_scaled(value in any::<u64>()) {
            let s = format_size(value, true);
            let field = s.strip_prefix('\t').unwrap();
            let suffix = field.chars().last().unwrap();
            let number = &field[..field.len() - suffix.len_utf8()];
            prop_assert!(SUFFIXES.contains(&suffix));
            prop_assert!(number.len() >= 6);
            let (_, fraction) = number.trim_start().split_once('.').unwrap();
            prop_assert_eq!(fraction.len(), 1);
            let (res, _) = scale(value as f64);
            prop_assert!((0.0..=1024.0).contains(&res));
        }
    }
}
