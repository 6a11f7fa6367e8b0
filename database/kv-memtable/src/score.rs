//! Two stage ordering used by the skiplist.
//!
//! Every key gets a numeric score built from its first 8 bytes. Scores are compared
//! first; only when they tie do we look at the full key bytes.

use std::cmp::Ordering;

const SCORE_BYTES: usize = 8;

/// Packs up to the first 8 bytes of `key` into a big endian `u64`, zero padded on the
/// right, and widens it to a float.
pub fn calc_score(key: &[u8]) -> f64 {
    let mut hash = 0u64;
    for (i, byte) in key.iter().take(SCORE_BYTES).enumerate() {
        let shift = 64 - 8 - i * 8;
        hash |= (*byte as u64) << shift;
    }
    hash as f64
}

/// Orders the target `(score, key)` against a stored node.
///
/// Equal scores never mean equal keys, they only send us to the byte comparison.
pub fn compare(score: f64, key: &[u8], node_score: f64, node_key: &[u8]) -> Ordering {
    match score.total_cmp(&node_score) {
        Ordering::Equal => key.cmp(node_key),
        ord => ord,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_packs_most_significant_byte_first() {
        assert_eq!(calc_score(&[]), 0.0);
        assert_eq!(calc_score(&[1]), (1u64 << 56) as f64);
        assert_eq!(calc_score(&[0, 0, 0, 0, 0, 0, 0, 1]), 1.0);
        assert_eq!(calc_score(&[0, 0, 0, 0, 0, 0, 1, 0]), 256.0);
    }

    #[test]
    fn score_ignores_bytes_past_the_eighth() {
        assert_eq!(calc_score(b"abcdefgh"), calc_score(b"abcdefghXYZ"));
        assert_eq!(calc_score(b"abc"), calc_score(b"abc\0\0"));
    }

    #[test]
    fn score_follows_prefix_order() {
        assert!(calc_score(b"apple") < calc_score(b"apricot"));
        assert!(calc_score(b"apricot") < calc_score(b"banana"));
        assert!(calc_score(b"a") < calc_score(b"b"));
    }

    #[test]
    fn compare_uses_score_first() {
        let (a, b) = (b"aaa".as_slice(), b"bbb".as_slice());
        assert_eq!(compare(calc_score(a), a, calc_score(b), b), Ordering::Less);
        assert_eq!(compare(calc_score(b), b, calc_score(a), a), Ordering::Greater);
    }

    #[test]
    fn compare_breaks_ties_on_bytes() {
        let a = b"prefix00-alpha".as_slice();
        let b = b"prefix00-beta".as_slice();
        let score = calc_score(a);
        assert_eq!(score, calc_score(b));
        assert_eq!(compare(score, a, score, b), Ordering::Less);
        assert_eq!(compare(score, b, score, a), Ordering::Greater);
        assert_eq!(compare(score, a, score, a), Ordering::Equal);
    }

    #[test]
    fn short_key_sorts_before_zero_padded_twin() {
        let short = b"ab".as_slice();
        let padded = b"ab\0".as_slice();
        let score = calc_score(short);
        assert_eq!(score, calc_score(padded));
        assert_eq!(compare(score, short, score, padded), Ordering::Less);
    }
}
