//! Keyword tables generated by `build.rs` from the corpora in `data/`.

use kwhash::Keywords;

/// Python keywords and compound operators, searched in the default space.
pub static PYTHON: Keywords<'static> = include!(concat!(env!("OUT_DIR"), "/python.rs"));

/// Python compound operators, searched with `djb2` over a prime seed corpus.
pub static OPERATORS: Keywords<'static> = include!(concat!(env!("OUT_DIR"), "/operators.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = include_str!("../data/python.txt");

    #[test]
    fn python() {
        assert_eq!(PYTHON.len(), 36);
        assert_eq!(PYTHON.capacity(), 127);
        assert_eq!(PYTHON.candidate().to_string(), "bkdr (seed 53), h & 0x7f");
        for (ordinal, key) in CORPUS.lines().enumerate() {
            assert_eq!(PYTHON.get(key), Some(ordinal));
        }
        assert_eq!(PYTHON.get("continue"), Some(7));
        assert_eq!(PYTHON.get("match"), None);
        assert_eq!(PYTHON.get(""), None);
        assert_eq!(PYTHON.iter().next(), Some(("continue", 7)));
    }

    #[test]
    fn python_listing() {
        let listing = include_str!(concat!(env!("OUT_DIR"), "/python.txt"));
        let mut lines = listing.lines();
        assert_eq!(lines.next(), Some("// bkdr (seed 53), h & 0x7f"));
        assert_eq!(lines.next(), Some("continue => 0x00"));
        assert_eq!(lines.next(), Some("** => 0x05"));
        assert_eq!(lines.count(), 34);
    }

    #[test]
    fn prime_scan() {
        // Under one seed, djb2 digests of two-byte keys differ by less than 2^11, so after `>> 8`
        // the operators share a handful of slots and no seed separates them.
        assert_eq!(
            include_str!(concat!(env!("OUT_DIR"), "/scan.txt")),
            "// 168 tried, 0 found\n\
             // closest: djb2 (seed 7), h >> 8 & 0xff, 9 colliding keys\n\
             // last: djb2 (seed 997), h >> 8 & 0xff: \"class\" and \"<<\" share slot 153\n",
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            env!("OPERATORS_SEARCH"),
            "336 djb2 (seed 2), h & 0x7f 5",
        );
        assert_eq!(OPERATORS.len(), 13);
        assert_eq!(OPERATORS.capacity(), 124);
        for (ordinal, key) in CORPUS.lines().skip(23).enumerate() {
            assert_eq!(OPERATORS.get(key), Some(ordinal));
        }
        assert_eq!(OPERATORS.get("and"), None);
        assert_eq!(OPERATORS.get("<>"), None);
    }
}
