use super::{
    corpus::{parse_seeds, Delimiter},
    emit::Order,
    family::StringFn,
    prove::Prover,
    search::{Outcome, Search, SearchConfig, SearchSpace, Seeds},
    HashFn, KeySet, Reduction,
};
use alloc::{
    string::{String, ToString},
    vec,
    vec::Vec,
};
use proptest::prelude::*;

const PYTHON: &str = "
    False None True and assert break class continue def elif else for global if import in lambda
    not or return try while ... ** // != %= *= += -= /= << <= == >= >>
";

const PRIMES: &str = "
    2 3 5 7 11 13 17 19 23 29
    31 37 41 43 47 53 59 61 67 71
    73 79 83 89 97
";

fn python() -> KeySet {
    KeySet::parse(PYTHON, Delimiter::Whitespace).unwrap()
}

fn operators() -> KeySet {
    KeySet::new(python().iter().skip(23)).unwrap()
}

fn search(keys: &KeySet, space: SearchSpace) -> Outcome {
    Search::new(keys, space, SearchConfig::new())
        .unwrap()
        .first(&mut ())
}

#[test]
fn three_keys() {
    let keys = KeySet::new(["if", "in", "is"]).unwrap();
    let solution = search(&keys, SearchSpace::for_keys(keys.len()))
        .into_result()
        .unwrap();
    assert_eq!(solution.position(), 4);
    assert_eq!(solution.candidate().to_string(), "mul(l, r), h & 0x3");
    assert_eq!(solution.assignment().slots(), [0, 3, 2]);
    assert_eq!(solution.assignment().digests(), [128, 203, 218]);
}

#[test]
fn operator_table() {
    let keys = operators();
    assert_eq!(keys.len(), 13);
    assert_eq!(keys.get(0), Some("**"));

    let solution = search(&keys, SearchSpace::for_keys(keys.len()))
        .into_result()
        .unwrap();
    assert_eq!(solution.position(), 4152);
    assert_eq!(solution.candidate().to_string(), "bkdr (seed 0), h & 0x1f");
    assert_eq!(
        solution.assignment().slots(),
        [8, 28, 0, 12, 27, 30, 4, 10, 16, 17, 20, 23, 24],
    );
}

#[test]
fn keyword_table() {
    let keys = python();
    assert_eq!(keys.len(), 36);

    let solution = search(&keys, SearchSpace::for_keys(keys.len()))
        .into_result()
        .unwrap();
    assert_eq!(solution.position(), 4205);
    assert_eq!(solution.candidate().to_string(), "bkdr (seed 53), h & 0x7f");
    assert_eq!(
        solution.assignment().slots(),
        [
            58, 21, 103, 46, 91, 114, 59, 0, 48, 89, 118, 108, 20, 126, 22, 6, 32, 54, 28, 53, 122,
            72, 109, 5, 25, 125, 9, 24, 27, 33, 39, 77, 78, 81, 84, 85,
        ],
    );

    let table = solution.table(Order::Keys);
    assert_eq!(table.verify(), Ok(()));
    let keywords = table.keywords().unwrap();
    for (ordinal, key) in keys.iter().enumerate() {
        assert_eq!(keywords.get(key), Some(ordinal));
    }
    for stranger in ["", "Fals", "false", "whilst", "<>", "...."] {
        assert_eq!(keywords.get(stranger), None);
    }

    let dense = table.dense().unwrap();
    assert_eq!(dense.len(), 128);
    assert_eq!(dense[0], Some("continue"));
    assert_eq!(dense.iter().flatten().count(), 36);
}

#[test]
fn seed_axis() {
    let keys = python();
    let space = SearchSpace::new(
        vec![HashFn::String(StringFn::Djb2)],
        Seeds::Range { start: 0, end: 64 },
        vec![Reduction::bits(8)],
    );
    let solution = search(&keys, space).into_result().unwrap();
    assert_eq!(solution.position(), 4);
    assert_eq!(solution.candidate().seed(), Some(4));
    assert_eq!(solution.assignment().slots()[..5], [47, 84, 68, 183, 86]);
}

#[test]
fn seed_corpus_exhausts() {
    let keys = python();
    let seeds = parse_seeds(PRIMES, Delimiter::Whitespace).unwrap();
    assert_eq!(seeds.len(), 25);

    let space = SearchSpace::new(
        vec![HashFn::String(StringFn::Djb2)],
        Seeds::List(seeds),
        vec![Reduction::bits(8)],
    );
    let exhausted = search(&keys, space).into_result().unwrap_err();
    assert_eq!(exhausted.tried, 25);
    assert_eq!(exhausted.degenerate, 0);
    assert!(!exhausted.limit_reached);
    assert_eq!(exhausted.last.unwrap().candidate().seed(), Some(97));
    assert!(exhausted.closest.unwrap().collisions > 0);
}

#[test]
fn survey_agrees_with_first() {
    let keys = KeySet::new(["if", "in", "is"]).unwrap();
    let search = Search::new(
        &keys,
        SearchSpace::for_keys(keys.len()),
        SearchConfig::new().with_limit(64),
    )
    .unwrap();
    let first = search.first(&mut ()).into_result().unwrap();
    let survey = search.all(&mut ());
    assert_eq!(survey.tried, 64);
    assert!(survey.limit_reached);
    assert_eq!(survey.solutions.first(), Some(&first));
}

fn key_sets() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z+=<>!]{1,6}", 1..12)
        .prop_map(|keys| keys.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn solutions_are_injective(keys in key_sets()) {
        let keys = KeySet::new(keys).unwrap();
        let search = Search::new(
            &keys,
            SearchSpace::for_keys(keys.len()),
            SearchConfig::new().with_limit(20_000),
        )
        .unwrap();
        if let Outcome::Success(solution) = search.first(&mut ()) {
            prop_assert!(Prover::Pairwise.is_injective(solution.assignment().slots()));
            let table = solution.table(Order::Slots);
            prop_assert_eq!(table.verify(), Ok(()));
            let keywords = table.keywords().unwrap();
            for (ordinal, key) in keys.iter().enumerate() {
                prop_assert_eq!(keywords.get(key), Some(ordinal));
            }
        }
    }

    #[test]
    fn search_is_deterministic(keys in key_sets(), chunk_size in 1..64_usize) {
        let keys = KeySet::new(keys).unwrap();
        let config = SearchConfig::new().with_limit(5_000);
        let space = SearchSpace::for_keys(keys.len());
        let reference = Search::new(&keys, space.clone(), config).unwrap().first(&mut ());
        let chunked = Search::new(
            &keys,
            space,
            config
                .with_chunk_size(chunk_size)
                .with_prover(Prover::Pairwise)
                .with_parallelism(cfg!(feature = "parallel")),
        )
        .unwrap()
        .first(&mut ());
        prop_assert_eq!(reference, chunked);
    }
}
