//! Candidate enumeration.
//!
//! A [`SearchSpace`] is the product of three axes: reductions, hash functions, and seeds. It is
//! enumerated in a fixed order, reductions outermost and seeds innermost, so narrower reductions
//! are preferred over wider ones and every function is tried at a given width before the next width
//! is considered. Seedless functions contribute one candidate per reduction.
//!
//! [`Search::first`] stops at the first collision-free candidate in that order; [`Search::all`]
//! collects every such candidate. Both are deterministic, including with the `parallel` feature:
//! candidates are evaluated in chunks, possibly on the `rayon` pool, but verdicts are always
//! consumed in enumeration order.
//!
//! Running out of candidates is a normal [`Outcome`], not an error.

use super::{
    family::HashFunction,
    prove::{Collision, Prover},
    reduce::Reduction,
    Candidate, ConfigError, HashFn, KeySet,
};
use alloc::{string::String, vec::Vec};
use core::fmt;
use rapidhash::RapidRng;

/// The seed axis.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Seeds {
    /// Explicit seeds, e.g. read from a corpus with [`parse_seeds`](crate::corpus::parse_seeds).
    List(Vec<u64>),
    /// `start..end`.
    Range {
        /// First seed.
        start: u64,
        /// One past the last seed.
        end: u64,
    },
    /// Deterministic pseudo-random seeds.
    Random {
        /// How many.
        count: u64,
    },
}

impl Seeds {
    /// The number of seeds.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::List(seeds) => seeds.len() as u64,
            Self::Range { start, end } => end.saturating_sub(*start),
            Self::Random { count } => *count,
        }
    }

    /// Check if there are no seeds.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate through the seeds. The order is fixed.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> SeedIter<'_> {
        SeedIter(match self {
            Self::List(seeds) => SeedIterInner::List(seeds.iter()),
            Self::Range { start, end } => SeedIterInner::Range(*start..*end),
            Self::Random { count } => SeedIterInner::Random {
                // Hexadecimal digits of pi - 3
                rng: RapidRng::new(0x243f_6a88_85a3_08d3),
                remaining: *count,
            },
        })
    }
}

impl Default for Seeds {
    #[inline]
    fn default() -> Self {
        Self::Range {
            start: 0,
            end: 1024,
        }
    }
}

/// Iterator over [`Seeds`].
pub struct SeedIter<'a>(SeedIterInner<'a>);

/// The actual iterator.
enum SeedIterInner<'a> {
    /// [`Seeds::List`].
    List(core::slice::Iter<'a, u64>),
    /// [`Seeds::Range`].
    Range(core::ops::Range<u64>),
    /// [`Seeds::Random`].
    Random {
        /// Source of seeds.
        rng: RapidRng,
        /// Seeds left to produce.
        remaining: u64,
    },
}

impl Iterator for SeedIter<'_> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        match &mut self.0 {
            SeedIterInner::List(seeds) => seeds.next().copied(),
            SeedIterInner::Range(seeds) => seeds.next(),
            SeedIterInner::Random { rng, remaining } => {
                *remaining = remaining.checked_sub(1)?;
                Some(rng.next())
            }
        }
    }
}

/// Everything a search may try.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchSpace<F = HashFn> {
    /// Hash functions, in the order they are tried.
    functions: Vec<F>,

    /// Seeds for seeded functions.
    #[cfg_attr(feature = "serde", serde(default))]
    seeds: Seeds,

    /// Reductions, in the order they are tried.
    #[cfg_attr(feature = "serde", serde(default = "default_reductions"))]
    reductions: Vec<Reduction>,
}

/// One 8-bit reduction.
#[cfg(feature = "serde")]
fn default_reductions() -> Vec<Reduction> {
    alloc::vec![Reduction::default()]
}

impl SearchSpace {
    /// The space the `keywords!` macro searches: every function in the family, seeds `0..1024`, and
    /// unshifted bit masks from the narrowest one that fits `keys` keys up to 16 bits.
    #[inline]
    #[must_use]
    pub fn for_keys(keys: usize) -> Self {
        let narrowest = Reduction::minimal_bits(keys);
        Self {
            functions: HashFn::family().collect(),
            seeds: Seeds::default(),
            reductions: (narrowest..=narrowest.max(16)).map(Reduction::bits).collect(),
        }
    }
}

impl<F> SearchSpace<F> {
    /// Create a search space.
    #[inline]
    #[must_use]
    pub const fn new(functions: Vec<F>, seeds: Seeds, reductions: Vec<Reduction>) -> Self {
        Self {
            functions,
            seeds,
            reductions,
        }
    }

    /// Replace the hash functions.
    #[inline]
    #[must_use]
    pub fn with_functions<G>(self, functions: impl IntoIterator<Item = G>) -> SearchSpace<G> {
        SearchSpace {
            functions: functions.into_iter().collect(),
            seeds: self.seeds,
            reductions: self.reductions,
        }
    }

    /// Replace the seeds.
    #[inline]
    #[must_use]
    pub fn with_seeds(mut self, seeds: Seeds) -> Self {
        self.seeds = seeds;
        self
    }

    /// Replace the reductions.
    #[inline]
    #[must_use]
    pub fn with_reductions(mut self, reductions: impl IntoIterator<Item = Reduction>) -> Self {
        self.reductions = reductions.into_iter().collect();
        self
    }

    /// The hash functions.
    #[inline]
    #[must_use]
    pub fn functions(&self) -> &[F] {
        &self.functions
    }

    /// The seeds.
    #[inline]
    #[must_use]
    pub const fn seeds(&self) -> &Seeds {
        &self.seeds
    }

    /// The reductions.
    #[inline]
    #[must_use]
    pub fn reductions(&self) -> &[Reduction] {
        &self.reductions
    }
}

impl<F: HashFunction + Clone> SearchSpace<F> {
    /// The number of candidates.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u128 {
        let per_reduction: u128 = self
            .functions
            .iter()
            .map(|function| {
                if function.is_seeded() {
                    u128::from(self.seeds.len())
                } else {
                    1
                }
            })
            .sum();
        per_reduction.saturating_mul(self.reductions.len() as u128)
    }

    /// Enumerate candidates in search order.
    #[inline]
    pub fn candidates(&self) -> impl Iterator<Item = Candidate<F>> + '_ {
        self.reductions.iter().flat_map(move |&reduction| {
            self.functions.iter().flat_map(move |function| {
                let seeded = function.is_seeded();
                let seeds = seeded.then(|| self.seeds.iter().map(Some));
                let unseeded = (!seeded).then_some(None);
                seeds
                    .into_iter()
                    .flatten()
                    .chain(unseeded)
                    .map(move |seed| Candidate::new(function.clone(), seed, reduction))
            })
        })
    }
}

/// Search knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Stop after this many candidates.
    limit: Option<u64>,

    /// Report progress every this many candidates. Zero disables reporting.
    progress_interval: u64,

    /// Collision detection strategy.
    prover: Prover,

    /// Evaluate chunks on the `rayon` pool.
    parallel: bool,

    /// Candidates evaluated per chunk.
    chunk_size: usize,
}

impl SearchConfig {
    /// Default configuration: unbounded, sequential, progress every 100 000 candidates.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit: None,
            progress_interval: 100_000,
            prover: Prover::Sorted,
            parallel: false,
            chunk_size: 4096,
        }
    }

    /// Stop after `limit` candidates.
    #[inline]
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the progress reporting interval. Zero disables reporting.
    #[inline]
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the collision detection strategy.
    #[inline]
    #[must_use]
    pub const fn with_prover(mut self, prover: Prover) -> Self {
        self.prover = prover;
        self
    }

    /// Evaluate candidates in parallel.
    ///
    /// Has no effect unless the `parallel` feature is enabled. Results are the same either way.
    #[inline]
    #[must_use]
    pub const fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the number of candidates evaluated per chunk. Zero is treated as one.
    #[inline]
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// The candidate limit.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// The progress reporting interval.
    #[inline]
    #[must_use]
    pub const fn progress_interval(&self) -> u64 {
        self.progress_interval
    }

    /// The collision detection strategy.
    #[inline]
    #[must_use]
    pub const fn prover(&self) -> Prover {
        self.prover
    }

    /// Whether parallel evaluation is requested.
    #[inline]
    #[must_use]
    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// The chunk size.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            1
        } else {
            self.chunk_size
        }
    }
}

impl Default for SearchConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Progress side channel.
///
/// Called with the number of candidates tried so far, every
/// [`progress_interval`](SearchConfig::progress_interval) candidates. Never called from inside the
/// evaluation of a candidate.
pub trait Progress {
    /// Report progress.
    fn report(&mut self, tried: u64);
}

impl Progress for () {
    #[inline]
    fn report(&mut self, _tried: u64) {}
}

impl<T: FnMut(u64)> Progress for T {
    #[inline]
    fn report(&mut self, tried: u64) {
        self(tried);
    }
}

/// Reports progress as `tracing` events at `INFO` level.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct TracingProgress;

impl Progress for TracingProgress {
    #[inline]
    fn report(&mut self, tried: u64) {
        tracing::info!(tried, "searching");
    }
}

/// Thread-safety required of hash functions by [`Search`]: `Send + Sync` with the `parallel`
/// feature, nothing without it.
///
/// Implemented for every type that qualifies, so it never needs to be implemented by hand.
#[cfg(feature = "parallel")]
pub trait Shareable: Send + Sync {}

#[cfg(feature = "parallel")]
impl<T: ?Sized + Send + Sync> Shareable for T {}

/// Thread-safety required of hash functions by [`Search`]: `Send + Sync` with the `parallel`
/// feature, nothing without it.
///
/// Implemented for every type that qualifies, so it never needs to be implemented by hand.
#[cfg(not(feature = "parallel"))]
pub trait Shareable {}

#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> Shareable for T {}

/// Why a candidate was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rejection<F = HashFn> {
    /// Two keys share a slot.
    Collision {
        /// The candidate.
        candidate: Candidate<F>,
        /// Positions of the keys, as reported by the prover.
        positions: Collision,
        /// The earlier key.
        first: String,
        /// The later key.
        second: String,
        /// The shared slot.
        slot: u64,
    },
    /// The function has no digest for a key.
    Degenerate {
        /// The candidate.
        candidate: Candidate<F>,
        /// Position of the key.
        position: usize,
        /// The key.
        key: String,
    },
}

impl<F> Rejection<F> {
    /// The rejected candidate.
    #[inline]
    #[must_use]
    pub const fn candidate(&self) -> &Candidate<F> {
        match self {
            Self::Collision { candidate, .. } | Self::Degenerate { candidate, .. } => candidate,
        }
    }
}

impl<F: fmt::Display> fmt::Display for Rejection<F> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision {
                candidate,
                first,
                second,
                slot,
                ..
            } => write!(f, "{candidate}: {first:?} and {second:?} share slot {slot}"),
            Self::Degenerate { candidate, key, .. } => {
                write!(f, "{candidate}: no digest for {key:?}")
            }
        }
    }
}

/// The rejected candidate with the fewest colliding keys.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Closest<F = HashFn> {
    /// The candidate.
    pub candidate: Candidate<F>,
    /// Keys minus distinct slots.
    pub collisions: usize,
}

/// Diagnostics of a search that found nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Exhausted<F = HashFn> {
    /// Candidates evaluated.
    pub tried: u64,
    /// Of those, candidates that had no digest for some key.
    pub degenerate: u64,
    /// Whether the search stopped at [`SearchConfig::limit`] with candidates left.
    pub limit_reached: bool,
    /// The last rejection, if any candidate was tried.
    pub last: Option<Rejection<F>>,
    /// The best rejected candidate, if any candidate got as far as the prover.
    pub closest: Option<Closest<F>>,
}

impl<F: fmt::Display> fmt::Display for Exhausted<F> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no collision-free candidate among {} tried ({} degenerate)",
            self.tried, self.degenerate,
        )?;
        if self.limit_reached {
            f.write_str(", limit reached")?;
        }
        if let Some(last) = &self.last {
            write!(f, "; last rejected {last}")?;
        }
        Ok(())
    }
}

impl<F: fmt::Debug + fmt::Display> core::error::Error for Exhausted<F> {}

/// An accepted injective mapping from keys to slots.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "AssignmentInner"))]
pub struct Assignment {
    /// The keys.
    keys: KeySet,
    /// Digest per key.
    digests: Vec<i64>,
    /// Slot per key, pairwise distinct.
    slots: Vec<u64>,
}

/// Unvalidated [`Assignment`], for deserialization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct AssignmentInner {
    /// See [`Assignment::keys`].
    keys: KeySet,
    /// See [`Assignment::digests`].
    digests: Vec<i64>,
    /// See [`Assignment::slots`].
    slots: Vec<u64>,
}

impl Assignment {
    /// The keys, in input order.
    #[inline]
    #[must_use]
    pub const fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Digests, parallel to [`keys`](Self::keys).
    #[inline]
    #[must_use]
    pub fn digests(&self) -> &[i64] {
        &self.digests
    }

    /// Slots, parallel to [`keys`](Self::keys).
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// Get the number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if there are no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get the slot of a key.
    #[inline]
    #[must_use]
    pub fn slot(&self, key: &str) -> Option<u64> {
        self.iter()
            .find(|(stored, _, _)| *stored == key)
            .map(|(_, _, slot)| slot)
    }

    /// Iterate through `(key, digest, slot)` triples in key order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64, u64)> + '_ {
        self.keys
            .iter()
            .zip(&self.digests)
            .zip(&self.slots)
            .map(|((key, digest), slot)| (key, *digest, *slot))
    }
}

/// A successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        bound(deserialize = "F: serde::Deserialize<'de> + HashFunction"),
        try_from = "SolutionInner<F>"
    )
)]
pub struct Solution<F = HashFn> {
    /// The winning candidate.
    candidate: Candidate<F>,
    /// Where it maps the keys.
    assignment: Assignment,
    /// Its 0-based position in enumeration order.
    position: u64,
}

/// Unvalidated [`Solution`], for deserialization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SolutionInner<F> {
    /// See [`Solution::candidate`].
    candidate: Candidate<F>,
    /// See [`Solution::assignment`].
    assignment: Assignment,
    /// See [`Solution::position`].
    position: u64,
}

impl<F> Solution<F> {
    /// The winning candidate.
    #[inline]
    #[must_use]
    pub const fn candidate(&self) -> &Candidate<F> {
        &self.candidate
    }

    /// The key to slot mapping.
    #[inline]
    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Position of the candidate in enumeration order.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }
}

/// Result of a first-found search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Outcome<F = HashFn> {
    /// A collision-free candidate was found.
    Success(Solution<F>),
    /// No candidate in the space (or below the limit) is collision-free.
    Exhausted(Exhausted<F>),
}

impl<F> Outcome<F> {
    /// Check for success.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert to a [`Result`], treating exhaustion as an error.
    ///
    /// # Errors
    ///
    /// Returns the diagnostics if the search was exhausted.
    #[inline]
    pub fn into_result(self) -> Result<Solution<F>, Exhausted<F>> {
        match self {
            Self::Success(solution) => Ok(solution),
            Self::Exhausted(exhausted) => Err(exhausted),
        }
    }
}

/// Result of a collect-all search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Survey<F = HashFn> {
    /// Every collision-free candidate, in enumeration order.
    pub solutions: Vec<Solution<F>>,
    /// Candidates evaluated.
    pub tried: u64,
    /// Of those, candidates that had no digest for some key.
    pub degenerate: u64,
    /// Whether the search stopped at [`SearchConfig::limit`] with candidates left.
    pub limit_reached: bool,
    /// The last rejection, if any candidate was rejected.
    pub last: Option<Rejection<F>>,
    /// The best rejected candidate, if any candidate got as far as the prover and was rejected.
    pub closest: Option<Closest<F>>,
}

/// Result of evaluating one candidate.
enum Verdict {
    /// Collision-free.
    Accepted {
        /// Per key.
        digests: Vec<i64>,
        /// Per key.
        slots: Vec<u64>,
    },
    /// The prover found a collision.
    Collided {
        /// The reported pair.
        collision: Collision,
        /// Their slot.
        slot: u64,
        /// Keys minus distinct slots.
        collisions: usize,
    },
    /// No digest for the key at this position.
    Degenerate(usize),
}

/// Per-worker buffers.
#[derive(Default)]
struct Scratch {
    /// Digests of the candidate being evaluated.
    digests: Vec<i64>,
    /// Slots of the candidate being evaluated.
    slots: Vec<u64>,
    /// `(slot, position)` pairs, sorted by the prover.
    order: Vec<(u64, usize)>,
}

/// Evaluate a candidate over all keys. Pure, apart from reusing `scratch`.
fn evaluate<F: HashFunction>(
    candidate: &Candidate<F>,
    keys: &KeySet,
    prover: Prover,
    scratch: &mut Scratch,
) -> Verdict {
    scratch.digests.clear();
    scratch.slots.clear();
    for (position, key) in keys.iter().enumerate() {
        let Some(digest) = candidate.digest(key.as_bytes()) else {
            return Verdict::Degenerate(position);
        };
        scratch.digests.push(digest);
        scratch.slots.push(candidate.reduction().reduce(digest));
    }
    match prover.inspect(&scratch.slots, &mut scratch.order) {
        None => Verdict::Accepted {
            digests: scratch.digests.clone(),
            slots: scratch.slots.clone(),
        },
        Some((collision, collisions)) => Verdict::Collided {
            collision,
            slot: scratch.slots[collision.first()],
            collisions,
        },
    }
}

/// Rejection bookkeeping for [`Exhausted`].
struct Rejections<F> {
    /// Degenerate candidates seen.
    degenerate: u64,
    /// The most recent rejection.
    last: Option<(Candidate<F>, Verdict)>,
    /// The rejected candidate with the fewest colliding keys, earliest on ties.
    closest: Option<Closest<F>>,
}

impl<F: Clone> Rejections<F> {
    /// Nothing rejected yet.
    const fn new() -> Self {
        Self {
            degenerate: 0,
            last: None,
            closest: None,
        }
    }

    /// Record a rejected candidate.
    fn record(&mut self, candidate: Candidate<F>, verdict: Verdict) {
        match verdict {
            Verdict::Degenerate(_) => self.degenerate += 1,
            Verdict::Collided { collisions, .. } => {
                if self
                    .closest
                    .as_ref()
                    .map_or(true, |closest| collisions < closest.collisions)
                {
                    self.closest = Some(Closest {
                        candidate: candidate.clone(),
                        collisions,
                    });
                }
            }
            Verdict::Accepted { .. } => return,
        }
        self.last = Some((candidate, verdict));
    }

    /// Resolve key positions of the last rejection.
    fn resolve(self, keys: &KeySet) -> (Option<Rejection<F>>, Option<Closest<F>>) {
        let key = |position: usize| keys.get(position).map(String::from).unwrap_or_default();
        let last = self.last.and_then(|(candidate, verdict)| match verdict {
            Verdict::Collided {
                collision, slot, ..
            } => Some(Rejection::Collision {
                candidate,
                positions: collision,
                first: key(collision.first()),
                second: key(collision.second()),
                slot,
            }),
            Verdict::Degenerate(position) => Some(Rejection::Degenerate {
                candidate,
                position,
                key: key(position),
            }),
            Verdict::Accepted { .. } => None,
        });
        (last, self.closest)
    }

    /// Produce the report of a search that found nothing.
    fn exhausted(self, keys: &KeySet, run: Run) -> Exhausted<F> {
        let degenerate = self.degenerate;
        let (last, closest) = self.resolve(keys);
        Exhausted {
            tried: run.tried,
            degenerate,
            limit_reached: run.limit_reached,
            last,
            closest,
        }
    }
}

/// How an enumeration ended.
#[derive(Clone, Copy)]
struct Run {
    /// Candidates evaluated.
    tried: u64,
    /// Whether the limit cut the enumeration short.
    limit_reached: bool,
}

/// A configured search over a key set.
#[derive(Clone, Debug)]
pub struct Search<'k, F = HashFn> {
    /// The keys.
    keys: &'k KeySet,
    /// Candidates to try.
    space: SearchSpace<F>,
    /// Knobs.
    config: SearchConfig,
}

impl<'k, F: HashFunction + Clone + Shareable> Search<'k, F> {
    /// Set up a search.
    ///
    /// # Errors
    ///
    /// Fails if a reduction is invalid or has fewer slots than there are keys.
    #[inline]
    pub fn new(
        keys: &'k KeySet,
        space: SearchSpace<F>,
        config: SearchConfig,
    ) -> Result<Self, ConfigError> {
        for &reduction in space.reductions() {
            reduction
                .validate()
                .map_err(|source| ConfigError::InvalidReduction { reduction, source })?;
            if reduction.capacity() < keys.len() as u128 {
                return Err(ConfigError::SlotSpaceTooSmall {
                    keys: keys.len(),
                    capacity: reduction.capacity(),
                    reduction,
                });
            }
        }
        Ok(Self {
            keys,
            space,
            config,
        })
    }

    /// The keys.
    #[inline]
    #[must_use]
    pub const fn keys(&self) -> &'k KeySet {
        self.keys
    }

    /// The search space.
    #[inline]
    #[must_use]
    pub const fn space(&self) -> &SearchSpace<F> {
        &self.space
    }

    /// The configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the first collision-free candidate in enumeration order.
    #[inline]
    pub fn first(&self, progress: &mut impl Progress) -> Outcome<F> {
        let mut rejections = Rejections::new();
        let mut winner = None;
        let run = self.run(progress, |candidate, position, verdict| match verdict {
            Verdict::Accepted { digests, slots } => {
                winner = Some(self.solution(candidate, digests, slots, position));
                false
            }
            verdict => {
                rejections.record(candidate, verdict);
                true
            }
        });

        if let Some(solution) = winner {
            tracing::debug!(position = solution.position, "search succeeded");
            return Outcome::Success(solution);
        }

        tracing::debug!(
            tried = run.tried,
            degenerate = rejections.degenerate,
            limit_reached = run.limit_reached,
            "search exhausted"
        );
        Outcome::Exhausted(rejections.exhausted(self.keys, run))
    }

    /// Collect every collision-free candidate, in enumeration order.
    #[inline]
    pub fn all(&self, progress: &mut impl Progress) -> Survey<F> {
        let mut rejections = Rejections::new();
        let mut solutions = Vec::new();
        let run = self.run(progress, |candidate, position, verdict| {
            match verdict {
                Verdict::Accepted { digests, slots } => {
                    solutions.push(self.solution(candidate, digests, slots, position));
                }
                verdict => rejections.record(candidate, verdict),
            }
            true
        });
        tracing::debug!(
            tried = run.tried,
            solutions = solutions.len(),
            degenerate = rejections.degenerate,
            "survey finished"
        );
        let degenerate = rejections.degenerate;
        let (last, closest) = rejections.resolve(self.keys);
        Survey {
            solutions,
            tried: run.tried,
            degenerate,
            limit_reached: run.limit_reached,
            last,
            closest,
        }
    }

    /// Assemble a solution.
    fn solution(
        &self,
        candidate: Candidate<F>,
        digests: Vec<i64>,
        slots: Vec<u64>,
        position: u64,
    ) -> Solution<F> {
        Solution {
            candidate,
            assignment: Assignment {
                keys: self.keys.clone(),
                digests,
                slots,
            },
            position,
        }
    }

    /// Drive the enumeration, feeding verdicts to `consume` in order until it returns `false`.
    fn run(
        &self,
        progress: &mut impl Progress,
        mut consume: impl FnMut(Candidate<F>, u64, Verdict) -> bool,
    ) -> Run {
        tracing::debug!(
            keys = self.keys.len(),
            candidates = %self.space.size(),
            limit = ?self.config.limit,
            "starting search"
        );

        let limit = self.config.limit.unwrap_or(u64::MAX);
        let interval = self.config.progress_interval;
        let mut candidates = self.space.candidates();
        let mut tried: u64 = 0;

        loop {
            let room = usize::try_from(limit - tried).unwrap_or(usize::MAX);
            let chunk: Vec<Candidate<F>> = candidates
                .by_ref()
                .take(self.config.chunk_size().min(room))
                .collect();
            if chunk.is_empty() {
                break;
            }

            let verdicts = self.evaluate_chunk(&chunk);
            for (candidate, verdict) in chunk.into_iter().zip(verdicts) {
                let position = tried;
                tried += 1;
                if interval != 0 && tried % interval == 0 {
                    progress.report(tried);
                }
                if let Verdict::Collided {
                    collision, slot, ..
                } = &verdict
                {
                    tracing::trace!(
                        position,
                        first = collision.first(),
                        second = collision.second(),
                        slot,
                        "collision"
                    );
                }
                if !consume(candidate, position, verdict) {
                    return Run {
                        tried,
                        limit_reached: false,
                    };
                }
            }
        }

        Run {
            tried,
            limit_reached: tried >= limit && candidates.next().is_some(),
        }
    }

    /// Evaluate candidates, in parallel if configured to.
    fn evaluate_chunk(&self, chunk: &[Candidate<F>]) -> Vec<Verdict> {
        let keys = self.keys;
        let prover = self.config.prover;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if self.config.parallel {
                return chunk
                    .par_iter()
                    .map_init(Scratch::default, |scratch, candidate| {
                        evaluate(candidate, keys, prover, scratch)
                    })
                    .collect();
            }
        }

        let mut scratch = Scratch::default();
        chunk
            .iter()
            .map(|candidate| evaluate(candidate, keys, prover, &mut scratch))
            .collect()
    }
}

/// Scope for `serde`-related code.
#[cfg(feature = "serde")]
mod serde_support {
    use super::{Assignment, AssignmentInner, HashFunction, Solution, SolutionInner};
    use crate::prove::Prover;
    use displaydoc::Display;
    use thiserror::Error;

    /// Deserialization validation failures.
    #[derive(Debug, Display, Error, PartialEq, Eq)]
    #[non_exhaustive]
    pub enum Invalid {
        /// {keys} keys, but {digests} digests and {slots} slots
        WrongLength {
            /// Number of keys.
            keys: usize,
            /// Number of digests.
            digests: usize,
            /// Number of slots.
            slots: usize,
        },

        /// keys {first} and {second} share a slot
        NotInjective {
            /// The earlier position.
            first: usize,
            /// The later position.
            second: usize,
        },

        /// key {0} does not map to the recorded digest and slot
        Drift(usize),
    }

    impl TryFrom<AssignmentInner> for Assignment {
        type Error = Invalid;

        #[inline]
        fn try_from(inner: AssignmentInner) -> Result<Self, Invalid> {
            let keys = inner.keys.len();
            if inner.digests.len() != keys || inner.slots.len() != keys {
                return Err(Invalid::WrongLength {
                    keys,
                    digests: inner.digests.len(),
                    slots: inner.slots.len(),
                });
            }

            if let Some(collision) = Prover::default().find_collision(&inner.slots) {
                return Err(Invalid::NotInjective {
                    first: collision.first(),
                    second: collision.second(),
                });
            }

            Ok(Self {
                keys: inner.keys,
                digests: inner.digests,
                slots: inner.slots,
            })
        }
    }

    impl<F: HashFunction> TryFrom<SolutionInner<F>> for Solution<F> {
        type Error = Invalid;

        #[inline]
        fn try_from(inner: SolutionInner<F>) -> Result<Self, Invalid> {
            for (position, (key, digest, slot)) in inner.assignment.iter().enumerate() {
                if inner.candidate.digest(key.as_bytes()) != Some(digest)
                    || inner.candidate.reduction().reduce(digest) != slot
                {
                    return Err(Invalid::Drift(position));
                }
            }

            Ok(Self {
                candidate: inner.candidate,
                assignment: inner.assignment,
                position: inner.position,
            })
        }
    }
}

#[cfg(feature = "serde")]
pub use serde_support::Invalid;
