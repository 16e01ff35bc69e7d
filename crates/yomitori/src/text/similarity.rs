//! Text agreement scoring between OCR outputs.
//!
//! The score is the Ratcliff/Obershelp "gestalt" ratio: find the longest common
//! contiguous block, recurse on the unmatched text to its left and right, and
//! report `2 * matched / (len(a) + len(b))`. Lengths are counted in Unicode
//! scalar values so kana and kanji weigh the same as ASCII.
//!
//! The longest-block search prefers the earliest block on ties, which makes the
//! raw ratio order dependent for a handful of inputs. [`similarity`] evaluates
//! every pair in a canonical order so the score is exactly symmetric.

use ahash::AHashMap;

/// Normalized agreement between two strings in `[0, 1]`.
///
/// - `similarity(a, a) == 1.0`
/// - `similarity(a, b) == similarity(b, a)`
/// - `similarity("", "") == 1.0`, and `0.0` against any non-empty string
///
/// # Example
///
/// ```rust
/// use yomitori::text::similarity;
///
/// assert_eq!(similarity("abcd", "bcde"), 0.75);
/// assert_eq!(similarity("猫", "猫"), 1.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };

    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    let total = first.len() + second.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&first, &second);
    (2 * matched) as f64 / total as f64
}

/// Mean of [`similarity`] over every unordered pair of `texts`.
///
/// Returns `1.0` for fewer than two texts.
pub fn mean_pairwise_similarity<S: AsRef<str>>(texts: &[S]) -> f64 {
    SimilarityMatrix::compute(texts).mean_pairwise()
}

/// Pairwise similarity scores for a fixed list of texts.
///
/// Computed once per selection so the agreement vote and the consensus score
/// share the same `C(n, 2)` comparisons.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn compute<S: AsRef<str>>(texts: &[S]) -> Self {
        let size = texts.len();
        let mut scores = vec![1.0; size * size];

        for i in 0..size {
            for j in (i + 1)..size {
                let score = similarity(texts[i].as_ref(), texts[j].as_ref());
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }

        Self { size, scores }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Score between texts `i` and `j`.
    ///
    /// # Panics
    ///
    /// If either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "similarity index out of bounds");
        self.scores[i * self.size + j]
    }

    /// Mean similarity of text `i` to every other text. `1.0` when alone.
    pub fn mean_to_others(&self, i: usize) -> f64 {
        if self.size < 2 {
            return 1.0;
        }

        let total: f64 = (0..self.size).filter(|&j| j != i).map(|j| self.get(i, j)).sum();
        total / (self.size - 1) as f64
    }

    /// Mean over all unordered pairs. `1.0` for fewer than two texts.
    pub fn mean_pairwise(&self) -> f64 {
        if self.size < 2 {
            return 1.0;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                total += self.get(i, j);
                pairs += 1;
            }
        }

        total / pairs as f64
    }
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut b2j: AHashMap<char, Vec<usize>> = AHashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b2j.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }

        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the given windows.
///
/// Among maximal blocks, the one starting earliest in `a` wins, then earliest
/// in `b`.
fn longest_match(
    a: &[char],
    b2j: &AHashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // j2len[j] = length of the match ending at a[i - 1], b[j]
    let mut j2len: AHashMap<usize, usize> = AHashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: AHashMap<usize, usize> = AHashMap::new();

        if let Some(positions) = b2j.get(ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }

                let k = j.checked_sub(1).and_then(|prev| j2len.get(&prev)).copied().unwrap_or(0) + 1;
                next.insert(j, k);

                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }

        j2len = next;
    }

    (best_i, best_j, best_size)
}
