use std::collections::HashSet;
use std::fmt;

/// A distance between two field values.
///
/// Implementations must return `0.0` for equal inputs and never a negative
/// value. Whether the result is bounded by 1 and whether the triangle
/// inequality holds are reported separately, since composite measures and
/// the search structure depend on both.
pub trait StringMeasure: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn distance(&self, a: &str, b: &str) -> f64;

    /// True when every distance lies in `[0, 1]`.
    fn max_distance_is_one(&self) -> bool;

    /// True when the triangle inequality holds for all inputs.
    fn is_metric(&self) -> bool;
}

/// Unit-cost edit distance over chars.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl StringMeasure for Levenshtein {
    fn name(&self) -> &'static str {
        "Levenshtein"
    }

    fn distance(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.is_empty() || b.is_empty() {
            return a.len().max(b.len()) as f64;
        }

        let mut prev: Vec<usize> = (0..=b.len()).collect();
        let mut curr = vec![0usize; b.len() + 1];
        for (i, ca) in a.iter().enumerate() {
            curr[0] = i + 1;
            for (j, cb) in b.iter().enumerate() {
                let substitution = prev[j] + usize::from(ca != cb);
                curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        prev[b.len()] as f64
    }

    fn max_distance_is_one(&self) -> bool {
        false
    }

    fn is_metric(&self) -> bool {
        true
    }
}

/// Jaccard distance over character bigrams, with both ends padded so that
/// first and last letters count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jaccard;

impl StringMeasure for Jaccard {
    fn name(&self) -> &'static str {
        "Jaccard"
    }

    fn distance(&self, a: &str, b: &str) -> f64 {
        let (x, y) = (bigrams(a), bigrams(b));
        let shared = x.intersection(&y).count();
        let union = x.len() + y.len() - shared;
        if union == 0 {
            return 0.0;
        }
        1.0 - shared as f64 / union as f64
    }

    fn max_distance_is_one(&self) -> bool {
        true
    }

    fn is_metric(&self) -> bool {
        true
    }
}

/// Sørensen–Dice distance over padded bigrams. Bounded, but not a metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct SorensenDice;

impl StringMeasure for SorensenDice {
    fn name(&self) -> &'static str {
        "Sorensen-Dice"
    }

    fn distance(&self, a: &str, b: &str) -> f64 {
        let (x, y) = (bigrams(a), bigrams(b));
        let total = x.len() + y.len();
        if total == 0 {
            return 0.0;
        }
        let shared = x.intersection(&y).count();
        1.0 - 2.0 * shared as f64 / total as f64
    }

    fn max_distance_is_one(&self) -> bool {
        true
    }

    fn is_metric(&self) -> bool {
        false
    }
}

/// 0 for equal values, 1 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl StringMeasure for Exact {
    fn name(&self) -> &'static str {
        "Exact"
    }

    fn distance(&self, a: &str, b: &str) -> f64 {
        if a == b {
            0.0
        } else {
            1.0
        }
    }

    fn max_distance_is_one(&self) -> bool {
        true
    }

    fn is_metric(&self) -> bool {
        true
    }
}

type Bigram = (Option<char>, Option<char>);

fn bigrams(s: &str) -> HashSet<Bigram> {
    let padded: Vec<Option<char>> = std::iter::once(None)
        .chain(s.chars().map(Some))
        .chain(std::iter::once(None))
        .collect();
    padded.windows(2).map(|w| (w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_levenshtein() {
        let l = Levenshtein;
        assert_eq!(l.distance("kitten", "sitting"), 3.0);
        assert_eq!(l.distance("janet", "jane"), 1.0);
        assert_eq!(l.distance("", "abc"), 3.0);
        assert_eq!(l.distance("smith", "smith"), 0.0);
    }

    #[test]
    fn test_jaccard_padded_bigrams() {
        let j = Jaccard;
        assert!(close(j.distance("janet", "jane"), 3.0 / 7.0));
        assert!(close(j.distance("smith", "smyth"), 0.5));
        assert_eq!(j.distance("anna", "anna"), 0.0);
        assert_eq!(j.distance("ab", "xy"), 1.0);
    }

    #[test]
    fn test_dice() {
        let d = SorensenDice;
        // 4 shared out of 6 + 5 bigrams
        assert!(close(d.distance("janet", "jane"), 1.0 - 8.0 / 11.0));
        assert!(!d.is_metric());
    }

    #[test]
    fn test_exact() {
        assert_eq!(Exact.distance("M", "M"), 0.0);
        assert_eq!(Exact.distance("M", "F"), 1.0);
    }
}
