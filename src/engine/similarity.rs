//! Token-order-independent string similarity.
//!
//! Both names are normalised (Latin-1 range dropped, punctuation →
//! whitespace, lowercase, trimmed), their tokens sorted and re-joined, and the two resulting strings compared
//! with an insertion/deletion edit ratio. Scores are whole percentages, so
//! `similarity` only ever returns multiples of 0.01.

/// Stripped before normalisation, so `é` vanishes instead of splitting a token.
const LATIN1_RANGE: std::ops::RangeInclusive<char> = '\u{80}'..='\u{FF}';

/// Normalise a name into its sorted-token form.
///
/// Code points U+0080..=U+00FF are removed outright. Every remaining
/// character that is not alphanumeric (or `_`) becomes a space, the result is
/// lowercased, split on whitespace, sorted and re-joined with single spaces.
pub fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !LATIN1_RANGE.contains(c))
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}

/// Indel ratio of two already-processed strings, 0–100, halves to even.
fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0;
    }

    // (total - indel_distance) / total, where indel_distance = total - 2 * lcs
    let matched = 2 * lcs_len(&a, &b);
    (100.0 * (matched as f64 / total as f64)).round_ties_even() as u8
}

/// Token-sort ratio between two names on a 0–100 scale.
///
/// Returns 0 when either name is empty after normalisation.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    ratio(&a, &b)
}

/// Token-sort ratio normalised to 0.0–1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    f64::from(token_sort_ratio(a, b)) / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
