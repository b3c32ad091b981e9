//! Text similarity used to decide whether two OCR readings name the same
//! product.

use std::collections::{HashMap, HashSet};

/// Characters treated as OCR noise when comparing readings.
const NOISE_CHARS: &[char] = &[
    '[', ']', '(', ')', '{', '}', '\'', '"', '.', ',', ';', ':', '!', '?', '-',
];

/// Sequences at least this long get their most frequent characters pruned
/// from the match index, as the classic sequence matcher does.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Join fragments, lowercase, trim and blank out noise characters.
///
/// Whitespace runs are left intact; the character ratio is computed on this
/// string as is.
pub fn normalize_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    let parts: Vec<&str> = fragments.iter().map(|f| f.as_ref()).collect();
    let joined = parts.join(" ");
    joined
        .to_lowercase()
        .trim()
        .chars()
        .map(|c| if NOISE_CHARS.contains(&c) { ' ' } else { c })
        .collect()
}

/// Whitespace tokens of a normalized string, single-character tokens dropped.
pub fn tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .collect()
}

pub fn word_jaccard(a: &[&str], b: &[&str]) -> f64 {
    let a: HashSet<&str> = a.iter().copied().collect();
    let b: HashSet<&str> = b.iter().copied().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Ratcliff/Obershelp similarity: `2 * matched / (len(a) + len(b))`, where
/// `matched` is the total size of the recursively found longest common
/// blocks. Two empty strings are identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * SequenceMatcher::new(&a, &b).matched_len() as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }
        Self { a, b, b2j }
    }

    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
        let mut run_len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_run_len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_run_len.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            run_len = next_run_len;
        }

        // Pruned characters never seed a match but may still extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }
        (best_i, best_j, best_len)
    }

    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }
        matched
    }
}

/// Fuzzy same-product test over two OCR readings.
///
/// Both readings must keep at least one token after normalization; the match
/// holds when the better of word-Jaccard and the character ratio reaches
/// `threshold`.
pub fn texts_match<S: AsRef<str>, T: AsRef<str>>(a: &[S], b: &[T], threshold: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a_norm = normalize_fragments(a);
    let b_norm = normalize_fragments(b);
    let a_tokens = tokens(&a_norm);
    let b_tokens = tokens(&b_norm);
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return false;
    }

    let jaccard = word_jaccard(&a_tokens, &b_tokens);
    let ratio = sequence_ratio(&a_norm, &b_norm);
    jaccard.max(ratio) >= threshold
}

/// Key used for segment equality: lowercase alphanumerics only.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
