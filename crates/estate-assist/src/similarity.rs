//! Lexical similarity scores used by the FAQ and hybrid matchers.
//!
//! Both scores are normalised to `[0.0, 1.0]`. `ratio` is the plain
//! edit-distance ratio over the whole strings; `partial_ratio` scores the
//! shorter string against its best-matching equal-length window of the
//! longer one, so a short query can still score high against a long
//! listing description.

/// Full-string edit-distance ratio.
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Best-window edit-distance ratio of the shorter string against the
/// longer one. Returns 0.0 when either side is empty.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 0.0;
    }

    let long_chars: Vec<char> = long.chars().collect();
    let mut best = 0.0f64;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        let score = strsim::normalized_levenshtein(short, &window);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }
    best
}
