//! Query and document term normalization
//!
//! A Sphinx search index stores *stemmed* terms ("configur", "aggreg",
//! "instal"), so anything matched against it has to go through the same
//! pipeline the documentation build and the browser widget use: lowercase,
//! drop stopwords, apply the Porter (1980) stemming algorithm.

/// The English stopword list the browser search widget ships.
pub const STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Check whether a (lowercased) word is an English stopword.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// One word of a user query, in both raw and index-normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWord {
    /// The word as typed, lowercased, with edge punctuation stripped
    pub original: String,

    /// The Porter-stemmed form, matching how the index stores terms
    pub stemmed: String,

    /// Whether the word is a stopword (usually dropped before lookup)
    pub stopword: bool,
}

/// Split a free-form query into normalized words.
///
/// Words are lowercased and stripped of edge punctuation; interior dots
/// survive so dotted symbol paths can still match the object inventory.
/// Stopwords are *flagged*, not removed: the searcher keeps a stopword
/// when it happens to exist verbatim in the index.
pub fn normalize_query(query: &str) -> Vec<QueryWord> {
    query
        .split_whitespace()
        .filter_map(|raw| {
            let word = raw
                .trim_matches(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                .to_lowercase();
            if word.is_empty() {
                return None;
            }
            Some(QueryWord {
                stemmed: porter_stem(&word),
                stopword: is_stopword(&word),
                original: word,
            })
        })
        .collect()
}

/// Split document text into lowercase tokens the way the index builder
/// does: runs of alphanumerics and underscores, everything else is a
/// separator.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Stem an English word with the Porter (1980) algorithm.
///
/// The input is lowercased first. Words shorter than three characters,
/// and words containing anything outside ASCII alphanumerics, are
/// returned unchanged (lowercased): that is what the widget's stemmer
/// does, and it keeps numeric terms like `24hr` intact.
pub fn porter_stem(word: &str) -> String {
    let w = word.to_lowercase();
    if w.len() <= 2 || !w.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return w;
    }
    let mut b = w.into_bytes();
    step1a(&mut b);
    step1b(&mut b);
    step1c(&mut b);
    step2(&mut b);
    step3(&mut b);
    step4(&mut b);
    step5a(&mut b);
    step5b(&mut b);
    // The buffer only ever shrinks or gets ASCII pushed, so this cannot
    // fail; avoid the unchecked conversion anyway.
    String::from_utf8(b).unwrap_or_default()
}

/// Is `w[i]` a consonant? `y` counts as a consonant at the start of the
/// word or after a vowel.
fn is_cons(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_cons(w, i - 1),
        _ => true,
    }
}

/// The Porter measure *m*: the number of vowel-consonant sequences in
/// `[C](VC)^m[V]`.
fn measure(w: &[u8]) -> usize {
    let n = w.len();
    let mut i = 0;
    while i < n && is_cons(w, i) {
        i += 1;
    }
    let mut m = 0;
    loop {
        while i < n && !is_cons(w, i) {
            i += 1;
        }
        if i == n {
            return m;
        }
        m += 1;
        while i < n && is_cons(w, i) {
            i += 1;
        }
        if i == n {
            return m;
        }
    }
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_cons(w, i))
}

/// Stem ends with a double consonant (`-tt`, `-ss`, ...).
fn ends_double(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_cons(w, n - 1)
}

/// Stem ends consonant-vowel-consonant where the final consonant is not
/// `w`, `x`, or `y` (the `*o` condition).
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_cons(w, n - 3)
        && !is_cons(w, n - 2)
        && is_cons(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn ends_with(w: &[u8], suffix: &str) -> bool {
    w.len() > suffix.len() && w.ends_with(suffix.as_bytes())
}

fn truncate(w: &mut Vec<u8>, by: usize) {
    let n = w.len();
    w.truncate(n - by);
}

/// Step 1a: plurals. SSES -> SS, IES -> I, SS -> SS, S -> ε.
fn step1a(w: &mut Vec<u8>) {
    if ends_with(w, "sses") || ends_with(w, "ies") {
        truncate(w, 2);
    } else if w.ends_with(b"s") && !w.ends_with(b"ss") {
        truncate(w, 1);
    }
}

/// Step 1b: -eed, -ed, -ing, with the at/bl/iz and double-consonant
/// fixups from the paper.
fn step1b(w: &mut Vec<u8>) {
    if ends_with(w, "eed") {
        if measure(&w[..w.len() - 3]) > 0 {
            truncate(w, 1);
        }
        return;
    }
    let removed = if ends_with(w, "ed") && has_vowel(&w[..w.len() - 2]) {
        truncate(w, 2);
        true
    } else if ends_with(w, "ing") && has_vowel(&w[..w.len() - 3]) {
        truncate(w, 3);
        true
    } else {
        false
    };
    if !removed {
        return;
    }
    if ends_with(w, "at") || ends_with(w, "bl") || ends_with(w, "iz") {
        w.push(b'e');
    } else if ends_double(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
        truncate(w, 1);
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

/// Step 1c: terminal y -> i when the stem contains a vowel.
fn step1c(w: &mut Vec<u8>) {
    if w.ends_with(b"y") && has_vowel(&w[..w.len() - 1]) {
        let n = w.len();
        w[n - 1] = b'i';
    }
}

/// Suffix table rules: replace the longest matching suffix when the
/// remaining stem has measure greater than `min_m`.
fn apply_table(w: &mut Vec<u8>, table: &[(&str, &str)], min_m: usize) {
    let best = table
        .iter()
        .filter(|(suffix, _)| ends_with(w, suffix))
        .max_by_key(|(suffix, _)| suffix.len());
    if let Some((suffix, replacement)) = best {
        let stem_len = w.len() - suffix.len();
        if measure(&w[..stem_len]) > min_m {
            w.truncate(stem_len);
            w.extend_from_slice(replacement.as_bytes());
        }
    }
}

fn step2(w: &mut Vec<u8>) {
    const TABLE: &[(&str, &str)] = &[
        ("ational", "ate"),
        ("tional", "tion"),
        ("enci", "ence"),
        ("anci", "ance"),
        ("izer", "ize"),
        ("abli", "able"),
        ("alli", "al"),
        ("entli", "ent"),
        ("eli", "e"),
        ("ousli", "ous"),
        ("ization", "ize"),
        ("ation", "ate"),
        ("ator", "ate"),
        ("alism", "al"),
        ("iveness", "ive"),
        ("fulness", "ful"),
        ("ousness", "ous"),
        ("aliti", "al"),
        ("iviti", "ive"),
        ("biliti", "ble"),
    ];
    apply_table(w, TABLE, 0);
}

fn step3(w: &mut Vec<u8>) {
    const TABLE: &[(&str, &str)] = &[
        ("icate", "ic"),
        ("ative", ""),
        ("alize", "al"),
        ("iciti", "ic"),
        ("ical", "ic"),
        ("ful", ""),
        ("ness", ""),
    ];
    apply_table(w, TABLE, 0);
}

/// Step 4: strip residual suffixes when m > 1. `-ion` additionally
/// requires the stem to end in `s` or `t`.
fn step4(w: &mut Vec<u8>) {
    const SUFFIXES: &[&str] = &[
        "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion",
        "ou", "ism", "ate", "iti", "ous", "ive", "ize",
    ];
    let best = SUFFIXES
        .iter()
        .filter(|suffix| ends_with(w, suffix))
        .max_by_key(|suffix| suffix.len());
    if let Some(suffix) = best {
        let stem_len = w.len() - suffix.len();
        if *suffix == "ion" && !matches!(w.get(stem_len.wrapping_sub(1)), Some(b's' | b't')) {
            return;
        }
        if measure(&w[..stem_len]) > 1 {
            w.truncate(stem_len);
        }
    }
}

/// Step 5a: drop a terminal e when m > 1, or when m == 1 and the stem
/// does not end cvc.
fn step5a(w: &mut Vec<u8>) {
    if !w.ends_with(b"e") || w.len() < 2 {
        return;
    }
    let stem = &w[..w.len() - 1];
    let m = measure(stem);
    if m > 1 || (m == 1 && !ends_cvc(stem)) {
        truncate(w, 1);
    }
}

/// Step 5b: -ll -> -l when m > 1.
fn step5b(w: &mut Vec<u8>) {
    if w.ends_with(b"ll") && measure(w) > 1 {
        truncate(w, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Examples from Porter's 1980 paper, step by step.
    #[test]
    fn test_paper_examples() {
        let cases = [
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("ties", "ti"),
            ("cats", "cat"),
            ("agreed", "agre"),
            ("plastered", "plaster"),
            ("motoring", "motor"),
            ("sing", "sing"),
            ("conflated", "conflat"),
            ("troubled", "troubl"),
            ("sized", "size"),
            ("hopping", "hop"),
            ("tanned", "tan"),
            ("falling", "fall"),
            ("hissing", "hiss"),
            ("failing", "fail"),
            ("filing", "file"),
            ("happy", "happi"),
            ("sky", "sky"),
            ("relational", "relat"),
            ("conditional", "condit"),
            ("rational", "ration"),
            ("digitizer", "digit"),
            ("operator", "oper"),
            ("feudalism", "feudal"),
            ("hopefulness", "hope"),
            ("triplicate", "triplic"),
            ("formative", "form"),
            ("electrical", "electr"),
            ("hopeful", "hope"),
            ("goodness", "good"),
            ("adjustable", "adjust"),
            ("replacement", "replac"),
            ("adoption", "adopt"),
            ("controlling", "control"),
        ];
        for (input, expected) in cases {
            assert_eq!(porter_stem(input), expected, "stem of {input:?}");
        }
    }

    /// Stems that appear in real Sphinx search indices.
    #[test]
    fn test_sphinx_index_vocabulary() {
        assert_eq!(porter_stem("configuration"), "configur");
        assert_eq!(porter_stem("installation"), "instal");
        assert_eq!(porter_stem("install"), "instal");
        assert_eq!(porter_stem("aggregated"), "aggreg");
        assert_eq!(porter_stem("endpoints"), "endpoint");
        assert_eq!(porter_stem("relay"), "relai");
        assert_eq!(porter_stem("search"), "search");
    }

    #[test]
    fn test_short_and_non_ascii_words_pass_through() {
        assert_eq!(porter_stem("is"), "is");
        assert_eq!(porter_stem("API"), "api");
        assert_eq!(porter_stem("naïve"), "naïve");
        assert_eq!(porter_stem("24hr"), "24hr");
        assert_eq!(porter_stem("100"), "100");
    }

    #[test]
    fn test_stopword_list_is_sorted_for_binary_search() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(STOPWORDS, sorted.as_slice());
    }

    #[test]
    fn test_normalize_query() {
        let words = normalize_query("  The Configuration, (installing)!");
        assert_eq!(words.len(), 3);
        assert!(words[0].stopword);
        assert_eq!(words[1].original, "configuration");
        assert_eq!(words[1].stemmed, "configur");
        assert_eq!(words[2].stemmed, "instal");
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        let tokens: Vec<String> = tokenize("Relay.Client sends JSON-encoded frames_2").collect();
        assert_eq!(
            tokens,
            vec!["relay", "client", "sends", "json", "encoded", "frames_2"]
        );
    }
}
