//! Martin Porter's 1980 suffix-stripping algorithm for English.
//!
//! Words are lowercased first. Words of two letters or less, and words with
//! non-ASCII characters, come back lowercased but otherwise untouched.
//!
//! ```
//! use ricochet::analysis::token_filter::stem::{PorterStemmer, Stemmer};
//!
//! assert_eq!(PorterStemmer.stem("relational"), "relat");
//! assert_eq!(PorterStemmer.stem("hopping"), "hop");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

#[derive(Clone, Copy, Debug, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        Self
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let lowered = word.to_lowercase();
        if lowered.len() <= 2 || !lowered.is_ascii() {
            return lowered;
        }

        let mut w = Word::new(&lowered);
        w.plurals_and_participles();
        w.terminal_y();
        w.double_suffixes();
        w.ic_ful_ness();
        w.single_suffixes();
        w.tidy_up();
        w.into_string()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
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
    ("logi", "log"),
];

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Working buffer. `stem_len` is the length of the word without the suffix
/// matched by the last successful [`Word::ends`].
struct Word {
    b: Vec<u8>,
    stem_len: usize,
}

impl Word {
    fn new(word: &str) -> Self {
        Word {
            b: word.as_bytes().to_vec(),
            stem_len: 0,
        }
    }

    fn into_string(self) -> String {
        self.b.into_iter().map(char::from).collect()
    }

    fn is_consonant(&self, i: usize) -> bool {
        match self.b[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.is_consonant(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant runs in `b[..len]`.
    fn measure(&self, len: usize) -> usize {
        let mut i = 0;
        while i < len && self.is_consonant(i) {
            i += 1;
        }
        let mut runs = 0;
        loop {
            while i < len && !self.is_consonant(i) {
                i += 1;
            }
            if i >= len {
                return runs;
            }
            while i < len && self.is_consonant(i) {
                i += 1;
            }
            runs += 1;
        }
    }

    fn has_vowel(&self, len: usize) -> bool {
        (0..len).any(|i| !self.is_consonant(i))
    }

    fn ends_in_double_consonant(&self, len: usize) -> bool {
        len >= 2 && self.b[len - 1] == self.b[len - 2] && self.is_consonant(len - 1)
    }

    /// consonant-vowel-consonant, the last not `w`, `x` or `y`.
    fn ends_cvc(&self, len: usize) -> bool {
        len >= 3
            && self.is_consonant(len - 3)
            && !self.is_consonant(len - 2)
            && self.is_consonant(len - 1)
            && !matches!(self.b[len - 1], b'w' | b'x' | b'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        if self.b.ends_with(suffix.as_bytes()) {
            self.stem_len = self.b.len() - suffix.len();
            true
        } else {
            false
        }
    }

    fn replace(&mut self, with: &str) {
        self.b.truncate(self.stem_len);
        self.b.extend_from_slice(with.as_bytes());
    }

    /// First matching rule wins, applied only when the stem has a measure
    /// above zero.
    fn apply_table(&mut self, table: &[(&str, &str)]) {
        if let Some((_, with)) = table.iter().find(|(suffix, _)| self.ends(suffix)) {
            if self.measure(self.stem_len) > 0 {
                self.replace(with);
            }
        }
    }

    fn plurals_and_participles(&mut self) {
        if self.b.last() == Some(&b's') {
            if self.ends("sses") {
                self.b.truncate(self.b.len() - 2);
            } else if self.ends("ies") {
                self.replace("i");
            } else if self.b[self.b.len() - 2] != b's' {
                self.b.pop();
            }
        }

        if self.ends("eed") {
            if self.measure(self.stem_len) > 0 {
                self.b.pop();
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.has_vowel(self.stem_len) {
            self.b.truncate(self.stem_len);
            if self.ends("at") || self.ends("bl") || self.ends("iz") {
                self.b.push(b'e');
            } else if self.ends_in_double_consonant(self.b.len()) {
                if !matches!(self.b.last(), Some(b'l' | b's' | b'z')) {
                    self.b.pop();
                }
            } else if self.measure(self.b.len()) == 1 && self.ends_cvc(self.b.len()) {
                self.b.push(b'e');
            }
        }
    }

    fn terminal_y(&mut self) {
        if self.ends("y") && self.has_vowel(self.stem_len) {
            let last = self.b.len() - 1;
            self.b[last] = b'i';
        }
    }

    fn double_suffixes(&mut self) {
        self.apply_table(STEP2);
    }

    fn ic_ful_ness(&mut self) {
        self.apply_table(STEP3);
    }

    fn single_suffixes(&mut self) {
        let Some(suffix) = STEP4.iter().find(|suffix| self.ends(suffix)) else {
            return;
        };
        // -ion only goes after s or t.
        let before = self.stem_len.checked_sub(1).map(|i| self.b[i]);
        if *suffix == "ion" && !matches!(before, Some(b's' | b't')) {
            return;
        }
        if self.measure(self.stem_len) > 1 {
            self.b.truncate(self.stem_len);
        }
    }

    fn tidy_up(&mut self) {
        let len = self.b.len();
        if self.b[len - 1] == b'e' {
            let m = self.measure(len - 1);
            if m > 1 || (m == 1 && !self.ends_cvc(len - 1)) {
                self.b.pop();
            }
        }
        if self.b.ends_with(b"ll") && self.measure(self.b.len()) > 1 {
            self.b.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer.stem(word)
    }

    #[test]
    fn test_vocabulary() {
        let cases = [
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("cats", "cat"),
            ("feed", "feed"),
            ("agreed", "agre"),
            ("plastered", "plaster"),
            ("motoring", "motor"),
            ("conflated", "conflat"),
            ("hopping", "hop"),
            ("falling", "fall"),
            ("filing", "file"),
            ("happy", "happi"),
            ("relational", "relat"),
            ("traditional", "tradit"),
            ("electrical", "electr"),
            ("adoption", "adopt"),
            ("controll", "control"),
            ("running", "run"),
            ("flies", "fli"),
            ("died", "di"),
        ];
        for (word, expected) in cases {
            assert_eq!(stem(word), expected, "{word}");
        }
    }

    #[test]
    fn test_short_and_non_ascii_words() {
        assert_eq!(stem("Is"), "is");
        assert_eq!(stem("Ærøskøbing"), "ærøskøbing");
        assert_eq!(stem("東京"), "東京");
    }

    #[test]
    fn test_measure() {
        for (word, m) in [("tree", 0), ("trees", 1), ("trouble", 1), ("troubles", 2)] {
            let w = Word::new(word);
            assert_eq!(w.measure(word.len()), m, "{word}");
        }
    }

    #[test]
    fn test_y_is_a_vowel_after_a_consonant() {
        let w = Word::new("sky");
        assert!(w.is_consonant(1));
        assert!(!w.is_consonant(2));
        assert!(Word::new("yes").is_consonant(0));
    }
}
