//! Arabic text normalization for equality comparison.
//!
//! Stored corpus text is never rewritten; roots and surface forms are passed
//! through [`normalize`] only at the point where two of them are compared.

/// Roots whose normalized form is shorter than this are treated as noise
/// (particles, mis-tagged clitics) and excluded from co-occurrence data.
pub const MIN_ROOT_LEN: usize = 3;

/// Normalize Arabic text: strips diacritics and tatweel, folds alef variants to
/// bare alef, and drops everything outside the Arabic letter block (including
/// whitespace, so `"ر ح م"`, `"ر-ح-م"` and `"رحم"` compare equal).
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            // Harakat, tanween, shadda, sukun, dagger alef
            '\u{064B}'..='\u{065F}' | '\u{0670}' => None,
            // Honorifics and Quranic annotation marks
            '\u{0610}'..='\u{061A}' | '\u{06D6}'..='\u{06ED}' => None,
            // Tatweel
            '\u{0640}' => None,
            // Hamza-above, hamza-below, madda, wasla, wavy hamza
            'أ' | 'إ' | 'آ' | 'ٱ' | '\u{0672}' | '\u{0673}' => Some('ا'),
            c if is_arabic_letter(c) => Some(c),
            _ => None,
        })
        .collect()
}

fn is_arabic_letter(c: char) -> bool {
    matches!(c,
        '\u{0621}'..='\u{063A}'
        | '\u{0641}'..='\u{064A}'
        | '\u{066E}'..='\u{066F}'
        | '\u{0674}'..='\u{06D3}'
        | '\u{06D5}'
        | '\u{06EE}'..='\u{06EF}'
        | '\u{06FA}'..='\u{06FC}'
        | '\u{06FF}'
    )
}

/// Character length of an already-normalized root.
pub fn root_len(normalized: &str) -> usize {
    normalized.chars().count()
}

/// Whether an already-normalized root is long enough to take part in
/// co-occurrence and lexicon listings.
pub fn is_significant_root(normalized: &str) -> bool {
    root_len(normalized) >= MIN_ROOT_LEN
}
