use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+").expect("Invalid digit run regex")
});

/// Turkish letters and their ASCII stand-ins.
const TURKISH_FOLDS: [(char, char); 12] = [
    ('ı', 'i'),
    ('İ', 'I'),
    ('ğ', 'g'),
    ('Ğ', 'G'),
    ('ü', 'u'),
    ('Ü', 'U'),
    ('ş', 's'),
    ('Ş', 'S'),
    ('ö', 'o'),
    ('Ö', 'O'),
    ('ç', 'c'),
    ('Ç', 'C'),
];

/// Turn a display label such as "Bulunduğu Kat" into an identifier such as
/// "Bulundugu_Kat". Characters outside the fold table are left untouched.
pub fn normalize_label(text: &str) -> String {
    text.chars()
        .map(|c| {
            TURKISH_FOLDS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Every maximal run of ASCII digits in `text`, in order of appearance.
pub fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    DIGIT_RUN_REGEX.find_iter(text).map(|m| m.as_str())
}

/// Concatenate all digit runs: "1.250.000 TL" becomes "1250000".
pub fn extract_digits(text: &str) -> String {
    digit_runs(text).collect()
}
