/// Split text into lower-cased terms.
///
/// A term is a maximal run of word characters (alphanumeric or `_`) at
/// least two characters long. Single-character runs are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !is_word_char(c))
        .filter(|tok| tok.chars().nth(1).is_some())
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
