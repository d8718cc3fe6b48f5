//! Tokenizing and strict argument parsing

/// Split a line on ASCII spaces, dropping empty tokens
///
/// Runs of spaces collapse; other whitespace is kept inside tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').filter(|token| !token.is_empty()).collect()
}

/// Join query words back together with single spaces
pub fn join_query(words: &[&str]) -> String {
    words.join(" ")
}

/// Parse a float that spans the whole token
pub fn parse_f32(token: &str) -> Option<f32> {
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parse a 1-based index that spans the whole token
pub fn parse_index(token: &str) -> Option<usize> {
    token.parse::<usize>().ok()
}

/// Parse a loop flag: `true|t|1` or `false|f|0`
pub fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}
