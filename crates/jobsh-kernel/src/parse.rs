//! Command-line tokenization.
//!
//! Deliberately minimal: whitespace-separated words, single quotes group
//! a word, and a trailing `&` requests a background launch. No pipes,
//! no expansion, no redirection.

/// Split `line` into an argument vector and a background flag.
///
/// The trailing `&` is consumed and never appears in the result.
pub fn tokenize(line: &str) -> (Vec<String>, bool) {
    let trimmed = line.trim();

    let (body, background) = match trimmed.strip_suffix('&') {
        Some(rest) => (rest.trim_end(), true),
        None => (trimmed, false),
    };

    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in body.chars() {
        match c {
            '\'' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    argv.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        argv.push(current);
    }

    (argv, background)
}
