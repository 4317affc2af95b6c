//! Tokenizer for prose type phrases.
//!
//! "array of [channel](#DOCS_RESOURCES_CHANNEL/channel-object) objects (max 10)?"
//! becomes `array`, `of`, a link, `objects`, a parenthetical group and a
//! question mark.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Link { text: String, target: String },
    /// Contents of a parenthetical remark.
    Group(String),
    Question,
}

impl Token {
    /// Case-insensitive comparison against a word token.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(word))
    }

    /// Text this token contributes to a plain-words phrase.
    fn plain_text(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w.as_str()),
            Token::Link { text, .. } => Some(text.as_str()),
            Token::Group(_) | Token::Question => None,
        }
    }
}

/// Space-joined words and link texts of `tokens`.
pub fn plain_words(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(Token::plain_text)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokenize(phrase: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = phrase;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        match c {
            '?' => {
                tokens.push(Token::Question);
                rest = &rest[1..];
            }
            '(' => {
                let end = closing(rest, '(', ')').unwrap_or(rest.len());
                let inner = rest[1..end].trim().to_string();
                tokens.push(Token::Group(inner));
                rest = rest.get(end + 1..).unwrap_or("");
            }
            '[' => match link(rest) {
                Some((token, consumed)) => {
                    tokens.push(token);
                    rest = &rest[consumed..];
                }
                None => {
                    // Not a link: the bracketed text reads as plain words.
                    let end = closing(rest, '[', ']').unwrap_or(rest.len());
                    tokens.extend(tokenize(&rest[1..end]));
                    rest = rest.get(end + 1..).unwrap_or("");
                }
            },
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || matches!(c, '?' | '(' | '['))
                    .unwrap_or(rest.len());
                let word = clean_word(&rest[..end]);
                if !word.is_empty() {
                    tokens.push(Token::Word(word));
                }
                rest = &rest[end..];
            }
        }
    }

    tokens
}

/// Parse `[text](target)` at the start of `input`, returning the token and the
/// number of bytes consumed.
fn link(input: &str) -> Option<(Token, usize)> {
    let text_end = closing(input, '[', ']')?;
    let after = &input[text_end + 1..];
    if !after.starts_with('(') {
        return None;
    }
    let target_end = closing(after, '(', ')')?;
    let token = Token::Link {
        text: input[1..text_end].trim().to_string(),
        target: after[1..target_end].trim().to_string(),
    };
    Some((token, text_end + 1 + target_end + 1))
}

/// Byte index of the delimiter closing the one at the start of `input`.
fn closing(input: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn clean_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '*' | '`' | '\\'))
        .collect::<String>()
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '"' | ')' | ']'))
        .to_string()
}
