//! Prose type phrase → [`Symbol`].
//!
//! Modifiers are stripped in a fixed order, re-entering on the remainder:
//! `array of`, `?`, `partial`, `or`, a trailing `object`, a link, then
//! parenthetical remarks. Whatever is left is looked up in the primitive
//! vocabulary.

use super::phrase::{plain_words, tokenize, Token};
use super::Compiler;
use crate::symbol::{Primitive, Symbol};
use tracing::{debug, warn};

impl<'a> Compiler<'a> {
    /// Resolve a type phrase. Never fails: anything unrecognized becomes
    /// [`Symbol::Unknown`].
    pub fn resolve_type(&mut self, phrase: &str) -> Symbol {
        let tokens = tokenize(phrase);
        self.resolve_tokens(&tokens)
    }

    fn resolve_tokens(&mut self, tokens: &[Token]) -> Symbol {
        let Some(first) = tokens.first() else {
            return Symbol::Unknown;
        };

        // array of X / list of X
        if first.is_word("array") || first.is_word("list") {
            let rest = &tokens[1..];
            if rest.first().is_some_and(|t| t.is_word("of")) {
                return Symbol::array(self.resolve_tokens(&rest[1..]));
            }
            if rest.iter().all(|t| matches!(t, Token::Group(_))) {
                return Symbol::array(Symbol::Unknown);
            }
        }

        // X? then ?X
        if let Some(last) = tokens.iter().rposition(|t| !matches!(t, Token::Group(_))) {
            if tokens[last] == Token::Question {
                return Symbol::nullable(self.resolve_tokens(&tokens[..last]));
            }
        }
        if *first == Token::Question {
            return Symbol::nullable(self.resolve_tokens(&tokens[1..]));
        }

        if first.is_word("partial") && tokens.len() > 1 {
            return Symbol::partial(self.resolve_tokens(&tokens[1..]));
        }

        // X or Y, split on the first `or`
        if let Some(at) = tokens.iter().position(|t| t.is_word("or")) {
            if at > 0 && at + 1 < tokens.len() {
                let left = self.resolve_tokens(&tokens[..at]);
                let right = self.resolve_tokens(&tokens[at + 1..]);
                return Symbol::or(left, right);
            }
        }

        // X object
        if let Some(last) = tokens.iter().rposition(|t| !matches!(t, Token::Group(_))) {
            if last > 0 && (tokens[last].is_word("object") || tokens[last].is_word("objects")) {
                let mut rest = tokens[..last].to_vec();
                rest.extend_from_slice(&tokens[last + 1..]);
                return self.resolve_tokens(&rest);
            }
        }

        // A link binds only when it is all that is left.
        if let [Token::Link { target, .. }] = tokens {
            if let Some(symbol) = self.resolve_link(target) {
                return symbol;
            }
        }

        if tokens.iter().any(|t| matches!(t, Token::Group(_))) {
            let rest: Vec<Token> = tokens
                .iter()
                .filter(|t| !matches!(t, Token::Group(_)))
                .cloned()
                .collect();
            return self.resolve_tokens(&rest);
        }

        let words = plain_words(tokens);
        let primitive = Primitive::lookup(&words).or_else(|| head_noun(&words).and_then(Primitive::lookup));
        match primitive {
            Some(primitive) => Symbol::primitive(primitive),
            None => {
                if !Primitive::is_untyped(&words) {
                    debug!("unresolved type phrase \"{}\"", words);
                }
                Symbol::Unknown
            }
        }
    }

    /// Resolve a link target to the structure its section defines,
    /// registering the structure on first use.
    pub fn resolve_link(&mut self, target: &str) -> Option<Symbol> {
        let Some(hit) = self.links().get(target) else {
            warn!("unresolved link target {}", target);
            return None;
        };
        let id = self.add_resource_section(&hit)?;
        Some(Symbol::structure(id, self.structure(id).name()))
    }
}

/// Last word of a multi-word phrase: "role object ids" → "ids".
fn head_noun(words: &str) -> Option<&str> {
    words.rsplit_once(' ').map(|(_, head)| head)
}
