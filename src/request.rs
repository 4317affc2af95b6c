//! Documented requests.
//!
//! A section titled `Get Channel % GET /channels/{channel.id#DOCS_RESOURCES_CHANNEL/channel-object}`
//! documents an HTTP endpoint. The compiler turns it into a [`Request`] with a
//! path template, its parameters, and the body, query and response types found
//! in the section.

use crate::symbol::Symbol;
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

static RE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}#]+)(?:#[^}]*)?\}").unwrap());

// Only a sentence that starts with "Returns" names the response.
static RE_RETURNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[.!?]\s+)Returns\s+(.+?)(?:\s+on\s+success|\.(?:\s|$)|$)").unwrap()
});

static RE_OBJECT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sobjects?\b").unwrap());

/// Marker separating a request's name from its method and path.
pub const ACTION_MARKER: char = '%';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn parse(verb: &str) -> Option<Method> {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// What a request heading declares on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub name: String,
    pub method: Method,
    /// Path with placeholders reduced to `{name}`.
    pub path: String,
    pub parameters: Vec<String>,
}

/// Parse a request heading. Returns `None` for ordinary section titles.
pub fn parse_title(title: &str) -> Option<RequestLine> {
    let (name, action) = title.split_once(ACTION_MARKER)?;
    let action = action.trim();
    let (verb, raw_path) = action.split_once(char::is_whitespace)?;
    let method = Method::parse(verb)?;
    let raw_path = raw_path.trim();
    if raw_path.is_empty() {
        return None;
    }
    let (path, parameters) = path_template(raw_path);
    Some(RequestLine {
        name: name.trim().to_string(),
        method,
        path,
        parameters,
    })
}

/// Reduce `{channel.id#ANCHOR}` placeholders to `{channel_id}` and collect
/// the parameter names in order.
pub fn path_template(raw: &str) -> (String, Vec<String>) {
    let mut parameters = Vec::new();
    let path = RE_PARAM
        .replace_all(raw, |caps: &Captures| {
            let name = parameter_name(&caps[1]);
            parameters.push(name.clone());
            format!("{{{}}}", name)
        })
        .into_owned();
    (path, parameters)
}

fn parameter_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// The type phrase of a "Returns ..." sentence, if the text has one that
/// names a value.
pub fn response_phrase(text: &str) -> Option<String> {
    let caps = RE_RETURNS.captures(text)?;
    let mut phrase = caps[1].trim();
    for article in ["a ", "an ", "the "] {
        let head = phrase.get(..article.len());
        if head.is_some_and(|h| h.eq_ignore_ascii_case(article)) {
            phrase = phrase[article.len()..].trim_start();
            break;
        }
    }
    // "the [user](...) object of the requester's account" ends at "object".
    if let Some(m) = RE_OBJECT_WORD.find(phrase) {
        if !phrase[m.end()..].contains(']') {
            phrase = &phrase[..m.end()];
        }
    }
    let lower = phrase.to_lowercase();
    if phrase.is_empty() || lower.contains("204") || lower.contains("empty response") || lower.starts_with("nothing") {
        return None;
    }
    Some(phrase.to_string())
}

/// A documented HTTP endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub parameters: Vec<String>,
    /// Anchor of the documenting section.
    pub source: String,
    pub body: Option<Symbol>,
    pub query: Option<Symbol>,
    pub response: Option<Symbol>,
}

/// Serialized form of a request in the manifest.
#[derive(Debug, Serialize)]
pub struct RequestEntry<'r> {
    pub name: &'r str,
    pub method: Method,
    pub path: &'r str,
    pub parameters: &'r [String],
    pub anchor: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl Request {
    pub fn entry(&self) -> RequestEntry<'_> {
        RequestEntry {
            name: &self.name,
            method: self.method,
            path: &self.path,
            parameters: &self.parameters,
            anchor: &self.source,
            body: self.body.as_ref().map(Symbol::serialize),
            query: self.query.as_ref().map(Symbol::serialize),
            response: self.response.as_ref().map(Symbol::serialize),
        }
    }
}
