//! Request parameter shaping.
//!
//! Widget clients send identifier lists in several shapes: a single value, a
//! comma-delimited string, a JSON array, or a repeated/bracketed query key.
//! Everything funnels through [`normalize`] so commands only ever see
//! `Option<Vec<String>>`, where `None` means "no filter".

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// A body or query value that is either one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for OneOrMany {
    fn from(s: &str) -> Self { OneOrMany::One(s.to_string()) }
}

impl From<Vec<String>> for OneOrMany {
    fn from(v: Vec<String>) -> Self { OneOrMany::Many(v) }
}

/// Absent or empty input yields `None`; a single string is split on commas
/// (tokens are kept verbatim, empty ones included); a list passes through.
pub fn normalize(param: Option<OneOrMany>) -> Option<Vec<String>> {
    match param? {
        OneOrMany::One(s) if s.is_empty() => None,
        OneOrMany::One(s) => Some(s.split(',').map(str::to_string).collect()),
        OneOrMany::Many(v) if v.is_empty() => None,
        OneOrMany::Many(v) => Some(v),
    }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Decoded query string that keeps every occurrence of every key in order.
///
/// `key=a&key=b`, `key[]=a` and `key[0]=a` all read back as a list; a single
/// plain `key=a` reads back as one string.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

fn split_key(raw: &str) -> (&str, bool) {
    match raw.find('[') {
        Some(idx) if raw.ends_with(']') => (&raw[..idx], true),
        _ => (raw, false),
    }
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<OneOrMany> {
        let mut bracketed = false;
        let mut values: Vec<String> = Vec::new();
        for (k, v) in &self.pairs {
            let (base, br) = split_key(k);
            if base == key {
                bracketed |= br;
                values.push(v.clone());
            }
        }
        match values.len() {
            0 => None,
            1 if !bracketed => values.pop().map(OneOrMany::One),
            _ => Some(OneOrMany::Many(values)),
        }
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| split_key(k).0 == key).map(|(_, v)| v.as_str())
    }

    /// Identifier list for `key`, normalized.
    pub fn ids(&self, key: &str) -> Option<Vec<String>> { normalize(self.get(key)) }

    /// Optional boolean flag; present but unparsable is a request error.
    pub fn flag(&self, key: &str) -> AppResult<Option<bool>> {
        match self.first(key) {
            None => Ok(None),
            Some(v) => parse_bool(v)
                .map(Some)
                .ok_or_else(|| AppError::user(ErrorCode::InvalidQuery, format!("{key} must be a boolean value"))),
        }
    }

    /// Zero-based page number, defaulting to 0.
    pub fn page(&self, key: &str) -> AppResult<u32> {
        match self.first(key) {
            None | Some("") => Ok(0),
            Some(v) => v
                .parse::<u32>()
                .map_err(|_| AppError::user(ErrorCode::InvalidQuery, format!("{key} must be a non-negative integer"))),
        }
    }
}
