//! RFC 5988 `link` header parsing
//!
//! GitHub paginates list endpoints with headers such as
//!
//! ```text
//! link: <https://api.github.com/...?page=2>; rel="next", <https://api.github.com/...?page=5>; rel="last"
//! ```
//!
//! Only the `next` relation drives pagination.

use crate::error::{Error, Result};
use url::Url;

/// A single `<url>; rel="..."` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target URL as written in the header (may be relative)
    pub url: String,
    /// Relation types, lower-cased
    pub rels: Vec<String>,
}

impl Link {
    /// Check whether this link carries the given relation type
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse a `link` header value into its entries
///
/// Entries whose target cannot be extracted are skipped unless they declare a
/// `next` relation; a broken `next` link is an error because dropping it would
/// silently truncate the listing.
pub fn parse_link_header(value: &str) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_ascii_whitespace());
        if rest.is_empty() {
            break;
        }
        let (entry, tail) = split_entry(rest);
        rest = tail;

        match parse_entry(entry) {
            Some(link) => links.push(link),
            None if declares_next(entry) => {
                return Err(Error::Pagination(format!(
                    "failed to extract the next URL from link header entry {:?}",
                    entry.trim()
                )));
            }
            None => {}
        }
    }

    Ok(links)
}

/// Find the `next` link, if any
pub fn next_link(links: &[Link]) -> Option<&Link> {
    links.iter().find(|link| link.has_rel("next"))
}

/// Resolve the `next` link against the URL of the page that returned it
pub(crate) fn next_url(links: &[Link], current: &Url) -> Result<Option<Url>> {
    let Some(link) = next_link(links) else {
        return Ok(None);
    };
    current
        .join(&link.url)
        .map(Some)
        .map_err(|e| Error::Pagination(format!("invalid next URL {:?}: {}", link.url, e)))
}

/// Split off the first entry at a top-level comma (outside `<...>` and quotes)
fn split_entry(input: &str) -> (&str, &str) {
    let mut in_target = false;
    let mut in_quotes = false;
    for (i, c) in input.char_indices() {
        match c {
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            '"' if !in_target => in_quotes = !in_quotes,
            ',' if !in_target && !in_quotes => return (&input[..i], &input[i + 1..]),
            _ => {}
        }
    }
    (input, "")
}

fn parse_entry(entry: &str) -> Option<Link> {
    let entry = entry.trim().strip_prefix('<')?;
    let end = entry.find('>')?;
    let url = entry[..end].trim();
    if url.is_empty() {
        return None;
    }
    Some(Link {
        url: url.to_string(),
        rels: rels(&entry[end + 1..]),
    })
}

/// Relation types from the `rel` parameter of an entry's parameter list
fn rels(params: &str) -> Vec<String> {
    params
        .split(';')
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("rel")
                .then(|| value.trim().trim_matches('"'))
        })
        .flat_map(|value| value.split_ascii_whitespace())
        .map(|rel| rel.to_ascii_lowercase())
        .collect()
}

/// Whether a malformed entry still announces a next page
fn declares_next(entry: &str) -> bool {
    let params = match entry.find('>') {
        Some(end) => &entry[end + 1..],
        None => entry,
    };
    rels(params).iter().any(|rel| rel == "next")
}
