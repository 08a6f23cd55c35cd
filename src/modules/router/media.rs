//! Media types and Accept negotiation.
//!
//! Parsing is deliberately small: `type/subtype` with `*` wildcards and
//! q-value ordering for Accept headers. No parameters beyond `q` are
//! interpreted.

use super::error::{RouterError, RouterResult};
use std::fmt;

/// A media type such as `application/json` or `text/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    main: String,
    sub: String,
}

impl MediaType {
    /// The `*/*` wildcard.
    #[must_use]
    pub fn any() -> Self {
        Self {
            main: "*".to_string(),
            sub: "*".to_string(),
        }
    }

    /// `application/json`.
    #[must_use]
    pub fn json() -> Self {
        Self {
            main: "application".to_string(),
            sub: "json".to_string(),
        }
    }

    /// `text/plain`.
    #[must_use]
    pub fn text() -> Self {
        Self {
            main: "text".to_string(),
            sub: "plain".to_string(),
        }
    }

    /// Parse a `type/subtype` string, ignoring any `;` parameters.
    pub fn parse(value: &str) -> RouterResult<Self> {
        let essence = value.split(';').next().unwrap_or("").trim();
        let mut parts = essence.split('/');

        let main = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let sub = parts.next().unwrap_or("").trim().to_ascii_lowercase();

        if main.is_empty() || sub.is_empty() || parts.next().is_some() {
            return Err(RouterError::InvalidMediaType(value.to_string()));
        }

        Ok(Self { main, sub })
    }

    /// The main type.
    #[must_use]
    pub fn main(&self) -> &str {
        &self.main
    }

    /// The subtype.
    #[must_use]
    pub fn sub(&self) -> &str {
        &self.sub
    }

    /// Compatibility check; wildcards on either side match.
    #[must_use]
    pub fn matches(&self, other: &MediaType) -> bool {
        let main_ok = self.main == "*" || other.main == "*" || self.main == other.main;
        let sub_ok = self.sub == "*" || other.sub == "*" || self.sub == other.sub;
        main_ok && sub_ok
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)
    }
}

/// Parse an `Accept` header into media types ordered by q-value, highest
/// first. Unparseable entries and entries with `q=0` are skipped.
#[must_use]
pub fn parse_accept(header: &str) -> Vec<MediaType> {
    let mut entries: Vec<(MediaType, f32)> = Vec::new();

    for part in header.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let mut q = 1.0f32;
        for param in part.split(';').skip(1) {
            let param = param.trim();
            if let Some(value) = param.strip_prefix("q=") {
                q = value.trim().parse().unwrap_or(1.0);
            }
        }

        if q <= 0.0 {
            continue;
        }

        if let Ok(media) = MediaType::parse(part) {
            entries.push((media, q));
        }
    }

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().map(|(media, _)| media).collect()
}

/// Check whether any accepted media type matches any produced one.
///
/// An empty accept list (absent or vacuous header) and an empty produces
/// list (unconstrained route) both accept everything.
#[must_use]
pub fn intersects(accept: &[MediaType], produces: &[MediaType]) -> bool {
    if accept.is_empty() || produces.is_empty() {
        return true;
    }

    accept
        .iter()
        .any(|a| produces.iter().any(|p| a.matches(p)))
}

/// Parse a list of media type strings.
pub fn parse_all(values: &[String]) -> RouterResult<Vec<MediaType>> {
    values.iter().map(|v| MediaType::parse(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_type() {
        let media = MediaType::parse("application/json").unwrap();
        assert_eq!(media.main(), "application");
        assert_eq!(media.sub(), "json");
        assert_eq!(media.to_string(), "application/json");
    }

    #[test]
    fn test_parse_ignores_parameters() {
        let media = MediaType::parse("text/plain; charset=utf-8").unwrap();
        assert_eq!(media, MediaType::text());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(MediaType::parse("").is_err());
        assert!(MediaType::parse("json").is_err());
        assert!(MediaType::parse("a/b/c").is_err());
    }

    #[test]
    fn test_wildcard_matching() {
        let any = MediaType::any();
        let json = MediaType::json();
        let text_any = MediaType::parse("text/*").unwrap();

        assert!(any.matches(&json));
        assert!(json.matches(&any));
        assert!(text_any.matches(&MediaType::text()));
        assert!(!text_any.matches(&json));
        assert!(!json.matches(&MediaType::text()));
    }

    #[test]
    fn test_parse_accept_ordering() {
        let accept = parse_accept("text/plain;q=0.5, application/json, text/html;q=0.8");
        assert_eq!(accept[0], MediaType::json());
        assert_eq!(accept[1], MediaType::parse("text/html").unwrap());
        assert_eq!(accept[2], MediaType::text());
    }

    #[test]
    fn test_parse_accept_skips_rejected() {
        let accept = parse_accept("application/xml;q=0, application/json");
        assert_eq!(accept, vec![MediaType::json()]);
    }

    #[test]
    fn test_intersects() {
        let accept = parse_accept("application/json");
        assert!(intersects(&accept, &[MediaType::json()]));
        assert!(!intersects(&accept, &[MediaType::text()]));

        // Absent header and unconstrained route both accept everything.
        assert!(intersects(&[], &[MediaType::json()]));
        assert!(intersects(&accept, &[]));
    }

    #[test]
    fn test_intersects_wildcard_accept() {
        let accept = parse_accept("*/*");
        assert!(intersects(&accept, &[MediaType::json()]));
    }
}
