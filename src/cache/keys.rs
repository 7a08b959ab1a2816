//! Cache key derivation.
//!
//! Maps a read request descriptor to one canonical string key. Two requests
//! that would return identical, authorization-equivalent results must collide
//! to the same key; requests that could differ per principal must not. This
//! is the invariant that keeps personalized and role-restricted responses
//! from leaking across users.

use std::fmt;

use crate::domain::types::Role;

/// Sentinel identity and role segment shared by every unauthenticated caller,
/// so that all anonymous requests for a resource hit one cache entry.
pub const ANONYMOUS_SEGMENT: &str = "anonymous";

/// Principal attached to a read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    Known { identity: String, role: Role },
}

impl Requester {
    pub fn known(identity: impl Into<String>, role: Role) -> Self {
        Self::Known {
            identity: identity.into(),
            role,
        }
    }

    fn role_segment(&self) -> &str {
        match self {
            Requester::Anonymous => ANONYMOUS_SEGMENT,
            Requester::Known { role, .. } => role.as_str(),
        }
    }

    fn identity_segment(&self) -> &str {
        match self {
            Requester::Anonymous => ANONYMOUS_SEGMENT,
            Requester::Known { identity, .. } => identity,
        }
    }
}

/// Descriptor of a cacheable read request.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Canonical route identity, e.g. `/blogs` or `/blogs/{id}`.
    pub route: String,
    /// Query parameters in arbitrary order; normalized during derivation.
    pub params: Vec<(String, String)>,
    pub requester: Requester,
}

impl ReadRequest {
    pub fn new(
        route: impl Into<String>,
        params: Vec<(String, String)>,
        requester: Requester,
    ) -> Self {
        Self {
            route: route.into(),
            params,
            requester,
        }
    }

    pub fn anonymous(route: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self::new(route, params, Requester::Anonymous)
    }
}

/// Characters that structure a key: segment and query delimiters plus the
/// escape character itself. Escaped wherever caller-controlled text (identity,
/// parameter names and values) flows into a key, so crafted input can never
/// forge segment boundaries or extra parameters.
const KEY_DELIMITERS: &[(char, &str)] = &[
    ('%', "%25"),
    (':', "%3A"),
    ('?', "%3F"),
    ('&', "%26"),
    ('=', "%3D"),
];

fn escape_segment(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match KEY_DELIMITERS.iter().find(|(delim, _)| *delim == ch) {
            Some((_, replacement)) => escaped.push_str(replacement),
            None => escaped.push(ch),
        }
    }
    escaped
}

/// Canonical cache key: `{namespace}:{role}:{identity}:{route}?{query}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the canonical cache key for a read request.
///
/// Pure and total: parameter names are case-folded, pairs are sorted by name
/// then value, anonymous requesters collapse to the shared sentinel segments,
/// and delimiter characters in the identity and in parameter names and values
/// are escaped. Parameter order in the request never affects the result, and
/// no choice of caller-controlled text can make two distinct requests collide.
pub fn derive_key(namespace: &str, request: &ReadRequest) -> CacheKey {
    let mut normalized: Vec<(String, String)> = request
        .params
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect();
    normalized.sort();

    let mut key = format!(
        "{namespace}:{}:{}:{}",
        request.requester.role_segment(),
        escape_segment(request.requester.identity_segment()),
        request.route
    );

    if !normalized.is_empty() {
        key.push('?');
        for (index, (name, value)) in normalized.iter().enumerate() {
            if index > 0 {
                key.push('&');
            }
            key.push_str(&escape_segment(name));
            key.push('=');
            key.push_str(&escape_segment(value));
        }
    }

    CacheKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parameter_order_is_irrelevant() {
        let a = ReadRequest::anonymous("/blogs", params(&[("page", "2"), ("category", "rust")]));
        let b = ReadRequest::anonymous("/blogs", params(&[("category", "rust"), ("page", "2")]));

        assert_eq!(derive_key("rivista", &a), derive_key("rivista", &b));
    }

    #[test]
    fn parameter_names_are_case_folded() {
        let a = ReadRequest::anonymous("/blogs", params(&[("Page", "2")]));
        let b = ReadRequest::anonymous("/blogs", params(&[("page", "2")]));

        assert_eq!(derive_key("rivista", &a), derive_key("rivista", &b));
    }

    #[test]
    fn distinct_identities_never_collide() {
        let alice = ReadRequest::new(
            "/blogs",
            params(&[("page", "1")]),
            Requester::known("alice", Role::Reader),
        );
        let bob = ReadRequest::new(
            "/blogs",
            params(&[("page", "1")]),
            Requester::known("bob", Role::Reader),
        );

        assert_ne!(derive_key("rivista", &alice), derive_key("rivista", &bob));
    }

    #[test]
    fn distinct_roles_never_collide() {
        let admin = ReadRequest::new(
            "/blogs",
            vec![],
            Requester::known("carol", Role::Admin),
        );
        let reader = ReadRequest::new(
            "/blogs",
            vec![],
            Requester::known("carol", Role::Reader),
        );

        assert_ne!(derive_key("rivista", &admin), derive_key("rivista", &reader));
    }

    #[test]
    fn anonymous_callers_share_one_entry() {
        let a = ReadRequest::anonymous("/blogs/42", vec![]);
        let b = ReadRequest::anonymous("/blogs/42", vec![]);

        let key = derive_key("rivista", &a);
        assert_eq!(key, derive_key("rivista", &b));
        assert_eq!(key.as_str(), "rivista:anonymous:anonymous:/blogs/42");
    }

    #[test]
    fn delimiters_in_identity_are_escaped() {
        let crafted = ReadRequest::new(
            "/blogs",
            vec![],
            Requester::known("alice:admin", Role::Reader),
        );

        let key = derive_key("rivista", &crafted);
        // The ':' never becomes a segment boundary.
        assert_eq!(key.as_str(), "rivista:reader:alice%3Aadmin:/blogs");
    }

    #[test]
    fn delimiters_in_values_cannot_forge_extra_parameters() {
        let embedded = ReadRequest::anonymous("/blogs", params(&[("category", "a&page=2")]));
        let separate = ReadRequest::anonymous("/blogs", params(&[("category", "a"), ("page", "2")]));

        assert_ne!(derive_key("rivista", &embedded), derive_key("rivista", &separate));
    }

    #[test]
    fn key_layout_is_namespace_role_identity_route_query() {
        let request = ReadRequest::new(
            "/blogs",
            params(&[("page", "2"), ("category", "rust")]),
            Requester::known("alice", Role::Author),
        );

        let key = derive_key("rivista", &request);
        assert_eq!(
            key.as_str(),
            "rivista:author:alice:/blogs?category=rust&page=2"
        );
    }
}
