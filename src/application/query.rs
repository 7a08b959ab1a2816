//! Paginated query builder.
//!
//! Translates filter/sort/page parameters into a descriptor the document
//! store consumes. Search text is escaped against the store's
//! pattern-matching metacharacters before use, so a literal term like
//! `"c++"` matches the substring `"c++"` instead of being interpreted.

use crate::config::QuerySettings;
use crate::domain::types::BlogStatus;

/// Characters with special meaning in the store's regex-based matcher.
const PATTERN_METACHARACTERS: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '[', ']', '{', '}', '^', '$', '|', '/',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    PublishedAt,
    CreatedAt,
    Views,
    Likes,
    Title,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::PublishedAt => "published_at",
            SortField::CreatedAt => "created_at",
            SortField::Views => "views",
            SortField::Likes => "likes",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::PublishedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Filter parameters for a blog listing.
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub status: Option<BlogStatus>,
}

/// Search term carried in both literal and escaped form.
///
/// The escaped `pattern` is what a regex-language store consumes; the
/// `literal` is what substring-matching adapters compare against. Matching
/// is case-insensitive across title/content/excerpt/tags/category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub literal: String,
    pub pattern: String,
}

impl SearchTerm {
    fn new(raw: &str) -> Option<Self> {
        let literal = raw.trim();
        if literal.is_empty() {
            return None;
        }
        Some(Self {
            literal: literal.to_string(),
            pattern: escape_search(literal),
        })
    }
}

/// Backslash-escape every pattern metacharacter in a search term.
/// Malformed input is sanitized, never rejected.
pub fn escape_search(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if PATTERN_METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Store-consumable query descriptor with clamped pagination.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub search: Option<SearchTerm>,
    pub status: Option<BlogStatus>,
    pub sort: Sort,
    pub page: u32,
    pub page_size: u32,
}

impl QueryDescriptor {
    /// Build a descriptor from raw request parameters.
    ///
    /// Pages below 1 clamp to 1; a zero page size falls back to the default
    /// and anything above the configured maximum clamps down.
    pub fn build(
        filter: BlogFilter,
        sort: Sort,
        page: u32,
        page_size: u32,
        settings: &QuerySettings,
    ) -> Self {
        let page = page.max(1);
        let page_size = if page_size == 0 {
            settings.default_page_size
        } else {
            page_size.min(settings.max_page_size)
        }
        .max(1);

        Self {
            category: filter.category.filter(|c| !c.trim().is_empty()),
            tags: filter.tags,
            author: filter.author.filter(|a| !a.trim().is_empty()),
            search: filter.search.as_deref().and_then(SearchTerm::new),
            status: filter.status,
            sort,
            page,
            page_size,
        }
    }

    /// Zero-based item offset of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Canonical query parameters for cache-key derivation. Every field that
    /// can change the result set must appear here, or requests with
    /// different results would collide to one cache entry.
    pub fn cache_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
            ("sort".to_string(), self.sort.field.as_str().to_string()),
            ("dir".to_string(), self.sort.direction.as_str().to_string()),
        ];
        if let Some(category) = &self.category {
            params.push(("category".to_string(), category.clone()));
        }
        if !self.tags.is_empty() {
            let mut tags = self.tags.clone();
            tags.sort();
            // One parameter per tag: a joined form would let a single tag
            // containing the join character impersonate a multi-tag filter.
            for (index, tag) in tags.iter().enumerate() {
                params.push((format!("tag{index}"), tag.clone()));
            }
        }
        if let Some(author) = &self.author {
            params.push(("author".to_string(), author.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.literal.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.as_str().to_string()));
        }
        params
    }
}
