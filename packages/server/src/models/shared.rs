use serde::{Deserialize, Deserializer, Serialize};

/// Paginator state included in list responses.
#[derive(Debug, Serialize, utoipa::ToSchema, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub number: u64,
    /// Total number of pages; at least 1 even when empty.
    #[schema(example = 3)]
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    #[schema(example = 2)]
    pub next_page_number: Option<u64>,
}

impl Pagination {
    /// Resolve a requested page against `total` items split into pages of `per_page`.
    ///
    /// Missing pages resolve to 1, pages beyond the end to the last page.
    pub fn resolve(requested: Option<u64>, total: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = total.div_ceil(per_page).max(1);
        let number = requested.unwrap_or(1).clamp(1, num_pages);
        let has_previous = number > 1;
        let has_next = number < num_pages;

        Self {
            number,
            num_pages,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| number - 1),
            next_page_number: has_next.then(|| number + 1),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self, per_page: u64) -> u64 {
        (self.number - 1) * per_page.max(1)
    }
}

/// Serde helper for lenient page numbers.
///
/// Anything that is not a positive integer (`"abc"`, `""`, `0`) becomes `None`.
pub fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n > 0))
}
