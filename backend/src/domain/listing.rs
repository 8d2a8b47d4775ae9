//! Query parameters shared by searchable back-office listings.

use pagination::PageRequest;

/// Free-text search plus paging for admin list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: PageRequest,
}

impl ListQuery {
    /// Build a query, discarding a blank search term.
    pub fn new(search: Option<String>, page: PageRequest) -> Self {
        let search = search
            .map(|term| term.trim().to_owned())
            .filter(|term| !term.is_empty());
        Self { search, page }
    }

    /// Case-insensitive substring match against any of `haystacks`.
    pub fn matches<'a>(&self, haystacks: impl IntoIterator<Item = &'a str>) -> bool {
        match &self.search {
            Some(term) => {
                let needle = term.to_lowercase();
                haystacks
                    .into_iter()
                    .any(|candidate| candidate.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}
