//! Page-number pagination with a default and caller-overridable size.

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A resolved page request: 1-based page number and effective page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Resolve raw query parameters into a page request.
    ///
    /// `page` falls back to 1 when absent, non-numeric or below 1.
    /// `page_size` falls back to the default when absent or invalid, and is
    /// capped (not rejected) at [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn from_params(page: Option<&str>, page_size: Option<&str>) -> Self {
        let number = page
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(1);

        let size = page_size
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|&s| s >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        Self { number, size }
    }

    #[must_use]
    pub const fn limit(self) -> i64 {
        self.size
    }

    #[must_use]
    pub const fn offset(self) -> i64 {
        // Page numbers are caller-chosen; saturate instead of overflowing so
        // an absurdly large page lands past the end rather than wrapping.
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let page = Page::from_params(None, None);
        assert_eq!(page, Page { number: 1, size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_explicit_page_and_size() {
        let page = Page::from_params(Some("3"), Some("5"));
        assert_eq!(page, Page { number: 3, size: 5 });
        assert_eq!(page.offset(), 10);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn test_invalid_page_falls_back_to_one() {
        assert_eq!(Page::from_params(Some("abc"), None).number, 1);
        assert_eq!(Page::from_params(Some("0"), None).number, 1);
        assert_eq!(Page::from_params(Some("-2"), None).number, 1);
    }

    #[test]
    fn test_page_size_capped_not_rejected() {
        assert_eq!(Page::from_params(None, Some("200")).size, MAX_PAGE_SIZE);
        assert_eq!(Page::from_params(None, Some("100")).size, 100);
    }

    #[test]
    fn test_huge_page_number_saturates_past_the_end() {
        let page = Page::from_params(Some("9223372036854775807"), None);
        assert_eq!(page.number, i64::MAX);
        // Must not wrap negative; any value past the data yields an empty page.
        assert_eq!(page.offset(), i64::MAX);
    }

    #[test]
    fn test_invalid_page_size_falls_back_to_default() {
        assert_eq!(Page::from_params(None, Some("abc")).size, DEFAULT_PAGE_SIZE);
        assert_eq!(Page::from_params(None, Some("0")).size, DEFAULT_PAGE_SIZE);
    }
}
