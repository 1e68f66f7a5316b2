/// One thumbnail as it travels from a search thread to the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResultItem {
    pub thumbnail: Vec<u8>,
    pub full_url: String,
    pub thumb_url: String,
}

/// A provider hit before its thumbnail has been fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageHit {
    pub thumb_url: String,
    pub full_url: String,
}

impl ImageHit {
    /// Builds a hit only when both URLs are present and non-empty.
    pub fn new(thumb_url: Option<&str>, full_url: Option<&str>) -> Option<Self> {
        let thumb_url = thumb_url.filter(|s| !s.is_empty())?;
        let full_url = full_url.filter(|s| !s.is_empty())?;
        Some(Self {
            thumb_url: thumb_url.to_string(),
            full_url: full_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_requires_both_urls() {
        assert!(ImageHit::new(Some("t"), None).is_none());
        assert!(ImageHit::new(Some(""), Some("f")).is_none());
        let hit = ImageHit::new(Some("t"), Some("f")).unwrap();
        assert_eq!(hit.thumb_url, "t");
        assert_eq!(hit.full_url, "f");
    }
}
