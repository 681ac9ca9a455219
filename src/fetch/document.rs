//! Queryable document wrapper
//!
//! Wraps a parsed HTML tree behind the small lookup surface the extractor
//! needs: first-match text, first-match attribute, all-match collection, and
//! an existence check. A selector that fails to parse behaves exactly like a
//! selector that matches nothing.

use scraper::{ElementRef, Html, Selector};

/// A fetched, queryable page
pub struct Document {
    html: Html,
    url: String,
}

/// A scoped view over one element of a document
///
/// Used for repeated structures (review cards, listing rows) where fields
/// must be read per-element rather than document-wide.
pub struct Block<'a> {
    element: ElementRef<'a>,
}

impl<'a> Block<'a> {
    /// Returns the trimmed text of the first descendant matching `selector`
    pub fn find_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.element
            .select(&sel)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the named attribute of the first descendant matching `selector`
    pub fn find_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.element
            .select(&sel)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl Document {
    /// Parses raw HTML into a queryable document
    pub fn parse(html: &str, url: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            url: url.to_string(),
        }
    }

    /// The URL this document was loaded from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the trimmed text of the first element matching `selector`
    ///
    /// Returns None on selector parse failure, no match, or empty text.
    pub fn find_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.html
            .select(&sel)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the named attribute of the first element matching `selector`
    pub fn find_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.html
            .select(&sel)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the trimmed text of every element matching `selector`
    ///
    /// Empty entries are dropped; a bad selector yields an empty list.
    pub fn find_all_text(&self, selector: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.html
            .select(&sel)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the named attribute of every element matching `selector`
    pub fn find_all_attr(&self, selector: &str, attr: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.html
            .select(&sel)
            .filter_map(|element| element.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns whether any element matches `selector`
    pub fn has(&self, selector: &str) -> bool {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).next().is_some(),
            Err(_) => false,
        }
    }

    /// Returns a scoped [`Block`] for every element matching `selector`
    pub fn blocks(&self, selector: &str) -> Vec<Block<'_>> {
        let Ok(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.html
            .select(&sel)
            .map(|element| Block { element })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(html, "https://catalog.example/title/x")
    }

    #[test]
    fn test_find_text_first_match() {
        let d = doc(r#"<p class="a">one</p><p class="a">two</p>"#);
        assert_eq!(d.find_text("p.a"), Some("one".to_string()));
    }

    #[test]
    fn test_find_text_trims_whitespace() {
        let d = doc(r#"<h1>  Dune  </h1>"#);
        assert_eq!(d.find_text("h1"), Some("Dune".to_string()));
    }

    #[test]
    fn test_find_text_empty_is_none() {
        let d = doc(r#"<h1>   </h1>"#);
        assert_eq!(d.find_text("h1"), None);
    }

    #[test]
    fn test_find_text_no_match() {
        let d = doc(r#"<p>text</p>"#);
        assert_eq!(d.find_text("h1"), None);
    }

    #[test]
    fn test_invalid_selector_is_a_miss() {
        let d = doc(r#"<p>text</p>"#);
        assert_eq!(d.find_text("p[["), None);
        assert!(d.find_all_text("p[[").is_empty());
        assert!(!d.has("p[["));
    }

    #[test]
    fn test_find_attr() {
        let d = doc(r#"<a class="t" href="/title/dune-1965">Dune</a>"#);
        assert_eq!(
            d.find_attr("a.t", "href"),
            Some("/title/dune-1965".to_string())
        );
        assert_eq!(d.find_attr("a.t", "rel"), None);
    }

    #[test]
    fn test_find_all_text_drops_empty() {
        let d = doc(r#"<li>sci-fi</li><li>  </li><li>classic</li>"#);
        assert_eq!(d.find_all_text("li"), vec!["sci-fi", "classic"]);
    }

    #[test]
    fn test_find_all_attr() {
        let d = doc(r#"<a href="/a">A</a><a href="/b">B</a><a>C</a>"#);
        assert_eq!(d.find_all_attr("a", "href"), vec!["/a", "/b"]);
    }

    #[test]
    fn test_has() {
        let d = doc(r#"<div class="score">8.7</div>"#);
        assert!(d.has("div.score"));
        assert!(!d.has("div.missing"));
    }

    #[test]
    fn test_blocks_scope_lookups_per_element() {
        let d = doc(
            r#"
            <div class="card"><a href="/a">A</a><span class="r">5</span></div>
            <div class="card"><a href="/b">B</a></div>
            "#,
        );

        let cards = d.blocks("div.card");
        assert_eq!(cards.len(), 2);

        assert_eq!(cards[0].find_attr("a", "href"), Some("/a".to_string()));
        assert_eq!(cards[0].find_text("span.r"), Some("5".to_string()));

        assert_eq!(cards[1].find_attr("a", "href"), Some("/b".to_string()));
        assert_eq!(cards[1].find_text("span.r"), None);
    }
}
