//! Filtering and sorting for the product listing.
//!
//! The listing is a pure function of the catalog and three inputs: a free-text
//! query, a category selector and a sort key. It is recomputed from scratch on
//! every request; catalogs are small.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Product};

/// Selector value meaning "every category".
pub const ALL_CATEGORIES: &str = "All";

/// Category selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == *category,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Only(category) => category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value.is_empty() || value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.as_str().to_owned()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing sort order.
///
/// Parses from the query-string spellings; anything unrecognised becomes
/// [`SortKey::Unsorted`] and leaves catalog order alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    /// Title, A to Z.
    #[default]
    Name,
    PriceLow,
    PriceHigh,
    /// Highest rated first.
    Rating,
    Unsorted,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Unsorted => "none",
        }
    }

    /// Selectable options with their labels, in menu order.
    #[must_use]
    pub const fn options() -> [(Self, &'static str); 4] {
        [
            (Self::Name, "Sort by Name"),
            (Self::PriceLow, "Price: Low to High"),
            (Self::PriceHigh, "Price: High to Low"),
            (Self::Rating, "Highest Rated"),
        ]
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => compare_titles(&a.title, &b.title),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Rating => b.rating.total_cmp(&a.rating),
            Self::Unsorted => Ordering::Equal,
        }
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value {
            "name" => Self::Name,
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            _ => Self::Unsorted,
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_owned()
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Case-insensitive title order, raw text as the tie-break.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// The three listing inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    #[serde(rename = "q")]
    pub query: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl ListingQuery {
    /// Filter then stable-sort the catalog.
    #[must_use]
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        filter_and_sort(catalog.products(), &self.query, &self.category, self.sort)
    }
}

fn matches_text(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.title.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

/// Products matching `query` (title or description, case-insensitive) and
/// `category`, ordered by `sort`.
#[must_use]
pub fn filter_and_sort<'a>(
    products: &'a [Product],
    query: &str,
    category: &CategoryFilter,
    sort: SortKey,
) -> Vec<&'a Product> {
    let needle = query.to_lowercase();
    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|p| matches_text(p, &needle) && category.matches(p))
        .collect();
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}

/// `All` followed by each category in first-seen catalog order.
#[must_use]
pub fn categories(catalog: &Catalog) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_owned()];
    for product in catalog.products() {
        if !out.iter().any(|c| *c == product.category) {
            out.push(product.category.clone());
        }
    }
    out
}

/// "Showing 2 of 8 products in Crochet".
#[must_use]
pub fn summary(shown: usize, total: usize, category: &CategoryFilter) -> String {
    match category {
        CategoryFilter::All => format!("Showing {shown} of {total} products"),
        CategoryFilter::Only(name) => format!("Showing {shown} of {total} products in {name}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::tests::{product, sample_catalog};

    fn titles(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn test_query_matches_title_case_insensitive() {
        let catalog = sample_catalog();
        let query = ListingQuery {
            query: "red".to_string(),
            category: CategoryFilter::All,
            sort: SortKey::Name,
        };
        assert_eq!(
            titles(&query.apply(&catalog)),
            vec!["Red Bookmark", "Red Scarf"]
        );
    }

    #[test]
    fn test_query_matches_description() {
        let mut p = product("d", "Mystery Box", "Gifts", 30);
        p.description = "Contains a RED surprise".to_string();
        let catalog = Catalog::new(vec![p, product("e", "Plain", "Gifts", 1)]).unwrap();

        let found = filter_and_sort(catalog.products(), "red", &CategoryFilter::All, SortKey::Name);
        assert_eq!(titles(&found), vec!["Mystery Box"]);
    }

    #[test]
    fn test_query_whitespace_is_literal() {
        let catalog = sample_catalog();

        let padded = filter_and_sort(catalog.products(), "scarf ", &CategoryFilter::All, SortKey::Name);
        assert!(padded.is_empty());

        let blank = filter_and_sort(catalog.products(), "   ", &CategoryFilter::All, SortKey::Name);
        assert!(blank.is_empty());

        let inner = filter_and_sort(catalog.products(), "red s", &CategoryFilter::All, SortKey::Name);
        assert_eq!(titles(&inner), vec!["Red Scarf"]);
    }

    #[test]
    fn test_category_only() {
        let catalog = sample_catalog();
        let found = filter_and_sort(
            catalog.products(),
            "",
            &CategoryFilter::from("Crochet"),
            SortKey::Name,
        );
        assert_eq!(titles(&found), vec!["Red Scarf"]);
    }

    #[test]
    fn test_query_and_category_combine() {
        let catalog = sample_catalog();
        let found = filter_and_sort(
            catalog.products(),
            "red",
            &CategoryFilter::from("Gifts"),
            SortKey::Name,
        );
        assert_eq!(titles(&found), vec!["Red Bookmark"]);

        let none = filter_and_sort(
            catalog.products(),
            "blue",
            &CategoryFilter::from("Gifts"),
            SortKey::Name,
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_sort_by_price() {
        let catalog = sample_catalog();
        let low = filter_and_sort(catalog.products(), "", &CategoryFilter::All, SortKey::PriceLow);
        let prices: Vec<_> = low.iter().map(|p| p.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::new(5, 0), Decimal::new(15, 0), Decimal::new(20, 0)]
        );

        let high = filter_and_sort(catalog.products(), "", &CategoryFilter::All, SortKey::PriceHigh);
        assert_eq!(
            titles(&high),
            vec!["Red Scarf", "Blue Calendar", "Red Bookmark"]
        );
    }

    #[test]
    fn test_sort_by_rating_desc() {
        let mut a = product("a", "A", "Gifts", 1);
        a.rating = 3.5;
        let mut b = product("b", "B", "Gifts", 1);
        b.rating = 5.0;
        let mut c = product("c", "C", "Gifts", 1);
        c.rating = 4.0;
        let catalog = Catalog::new(vec![a, b, c]).unwrap();

        let found = filter_and_sort(catalog.products(), "", &CategoryFilter::All, SortKey::Rating);
        assert_eq!(titles(&found), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_unknown_sort_keeps_catalog_order() {
        let catalog = sample_catalog();
        let key = SortKey::from("popularity");
        assert_eq!(key, SortKey::Unsorted);

        let found = filter_and_sort(catalog.products(), "", &CategoryFilter::All, key);
        assert_eq!(
            titles(&found),
            vec!["Red Scarf", "Blue Calendar", "Red Bookmark"]
        );
    }

    #[test]
    fn test_price_ties_are_stable() {
        let catalog = Catalog::new(vec![
            product("x", "Zebra", "Gifts", 10),
            product("y", "Apple", "Gifts", 10),
        ])
        .unwrap();
        let found = filter_and_sort(catalog.products(), "", &CategoryFilter::All, SortKey::PriceLow);
        assert_eq!(titles(&found), vec!["Zebra", "Apple"]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let catalog = Catalog::new(vec![
            product("x", "beanie", "Crochet", 10),
            product("y", "Apron", "Gifts", 10),
            product("z", "Cowl", "Crochet", 10),
        ])
        .unwrap();
        let found = filter_and_sort(catalog.products(), "", &CategoryFilter::All, SortKey::Name);
        assert_eq!(titles(&found), vec!["Apron", "beanie", "Cowl"]);
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(CategoryFilter::from("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::from(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from("Calendars"),
            CategoryFilter::Only("Calendars".to_string())
        );
        assert_eq!("price-high".parse::<SortKey>().unwrap(), SortKey::PriceHigh);
        assert_eq!(SortKey::from(SortKey::Rating.as_str()), SortKey::Rating);
    }

    #[test]
    fn test_query_deserializes_from_params() {
        let query: ListingQuery =
            serde_json::from_str(r#"{"q":"scarf","category":"Crochet","sort":"price-low"}"#)
                .unwrap();
        assert_eq!(query.query, "scarf");
        assert_eq!(query.category, CategoryFilter::Only("Crochet".to_string()));
        assert_eq!(query.sort, SortKey::PriceLow);

        let defaults: ListingQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, ListingQuery::default());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let catalog = Catalog::new(vec![
            product("a", "A", "Crochet", 1),
            product("b", "B", "Calendars", 1),
            product("c", "C", "Crochet", 1),
            product("d", "D", "Gifts", 1),
        ])
        .unwrap();
        assert_eq!(
            categories(&catalog),
            vec!["All", "Crochet", "Calendars", "Gifts"]
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            summary(3, 8, &CategoryFilter::All),
            "Showing 3 of 8 products"
        );
        assert_eq!(
            summary(1, 8, &CategoryFilter::from("Crochet")),
            "Showing 1 of 8 products in Crochet"
        );
    }
}
