//! # Catalog Types
//!
//! Products, categories and the paginated list envelope served by the
//! storefront backend, plus the product search query builder.

use crate::transport::ApiRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paginated list envelope (`count`/`next`/`previous`/`results`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching records across all pages
    pub count: u64,

    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub previous: Option<String>,

    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,

    pub name: String,

    /// Decimal price as sent by the backend (e.g. "19.99")
    pub price: String,

    /// Units in stock
    pub inventory: u32,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub total_sold: u32,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Category slugs
    #[serde(default)]
    pub categories: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can be ordered from current stock
    pub fn can_fulfill(&self, quantity: u32) -> bool {
        quantity > 0 && quantity <= self.inventory
    }
}

/// Seller-side product fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,

    /// Decimal price, e.g. "19.99"
    pub price: String,

    pub inventory: u32,

    #[serde(default)]
    pub description: String,

    /// Category names
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: impl Into<String>, inventory: u32) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            inventory,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.clone(),
            inventory: product.inventory,
            description: product.description.clone(),
            categories: product.categories.clone(),
        }
    }
}

/// A product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product listing query.
///
/// Empty filters are left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: String,
    /// Backend ordering key, e.g. `price`, `-price`, `-created_at`
    pub ordering: Option<String>,
    /// Category slug
    pub category: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest products first, as shown on the landing page
    pub fn latest(limit: u32) -> Self {
        Self {
            ordering: Some("-created_at".to_string()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn price_range(mut self, min: Option<String>, max: Option<String>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Query string pairs in the order the backend documents them
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        let optional = [
            ("ordering", &self.ordering),
            ("categories", &self.category),
            ("price_min", &self.price_min),
            ("price_max", &self.price_max),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key.to_string(), v.to_string()));
            }
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        pairs
    }

    /// GET request against the public product listing
    pub fn to_request(&self) -> ApiRequest {
        self.to_request_at("/products/public/")
    }

    /// GET request against any product listing that takes these filters
    pub fn to_request_at(&self, path: &str) -> ApiRequest {
        self.to_pairs()
            .into_iter()
            .fold(ApiRequest::get(path), |req, (k, v)| req.with_query(k, v))
    }
}
