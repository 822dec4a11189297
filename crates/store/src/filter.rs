//! Catalog listing filters, sorting, and pagination.

use domain::{Money, Product};

/// Field the product listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Popularity,
    Price,
    CreatedAt,
    SoldCount,
    Name,
}

impl SortField {
    /// Parses a query-string value; unknown values fall back to popularity.
    pub fn parse(value: &str) -> Self {
        match value {
            "price" => Self::Price,
            "createdAt" | "created_at" => Self::CreatedAt,
            "soldCount" | "sold_count" => Self::SoldCount,
            "name" => Self::Name,
            _ => Self::Popularity,
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::Price => "price_cents",
            Self::CreatedAt => "created_at",
            Self::SoldCount => "sold_count",
            Self::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        match value {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filter for listing catalog products. Built with chained setters,
/// defaulting to the first page of twelve products by popularity.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub size: Option<String>,
    pub trending: Option<bool>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub search: Option<String>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 12,
            sort_by: SortField::default(),
            order: SortOrder::default(),
            category: None,
            tag: None,
            size: None,
            trending: None,
            min_price: None,
            max_price: None,
            search: None,
        }
    }
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, 100);
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.order = order;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn trending(mut self, trending: bool) -> Self {
        self.trending = Some(trending);
        self
    }

    pub fn price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub(crate) fn offset(&self) -> u64 {
        // page and limit are both caller-supplied; widen before the
        // multiply so an absurd page number cannot overflow.
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Predicate used by the in-memory store; the Postgres store builds
    /// the equivalent WHERE clause.
    pub(crate) fn matches(&self, product: &Product) -> bool {
        if let Some(ref category) = self.category
            && &product.category != category
        {
            return false;
        }
        if let Some(ref tag) = self.tag
            && !product.tags.iter().any(|t| t == tag)
        {
            return false;
        }
        if let Some(ref size) = self.size
            && !product.sizes.iter().any(|s| s == size)
        {
            return false;
        }
        if let Some(trending) = self.trending
            && product.is_trending != trending
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price > max
        {
            return false;
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}

/// One page of products plus the total match count.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl ProductPage {
    pub fn new(products: Vec<Product>, total: u64, filter: &ProductFilter) -> Self {
        let pages = (total as u32).div_ceil(filter.limit);
        Self {
            products,
            total,
            page: filter.page,
            pages,
        }
    }
}
