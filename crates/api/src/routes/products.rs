//! Catalog CRUD endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{DomainError, Money, Product, StringList, slugify, validate_colours, validate_sizes};
use serde::{Deserialize, Serialize};
use store::{ProductFilter, ProductPage, SortField, SortOrder};

use crate::AppState;
use crate::auth::Admin;
use crate::error::ApiError;
use crate::extract::{Json, Path};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub total_stock: Option<u32>,
    #[serde(default)]
    pub tags: StringList,
    #[serde(default)]
    pub colours: StringList,
    #[serde(default)]
    pub sizes: StringList,
    #[serde(default)]
    pub images: StringList,
    #[serde(default)]
    pub is_trending: bool,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub total_stock: Option<u32>,
    pub tags: Option<StringList>,
    pub colours: Option<StringList>,
    pub sizes: Option<StringList>,
    pub images: Option<StringList>,
    pub is_trending: Option<bool>,
    pub popularity: Option<i64>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub size: Option<String>,
    pub trending: Option<bool>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> ProductFilter {
        let mut filter = ProductFilter::new();
        if let Some(page) = self.page {
            filter = filter.page(page);
        }
        if let Some(limit) = self.limit {
            filter = filter.limit(limit);
        }
        filter = filter.sort(
            self.sort_by.as_deref().map(SortField::parse).unwrap_or_default(),
            self.order.as_deref().map(SortOrder::parse).unwrap_or_default(),
        );
        if let Some(category) = self.category {
            filter = filter.category(category);
        }
        if let Some(tag) = self.tag {
            filter = filter.tag(tag);
        }
        if let Some(size) = self.size {
            filter = filter.size(size);
        }
        if let Some(trending) = self.trending {
            filter = filter.trending(trending);
        }
        if let Some(term) = self.search {
            filter = filter.search(term);
        }
        filter.price_range(
            self.min_price.map(Money::from_major_f64),
            self.max_price.map(Money::from_major_f64),
        )
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub colours: Vec<String>,
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    pub price: f64,
    pub total_stock: u32,
    pub in_stock: bool,
    pub sold_count: u32,
    pub is_trending: bool,
    pub popularity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            category: product.category,
            tags: product.tags,
            colours: product.colours,
            sizes: product.sizes,
            images: product.images,
            price: product.price.as_major_f64(),
            total_stock: product.total_stock,
            in_stock: product.in_stock,
            sold_count: product.sold_count,
            is_trending: product.is_trending,
            popularity: product.popularity,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl From<ProductPage> for ProductListResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            products: page.products.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            pages: page.pages,
        }
    }
}

// -- Handlers --

/// POST /api/products — create a product.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(DomainError::EmptyField("name").into());
    }
    if req.price <= 0.0 {
        return Err(DomainError::InvalidPrice(req.price).into());
    }

    let mut colours = normalize(req.colours);
    if colours.is_empty() {
        colours.push("default".to_string());
    }
    let sizes = normalize(req.sizes);
    validate_colours(&colours)?;
    validate_sizes(&sizes)?;

    let slug = slugify(&req.name);
    if state.catalog.find_by_slug(&slug).await?.is_some() {
        return Err(ApiError::BadRequest(format!(
            "a product with slug '{slug}' already exists"
        )));
    }

    let total_stock = req.total_stock.unwrap_or(0);
    let now = Utc::now();
    let product = Product {
        id: ProductId::new(),
        name: req.name.trim().to_string(),
        slug,
        description: req.description,
        category: req.category,
        tags: req.tags.into_vec(),
        colours,
        sizes,
        images: req.images.into_vec(),
        price: Money::from_major_f64(req.price),
        total_stock,
        in_stock: total_stock > 0,
        sold_count: 0,
        is_trending: req.is_trending,
        popularity: 0,
        created_at: now,
        updated_at: now,
    };

    state.catalog.insert(&product).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "product created");

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /api/products — list products with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let filter = query.into_filter();
    let page = state.catalog.list(&filter).await?;
    Ok(Json(page.into()))
}

/// GET /api/products/{slug} — product by slug.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product '{slug}' not found")))?;
    Ok(Json(product.into()))
}

/// GET /api/products/id/{id} — product by id.
pub async fn get_by_id(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(product.into()))
}

/// PUT /api/products/{id} — patch a product.
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let mut product = state
        .catalog
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyField("name").into());
        }
        let slug = slugify(&name);
        if let Some(existing) = state.catalog.find_by_slug(&slug).await?
            && existing.id != id
        {
            return Err(ApiError::BadRequest(format!(
                "a product with slug '{slug}' already exists"
            )));
        }
        product.slug = slug;
        product.name = name.trim().to_string();
    }
    if let Some(description) = req.description {
        product.description = description;
    }
    if let Some(category) = req.category {
        product.category = category;
    }
    if let Some(price) = req.price {
        if price <= 0.0 {
            return Err(DomainError::InvalidPrice(price).into());
        }
        product.price = Money::from_major_f64(price);
    }
    if let Some(tags) = req.tags {
        product.tags = tags.into_vec();
    }
    if let Some(colours) = req.colours {
        let colours = normalize(colours);
        validate_colours(&colours)?;
        product.colours = colours;
    }
    if let Some(sizes) = req.sizes {
        let sizes = normalize(sizes);
        validate_sizes(&sizes)?;
        product.sizes = sizes;
    }
    if let Some(images) = req.images {
        product.images = images.into_vec();
    }
    if let Some(is_trending) = req.is_trending {
        product.is_trending = is_trending;
    }
    if let Some(popularity) = req.popularity {
        product.popularity = popularity;
    }
    if let Some(total_stock) = req.total_stock {
        product.set_stock(total_stock);
    } else {
        product.updated_at = Utc::now();
    }

    if !state.catalog.update(&product).await? {
        return Err(ApiError::NotFound(format!("Product {id} not found")));
    }
    Ok(Json(product.into()))
}

/// DELETE /api/products/{id} — delete a product.
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    if !state.catalog.delete(id).await? {
        return Err(ApiError::NotFound(format!("Product {id} not found")));
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn normalize(list: StringList) -> Vec<String> {
    list.into_vec()
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .collect()
}
