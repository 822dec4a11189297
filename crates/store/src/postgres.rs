use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::cart::CartStore;
use crate::catalog::CatalogStore;
use crate::filter::{ProductFilter, ProductPage};
use crate::{Result, StoreError};
use common::{CartId, LineId, ProductId, UserId};
use domain::{Cart, CartLine, Money, Product};

/// Runs the database migrations for both stores.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// PostgreSQL-backed catalog store.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            tags: row.try_get("tags")?,
            colours: row.try_get("colours")?,
            sizes: row.try_get("sizes")?,
            images: row.try_get("images")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            total_stock: row.try_get::<i64, _>("total_stock")?.max(0) as u32,
            in_stock: row.try_get("in_stock")?,
            sold_count: row.try_get::<i64, _>("sold_count")?.max(0) as u32,
            is_trending: row.try_get("is_trending")?,
            popularity: row.try_get("popularity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_filters(filter: &ProductFilter, sql: &mut String, param: &mut usize) {
        let mut clause = |sql: &mut String, text: &str| {
            *param += 1;
            sql.push_str(&format!(" AND {}", text.replace("$n", &format!("${param}"))));
        };

        if filter.category.is_some() {
            clause(sql, "category = $n");
        }
        if filter.tag.is_some() {
            clause(sql, "$n = ANY(tags)");
        }
        if filter.size.is_some() {
            clause(sql, "$n = ANY(sizes)");
        }
        if filter.trending.is_some() {
            clause(sql, "is_trending = $n");
        }
        if filter.min_price.is_some() {
            clause(sql, "price_cents >= $n");
        }
        if filter.max_price.is_some() {
            clause(sql, "price_cents <= $n");
        }
        if filter.search.is_some() {
            clause(sql, "(name ILIKE $n OR description ILIKE $n)");
        }
    }

    fn bind_filters<'q>(
        filter: &'q ProductFilter,
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        if let Some(ref category) = filter.category {
            query = query.bind(category);
        }
        if let Some(ref tag) = filter.tag {
            query = query.bind(tag);
        }
        if let Some(ref size) = filter.size {
            query = query.bind(size);
        }
        if let Some(trending) = filter.trending {
            query = query.bind(trending);
        }
        if let Some(min) = filter.min_price {
            query = query.bind(min.cents());
        }
        if let Some(max) = filter.max_price {
            query = query.bind(max.cents());
        }
        if let Some(ref term) = filter.search {
            query = query.bind(format!("%{term}%"));
        }
        query
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, slug, description, category, tags, colours, sizes, images,
                 price_cents, total_stock, in_stock, sold_count, is_trending, popularity,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.tags)
        .bind(&product.colours)
        .bind(&product.sizes)
        .bind(&product.images)
        .bind(product.price.cents())
        .bind(i64::from(product.total_stock))
        .bind(product.in_stock)
        .bind(i64::from(product.sold_count))
        .bind(product.is_trending)
        .bind(product.popularity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list(&self, filter: &ProductFilter) -> Result<ProductPage> {
        let mut where_sql = String::from("WHERE TRUE");
        let mut param = 0;
        Self::push_filters(filter, &mut where_sql, &mut param);

        let select_sql = format!(
            "SELECT * FROM products {where_sql} ORDER BY {} {} LIMIT ${} OFFSET ${}",
            filter.sort_by.column(),
            filter.order.keyword(),
            param + 1,
            param + 2,
        );
        let count_sql = format!("SELECT COUNT(*) FROM products {where_sql}");

        let rows = Self::bind_filters(filter, sqlx::query(&select_sql))
            .bind(i64::from(filter.limit))
            .bind(filter.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let products = rows
            .into_iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>>>()?;

        let total: i64 = Self::bind_filters(filter, sqlx::query(&count_sql))
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        Ok(ProductPage::new(products, total.max(0) as u64, filter))
    }

    async fn update(&self, product: &Product) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2, slug = $3, description = $4, category = $5, tags = $6,
                colours = $7, sizes = $8, images = $9, price_cents = $10,
                total_stock = $11, in_stock = $12, sold_count = $13,
                is_trending = $14, popularity = $15, updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.tags)
        .bind(&product.colours)
        .bind(&product.sizes)
        .bind(&product.images)
        .bind(product.price.cents())
        .bind(i64::from(product.total_stock))
        .bind(product.in_stock)
        .bind(i64::from(product.sold_count))
        .bind(product.is_trending)
        .bind(product.popularity)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_sale(&self, id: ProductId, quantity: u32) -> Result<Product> {
        // Single conditional statement: the decrement, clamp, and
        // in_stock derivation commit together per product.
        let row = sqlx::query(
            r#"
            UPDATE products SET
                total_stock = GREATEST(total_stock - $2, 0),
                sold_count = sold_count + $2,
                in_stock = (total_stock - $2) > 0,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::ProductNotFound(id)),
        }
    }
}

/// PostgreSQL-backed cart store.
///
/// A save replaces the cart's lines wholesale inside one transaction,
/// giving the same last-write-wins behavior as a single-document write.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_line(row: PgRow) -> Result<CartLine> {
        Ok(CartLine {
            id: LineId::from_uuid(row.try_get::<Uuid, _>("id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: row.try_get::<i64, _>("quantity")?.max(0) as u32,
            colour: row.try_get("colour")?,
            size: row.try_get("size")?,
        })
    }

    async fn load_cart(&self, row: PgRow) -> Result<Cart> {
        let cart_id: Uuid = row.try_get("id")?;

        let line_rows =
            sqlx::query("SELECT * FROM cart_lines WHERE cart_id = $1 ORDER BY position")
                .bind(cart_id)
                .fetch_all(&self.pool)
                .await?;

        let items = line_rows
            .into_iter()
            .map(Self::row_to_line)
            .collect::<Result<Vec<_>>>()?;

        Ok(Cart {
            id: CartId::from_uuid(cart_id),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>> {
        let row = sqlx::query("SELECT * FROM carts WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.load_cart(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>> {
        let row = sqlx::query("SELECT * FROM carts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.load_cart(row).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(cart.id.as_uuid())
        .bind(cart.user_id.as_uuid())
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(cart.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (position, line) in cart.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_lines (id, cart_id, product_id, quantity, colour, size, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(line.id.as_uuid())
            .bind(cart.id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(i64::from(line.quantity))
            .bind(&line.colour)
            .bind(&line.size)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
