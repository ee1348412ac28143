//! Listing persistence. `AppState` carries an `Arc<dyn ListingStore>`;
//! production uses `PgListingStore`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::generation::generator::GenerationResult;
use crate::listings::validation::NewListing;
use crate::models::listing::{ListingDescriptionRow, ListingRow};

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create(&self, listing: &NewListing) -> Result<ListingRow>;

    async fn get(&self, id: Uuid) -> Result<Option<ListingRow>>;

    /// Field-level update of the persisted description and score only.
    async fn update_description(
        &self,
        id: Uuid,
        description: &str,
        seo_score: Option<i32>,
    ) -> Result<ListingRow>;

    /// Appends freshly generated options to the listing's description history.
    async fn record_descriptions(
        &self,
        listing_id: Uuid,
        tone: &str,
        results: &[GenerationResult],
    ) -> Result<()>;

    /// History rows, newest first.
    async fn description_history(&self, listing_id: Uuid) -> Result<Vec<ListingDescriptionRow>>;
}

pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn create(&self, listing: &NewListing) -> Result<ListingRow> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            INSERT INTO listings (id, title, property_type, location, price, key_features, tone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&listing.title)
        .bind(listing.property_type.as_str())
        .bind(&listing.location)
        .bind(listing.price)
        .bind(&listing.key_features)
        .bind(listing.tone.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Created listing {} ({})", row.id, row.property_type);
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ListingRow>> {
        Ok(
            sqlx::query_as::<_, ListingRow>("SELECT * FROM listings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_description(
        &self,
        id: Uuid,
        description: &str,
        seo_score: Option<i32>,
    ) -> Result<ListingRow> {
        Ok(sqlx::query_as::<_, ListingRow>(
            r#"
            UPDATE listings
            SET ai_description = $2, seo_score = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(description)
        .bind(seo_score)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn record_descriptions(
        &self,
        listing_id: Uuid,
        tone: &str,
        results: &[GenerationResult],
    ) -> Result<()> {
        for result in results {
            sqlx::query(
                r#"
                INSERT INTO listing_descriptions (id, listing_id, description, tone, seo_score)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(listing_id)
            .bind(&result.description)
            .bind(tone)
            .bind(result.seo_score as i32)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn description_history(&self, listing_id: Uuid) -> Result<Vec<ListingDescriptionRow>> {
        Ok(sqlx::query_as::<_, ListingDescriptionRow>(
            "SELECT * FROM listing_descriptions WHERE listing_id = $1 ORDER BY created_at DESC",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
