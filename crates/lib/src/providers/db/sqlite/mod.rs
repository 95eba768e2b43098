use crate::{
    assemble::parse_price,
    errors::MatchError,
    providers::db::records::{NewVisionCall, ProductImage, StoredListing, VisionCall},
    types::ListingCandidate,
};
use chrono::Utc;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{params, Connection, Database, Row, Value as TursoValue};

pub mod sql;

/// A provider for the local SQLite store of uploads, listings and vision calls.
///
/// Cloning shares the same underlying `Database`, so an in-memory instance can
/// be handed to several components in tests.
#[derive(Clone)]
pub struct SqliteProvider {
    pub db: Database,
}

impl SqliteProvider {
    /// Opens (or creates) the database at `db_path`. Use ":memory:" for an
    /// isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, MatchError> {
        let db = turso::Builder::new_local(db_path).build().await?;

        let conn = db.connect()?;
        // PRAGMA returns a row, so it must go through `query`.
        conn.query("PRAGMA journal_mode=WAL;", ()).await?;

        Ok(Self { db })
    }

    /// Ensures that all tables and indexes exist. Safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), MatchError> {
        let conn = self.db.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    // --- Product Images ---

    pub async fn create_product_image(
        &self,
        image_path: &str,
        original_name: Option<&str>,
        checksum: &str,
    ) -> Result<ProductImage, MatchError> {
        let conn = self.db.connect()?;
        let uploaded_at = Utc::now().to_rfc3339();

        let mut rows = conn
            .query(
                sql::INSERT_PRODUCT_IMAGE,
                vec![
                    TursoValue::Text(image_path.to_string()),
                    optional_text(original_name.map(str::to_string)),
                    TursoValue::Text(checksum.to_string()),
                    TursoValue::Text(uploaded_at.clone()),
                ],
            )
            .await?;
        let id = match rows.next().await? {
            Some(row) => integer_at(&row, 0)?,
            None => {
                return Err(MatchError::Database(turso::Error::SqlExecutionFailure(
                    "INSERT into product_images returned no id".to_string(),
                )))
            }
        };

        info!(image_id = id, path = %image_path, "Stored product image record.");
        Ok(ProductImage {
            id,
            image_path: image_path.to_string(),
            original_name: original_name.map(str::to_string),
            checksum: checksum.to_string(),
            uploaded_at,
        })
    }

    pub async fn get_product_image(&self, id: i64) -> Result<Option<ProductImage>, MatchError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::SELECT_PRODUCT_IMAGE, params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(ProductImage {
                id: integer_at(&row, 0)?,
                image_path: text_at(&row, 1)?,
                original_name: optional_text_at(&row, 2)?,
                checksum: text_at(&row, 3)?,
                uploaded_at: text_at(&row, 4)?,
            })),
            None => Ok(None),
        }
    }

    /// Removes an image and every listing linked to it.
    pub async fn delete_product_image(&self, id: i64) -> Result<(), MatchError> {
        let conn = self.db.connect()?;
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            conn.execute(sql::DELETE_LISTINGS_FOR_IMAGE, params![id])
                .await?;
            conn.execute(sql::DELETE_PRODUCT_IMAGE, params![id]).await
        }
        .await;

        match result {
            Ok(_) => {
                conn.execute("COMMIT", ()).await?;
                info!(image_id = id, "Deleted product image record.");
                Ok(())
            }
            Err(e) => {
                conn.execute("ROLLBACK", ()).await?;
                Err(MatchError::Database(e))
            }
        }
    }

    // --- Listings ---

    /// Saves listings for an image in one transaction and returns their ids.
    pub async fn insert_listings(
        &self,
        product_image_id: i64,
        listings: &[ListingCandidate],
    ) -> Result<Vec<i64>, MatchError> {
        if listings.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.db.connect()?;
        info!(
            "Starting database transaction to save {} listings for image {}.",
            listings.len(),
            product_image_id
        );
        conn.execute("BEGIN TRANSACTION", ()).await?;

        let mut ids = Vec::with_capacity(listings.len());
        for listing in listings {
            match insert_listing(&conn, product_image_id, listing).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    conn.execute("ROLLBACK", ()).await?;
                    return Err(MatchError::Database(e));
                }
            }
        }

        conn.execute("COMMIT", ()).await?;
        Ok(ids)
    }

    /// Returns the listings for an image, newest first.
    pub async fn listings_for_image(
        &self,
        product_image_id: i64,
    ) -> Result<Vec<StoredListing>, MatchError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(sql::SELECT_LISTINGS_FOR_IMAGE, params![product_image_id])
            .await?;

        let mut listings = Vec::new();
        while let Some(row) = rows.next().await? {
            listings.push(StoredListing {
                id: integer_at(&row, 0)?,
                product_image_id: integer_at(&row, 1)?,
                listing: ListingCandidate {
                    title: text_at(&row, 2)?,
                    price: optional_text_at(&row, 3)?.as_deref().and_then(parse_price),
                    currency: optional_text_at(&row, 4)?,
                    url: text_at(&row, 5)?,
                    item_id: optional_text_at(&row, 6)?,
                    condition: optional_text_at(&row, 7)?,
                    location: optional_text_at(&row, 8)?,
                    seller: optional_text_at(&row, 9)?,
                },
                created_at: text_at(&row, 10)?,
            });
        }
        Ok(listings)
    }

    // --- Vision Calls ---

    pub async fn record_vision_call(&self, call: &NewVisionCall) -> Result<i64, MatchError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                sql::INSERT_VISION_CALL,
                vec![
                    TursoValue::Text(call.image_name.clone()),
                    TursoValue::Text(call.search_query.clone()),
                    TursoValue::Text(serde_json::to_string(&call.annotations)?),
                    TursoValue::Text(serde_json::to_string(&call.listings)?),
                    TursoValue::Text(serde_json::to_string(&call.raw_response)?),
                    TursoValue::Integer(call.duration_ms),
                    TursoValue::Text(Utc::now().to_rfc3339()),
                ],
            )
            .await?;

        let id = match rows.next().await? {
            Some(row) => integer_at(&row, 0)?,
            None => {
                return Err(MatchError::Database(turso::Error::SqlExecutionFailure(
                    "INSERT into vision_calls returned no id".to_string(),
                )))
            }
        };
        debug!(call_id = id, image = %call.image_name, "Recorded vision call.");
        Ok(id)
    }

    /// Returns the most recent vision calls, newest first.
    pub async fn list_vision_calls(&self, limit: u32) -> Result<Vec<VisionCall>, MatchError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(&sql::select_recent_vision_calls(limit), ())
            .await?;

        let mut calls = Vec::new();
        while let Some(row) = rows.next().await? {
            calls.push(vision_call_from_row(&row)?);
        }
        Ok(calls)
    }

    pub async fn get_vision_call(&self, id: i64) -> Result<Option<VisionCall>, MatchError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::SELECT_VISION_CALL, params![id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(vision_call_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

async fn insert_listing(
    conn: &Connection,
    product_image_id: i64,
    listing: &ListingCandidate,
) -> Result<i64, turso::Error> {
    let values = vec![
        TursoValue::Integer(product_image_id),
        TursoValue::Text(listing.title.clone()),
        optional_text(listing.price.map(|p| p.to_string())),
        optional_text(listing.currency.clone()),
        TursoValue::Text(listing.url.clone()),
        optional_text(listing.item_id.clone()),
        optional_text(listing.condition.clone()),
        optional_text(listing.location.clone()),
        optional_text(listing.seller.clone()),
        TursoValue::Text(Utc::now().to_rfc3339()),
    ];

    let mut rows = conn.query(sql::INSERT_LISTING, values).await?;
    match rows.next().await? {
        Some(row) => match row.get_value(0)? {
            TursoValue::Integer(id) => Ok(id),
            other => Err(turso::Error::SqlExecutionFailure(format!(
                "unexpected listing id value: {other:?}"
            ))),
        },
        None => Err(turso::Error::SqlExecutionFailure(
            "INSERT into listings returned no id".to_string(),
        )),
    }
}

fn vision_call_from_row(row: &Row) -> Result<VisionCall, MatchError> {
    Ok(VisionCall {
        id: integer_at(row, 0)?,
        image_name: text_at(row, 1)?,
        search_query: text_at(row, 2)?,
        annotations: serde_json::from_str(&text_at(row, 3)?)?,
        listings: serde_json::from_str(&text_at(row, 4)?)?,
        raw_response: serde_json::from_str(&text_at(row, 5)?)?,
        duration_ms: integer_at(row, 6)?,
        created_at: text_at(row, 7)?,
    })
}

// --- Row Helpers ---

fn optional_text(value: Option<String>) -> TursoValue {
    value.map(TursoValue::Text).unwrap_or(TursoValue::Null)
}

fn integer_at(row: &Row, idx: usize) -> Result<i64, MatchError> {
    match row.get_value(idx)? {
        TursoValue::Integer(i) => Ok(i),
        other => Err(unexpected(idx, "integer", &other)),
    }
}

fn text_at(row: &Row, idx: usize) -> Result<String, MatchError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) => Ok(s),
        other => Err(unexpected(idx, "text", &other)),
    }
}

fn optional_text_at(row: &Row, idx: usize) -> Result<Option<String>, MatchError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) => Ok(Some(s)),
        TursoValue::Null => Ok(None),
        other => Err(unexpected(idx, "text or null", &other)),
    }
}

fn unexpected(idx: usize, expected: &str, found: &TursoValue) -> MatchError {
    MatchError::Database(turso::Error::SqlExecutionFailure(format!(
        "column {idx}: expected {expected}, found {found:?}"
    )))
}
