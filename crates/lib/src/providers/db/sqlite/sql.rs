//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL strings for the SQLite provider so the
//! provider methods only deal with binding and row mapping.

pub const CREATE_PRODUCT_IMAGES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS product_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_path TEXT NOT NULL,
        original_name TEXT,
        checksum TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    );
";

pub const CREATE_LISTINGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS listings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_image_id INTEGER NOT NULL REFERENCES product_images(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        price TEXT,
        currency TEXT,
        url TEXT NOT NULL,
        item_id TEXT,
        condition TEXT,
        location TEXT,
        seller TEXT,
        created_at TEXT NOT NULL
    );
";

pub const CREATE_LISTINGS_IMAGE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_listings_product_image_id ON listings (product_image_id);";

pub const CREATE_VISION_CALLS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS vision_calls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_name TEXT NOT NULL,
        search_query TEXT NOT NULL,
        annotations TEXT NOT NULL,
        listings TEXT NOT NULL,
        raw_response TEXT NOT NULL,
        duration_ms INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
";

/// Every statement needed to bring a fresh database up to date, in order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_PRODUCT_IMAGES_TABLE,
    CREATE_LISTINGS_TABLE,
    CREATE_LISTINGS_IMAGE_INDEX,
    CREATE_VISION_CALLS_TABLE,
];

pub const INSERT_PRODUCT_IMAGE: &str = "INSERT INTO product_images (image_path, original_name, checksum, uploaded_at) VALUES (?, ?, ?, ?) RETURNING id";

pub const SELECT_PRODUCT_IMAGE: &str =
    "SELECT id, image_path, original_name, checksum, uploaded_at FROM product_images WHERE id = ?";

pub const DELETE_LISTINGS_FOR_IMAGE: &str = "DELETE FROM listings WHERE product_image_id = ?";

pub const DELETE_PRODUCT_IMAGE: &str = "DELETE FROM product_images WHERE id = ?";

pub const INSERT_LISTING: &str = "
    INSERT INTO listings (product_image_id, title, price, currency, url, item_id, condition, location, seller, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id
";

pub const SELECT_LISTINGS_FOR_IMAGE: &str = "
    SELECT id, product_image_id, title, price, currency, url, item_id, condition, location, seller, created_at
    FROM listings
    WHERE product_image_id = ?
    ORDER BY created_at DESC, id DESC
";

pub const INSERT_VISION_CALL: &str = "
    INSERT INTO vision_calls (image_name, search_query, annotations, listings, raw_response, duration_ms, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id
";

/// Returns the SQL query listing the newest vision calls first.
///
/// # Arguments
///
/// * `limit`: The maximum number of rows to return.
pub fn select_recent_vision_calls(limit: u32) -> String {
    format!(
        "
        SELECT id, image_name, search_query, annotations, listings, raw_response, duration_ms, created_at
        FROM vision_calls
        ORDER BY created_at DESC, id DESC
        LIMIT {limit};
    "
    )
}

pub const SELECT_VISION_CALL: &str = "
    SELECT id, image_name, search_query, annotations, listings, raw_response, duration_ms, created_at
    FROM vision_calls
    WHERE id = ?
";
