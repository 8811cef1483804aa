use crate::models::{Currency, Location, Property, Source};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../sql/schema.sql");

const COLUMNS: &str = "id, source, url, external_id, title, description, property_type, \
     operation, city, neighborhood, address, latitude, longitude, price, currency, expenses, \
     rooms, bedrooms, bathrooms, garages, total_surface, covered_surface, pets, furnished, \
     patio, images, main_image, scraped_at";

const INSERT_LISTING: &str = "INSERT OR IGNORE INTO listings (
        source, url, external_id, title, description, property_type, operation,
        city, neighborhood, address, latitude, longitude, price, currency, expenses,
        rooms, bedrooms, bathrooms, garages, total_surface, covered_surface,
        pets, furnished, patio, images, main_image, scraped_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
        ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27
    )";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open listing store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("listing store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to encode listing images: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredListing {
    pub id: i64,
    #[serde(flatten)]
    pub property: Property,
}

/// Listing count for one source or neighborhood.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tally {
    pub name: String,
    pub count: usize,
}

/// Price figures per currency; listings without a price are counted but
/// left out of the average and range.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSummary {
    pub currency: Currency,
    pub count: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreStats {
    pub total: usize,
    pub by_source: Vec<Tally>,
    pub by_neighborhood: Vec<Tally>,
    pub by_currency: Vec<PriceSummary>,
}

/// SQLite table of accepted listings, unique by URL.
///
/// Every write commits on its own, so there is nothing to flush.
#[derive(Debug)]
pub struct ListingStore {
    conn: Connection,
    path: PathBuf,
}

impl ListingStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = match Connection::open(&path) {
            Ok(conn) => conn,
            Err(source) => return Err(StoreError::Open { path, source }),
        };
        let store = Self::with_connection(conn, path)?;
        info!(
            "Opened listing store {} ({} listings)",
            store.path.display(),
            store.len()?
        );
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, path: PathBuf) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Highest id handed out so far, 0 for an empty store.
    pub fn last_id(&self) -> Result<i64, StoreError> {
        let id: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(id), 0) FROM listings",
            [],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Adds `property` unless its URL is already stored.
    pub fn insert(&mut self, property: &Property) -> Result<bool, StoreError> {
        let images = serde_json::to_string(&property.images)?;
        let location = &property.location;
        let inserted = self.conn.execute(
            INSERT_LISTING,
            params![
                property.source.as_str(),
                property.url,
                property.external_id,
                property.title,
                property.description,
                property.property_type,
                property.operation,
                location.city,
                location.neighborhood,
                location.address,
                location.latitude,
                location.longitude,
                property.price,
                property.currency.as_str(),
                property.expenses,
                property.rooms,
                property.bedrooms,
                property.bathrooms,
                property.garages,
                property.total_surface,
                property.covered_surface,
                property.pets,
                property.furnished,
                property.patio,
                images,
                property.main_image,
                property.scraped_at,
            ],
        )?;
        Ok(inserted == 1)
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredListing>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM listings WHERE id = ?1");
        let listing = self
            .conn
            .query_row(&sql, params![id], listing_from_row)
            .optional()?;
        Ok(listing)
    }

    /// Every stored listing, oldest first.
    pub fn listings(&self) -> Result<Vec<StoredListing>, StoreError> {
        self.listings_after(0)
    }

    /// Listings with an id above `id`, oldest first.
    pub fn listings_after(&self, id: i64) -> Result<Vec<StoredListing>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM listings WHERE id > ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id], listing_from_row)?;
        let listings = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    /// Deletes the listings with the given ids in one transaction,
    /// returning how many went.
    pub fn remove(&mut self, ids: &[i64]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM listings WHERE id = ?1")?;
            for id in ids {
                removed += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        debug!("Deleted {} of {} requested listings", removed, ids.len());
        Ok(removed)
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(StoreStats {
            total: self.len()?,
            by_source: self.tally(
                "SELECT source, COUNT(*) FROM listings
                 GROUP BY source ORDER BY COUNT(*) DESC, source",
            )?,
            by_neighborhood: self.tally(
                "SELECT neighborhood, COUNT(*) FROM listings
                 WHERE neighborhood IS NOT NULL
                 GROUP BY neighborhood ORDER BY COUNT(*) DESC, neighborhood",
            )?,
            by_currency: self.price_summaries()?,
        })
    }

    fn tally(&self, sql: &str) -> Result<Vec<Tally>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Tally {
                name: row.get(0)?,
                count: row.get::<_, i64>(1)? as usize,
            })
        })?;
        let tallies = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(tallies)
    }

    fn price_summaries(&self) -> Result<Vec<PriceSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT currency, COUNT(*),
                    AVG(NULLIF(price, 0)), MIN(NULLIF(price, 0)), MAX(NULLIF(price, 0))
             FROM listings GROUP BY currency ORDER BY currency",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PriceSummary {
                currency: currency_column(row, 0)?,
                count: row.get::<_, i64>(1)? as usize,
                average: row
                    .get::<_, Option<f64>>(2)?
                    .map(|avg| (avg * 100.0).round() / 100.0),
                min: row.get(3)?,
                max: row.get(4)?,
            })
        })?;
        let summaries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }
}

fn currency_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Currency> {
    let code: String = row.get(idx)?;
    Currency::from_code(&code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown currency {code:?}").into(),
        )
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<StoredListing> {
    let source: String = row.get(1)?;
    let images: String = row.get(25)?;
    let images = serde_json::from_str(&images)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(25, Type::Text, Box::new(e)))?;

    Ok(StoredListing {
        id: row.get(0)?,
        property: Property {
            source: Source::from_name(&source),
            url: row.get(2)?,
            external_id: row.get(3)?,
            title: row.get(4)?,
            description: row.get(5)?,
            property_type: row.get(6)?,
            operation: row.get(7)?,
            location: Location {
                city: row.get(8)?,
                neighborhood: row.get(9)?,
                address: row.get(10)?,
                latitude: row.get(11)?,
                longitude: row.get(12)?,
            },
            price: row.get(13)?,
            currency: currency_column(row, 14)?,
            expenses: row.get(15)?,
            rooms: row.get(16)?,
            bedrooms: row.get(17)?,
            bathrooms: row.get(18)?,
            garages: row.get(19)?,
            total_surface: row.get(20)?,
            covered_surface: row.get(21)?,
            pets: row.get(22)?,
            furnished: row.get(23)?,
            patio: row.get(24)?,
            images,
            main_image: row.get(26)?,
            scraped_at: row.get(27)?,
        },
    })
}
