//! MongoDB database wrapper and text store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

use super::models::TextRow;
use super::store::{TextFilter, TextStore};
use crate::error::TextResult;

/// Server error code for unique index violations.
const DUPLICATE_KEY: i32 = 11000;

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the server cannot be reached.
    pub async fn connect(uri: &str, db_name: &str) -> TextResult<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        let db = client.database(db_name);

        Ok(Self { db })
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// [`TextStore`] over a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoTextStore {
    collection: Collection<TextRow>,
}

impl MongoTextStore {
    /// Open the text collection and make sure its unique index exists.
    pub async fn open(db: &Database, collection: &str) -> TextResult<Self> {
        let store = Self {
            collection: db.collection(collection),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> TextResult<()> {
        let model = IndexModel::builder()
            .keys(doc! { "locale": 1, "scope": 1, "key": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(model).await?;
        debug!("Ensured unique index on {}", self.collection.name());
        Ok(())
    }
}

fn filter_document(filter: &TextFilter) -> Document {
    let mut document = Document::new();
    if let Some(locale) = &filter.locale {
        document.insert("locale", locale.as_str());
    }
    if let Some(scope) = &filter.scope {
        document.insert("scope", scope.as_str());
    }
    document
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl TextStore for MongoTextStore {
    async fn select(&self, filter: &TextFilter) -> TextResult<Vec<TextRow>> {
        let options = FindOptions::builder().sort(doc! { "key": 1 }).build();

        let cursor = self
            .collection
            .find(filter_document(filter))
            .with_options(options)
            .await?;
        let rows: Vec<TextRow> = cursor.try_collect().await?;

        debug!("DB select {:?}: {} rows", filter, rows.len());
        Ok(rows)
    }

    async fn insert_missing(&self, rows: Vec<TextRow>) -> TextResult<u64> {
        let options = UpdateOptions::builder().upsert(true).build();
        let mut inserted = 0;

        for row in rows {
            let filter = doc! {
                "locale": &row.locale,
                "scope": &row.scope,
                "key": &row.key,
            };
            let update = doc! {
                "$setOnInsert": {
                    "value": &row.value,
                    "created_at": row.created_at,
                    "updated_at": row.updated_at,
                }
            };

            match self
                .collection
                .update_one(filter, update)
                .with_options(options.clone())
                .await
            {
                Ok(result) if result.upserted_id.is_some() => inserted += 1,
                Ok(_) => {}
                // Another writer registered the same key first.
                Err(e) if is_duplicate_key(&e) => {
                    debug!("Key '{}' already registered for {}", row.key, row.locale);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(inserted)
    }
}
