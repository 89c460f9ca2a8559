use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::models::catalog::{Catalog, Destination, Hotel, Vehicle, VehicleClass, VehicleType};

pub const CATALOG_DATABASE: &str = "Catalog";

/// Where the planner gets its catalog snapshot from. A load always returns
/// every row of every relation; there is no partial or incremental refresh.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_catalog(&self) -> Catalog;
}

pub struct MongoCatalog {
    client: Arc<Client>,
}

impl MongoCatalog {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Fetch a whole collection. A failed fetch is logged and reads as empty
    /// so the planner can report "no hotels/vehicles found" instead of failing.
    /// Rows that do not decode are skipped one by one.
    async fn fetch_all<T>(&self, collection_name: &str) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        let collection: Collection<Document> = self
            .client
            .database(CATALOG_DATABASE)
            .collection(collection_name);

        let mut cursor = match collection.find(doc! {}).await {
            Ok(cursor) => cursor,
            Err(err) => {
                log::error!("Failed to find {}: {:?}", collection_name, err);
                return Vec::new();
            }
        };

        let mut documents = Vec::new();
        loop {
            match cursor.try_next().await {
                Ok(Some(document)) => documents.push(document),
                Ok(None) => break,
                Err(err) => {
                    log::error!("Failed to read {}: {:?}", collection_name, err);
                    break;
                }
            }
        }

        decode_rows(collection_name, documents)
    }
}

fn decode_rows<T>(collection_name: &str, documents: Vec<Document>) -> Vec<T>
where
    T: DeserializeOwned,
{
    let total = documents.len();
    let rows: Vec<T> = documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get("_id").cloned();
            match bson::from_document::<T>(document) {
                Ok(row) => Some(row),
                Err(err) => {
                    log::warn!("Skipping {} row {:?}: {}", collection_name, id, err);
                    None
                }
            }
        })
        .collect();

    if rows.len() < total {
        log::warn!(
            "Loaded {} of {} {} rows",
            rows.len(),
            total,
            collection_name
        );
    }
    rows
}

#[async_trait]
impl CatalogSource for MongoCatalog {
    async fn load_catalog(&self) -> Catalog {
        let (hotels, vehicles, destinations, vehicle_types, vehicle_classes) = futures::join!(
            self.fetch_all::<Hotel>("Hotels"),
            self.fetch_all::<Vehicle>("Vehicles"),
            self.fetch_all::<Destination>("Destinations"),
            self.fetch_all::<VehicleType>("VehicleTypes"),
            self.fetch_all::<VehicleClass>("VehicleClasses"),
        );

        log::info!(
            "Catalog loaded: {} hotels, {} vehicles, {} destinations, {} vehicle types, {} vehicle classes",
            hotels.len(),
            vehicles.len(),
            destinations.len(),
            vehicle_types.len(),
            vehicle_classes.len()
        );

        Catalog {
            hotels,
            vehicles,
            destinations,
            vehicle_types,
            vehicle_classes,
        }
    }
}

/// Fixed catalog held in memory.
pub struct StaticCatalog {
    catalog: Catalog,
}

impl StaticCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load_catalog(&self) -> Catalog {
        self.catalog.clone()
    }
}
