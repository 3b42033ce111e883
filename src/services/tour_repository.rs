use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};
use std::{path::Path, sync::Arc};
use thiserror::Error;

use crate::models::tour::{Tour, TourSummary};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("tour catalog unavailable: {0}")]
    Unavailable(String),
    #[error("invalid tour catalog: {0}")]
    InvalidCatalog(String),
}

/// Read access to tour rate cards. The data is trusted as-is.
///
/// Handlers run on actix's single-threaded workers, so the returned futures
/// carry no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait TourRepository {
    async fn list_tours(&self) -> Result<Vec<TourSummary>, RepositoryError>;
    async fn find_tour(&self, tour_id: &str) -> Result<Option<Tour>, RepositoryError>;
}

pub struct MongoTourRepository {
    client: Arc<Client>,
}

impl MongoTourRepository {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<Tour> {
        self.client.database("Tours").collection("RateCards")
    }
}

impl TourRepository for MongoTourRepository {
    async fn list_tours(&self) -> Result<Vec<TourSummary>, RepositoryError> {
        let cursor = self
            .collection()
            .find(doc! {})
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let tours: Vec<Tour> = cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::InvalidCatalog(e.to_string()))?;
        Ok(tours.iter().map(TourSummary::from).collect())
    }

    async fn find_tour(&self, tour_id: &str) -> Result<Option<Tour>, RepositoryError> {
        self.collection()
            .find_one(doc! { "id": tour_id })
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }
}

/// Catalog held in memory, loaded once from a JSON array of tours.
#[derive(Debug, Clone, Default)]
pub struct StaticTourRepository {
    tours: Vec<Tour>,
}

impl StaticTourRepository {
    pub fn new(tours: Vec<Tour>) -> Self {
        Self { tours }
    }

    pub fn from_json(raw: &str) -> Result<Self, RepositoryError> {
        serde_json::from_str(raw)
            .map(Self::new)
            .map_err(|e| RepositoryError::InvalidCatalog(e.to_string()))
    }

    pub async fn load(path: &Path) -> Result<Self, RepositoryError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            RepositoryError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        let repository = Self::from_json(&raw)?;
        log::info!(
            "Loaded {} tour(s) from {}",
            repository.tours.len(),
            path.display()
        );
        Ok(repository)
    }
}

impl TourRepository for StaticTourRepository {
    async fn list_tours(&self) -> Result<Vec<TourSummary>, RepositoryError> {
        Ok(self.tours.iter().map(TourSummary::from).collect())
    }

    async fn find_tour(&self, tour_id: &str) -> Result<Option<Tour>, RepositoryError> {
        Ok(self.tours.iter().find(|tour| tour.id == tour_id).cloned())
    }
}
