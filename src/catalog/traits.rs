use crate::error::Result;
use crate::models::{Agent, City, CreatedRecord, Estate, NewAgent, NewEstate, Region};
use async_trait::async_trait;

/// Remote catalog of estates, agents, cities and regions.
/// Persistence, id assignment and server-side validation live behind it.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_estates(&self) -> Result<Vec<Estate>>;

    async fn get_estate(&self, id: u64) -> Result<Estate>;

    async fn list_agents(&self) -> Result<Vec<Agent>>;

    async fn list_cities(&self) -> Result<Vec<City>>;

    async fn list_regions(&self) -> Result<Vec<Region>>;

    /// Multipart write; the reply carries the server-assigned id
    async fn create_estate(&self, estate: &NewEstate) -> Result<CreatedRecord>;

    async fn create_agent(&self, agent: &NewAgent) -> Result<CreatedRecord>;

    async fn delete_estate(&self, id: u64) -> Result<()>;

    /// Human-readable endpoint, for logs
    fn endpoint(&self) -> &str;
}
