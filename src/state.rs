//! In-memory view state: the collections fetched from the catalog, the active
//! filter, and the derived list of visible estates.
//!
//! Every mutation is `catalog write -> local update -> mirror rewrite`. A
//! failed write returns its error and leaves both the lists and the mirror
//! untouched. The visible list is recomputed after each transition.

use crate::catalog::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::filter::FilterParams;
use crate::mirror::EstateMirror;
use crate::models::{Agent, City, Estate, NewAgent, NewEstate, Region};
use tracing::{debug, info, warn};

/// Shown when an estate's city id does not resolve
pub const UNKNOWN_CITY: &str = "Unknown city";

/// Collections that could not be fetched during [`ViewState::load`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    pub failed: Vec<&'static str>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn accept<T>(&mut self, collection: &'static str, result: Result<Vec<T>>) -> Option<Vec<T>> {
        match result {
            Ok(items) => {
                debug!("Fetched {} {}", items.len(), collection);
                Some(items)
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", collection, e);
                self.failed.push(collection);
                None
            }
        }
    }
}

pub struct ViewState<C, M> {
    catalog: C,
    mirror: M,
    estates: Vec<Estate>,
    agents: Vec<Agent>,
    cities: Vec<City>,
    regions: Vec<Region>,
    filter: FilterParams,
    /// Indices into `estates` passing `filter`
    visible: Vec<usize>,
}

impl<C: CatalogApi, M: EstateMirror> ViewState<C, M> {
    /// Start from the mirrored snapshot until the first fetch lands
    pub fn new(catalog: C, mirror: M) -> Self {
        let estates = mirror.load();
        if !estates.is_empty() {
            debug!("Pre-populated {} estates from mirror", estates.len());
        }

        let mut state = Self {
            catalog,
            mirror,
            estates,
            agents: Vec::new(),
            cities: Vec::new(),
            regions: Vec::new(),
            filter: FilterParams::default(),
            visible: Vec::new(),
        };
        state.refresh_view();
        state
    }

    /// Fetch all four collections concurrently. A collection that fails to
    /// load keeps its current contents; the others are still applied.
    pub async fn load(&mut self) -> LoadReport {
        info!("Loading catalog from {}", self.catalog.endpoint());

        let (estates, agents, cities, regions) = tokio::join!(
            self.catalog.list_estates(),
            self.catalog.list_agents(),
            self.catalog.list_cities(),
            self.catalog.list_regions(),
        );

        let mut report = LoadReport::default();
        if let Some(cities) = report.accept("cities", cities) {
            self.cities = cities;
        }
        if let Some(regions) = report.accept("regions", regions) {
            self.regions = regions;
        }
        if let Some(agents) = report.accept("agents", agents) {
            self.agents = agents;
        }
        if let Some(estates) = report.accept("estates", estates) {
            self.estates = estates;
            self.resolve_cities();
            self.sync_mirror();
        }

        self.refresh_view();
        info!(
            "Loaded {} estates, {} agents, {} cities, {} regions",
            self.estates.len(),
            self.agents.len(),
            self.cities.len(),
            self.regions.len()
        );
        report
    }

    /// Submit a new listing and append the server's record on success
    pub async fn add_estate(&mut self, data: NewEstate) -> Result<Estate> {
        self.validate_listing(&data)?;

        let created = self.catalog.create_estate(&data).await?;
        let estate = data.to_estate(&created, self.city(data.city_id).cloned());

        self.estates.push(estate.clone());
        self.sync_mirror();
        self.refresh_view();
        Ok(estate)
    }

    /// Delete a listing remotely, then drop it locally
    pub async fn remove_estate(&mut self, id: u64) -> Result<()> {
        self.catalog.delete_estate(id).await?;

        let before = self.estates.len();
        self.estates.retain(|estate| estate.id != id);
        if self.estates.len() == before {
            debug!("Estate #{} was not in the local list", id);
        }

        self.sync_mirror();
        self.refresh_view();
        Ok(())
    }

    /// Register an agent. Every field is required; nothing is sent otherwise.
    pub async fn add_agent(&mut self, data: NewAgent) -> Result<Agent> {
        if let Some(field) = data.missing_field() {
            return Err(CatalogError::missing(field));
        }

        let created = self.catalog.create_agent(&data).await?;
        let agent = data.to_agent(&created);
        self.agents.push(agent.clone());
        Ok(agent)
    }

    /// Re-read one estate from the catalog and replace the local copy
    pub async fn refresh_estate(&mut self, id: u64) -> Result<Estate> {
        let mut fresh = self.catalog.get_estate(id).await?;
        if fresh.city.is_none() {
            fresh.city = self.city(fresh.city_id).cloned();
        }

        match self.estates.iter_mut().find(|estate| estate.id == id) {
            Some(slot) => *slot = fresh.clone(),
            None => self.estates.push(fresh.clone()),
        }

        self.sync_mirror();
        self.refresh_view();
        Ok(fresh)
    }

    pub fn set_filter(&mut self, filter: FilterParams) {
        debug!("Filter: {}", filter);
        self.filter = filter;
        self.refresh_view();
    }

    fn validate_listing(&self, data: &NewEstate) -> Result<()> {
        if let Some(field) = data.missing_field() {
            return Err(CatalogError::missing(field));
        }
        if !data.area.is_finite() {
            return Err(CatalogError::Validation {
                field: "area",
                reason: format!("{} is not a finite number", data.area),
            });
        }

        // Only checkable once the reference lists are loaded
        if !self.cities.is_empty() {
            match self.city(data.city_id) {
                None => {
                    return Err(CatalogError::Validation {
                        field: "city_id",
                        reason: format!("unknown city #{}", data.city_id),
                    })
                }
                Some(city) if city.region_id != data.region_id => {
                    return Err(CatalogError::Validation {
                        field: "city_id",
                        reason: format!("{} is not in region #{}", city.name, data.region_id),
                    })
                }
                Some(_) => {}
            }
        }
        if !self.agents.is_empty() && self.agent(data.agent_id).is_none() {
            return Err(CatalogError::Validation {
                field: "agent_id",
                reason: format!("unknown agent #{}", data.agent_id),
            });
        }
        Ok(())
    }

    fn resolve_cities(&mut self) {
        for estate in self.estates.iter_mut().filter(|e| e.city.is_none()) {
            estate.city = self.cities.iter().find(|c| c.id == estate.city_id).cloned();
        }
    }

    fn sync_mirror(&self) {
        // The remote write already succeeded; a stale mirror is only a placeholder
        if let Err(e) = self.mirror.save(&self.estates) {
            warn!("Failed to rewrite estate mirror: {}", e);
        }
    }

    fn refresh_view(&mut self) {
        self.visible = self
            .estates
            .iter()
            .enumerate()
            .filter(|(_, estate)| self.filter.matches(estate))
            .map(|(index, _)| index)
            .collect();
    }
}

impl<C, M> ViewState<C, M> {
    /// Estates passing the active filter, in list order
    pub fn visible(&self) -> Vec<&Estate> {
        self.visible
            .iter()
            .filter_map(|&index| self.estates.get(index))
            .collect()
    }

    pub fn filter(&self) -> &FilterParams {
        &self.filter
    }

    pub fn estates(&self) -> &[Estate] {
        &self.estates
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn estate(&self, id: u64) -> Option<&Estate> {
        self.estates.iter().find(|estate| estate.id == id)
    }

    pub fn agent(&self, id: u64) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn agent_for(&self, estate: &Estate) -> Option<&Agent> {
        estate.agent_id.and_then(|id| self.agent(id))
    }

    pub fn city(&self, id: u64) -> Option<&City> {
        self.cities.iter().find(|city| city.id == id)
    }

    pub fn region(&self, id: u64) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    pub fn city_name<'a>(&'a self, estate: &'a Estate) -> &'a str {
        estate
            .city
            .as_ref()
            .or_else(|| self.city(estate.city_id))
            .map(|city| city.name.as_str())
            .unwrap_or(UNKNOWN_CITY)
    }

    /// Cities offered once a region is picked in the listing form
    pub fn cities_in_region(&self, region_id: u64) -> Vec<&City> {
        self.cities
            .iter()
            .filter(|city| city.region_id == region_id)
            .collect()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }
}
