use crate::config::BackendConfig;
use crate::fetcher::StatsFetcher;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<StatsFetcher>,
}

impl AppState {
    pub fn new(backend: &BackendConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            fetcher: Arc::new(StatsFetcher::new(backend)?),
        })
    }
}
