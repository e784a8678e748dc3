use std::sync::Arc;

use upstream::{Client, FetchError};

use super::{config::Config, window::WindowAggregator};

pub struct RankingState {
    pub config: Config,
    pub client: Client,
}

impl RankingState {
    pub fn new(config: Config) -> Result<Arc<Self>, FetchError> {
        let client = Client::new(&config.upstream)?;

        Ok(Arc::new(Self { config, client }))
    }
}

pub struct NumbersState {
    pub config: Config,
    pub client: Client,
    pub window: WindowAggregator,
}

impl NumbersState {
    pub fn new(config: Config) -> Result<Arc<Self>, FetchError> {
        let client = Client::new(&config.upstream)?;
        let window = WindowAggregator::new(config.window_size);

        Ok(Arc::new(Self {
            config,
            client,
            window,
        }))
    }
}
