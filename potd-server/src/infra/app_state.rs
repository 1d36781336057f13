use std::{fmt, sync::Arc};

use potd_core::PictureService;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PictureService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: PictureService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }

    pub fn service(&self) -> &PictureService {
        &self.service
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
