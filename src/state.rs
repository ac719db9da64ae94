use crate::service::TrainsService;
use crate::store::Store;

/// Built once in `main` and shared by `Arc` with the HTTP routes and the
/// poller.
pub struct AppState {
    pub store: Store,
    pub service: TrainsService,
}

impl AppState {
    pub fn new(api_endpoint: String) -> Self {
        Self {
            store: Store::new(),
            service: TrainsService::new(api_endpoint),
        }
    }
}
