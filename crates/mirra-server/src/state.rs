use mirra_client::ReqwestFetcher;
use mirra_core::ProfileService;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub service: ProfileService<ReqwestFetcher>,
}
