use cinelog_core::catalog::CatalogService;
use cinelog_core::traits::{Clock, Enricher, Fetcher};

use crate::dto::Manifest;

/// Shared application state, available to all route handlers via
/// `State<Arc<AppState<_, _, _>>>`.
///
/// Generic over the pipeline's capability traits so integration tests can
/// drive the router with mocks instead of the network.
pub struct AppState<F, E, C>
where
    F: Fetcher,
    E: Enricher,
    C: Clock,
{
    pub catalog: CatalogService<F, E, C>,
    pub manifest: Manifest,
}
