use std::sync::Arc;

use axum::Router;

use cinelog_api::dto::Manifest;
use cinelog_api::routes;
use cinelog_api::state::AppState;
use cinelog_core::catalog::{CatalogConfig, CatalogService};
use cinelog_core::testutil::{FakeClock, MockFetcher};
use cinelog_core::traits::NullEnricher;

pub const FILMS_P1: &str = "https://boxd.test/jake84/films/page/1/";
pub const DIARY_P1: &str = "https://boxd.test/jake84/films/diary/page/1/";

/// Router wired to a mock fetcher instead of the network.
pub fn setup_test_app(fetcher: MockFetcher) -> Router {
    let config = CatalogConfig::new("jake84").with_base_url("https://boxd.test");
    let manifest = Manifest::for_user("jake84", &config.catalog_id);
    let catalog = CatalogService::new(config, fetcher, NullEnricher, FakeClock::new());

    routes::router(Arc::new(AppState { catalog, manifest }))
}

/// A fetcher stubbed with one films page and one diary page.
pub fn stubbed_fetcher() -> MockFetcher {
    let fetcher = MockFetcher::default();
    fetcher.stub(
        FILMS_P1,
        Ok(r#"<html><body>
            <div class="film-detail-content">
                <div class="film-title-wrapper"><a href="/film/heat/">Heat</a></div>
                <img src="https://img.test/heat.jpg">
            </div>
            <div class="film-detail-content">
                <div class="film-title-wrapper"><a href="/film/alien/">Alien</a></div>
                <img src="https://img.test/alien.jpg">
            </div>
        </body></html>"#
            .to_string()),
    );
    fetcher.stub(
        DIARY_P1,
        Ok(r#"<html><body><table>
            <tr class="diary-entry-row">
                <td class="film-title"><a href="/film/heat/">Heat</a></td>
                <td><span class="rating rated-8"></span></td>
            </tr>
        </table></body></html>"#
            .to_string()),
    );
    fetcher
}
