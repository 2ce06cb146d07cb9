use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Mounted at `/admin/settings`.
///
/// ```text
/// GET    /scheduling      get_scheduling_settings
/// PUT    /scheduling      update_scheduling_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/scheduling",
        get(settings::get_scheduling_settings).put(settings::update_scheduling_settings),
    )
}
