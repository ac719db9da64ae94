use crate::state::AppState;
use crate::types::Frequency;
use crate::views::{StatsView, TimetableView};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

/// The two pages exposed to users, as plain history-mode paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Timetable,
    Stats,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Timetable, Route::Stats];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Timetable => "/",
            Route::Stats => "/stats",
        }
    }

    /// Exact match only; `/stats/` and hash-mode URLs are not routes.
    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Timetable => "Timetable",
            Route::Stats => "StatsPage",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub frequency: Frequency,
    pub since: Option<i64>,
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    // GET /
    let timetable_route = at(Route::Timetable)
        .and(warp::get())
        .and(state_filter.clone())
        .then(|state: Arc<AppState>| async move {
            let view = TimetableView::from(state.store.snapshot().await);
            warp::reply::json(&view).into_response()
        });

    // GET /stats?frequency=day&since=...
    let stats_route = at(Route::Stats)
        .and(warp::get())
        .and(warp::query::<StatsQuery>())
        .and(state_filter)
        .then(stats);

    timetable_route.or(stats_route).unify()
}

// Matches exactly the paths `Route::from_path` resolves to `route`.
fn at(route: Route) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path::full()
        .and_then(move |path: FullPath| async move {
            match Route::from_path(path.as_str()) {
                Some(found) if found == route => Ok(()),
                _ => Err(warp::reject::not_found()),
            }
        })
        .untuple_one()
}

async fn stats(query: StatsQuery, state: Arc<AppState>) -> Response {
    match state
        .service
        .query_aggregate(query.frequency, query.since)
        .await
    {
        Ok(rows) => warp::reply::json(&StatsView::new(query.frequency, rows)).into_response(),
        Err(e) => {
            warn!(frequency = %query.frequency, "stats view unavailable");
            warp::reply::with_status(
                warp::reply::json(&json!({ "error": e.to_string() })),
                StatusCode::BAD_GATEWAY,
            )
            .into_response()
        }
    }
}
