use crate::date_range::{DateRangeController, Layout};
use crate::errors::{AppError, WindowError};
use crate::fetcher::{RankingRequest, StatsFetcher, StatsRequest};
use crate::models::{DashboardQuery, DateWindow, Mode};
use crate::state::AppState;
use crate::table::{render_message, render_ranking_outcome, render_stats_outcome};
use crate::ui::{render_page, PageKind, PageView};
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

pub async fn stats_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    Html(stats_view(&state.fetcher, "", query).await)
}

pub async fn rankings_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    Html(rankings_view(&state.fetcher, "", query).await)
}

pub async fn board_stats_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let slug = board_slug(&slug)?;
    let fetcher = state.fetcher.scoped(Some(slug.to_string()));
    let base_path = format!("/boards/{slug}");
    Ok(Html(stats_view(&fetcher, &base_path, query).await))
}

pub async fn board_rankings_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let slug = board_slug(&slug)?;
    let fetcher = state.fetcher.scoped(Some(slug.to_string()));
    let base_path = format!("/boards/{slug}");
    Ok(Html(rankings_view(&fetcher, &base_path, query).await))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn stats_view(fetcher: &StatsFetcher, base_path: &str, query: DashboardQuery) -> String {
    let controller = DateRangeController::today(Layout::Range);
    let mode = query.mode();
    let nickname = query.nickname.as_deref().unwrap_or("");

    let (window, results) = match resolve_window(&controller, mode, &query) {
        Ok(window) if query.is_reset() => (window, String::new()),
        Ok(window) => match StatsRequest::new(mode, nickname, window) {
            Some(request) => {
                let outcome = fetcher.fetch_stats(&request).await;
                (window, render_stats_outcome(mode, &outcome))
            }
            None => {
                debug!("blank nickname, stats fetch skipped");
                (window, String::new())
            }
        },
        Err(err) => (controller.for_mode(mode), render_message(&err.to_string())),
    };

    render_page(&PageView {
        kind: PageKind::Stats,
        mode,
        window: &window,
        nickname,
        board_slug: fetcher.board_slug(),
        base_path,
        results: &results,
    })
}

async fn rankings_view(fetcher: &StatsFetcher, base_path: &str, query: DashboardQuery) -> String {
    let controller = DateRangeController::today(Layout::Single);
    let mode = query.mode();

    let (window, results) = match resolve_window(&controller, mode, &query) {
        Ok(window) if query.is_reset() => (window, String::new()),
        Ok(window) => {
            let window = if window.start().is_none() {
                controller.for_mode(mode)
            } else {
                window
            };
            let results = match RankingRequest::new(mode, &window) {
                Some(request) => render_ranking_outcome(&fetcher.fetch_ranking(&request).await),
                None => String::new(),
            };
            (window, results)
        }
        Err(err) => (controller.for_mode(mode), render_message(&err.to_string())),
    };

    render_page(&PageView {
        kind: PageKind::Rankings,
        mode,
        window: &window,
        nickname: "",
        board_slug: fetcher.board_slug(),
        base_path,
        results: &results,
    })
}

/// Submitted dates win unless the mode was just switched or none were sent.
fn resolve_window(
    controller: &DateRangeController,
    mode: Mode,
    query: &DashboardQuery,
) -> Result<DateWindow, WindowError> {
    if query.is_reset() || !query.has_dates() {
        return Ok(controller.for_mode(mode));
    }
    let end = match controller.layout() {
        Layout::Single => None,
        Layout::Range => query.end_date.as_deref(),
    };
    DateWindow::parse(mode.granularity(), query.start_date.as_deref(), end)
}

fn board_slug(raw: &str) -> Result<&str, AppError> {
    let slug = raw.trim();
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !valid {
        return Err(AppError::bad_request("invalid board slug"));
    }
    Ok(slug)
}
