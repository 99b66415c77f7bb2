use crate::config::BackendConfig;
use crate::errors::FetchError;
use crate::models::{Boundary, DateWindow, Mode, NicknameStats, PeriodRow, RankingRow, StatsPayload};
use reqwest::{Client, Url, header};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    MonthlyRanking,
    DailyRanking,
    MonthlyStats,
    DailyStats,
}

impl Endpoint {
    pub fn ranking(mode: Mode) -> Self {
        match mode {
            Mode::MonthlyBetting => Endpoint::MonthlyRanking,
            Mode::DailyBetting => Endpoint::DailyRanking,
        }
    }

    pub fn stats(mode: Mode) -> Self {
        match mode {
            Mode::MonthlyBetting => Endpoint::MonthlyStats,
            Mode::DailyBetting => Endpoint::DailyStats,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::MonthlyRanking => "/api/monthly_ranking",
            Endpoint::DailyRanking => "/api/daily_ranking",
            Endpoint::MonthlyStats => "/api/monthly_stats",
            Endpoint::DailyStats => "/api/daily_stats",
        }
    }

    fn accepts_json(self) -> bool {
        matches!(self, Endpoint::MonthlyStats | Endpoint::DailyStats)
    }
}

/// One fully resolved backend call: endpoint plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiQuery {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl ApiQuery {
    pub fn url(&self, base: &Url) -> Result<Url, FetchError> {
        let mut url = base
            .join(self.endpoint.path().trim_start_matches('/'))
            .map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    #[cfg(test)]
    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingRequest {
    pub mode: Mode,
    pub period: Boundary,
}

impl RankingRequest {
    pub fn new(mode: Mode, window: &DateWindow) -> Option<Self> {
        let period = window.start()?;
        (period.granularity() == mode.granularity()).then_some(Self { mode, period })
    }

    pub fn query(&self, board_slug: Option<&str>) -> ApiQuery {
        let mut params = Vec::with_capacity(2);
        if let Some(slug) = board_slug {
            params.push(("boardSlug", slug.to_string()));
        }
        let key = match self.mode {
            Mode::MonthlyBetting => "statMonth",
            Mode::DailyBetting => "statDate",
        };
        params.push((key, self.period.to_string()));
        ApiQuery {
            endpoint: Endpoint::ranking(self.mode),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub mode: Mode,
    pub nickname: String,
    pub window: DateWindow,
}

impl StatsRequest {
    /// `None` when the nickname is blank: nothing is fetched at all.
    pub fn new(mode: Mode, nickname: &str, window: DateWindow) -> Option<Self> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return None;
        }
        Some(Self {
            mode,
            nickname: nickname.to_string(),
            window,
        })
    }

    pub fn query(&self, board_slug: Option<&str>) -> ApiQuery {
        let mut params = vec![("nickname", self.nickname.clone())];
        if let Some(slug) = board_slug {
            params.push(("boardSlug", slug.to_string()));
        }
        let (start_key, end_key) = match self.mode {
            Mode::MonthlyBetting => ("startMonth", "endMonth"),
            Mode::DailyBetting => ("startDate", "endDate"),
        };
        if let Some(start) = self.window.start() {
            params.push((start_key, start.to_string()));
        }
        if let Some(end) = self.window.end() {
            params.push((end_key, end.to_string()));
        }
        ApiQuery {
            endpoint: Endpoint::stats(self.mode),
            params,
        }
    }
}

/// Why a successful response still has nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    NoResults,
    NoRecords,
    Server(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Rows(T),
    Empty(EmptyReason),
}

#[derive(Clone)]
pub struct StatsFetcher {
    client: Client,
    base_url: Url,
    board_slug: Option<String>,
}

impl StatsFetcher {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            board_slug: config.board_slug.clone(),
        })
    }

    /// Same client and backend, queries scoped to `board_slug`.
    pub fn scoped(&self, board_slug: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            board_slug,
        }
    }

    pub fn board_slug(&self) -> Option<&str> {
        self.board_slug.as_deref()
    }

    pub async fn fetch_ranking(
        &self,
        request: &RankingRequest,
    ) -> Result<Fetched<Vec<RankingRow>>, FetchError> {
        let body = self.get(&request.query(self.board_slug())).await?;
        classify_ranking(body)
    }

    pub async fn fetch_stats(&self, request: &StatsRequest) -> Result<Fetched<StatsPayload>, FetchError> {
        let body = self.get(&request.query(self.board_slug())).await?;
        classify_stats(body)
    }

    async fn get(&self, query: &ApiQuery) -> Result<Value, FetchError> {
        let url = query.url(&self.base_url)?;
        debug!(%url, "calling backend");

        let mut request = self.client.get(url);
        if query.endpoint.accepts_json() {
            request = request.header(header::ACCEPT, "application/json");
        }

        let response = request.send().await.map_err(|err| {
            warn!(endpoint = query.endpoint.path(), "backend unreachable: {err}");
            FetchError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = query.endpoint.path(), %status, "backend returned an error status");
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason(),
            });
        }

        response.json::<Value>().await.map_err(|err| {
            warn!(endpoint = query.endpoint.path(), "backend payload is not json: {err}");
            FetchError::Decode(err.to_string())
        })
    }
}

pub fn classify_ranking(body: Value) -> Result<Fetched<Vec<RankingRow>>, FetchError> {
    match body {
        Value::Null => Ok(Fetched::Empty(EmptyReason::NoRecords)),
        Value::Array(items) if items.is_empty() => Ok(Fetched::Empty(EmptyReason::NoRecords)),
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<RankingRow>)
            .collect::<Result<Vec<_>, _>>()
            .map(Fetched::Rows)
            .map_err(|err| FetchError::Decode(err.to_string())),
        Value::Object(map) => match map.get("error").and_then(error_message) {
            Some(message) => Ok(Fetched::Empty(EmptyReason::Server(message))),
            None if map.is_empty() => Ok(Fetched::Empty(EmptyReason::NoRecords)),
            None => Err(FetchError::Decode("expected a list of ranking rows".to_string())),
        },
        _ => Err(FetchError::Decode("expected a list of ranking rows".to_string())),
    }
}

pub fn classify_stats(body: Value) -> Result<Fetched<StatsPayload>, FetchError> {
    let map = match body {
        Value::Null => return Ok(Fetched::Empty(EmptyReason::NoResults)),
        Value::Object(map) => map,
        Value::Array(items) if items.is_empty() => return Ok(Fetched::Empty(EmptyReason::NoRecords)),
        _ => return Err(FetchError::Decode("expected stats keyed by nickname".to_string())),
    };

    if let Some(message) = map.get("error").and_then(error_message) {
        return Ok(Fetched::Empty(EmptyReason::Server(message)));
    }
    if map.is_empty() {
        return Ok(Fetched::Empty(EmptyReason::NoRecords));
    }

    let mut entries = Vec::with_capacity(map.len());
    for (nickname, rows) in map {
        let stats = match rows {
            Value::Array(rows) if !rows.is_empty() => {
                let rows = rows
                    .into_iter()
                    .map(serde_json::from_value::<PeriodRow>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| FetchError::Decode(err.to_string()))?;
                NicknameStats::Rows(rows)
            }
            _ => NicknameStats::NoRecords,
        };
        entries.push((nickname, stats));
    }
    Ok(Fetched::Rows(StatsPayload { entries }))
}

/// Text of a truthy `error` field.
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Granularity, YearMonth};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn base() -> Url {
        Url::parse("http://backend.test/").unwrap()
    }

    fn month(y: i32, m: u32) -> Boundary {
        Boundary::Month(YearMonth::new(y, m).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> Boundary {
        Boundary::Day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn monthly_ranking_query() {
        let window = DateWindow::new(Granularity::Month, Some(month(2026, 10)), None).unwrap();
        let request = RankingRequest::new(Mode::MonthlyBetting, &window).unwrap();

        let query = request.query(None);
        assert_eq!(query.endpoint, Endpoint::MonthlyRanking);
        assert_eq!(
            query.url(&base()).unwrap().as_str(),
            "http://backend.test/api/monthly_ranking?statMonth=2026-10"
        );

        let scoped = request.query(Some("pan_setkacup"));
        assert_eq!(
            scoped.url(&base()).unwrap().as_str(),
            "http://backend.test/api/monthly_ranking?boardSlug=pan_setkacup&statMonth=2026-10"
        );
    }

    #[test]
    fn daily_ranking_query() {
        let window = DateWindow::new(Granularity::Date, Some(day(2026, 10, 14)), None).unwrap();
        let request = RankingRequest::new(Mode::DailyBetting, &window).unwrap();
        let query = request.query(None);
        assert_eq!(query.endpoint, Endpoint::DailyRanking);
        assert_eq!(query.param("statDate"), Some("2026-10-14"));
        assert_eq!(query.param("boardSlug"), None);
    }

    #[test]
    fn ranking_needs_a_matching_period() {
        let empty = DateWindow::new(Granularity::Month, None, None).unwrap();
        assert!(RankingRequest::new(Mode::MonthlyBetting, &empty).is_none());

        let monthly = DateWindow::new(Granularity::Month, Some(month(2026, 10)), None).unwrap();
        assert!(RankingRequest::new(Mode::DailyBetting, &monthly).is_none());
    }

    #[test]
    fn monthly_stats_query_orders_params() {
        let window =
            DateWindow::new(Granularity::Month, Some(month(2026, 8)), Some(month(2026, 10))).unwrap();
        let request = StatsRequest::new(Mode::MonthlyBetting, "  홍길동 ", window).unwrap();
        let query = request.query(Some("free"));

        assert_eq!(query.endpoint, Endpoint::MonthlyStats);
        let keys: Vec<_> = query.params.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, ["nickname", "boardSlug", "startMonth", "endMonth"]);
        assert_eq!(query.param("nickname"), Some("홍길동"));
        assert!(
            query
                .url(&base())
                .unwrap()
                .as_str()
                .starts_with("http://backend.test/api/monthly_stats?nickname=%ED%99%8D")
        );
    }

    #[test]
    fn daily_stats_query_omits_unset_bounds() {
        let window = DateWindow::new(Granularity::Date, None, Some(day(2026, 10, 31))).unwrap();
        let request = StatsRequest::new(Mode::DailyBetting, "A", window).unwrap();
        let query = request.query(None);

        assert_eq!(query.endpoint, Endpoint::DailyStats);
        assert_eq!(
            query.params,
            vec![("nickname", "A".to_string()), ("endDate", "2026-10-31".to_string())]
        );
    }

    #[test]
    fn blank_nickname_builds_no_request() {
        let window = DateWindow::new(Granularity::Month, None, None).unwrap();
        assert!(StatsRequest::new(Mode::MonthlyBetting, "", window).is_none());
        assert!(StatsRequest::new(Mode::DailyBetting, " \t ", window).is_none());
    }

    #[test]
    fn endpoints_resolve_against_prefixed_base() {
        let window = DateWindow::new(Granularity::Month, Some(month(2026, 1)), None).unwrap();
        let query = RankingRequest::new(Mode::MonthlyBetting, &window)
            .unwrap()
            .query(None);
        let prefixed = Url::parse("https://stats.example.com/betting/").unwrap();
        assert_eq!(
            query.url(&prefixed).unwrap().as_str(),
            "https://stats.example.com/betting/api/monthly_ranking?statMonth=2026-01"
        );
    }

    #[test]
    fn only_stats_endpoints_ask_for_json() {
        assert!(Endpoint::MonthlyStats.accepts_json());
        assert!(Endpoint::DailyStats.accepts_json());
        assert!(!Endpoint::MonthlyRanking.accepts_json());
        assert!(!Endpoint::DailyRanking.accepts_json());
    }

    #[test]
    fn ranking_payload_classification() {
        let rows = classify_ranking(json!([{"nickname": "A", "total_amount": 1000}])).unwrap();
        match rows {
            Fetched::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].nickname, "A");
                assert_eq!(rows[0].total_amount.finite(), Some(1000.0));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(classify_ranking(json!([])).unwrap(), Fetched::Empty(EmptyReason::NoRecords));
        assert_eq!(classify_ranking(Value::Null).unwrap(), Fetched::Empty(EmptyReason::NoRecords));
        assert_eq!(
            classify_ranking(json!({"error": "board not found"})).unwrap(),
            Fetched::Empty(EmptyReason::Server("board not found".to_string()))
        );
        assert!(matches!(classify_ranking(json!({"rows": []})), Err(FetchError::Decode(_))));
        assert!(matches!(classify_ranking(json!("oops")), Err(FetchError::Decode(_))));
    }

    #[test]
    fn stats_payload_classification() {
        assert_eq!(classify_stats(json!({})).unwrap(), Fetched::Empty(EmptyReason::NoRecords));
        assert_eq!(classify_stats(Value::Null).unwrap(), Fetched::Empty(EmptyReason::NoResults));
        assert_eq!(
            classify_stats(json!({"error": "user not found"})).unwrap(),
            Fetched::Empty(EmptyReason::Server("user not found".to_string()))
        );
        // A falsy error field is ignored.
        assert_eq!(
            classify_stats(json!({"error": ""})).unwrap(),
            Fetched::Rows(StatsPayload {
                entries: vec![("error".to_string(), NicknameStats::NoRecords)]
            })
        );
    }

    #[test]
    fn malformed_text_cells_keep_the_table() {
        let ranking = classify_ranking(json!([
            {"nickname": "A", "total_amount": 1000, "win_rate": 60},
            {"nickname": null, "total_amount": 5}
        ]))
        .unwrap();
        let Fetched::Rows(rows) = ranking else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].nickname, "A");
        assert_eq!(rows[1].nickname, "");
        assert_eq!(rows[1].total_amount.finite(), Some(5.0));

        let stats = classify_stats(json!({"A": [{"stat_month": 202609, "total_bets": 3}]})).unwrap();
        let Fetched::Rows(payload) = stats else {
            panic!("expected rows");
        };
        assert!(matches!(&payload.entries[0].1, NicknameStats::Rows(rows) if rows[0].period_label == "202609"));
    }

    #[test]
    fn stats_payload_keeps_response_order() {
        let body = json!({
            "zeta": [{"stat_month": "2026-10", "total_bets": 2}],
            "alpha": [],
            "mid": "unexpected"
        });
        let Fetched::Rows(payload) = classify_stats(body).unwrap() else {
            panic!("expected rows");
        };
        let names: Vec<_> = payload.entries.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(matches!(&payload.entries[0].1, NicknameStats::Rows(rows) if rows[0].period_label == "2026-10"));
        assert_eq!(payload.entries[1].1, NicknameStats::NoRecords);
        assert_eq!(payload.entries[2].1, NicknameStats::NoRecords);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = StatsFetcher::new(&BackendConfig {
            base_url: Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap(),
            board_slug: None,
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let window = DateWindow::new(Granularity::Month, Some(month(2026, 10)), None).unwrap();
        let request = RankingRequest::new(Mode::MonthlyBetting, &window).unwrap();

        let err = fetcher.fetch_ranking(&request).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
