//! HTTP surface: route table, request/response shapes and the error →
//! status mapping.

use crate::core::rates::{CurrencyEntry, RateSnapshot};
use crate::error::RatesError;
use crate::history::HistoryService;
use crate::store::CurrencyListStore;
use anyhow::{Context, Result};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub history: Arc<HistoryService>,
    pub list: Arc<dyn CurrencyListStore>,
}

pub fn router(state: AppState, allowed_origin: &str) -> Result<axum::Router> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {allowed_origin}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Ok(axum::Router::new()
        .route(
            "/currency/historical",
            get(historical_by_period).put(refresh_latest),
        )
        .route("/currency/historical/latest", get(latest_rates))
        .route("/currency/list", get(currency_list))
        .layer(cors)
        .with_state(state))
}

impl IntoResponse for RatesError {
    fn into_response(self) -> Response {
        let status = match &self {
            RatesError::Unauthorized => StatusCode::UNAUTHORIZED,
            RatesError::MissingParameter(_)
            | RatesError::InvalidCurrency(_)
            | RatesError::UnknownPeriod(_) => StatusCode::BAD_REQUEST,
            RatesError::LatestRatesFetch | RatesError::HistoricalRatesFetch => {
                StatusCode::BAD_GATEWAY
            }
            RatesError::BackfillInsert(_) | RatesError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if !self.is_client_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(ErrorBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct HistoricalQuery {
    currency: Option<String>,
    period: Option<String>,
    skip: Option<usize>,
    limit: Option<usize>,
}

async fn historical_by_period(
    State(state): State<AppState>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<Vec<RateSnapshot>>, RatesError> {
    let snapshots = state
        .history
        .rates_by_period(
            query.currency.as_deref(),
            query.period.as_deref(),
            query.skip,
            query.limit,
        )
        .await?;
    Ok(Json(snapshots))
}

async fn latest_rates(
    State(state): State<AppState>,
) -> Result<Json<Vec<RateSnapshot>>, RatesError> {
    Ok(Json(state.history.latest_rates().await?))
}

#[derive(Debug, Deserialize)]
struct RefreshBody {
    key: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    message: String,
}

async fn refresh_latest(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<RefreshResponse>, RatesError> {
    state.history.refresh_latest(&body.key).await?;
    let message = format!(
        "Currency rates are updated at: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{message}");
    Ok(Json(RefreshResponse { message }))
}

async fn currency_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<CurrencyEntry>>, RatesError> {
    let entries = state.list.all().await.map_err(RatesError::Store)?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::currency_api::CurrencyApiProvider;
    use crate::store::RateStore;
    use crate::store::memory::MemoryStore;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn spawn_app(state: AppState) -> String {
        let app = router(state, "http://localhost:5173").unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn state_with_store(store: Arc<MemoryStore>, provider_url: &str) -> AppState {
        let provider = Arc::new(CurrencyApiProvider::new(provider_url, "api-key"));
        AppState {
            history: Arc::new(HistoryService::new(store.clone(), provider, "secret")),
            list: store,
        }
    }

    fn snapshot(date: &str, sign: &str, rate: f64) -> RateSnapshot {
        RateSnapshot::new(date, HashMap::from([(sign.to_string(), rate)]))
    }

    #[tokio::test]
    async fn test_historical_missing_parameter_is_400() {
        let store = Arc::new(MemoryStore::new());
        let base = spawn_app(state_with_store(store, "http://unused.invalid").await).await;

        let response = reqwest::get(format!("{base}/currency/historical?period=day"))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_historical_unknown_period_is_400() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&snapshot("2024-01-01", "EUR", 0.91)).await.unwrap();
        let base = spawn_app(state_with_store(store, "http://unused.invalid").await).await;

        let response = reqwest::get(format!(
            "{base}/currency/historical?currency=EUR&period=week"
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_historical_day_projects_one_currency() {
        let store = Arc::new(MemoryStore::new());
        for date in ["2024-01-01", "2024-01-02"] {
            let mut snap = snapshot(date, "EUR", 0.91);
            snap.rates.insert("GBP".to_string(), 0.79);
            store.upsert(&snap).await.unwrap();
        }
        let base = spawn_app(state_with_store(store, "http://unused.invalid").await).await;

        let body: Vec<RateSnapshot> = reqwest::get(format!(
            "{base}/currency/historical?currency=EUR&period=day"
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

        assert_eq!(body.len(), 2);
        assert_eq!(body[0].date, "2024-01-02");
        assert_eq!(body[0].rates.len(), 1);
        assert_eq!(body[0].rates.get("EUR"), Some(&0.91));
    }

    #[tokio::test]
    async fn test_latest_view_rounds_to_three_decimals() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert(&snapshot("2024-01-01", "EUR", 0.912_345))
            .await
            .unwrap();
        let base = spawn_app(state_with_store(store, "http://unused.invalid").await).await;

        let body: Vec<RateSnapshot> =
            reqwest::get(format!("{base}/currency/historical/latest"))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();

        assert_eq!(body[0].rates.get("EUR"), Some(&0.912));
    }

    #[tokio::test]
    async fn test_refresh_bad_key_is_401() {
        let store = Arc::new(MemoryStore::new());
        let base = spawn_app(state_with_store(store.clone(), "http://unused.invalid").await).await;

        let response = reqwest::Client::new()
            .put(format!("{base}/currency/historical"))
            .json(&serde_json::json!({ "key": "wrong" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401);
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_ok_returns_status_message() {
        let provider_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{ "data": { "EUR": 0.9123 } }"#),
            )
            .mount(&provider_server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let base = spawn_app(state_with_store(store.clone(), &provider_server.uri()).await).await;

        let response = reqwest::Client::new()
            .put(format!("{base}/currency/historical"))
            .json(&serde_json::json!({ "key": "secret" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Currency rates are updated at: "));

        let stored = store.latest().await.unwrap().unwrap();
        assert_eq!(stored.rates.get("EUR"), Some(&0.9123));
    }

    #[tokio::test]
    async fn test_refresh_provider_down_is_502() {
        let provider_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&provider_server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let base = spawn_app(state_with_store(store, &provider_server.uri()).await).await;

        let response = reqwest::Client::new()
            .put(format!("{base}/currency/historical"))
            .json(&serde_json::json!({ "key": "secret" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 502);
    }

    #[tokio::test]
    async fn test_currency_list() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_all(&[CurrencyEntry {
                name: "Euro".to_string(),
                sign: "EUR".to_string(),
            }])
            .await
            .unwrap();
        let base = spawn_app(state_with_store(store, "http://unused.invalid").await).await;

        let body: Vec<CurrencyEntry> = reqwest::get(format!("{base}/currency/list"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body.len(), 1);
        assert_eq!(body[0].sign, "EUR");
    }
}
