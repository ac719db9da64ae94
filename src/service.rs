use crate::error::FetchError;
use crate::types::{AggregateRow, Frequency, TrainsPayload};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, error};

/// Anything the store can pull trains from.
pub trait TrainsSource {
    fn query(
        &self,
        since: Option<i64>,
    ) -> impl Future<Output = Result<TrainsPayload, FetchError>> + Send;
}

/// HTTP client for the trains API.
pub struct TrainsService {
    endpoint: String,
    client: reqwest::Client,
}

impl TrainsService {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    // The endpoint is concatenated as configured, no normalisation.
    pub fn query_url(&self, since: Option<i64>) -> String {
        with_since(self.endpoint.clone(), since)
    }

    pub fn aggregate_url(&self, frequency: Frequency, since: Option<i64>) -> String {
        with_since(format!("{}/aggregate/{}", self.endpoint, frequency), since)
    }

    pub async fn query_aggregate(
        &self,
        frequency: Frequency,
        since: Option<i64>,
    ) -> Result<Vec<AggregateRow>, FetchError> {
        let url = self.aggregate_url(frequency, since);
        self.get_json(url)
            .await
            .inspect_err(|e| error!(error = %e, "Error fetching aggregate"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let res = match self.client.get(&url).send().await {
            Ok(res) => res,
            Err(source) => return Err(FetchError::Network { url, source }),
        };

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        match res.json::<T>().await {
            Ok(body) => Ok(body),
            Err(source) => Err(FetchError::Decode { url, source }),
        }
    }
}

impl TrainsSource for TrainsService {
    async fn query(&self, since: Option<i64>) -> Result<TrainsPayload, FetchError> {
        let url = self.query_url(since);
        self.get_json(url)
            .await
            .inspect_err(|e| error!(error = %e, "Error fetching trains"))
    }
}

fn with_since(mut url: String, since: Option<i64>) -> String {
    if let Some(since) = since {
        url.push_str("?since=");
        url.push_str(&since.to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrainId;
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use warp::Filter;

    // Minimal stand-in for the trains API on an ephemeral port.
    fn spawn_api() -> SocketAddr {
        let trains = warp::path!("api")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .map(|params: HashMap<String, String>| {
                let since = params.get("since").cloned().unwrap_or_default();
                warp::reply::json(&json!({
                    "aller": [{"id": 1, "since": since}],
                    "retour": [],
                    "infos": {"from_station": "Poissy", "to_station": "Paris"}
                }))
            });

        let aggregate = warp::path!("api" / "aggregate" / String).map(|frequency: String| {
            warp::reply::json(&json!([
                {"date": "2017-02-12", "type": frequency, "count": 2}
            ]))
        });

        let broken = warp::path!("broken").map(|| {
            warp::reply::with_status("boom", warp::http::StatusCode::INTERNAL_SERVER_ERROR)
        });

        let garbage = warp::path!("garbage").map(|| "not json");

        let (addr, server) = warp::serve(trains.or(aggregate).or(broken).or(garbage))
            .bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    #[test]
    fn test_query_url_without_since() {
        let service = TrainsService::new("http://localhost/api".to_string());
        assert_eq!(service.query_url(None), "http://localhost/api");
    }

    #[test]
    fn test_query_url_with_since() {
        let service = TrainsService::new("http://localhost/api".to_string());
        assert!(service.query_url(Some(1000)).ends_with("?since=1000"));
        assert_eq!(
            service.aggregate_url(Frequency::HourOverall, Some(1000)),
            "http://localhost/api/aggregate/hour_overall?since=1000"
        );
        assert_eq!(
            service.aggregate_url(Frequency::Day, None),
            "http://localhost/api/aggregate/day"
        );
    }

    #[tokio::test]
    async fn test_query_decodes_payload_and_forwards_since() {
        let addr = spawn_api();
        let service = TrainsService::new(format!("http://{}/api", addr));

        let payload = service.query(Some(1000)).await.unwrap();
        assert_eq!(payload.aller.len(), 1);
        assert_eq!(payload.aller[0].id, TrainId::Int(1));
        assert_eq!(payload.aller[0].fields["since"], json!("1000"));
        assert!(payload.retour.is_empty());
        assert_eq!(payload.infos.unwrap()["to_station"], json!("Paris"));

        let payload = service.query(None).await.unwrap();
        assert_eq!(payload.aller[0].fields["since"], json!(""));
    }

    #[tokio::test]
    async fn test_query_aggregate() {
        let addr = spawn_api();
        let service = TrainsService::new(format!("http://{}/api", addr));

        let rows = service.query_aggregate(Frequency::Weekday, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "weekday");
        assert_eq!(rows[0].count, 2);
    }

    #[tokio::test]
    async fn test_query_http_error_is_status() {
        let addr = spawn_api();
        let service = TrainsService::new(format!("http://{}/broken", addr));

        match service.query(None).await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_bad_body_is_decode() {
        let addr = spawn_api();
        let service = TrainsService::new(format!("http://{}/garbage", addr));

        assert!(matches!(
            service.query(None).await,
            Err(FetchError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_query_network_failure() {
        // Grab a free port and release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = TrainsService::new(format!("http://{}/api", addr));
        assert!(matches!(
            service.query(None).await,
            Err(FetchError::Network { .. })
        ));
    }
}
