use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{build_auth_header, ApiConfig};

use super::error::FeedError;
use super::traits::DiscoveryApi;
use super::types::{Candidate, FeedPage, PageRequest, SwipeRequest, SwipeResponse};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Discovery backend over HTTP.
pub struct HttpDiscoveryApi {
    client: Client,
    api: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpDiscoveryApi {
    pub fn new(api: ApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(api.timeout_seconds)))
            .connect_timeout(Duration::from_secs(u64::from(api.connect_timeout_seconds)))
            .build()?;

        Ok(Self { client, api })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api.base_url.trim_end_matches('/'), path)
    }

    fn prepare(&self, builder: RequestBuilder, request_id: &str) -> RequestBuilder {
        let builder = builder.header(REQUEST_ID_HEADER, request_id);
        match build_auth_header(&self.api) {
            Some((name, value)) => builder.header(name, value),
            None => builder,
        }
    }
}

#[async_trait]
impl DiscoveryApi for HttpDiscoveryApi {
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage, FeedError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            request_id = %request_id,
            offset = request.cursor,
            limit = request.page_size,
            "Fetching candidates"
        );

        let builder = self
            .client
            .get(self.url(&self.api.candidates_path))
            .query(&request.query_pairs());
        let response = self
            .prepare(builder, &request_id)
            .send()
            .await
            .map_err(FeedError::network)?;

        let candidates: Vec<Candidate> = decode(response, &request_id).await?;
        tracing::debug!(
            request_id = %request_id,
            returned = candidates.len(),
            "Candidates received"
        );
        Ok(FeedPage::from_response(candidates, request.page_size))
    }

    async fn record_swipe(&self, request: &SwipeRequest) -> Result<SwipeResponse, FeedError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            request_id = %request_id,
            swiped_id = %request.swiped_id,
            "Recording swipe"
        );

        let builder = self
            .client
            .post(self.url(&self.api.swipes_path))
            .json(request);
        let response = self
            .prepare(builder, &request_id)
            .send()
            .await
            .map_err(FeedError::network)?;

        decode(response, &request_id).await
    }
}

/// Map the status to the error taxonomy, then decode a 2xx body.
async fn decode<T: DeserializeOwned>(response: Response, request_id: &str) -> Result<T, FeedError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::warn!(request_id = %request_id, status = status.as_u16(), "Request not authorized");
        return Err(FeedError::Auth {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(FeedError::network)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
        tracing::warn!(
            request_id = %request_id,
            status = status.as_u16(),
            message = %message,
            "Backend returned an error"
        );
        return Err(FeedError::Server {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| FeedError::InvalidResponse {
        message: e.to_string(),
    })
}
