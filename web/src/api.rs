use serde::de::DeserializeOwned;
use shared::protocol::{ErrorBody, ResultRecord, ResultSubmission, SaveResponse};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Network error. Please check your connection and try again.")]
    Network(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

/// The API is served from the same origin as the page.
fn api_url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string());
    format!("{origin}/api{path}")
}

async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        return Ok(response.json::<T>().await?);
    }
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => format!("{}: {}", body.message, body.error),
        Err(_) => format!("Request failed with status {status}"),
    };
    web_sys::console::error_1(&message.clone().into());
    Err(ClientError::Rejected(message))
}

pub async fn save_result(submission: &ResultSubmission) -> Result<SaveResponse, ClientError> {
    let response = reqwest::Client::new()
        .post(api_url("/results"))
        .json(submission)
        .send()
        .await?;
    read(response).await
}

pub async fn leaderboard(limit: usize) -> Result<Vec<ResultRecord>, ClientError> {
    let response = reqwest::Client::new()
        .get(api_url(&format!("/leaderboard?limit={limit}")))
        .send()
        .await?;
    read(response).await
}
