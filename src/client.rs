use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::api::{GridApi, MessageBody};
use crate::cell::{Cell, CellUpdate};
use crate::error::GridError;

/// [`GridApi`] over HTTP against a running `website` server.
#[derive(Clone, Debug)]
pub struct HttpGridApi {
    client: Client,
    base_url: String,
}

impl HttpGridApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpGridApi {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> GridError {
    GridError::Transport(err.to_string())
}

/// Turns a non-success reply into a store failure carrying the server's message.
async fn check(response: Response) -> Result<Response, GridError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<MessageBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(GridError::Store(format!("{}: {}", status.as_u16(), message)))
}

#[async_trait]
impl GridApi for HttpGridApi {
    async fn list_cells(&self) -> Result<Vec<Cell>, GridError> {
        let response = self
            .client
            .get(self.url("/api/cells"))
            .send()
            .await
            .map_err(transport)?;
        check(response).await?.json().await.map_err(transport)
    }

    async fn update_cell(&self, update: &CellUpdate) -> Result<CellUpdate, GridError> {
        let response = self
            .client
            .post(self.url("/api/update"))
            .json(update)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?.json().await.map_err(transport)
    }

    async fn reset_cells(&self) -> Result<(), GridError> {
        let response = self
            .client
            .post(self.url("/api/reset"))
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }
}
