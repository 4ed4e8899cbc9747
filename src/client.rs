use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::error::{DirectoryError, Result};
use crate::types::User;

/// Read-only source of remote user records.
#[allow(async_fn_in_trait)]
pub trait UserSource {
    async fn fetch_users(&self) -> Result<Vec<User>>;

    async fn fetch_user(&self, id: &str) -> Result<User>;
}

/// `UserSource` backed by a JSON REST endpoint (`GET /users`, `GET /users/{id}`).
pub struct HttpUserSource {
    http: Client,
    base: Url,
}

impl HttpUserSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| DirectoryError::InvalidUrl {
            url: base_url.to_string(),
            source: e,
        })?;

        if base.cannot_be_a_base() {
            return Err(DirectoryError::InvalidUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        // Drop any trailing slash so segments append cleanly.
        let trimmed = base.path().trim_end_matches('/').to_string();
        base.set_path(&trimmed);

        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "fetching");

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    Err(DirectoryError::ApiError {
        status: response.status().as_u16(),
        message: response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string()),
    })
}

impl UserSource for HttpUserSource {
    async fn fetch_users(&self) -> Result<Vec<User>> {
        let url = self.endpoint(&["users"]);
        self.get(url).await.map_err(|e| {
            error!(error = %e, "error fetching users");
            e
        })
    }

    async fn fetch_user(&self, id: &str) -> Result<User> {
        let url = self.endpoint(&["users", id]);
        self.get(url).await.map_err(|e| {
            error!(error = %e, id, "error fetching user");
            match e {
                DirectoryError::ApiError { status, .. }
                    if status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    DirectoryError::UserNotFound(id.to_string())
                }
                other => other,
            }
        })
    }
}
