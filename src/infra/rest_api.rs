//! Client for the marketplace REST backend.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{
    cart::{LineItem, LineItemId, ProductId, ServerCartItem, VariantId},
    checkout::{AuthenticatedOrderPayload, GuestOrderPayload},
};

use super::{ApiSettings, ClientError};

/// Bearer credential of a signed in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub replace_quantity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
}

#[automock]
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// `GET /cart`
    async fn fetch_cart(&self, credential: &Credential) -> Result<Vec<LineItem>, ClientError>;

    /// `POST /cart/add`
    async fn add_to_cart(
        &self,
        credential: &Credential,
        request: &AddToCartRequest,
    ) -> Result<(), ClientError>;

    /// `PATCH /cart/:id`
    async fn update_cart_item(
        &self,
        credential: &Credential,
        id: LineItemId,
        quantity: u32,
    ) -> Result<(), ClientError>;

    /// `DELETE /cart/:id`
    async fn remove_cart_item(
        &self,
        credential: &Credential,
        id: LineItemId,
    ) -> Result<(), ClientError>;

    /// `POST /dathang`
    async fn place_order(
        &self,
        credential: &Credential,
        payload: &AuthenticatedOrderPayload,
    ) -> Result<serde_json::Value, ClientError>;

    /// `POST /nologin`
    async fn place_guest_order(
        &self,
        payload: &GuestOrderPayload,
    ) -> Result<serde_json::Value, ClientError>;
}

//----------------------- Implementation --------------------------

#[derive(Debug, Clone)]
pub struct RestApi {
    base_url: String,
    http: Client,
}

impl RestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|source| ClientError::Transport {
                endpoint: settings.base_url.clone(),
                source,
            })?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        let status = response.status();
        debug!("{endpoint} responded with {status}");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                message: ClientError::message_from_body(&body),
            });
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, ClientError> {
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_owned(),
                source,
            })?;
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_owned(),
            source,
        })
    }
}

/// `GET /cart` answers with either a bare array or a `data` envelope.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CartPayload {
    Items(Vec<ServerCartItem>),
    Wrapped { data: Vec<ServerCartItem> },
}

#[async_trait]
impl MarketplaceApi for RestApi {
    async fn fetch_cart(&self, credential: &Credential) -> Result<Vec<LineItem>, ClientError> {
        let endpoint = "GET /cart";
        let request = self.http.get(self.url("/cart")).bearer_auth(credential.token());
        let response = self.send(endpoint, request).await?;
        let items = match Self::read_json::<CartPayload>(endpoint, response).await? {
            CartPayload::Items(items) | CartPayload::Wrapped { data: items } => items,
        };
        Ok(items.into_iter().map(LineItem::from).collect())
    }

    async fn add_to_cart(
        &self,
        credential: &Credential,
        request: &AddToCartRequest,
    ) -> Result<(), ClientError> {
        let builder = self
            .http
            .post(self.url("/cart/add"))
            .bearer_auth(credential.token())
            .json(request);
        self.send("POST /cart/add", builder).await?;
        Ok(())
    }

    async fn update_cart_item(
        &self,
        credential: &Credential,
        id: LineItemId,
        quantity: u32,
    ) -> Result<(), ClientError> {
        let builder = self
            .http
            .patch(self.url(&format!("/cart/{id}")))
            .bearer_auth(credential.token())
            .json(&serde_json::json!({ "quantity": quantity }));
        self.send(&format!("PATCH /cart/{id}"), builder).await?;
        Ok(())
    }

    async fn remove_cart_item(
        &self,
        credential: &Credential,
        id: LineItemId,
    ) -> Result<(), ClientError> {
        let builder = self
            .http
            .delete(self.url(&format!("/cart/{id}")))
            .bearer_auth(credential.token());
        self.send(&format!("DELETE /cart/{id}"), builder).await?;
        Ok(())
    }

    async fn place_order(
        &self,
        credential: &Credential,
        payload: &AuthenticatedOrderPayload,
    ) -> Result<serde_json::Value, ClientError> {
        let endpoint = "POST /dathang";
        let builder = self
            .http
            .post(self.url("/dathang"))
            .bearer_auth(credential.token())
            .json(payload);
        let response = self.send(endpoint, builder).await?;
        Self::read_json(endpoint, response).await
    }

    async fn place_guest_order(
        &self,
        payload: &GuestOrderPayload,
    ) -> Result<serde_json::Value, ClientError> {
        let endpoint = "POST /nologin";
        let builder = self.http.post(self.url("/nologin")).json(payload);
        let response = self.send(endpoint, builder).await?;
        Self::read_json(endpoint, response).await
    }
}
