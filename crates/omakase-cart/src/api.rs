//! REST client for the cart backend.
//!
//! Every call is stamped with the session header. Mutation responses are
//! item echoes that the client reads but never interprets.

use std::sync::Arc;

use omakase_http::{ClientRequestBuilder, FetchClient, FetchError};
use omakase_store::SessionIdentity;
use serde_json::Value;
use tracing::debug;

use crate::config::CartConfig;
use crate::ids::ProductId;
use crate::wire::{AddItemRequest, CartSnapshot, UpdateQuantityRequest};

/// Thin typed wrapper over the four cart routes.
#[derive(Debug, Clone)]
pub struct CartApi {
    client: FetchClient,
    identity: Arc<SessionIdentity>,
    cart_path: String,
    session_header: String,
}

impl CartApi {
    /// Create an API client. `client` should already carry the base URL.
    pub fn new(client: FetchClient, identity: Arc<SessionIdentity>, config: &CartConfig) -> Self {
        Self {
            client,
            identity,
            cart_path: config.cart_path.trim_end_matches('/').to_string(),
            session_header: config.session_header.clone(),
        }
    }

    /// Session identity used to stamp requests.
    pub fn identity(&self) -> &Arc<SessionIdentity> {
        &self.identity
    }

    /// `GET /cart`.
    pub async fn get_cart(&self) -> Result<CartSnapshot, FetchError> {
        let response = self
            .stamp(self.client.get(self.cart_path.clone()))
            .send()
            .await?
            .error_for_status()?;
        let snapshot: CartSnapshot = response.json()?;
        debug!(lines = snapshot.lines.len(), "cart fetched");
        Ok(snapshot)
    }

    /// `POST /cart`.
    pub async fn add_item(&self, item: &AddItemRequest) -> Result<Value, FetchError> {
        let request = self.stamp(self.client.post(self.cart_path.clone())).json(item)?;
        Self::echo(request).await
    }

    /// `DELETE /cart/{id}`.
    pub async fn remove_item(&self, id: ProductId) -> Result<Value, FetchError> {
        Self::echo(self.stamp(self.client.delete(self.item_path(id)))).await
    }

    /// `PUT /cart/{id}`.
    pub async fn update_quantity(
        &self,
        id: ProductId,
        update: &UpdateQuantityRequest,
    ) -> Result<Value, FetchError> {
        let request = self.stamp(self.client.put(self.item_path(id))).json(update)?;
        Self::echo(request).await
    }

    fn item_path(&self, id: ProductId) -> String {
        format!("{}/{}", self.cart_path, id)
    }

    fn stamp(&self, request: ClientRequestBuilder) -> ClientRequestBuilder {
        let token = self.identity.session_id();
        request.header(self.session_header.clone(), token.as_str())
    }

    async fn echo(request: ClientRequestBuilder) -> Result<Value, FetchError> {
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().unwrap_or(Value::Null))
    }
}
