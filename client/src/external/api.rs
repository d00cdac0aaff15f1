//! REST client for the Busy Fool API
//!
//! Ingredients and products are persisted by the API; this client only moves
//! records over the wire. Every costing figure is recomputed locally.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use shared::models::{
    AuthSession, ImportedIngredients, Ingredient, IngredientPayload, LoginInput, Product,
    RegisterInput, RegisteredUser,
};

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

/// Busy Fool API client
#[derive(Debug, Clone)]
pub struct BusyFoolApi {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl BusyFoolApi {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    /// Create a client with custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn with_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self.access_token.as_deref().ok_or(AppError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    pub async fn login(&self, input: &LoginInput) -> AppResult<AuthSession> {
        tracing::debug!("POST /auth/login");
        self.send(self.client.post(self.url("/auth/login")).json(input))
            .await
    }

    pub async fn register(&self, input: &RegisterInput) -> AppResult<RegisteredUser> {
        tracing::debug!("POST /auth/register");
        self.send(self.client.post(self.url("/auth/register")).json(input))
            .await
    }

    // ========================================================================
    // Ingredients
    // ========================================================================

    pub async fn list_ingredients(&self) -> AppResult<Vec<Ingredient>> {
        tracing::debug!("GET /ingredients");
        let request = self.authorized(self.client.get(self.url("/ingredients")))?;
        self.send(request).await
    }

    pub async fn create_ingredient(&self, payload: &IngredientPayload) -> AppResult<Ingredient> {
        tracing::debug!("POST /ingredients ({})", payload.name);
        let request = self.authorized(self.client.post(self.url("/ingredients")))?;
        self.send(request.json(payload)).await
    }

    pub async fn update_ingredient(
        &self,
        id: Uuid,
        payload: &IngredientPayload,
    ) -> AppResult<Ingredient> {
        tracing::debug!("PATCH /ingredients/{}", id);
        let request =
            self.authorized(self.client.patch(self.url(&format!("/ingredients/{}", id))))?;
        self.send(request.json(payload)).await
    }

    pub async fn delete_ingredient(&self, id: Uuid) -> AppResult<()> {
        tracing::debug!("DELETE /ingredients/{}", id);
        let request =
            self.authorized(self.client.delete(self.url(&format!("/ingredients/{}", id))))?;
        check(request.send().await?).await?;
        Ok(())
    }

    /// Upload a CSV file; returns the records the API created
    pub async fn import_ingredients_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> AppResult<Vec<Ingredient>> {
        tracing::debug!("POST /ingredients/import-csv ({} bytes)", contents.len());
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);
        let request = self.authorized(self.client.post(self.url("/ingredients/import-csv")))?;
        let imported: ImportedIngredients = self.send(request.multipart(form)).await?;
        Ok(imported.imported_ingredients)
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        tracing::debug!("GET /products");
        let request = self.authorized(self.client.get(self.url("/products")))?;
        self.send(request).await
    }
}

async fn check(response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(error_from_status(status, &body))
}

/// Map a failed response to an error, using the body's `message` when present.
///
/// `message` may be a string or a list of strings.
pub fn error_from_status(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("message") {
            Some(Value::String(message)) => Some(message.clone()),
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                "unknown error".to_string()
            } else {
                body.to_string()
            }
        });

    match status {
        400 | 422 => AppError::Validation(message),
        401 | 403 => AppError::Unauthorized(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        _ => AppError::Api { status, message },
    }
}
