//! REST implementation of the gateway traits.
//!
//! Uses `reqwest` with a cookie store (the backend authenticates with a
//! session cookie) and an optional bearer token. Every response is wrapped in
//! `{ success, message, data }`; non-success status codes carry a `message`.

mod wire;

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use cartwheel_core::{CartItemId, CartLine, CategoryId, Product, SortMode, StoreSettings};

use super::{CartGateway, CatalogGateway, FetchedCategoryPage, GatewayError};
use crate::config::ClientConfig;

use wire::{
    CartData, CategoryPageData, Envelope, ErrorBody, SetupData, UpdateCartBody, WireProduct,
    convert_category_page,
};

/// Longest slice of a response body included in logs and errors.
const BODY_PREVIEW_CHARS: usize = 200;

// =============================================================================
// RestGateway
// =============================================================================

/// Gateway backed by the storefront REST API.
#[derive(Clone)]
pub struct RestGateway {
    inner: Arc<RestGatewayInner>,
}

struct RestGatewayInner {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RestGateway {
    /// Create a new REST gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| GatewayError::Auth(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestGatewayInner {
                client,
                config: config.clone(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        self.inner.config.endpoint(path)
    }

    /// Send a request and unwrap the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, GatewayError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| preview(&body));
            tracing::error!(
                status = %status,
                body = %preview(&body),
                "Storefront API returned non-success status"
            );
            return Err(error_for_status(status, message));
        }

        // Mutations may answer 204 or an empty body
        if body.trim().is_empty() {
            return Ok(Envelope {
                success: Some(true),
                message: None,
                data: None,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&body),
                "Failed to parse storefront API response"
            );
            GatewayError::Parse(e)
        })?;

        if envelope.success == Some(false) {
            return Err(GatewayError::Validation(
                envelope
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }

        Ok(envelope)
    }

    /// Send a request whose envelope must carry data.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, GatewayError> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| GatewayError::InvalidResponse(format!("{what} response has no data")))
    }

    /// Send a request whose response payload is irrelevant.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(), GatewayError> {
        self.send::<serde::de::IgnoredAny>(request).await.map(|_| ())
    }
}

// =============================================================================
// Cart Methods (never cached - mutable state)
// =============================================================================

impl CartGateway for RestGateway {
    #[instrument(skip(self))]
    async fn fetch_cart_snapshot(&self) -> Result<Vec<CartLine>, GatewayError> {
        let request = self.inner.client.get(self.url("cart"));
        let data: CartData = self.fetch(request, "cart").await?;

        let lines: Vec<CartLine> = data.items.into_iter().map(CartLine::from).collect();
        debug!(lines = lines.len(), "Fetched cart snapshot");
        Ok(lines)
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    async fn update_cart_line(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let request = self
            .inner
            .client
            .put(self.url("cart/update"))
            .json(&UpdateCartBody {
                item_id: item_id.as_str(),
                quantity,
            });
        self.execute(request).await
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    async fn remove_cart_line(&self, item_id: &CartItemId) -> Result<(), GatewayError> {
        let path = format!("cart/remove/{}", urlencode(item_id.as_str()));
        let request = self.inner.client.delete(self.url(&path));
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), GatewayError> {
        let request = self.inner.client.delete(self.url("cart/clear"));
        self.execute(request).await
    }
}

// =============================================================================
// Catalog Methods
// =============================================================================

impl CatalogGateway for RestGateway {
    #[instrument(skip(self), fields(category_id = %category_id))]
    async fn fetch_category_page(
        &self,
        category_id: &CategoryId,
        page: u32,
        limit: u32,
        sort: Option<SortMode>,
    ) -> Result<FetchedCategoryPage, GatewayError> {
        let path = format!("categories/{}", urlencode(category_id.as_str()));
        let mut query: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(sort) = sort {
            query.push(("sort", sort.as_str().to_string()));
        }

        let request = self.inner.client.get(self.url(&path)).query(&query);
        let data: CategoryPageData = self.fetch(request, "category").await?;

        Ok(convert_category_page(data, page, category_id.as_str()))
    }

    #[instrument(skip(self))]
    async fn suggest_products(&self, query: &str) -> Result<Vec<Product>, GatewayError> {
        let request = self
            .inner
            .client
            .get(self.url("products/suggest"))
            .query(&[("q", query)]);
        let products: Option<Vec<WireProduct>> = self.send(request).await?.data;

        Ok(products
            .unwrap_or_default()
            .into_iter()
            .map(Product::from)
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_store_settings(&self) -> Result<StoreSettings, GatewayError> {
        let request = self.inner.client.get(self.url("data"));
        let data: SetupData = self.fetch(request, "setup").await?;
        Ok(StoreSettings::from(data))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map a non-success HTTP status onto the gateway error taxonomy.
fn error_for_status(status: StatusCode, message: String) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Auth(message),
        StatusCode::NOT_FOUND => GatewayError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Network(format!("HTTP {status}: {message}")),
    }
}

/// Truncate a response body for logs.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Percent-encode a path segment.
fn urlencode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_gateway(server: &MockServer) -> RestGateway {
        let config = ClientConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap())
            .with_token("test-token");
        RestGateway::new(&config).expect("failed to create gateway")
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, String::new()),
            GatewayError::Auth(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, String::new()),
            GatewayError::NotFound(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNPROCESSABLE_ENTITY, String::new()),
            GatewayError::Validation(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, String::new()),
            GatewayError::Network(_)
        ));
    }

    #[test]
    fn test_urlencode_path_segment() {
        assert_eq!(urlencode("a b/c"), "a%20b%2Fc");
        assert_eq!(urlencode("65f1c0ffee"), "65f1c0ffee");
    }

    #[tokio::test]
    async fn test_fetch_cart_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"items": [
                    {"itemId": "a", "productId": "p1", "name": "Tea", "price": 10,
                     "stock": 5, "quantity": 2, "selections": []}
                ]}
            })))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let lines = gateway.fetch_cart_snapshot().await.unwrap();

        assert_eq!(lines.len(), 1);
        let line = lines.first().unwrap();
        assert_eq!(line.item_id.as_str(), "a");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price.amount(), Decimal::from(10));
    }

    #[tokio::test]
    async fn test_update_cart_line_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/update"))
            .and(body_json(json!({"itemId": "a", "quantity": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        gateway
            .update_cart_line(&CartItemId::new("a"), 4)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_rejected_maps_to_validation() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/update"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "Quantity exceeds stock"
            })))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let err = gateway
            .update_cart_line(&CartItemId::new("a"), 99)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Validation(ref msg) if msg == "Quantity exceeds stock"));
    }

    #[tokio::test]
    async fn test_success_false_maps_to_validation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/clear"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Cart is locked"
            })))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let err = gateway.clear_cart().await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_line_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/remove/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "message": "Item not found"
            })))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let err = gateway
            .remove_cart_line(&CartItemId::new("gone"))
            .await
            .unwrap_err();
        assert!(err.requires_refresh());
    }

    #[tokio::test]
    async fn test_fetch_category_page_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories/cat1"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "20"))
            .and(query_param("sort", "priceAsc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "category": {"name": "Coffee"},
                    "products": [{"_id": "p1", "name": "Beans", "price": 30, "images": []}],
                    "pagination": {"page": 2, "totalPages": 3, "total": 41}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let fetched = gateway
            .fetch_category_page(&CategoryId::new("cat1"), 2, 20, Some(SortMode::PriceAsc))
            .await
            .unwrap();

        assert_eq!(fetched.category.name, "Coffee");
        assert_eq!(fetched.page.pagination.total_pages, 3);
        assert_eq!(fetched.page.products.len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let err = gateway.fetch_cart_snapshot().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_data_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let err = gateway.fetch_store_settings().await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_suggest_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/suggest"))
            .and(query_param("q", "cof"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"_id": "p1", "name": "Coffee", "price": 12.5}]
            })))
            .mount(&server)
            .await;

        let gateway = create_test_gateway(&server);
        let products = gateway.suggest_products("cof").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().name, "Coffee");
    }
}
