use crate::endpoint::Endpoint;
use crate::{Error, Result};
use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://gapi.hotmail007.com";
/// Every mail category the shop sells, as one `mailType` value
pub const MAIL_TYPE: &str = "outlook/hotmail/hotmail Trusted/outlook Trusted";
const DEFAULT_MAX_CONNECTIONS: usize = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Stock {
    #[serde(default)]
    data: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Purchase<'a> {
    client_key: &'a str,
    mail_type: &'a str,
    quantity: u32,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on simultaneous requests and on idle pooled connections
    pub max_connections: usize,
    /// Total time allowed for one request, body included
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Connection-pooled client shared by every worker. Clones share the pool
/// and the in-flight request limit.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    permits: Arc<Semaphore>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let max_connections = config.max_connections.max(1);

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(max_connections)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            permits: Arc::new(Semaphore::new(max_connections)),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: Endpoint,
    ) -> Result<T> {
        let _permit = self.permits.acquire().await?;

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        log::debug!("{endpoint} responded with {status}: {text}");

        if !status.is_success() {
            return Err(Error::Response(status, text));
        }

        serde_json::from_str(&text).map_err(|e| Error::Deserialize(e, text))
    }

    async fn get<T, Q>(&self, endpoint: Endpoint, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self
            .client
            .get(format!("{}{endpoint}", self.base_url))
            .query(query);

        self.request(builder, endpoint).await
    }

    /// Number of mails currently in stock. A missing or `null` count reads as zero.
    pub async fn fetch_stock(&self) -> Result<u32> {
        let stock: Stock = self
            .get(Endpoint::Stock, &[("mailType", MAIL_TYPE)])
            .await?;

        Ok(stock.data.unwrap_or_default())
    }

    /// Places an order for `quantity` mails. The response is not validated.
    pub async fn buy_mails(&self, client_key: &str, quantity: u32) -> Result<Value> {
        self.get(
            Endpoint::BuyMail,
            &Purchase {
                client_key,
                mail_type: MAIL_TYPE,
                quantity,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::new(&ClientConfig {
            base_url: server.uri(),
            max_connections: 2,
            timeout: Duration::from_millis(500),
        })
        .unwrap()
    }

    async fn mount_stock(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/mail/getStock"))
            .and(query_param("mailType", MAIL_TYPE))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_stock() {
        let server = MockServer::start().await;
        mount_stock(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": 42})),
        )
        .await;

        assert_eq!(client_for(&server).fetch_stock().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_fetch_stock_missing_or_null_is_zero() {
        for body in [json!({"code": 0}), json!({"data": null})] {
            let server = MockServer::start().await;
            mount_stock(&server, ResponseTemplate::new(200).set_body_json(body)).await;

            assert_eq!(client_for(&server).fetch_stock().await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_fetch_stock_malformed_body() {
        let server = MockServer::start().await;
        mount_stock(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

        let err = client_for(&server).fetch_stock().await.unwrap_err();
        assert!(matches!(err, Error::Deserialize(_, ref text) if text == "<html>"));
    }

    #[tokio::test]
    async fn test_fetch_stock_negative_count_is_rejected() {
        let server = MockServer::start().await;
        mount_stock(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"data": -3})),
        )
        .await;

        assert!(client_for(&server).fetch_stock().await.is_err());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        mount_stock(&server, ResponseTemplate::new(503).set_body_string("down")).await;

        let err = client_for(&server).fetch_stock().await.unwrap_err();
        assert!(matches!(err, Error::Response(status, _) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        mount_stock(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .await;

        let err = client_for(&server).fetch_stock().await.unwrap_err();
        assert!(matches!(err, Error::HttpClient(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_buy_mails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mail/getMail"))
            .and(query_param("clientKey", "secret"))
            .and(query_param("mailType", MAIL_TYPE))
            .and(query_param("quantity", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = client_for(&server).buy_mails("secret", 2).await.unwrap();
        assert_eq!(value, json!({"status": "ok"}));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(HttpClient::new(&config), Err(Error::BaseUrl(_))));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig {
            base_url: "https://example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(HttpClient::new(&config).unwrap().base_url, "https://example.com");
    }
}
