use crate::catalog::traits::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::models::{Agent, Attachment, City, CreatedRecord, Estate, NewAgent, NewEstate, Region};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.real-estate-manager.redberryinternship.ge/api";

const ESTATES: &str = "real-estates";
const AGENTS: &str = "agents";
const CITIES: &str = "cities";
const REGIONS: &str = "regions";

/// Connection settings for [`HttpCatalogClient`]
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub base_url: String,
    /// Bearer token; the API requires it for writes and for the estate/agent reads
    pub token: Option<String>,
    /// No timeout when unset
    pub timeout: Option<Duration>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: None,
        }
    }
}

/// Catalog client talking JSON and multipart over HTTP
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(options: CatalogOptions) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("estate-manager/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            token: options.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.url(path))
            .header(ACCEPT, "application/json");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", self.url(path));

        let response = self.request(Method::GET, path).send().await?;
        let body = check(response).await?.bytes().await?;

        debug!("Downloaded {} bytes from {}", body.len(), path);
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<CreatedRecord> {
        debug!("POST {} (multipart)", self.url(path));

        let response = self
            .request(Method::POST, path)
            .multipart(form)
            .send()
            .await?;
        let body = check(response).await?.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turn a non-2xx response into [`CatalogError::Api`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = api_message(&body);
    warn!("API returned {}: {}", status, message);

    Err(CatalogError::Api { status, message })
}

/// Error message from an API error body: its `message` field when it is
/// JSON, the trimmed text otherwise.
fn api_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "no message".to_string(),
        None => body.trim().to_string(),
    }
}

fn multipart(
    fields: Vec<(&'static str, String)>,
    file_field: &'static str,
    file: Option<&Attachment>,
) -> Result<Form> {
    let file = file.ok_or_else(|| CatalogError::missing(file_field))?;

    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)?;

    Ok(form.part(file_field, part))
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_estates(&self) -> Result<Vec<Estate>> {
        self.get_json(ESTATES).await
    }

    async fn get_estate(&self, id: u64) -> Result<Estate> {
        self.get_json(&format!("{ESTATES}/{id}")).await
    }

    async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get_json(AGENTS).await
    }

    async fn list_cities(&self) -> Result<Vec<City>> {
        self.get_json(CITIES).await
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        self.get_json(REGIONS).await
    }

    async fn create_estate(&self, estate: &NewEstate) -> Result<CreatedRecord> {
        let form = multipart(estate.form_fields(), "image", estate.image.as_ref())?;
        let created = self.post_form(ESTATES, form).await?;

        info!("Created estate #{} at {}", created.id, estate.address);
        Ok(created)
    }

    async fn create_agent(&self, agent: &NewAgent) -> Result<CreatedRecord> {
        let form = multipart(agent.form_fields(), "avatar", agent.avatar.as_ref())?;
        let created = self.post_form(AGENTS, form).await?;

        info!("Created agent #{} {} {}", created.id, agent.name, agent.surname);
        Ok(created)
    }

    async fn delete_estate(&self, id: u64) -> Result<()> {
        let path = format!("{ESTATES}/{id}");
        debug!("DELETE {}", self.url(&path));

        let response = self.request(Method::DELETE, &path).send().await?;
        check(response).await?;

        info!("Deleted estate #{}", id);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    #[test]
    fn api_message_prefers_json_field() {
        assert_eq!(
            api_message(r#"{"message":"The price field is required."}"#),
            "The price field is required."
        );
        assert_eq!(api_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(api_message(""), "no message");
        assert_eq!(api_message(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = HttpCatalogClient::new(CatalogOptions {
            base_url: "http://localhost:8000/api/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.endpoint(), "http://localhost:8000/api");
        assert_eq!(client.url("real-estates/4"), "http://localhost:8000/api/real-estates/4");
    }

    #[test]
    fn requests_ask_for_json_and_carry_the_token() {
        let anonymous = HttpCatalogClient::new(CatalogOptions::default()).unwrap();
        let request = anonymous
            .request(Method::GET, "regions")
            .build()
            .unwrap();
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert!(request.headers().get(AUTHORIZATION).is_none());

        let authorized = HttpCatalogClient::new(CatalogOptions {
            token: Some("9d0ddfbb-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        let request = authorized
            .request(Method::POST, "real-estates")
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), format!("{DEFAULT_BASE_URL}/real-estates"));
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer 9d0ddfbb-test");
    }

    #[test]
    fn multipart_requires_the_file() {
        let err = multipart(vec![("name", "Nino".to_string())], "avatar", None).unwrap_err();
        assert!(err.is_validation());

        let avatar = Attachment::new("a.png", "image/png", vec![0x89, 0x50]);
        assert!(multipart(vec![], "avatar", Some(&avatar)).is_ok());
    }
}
