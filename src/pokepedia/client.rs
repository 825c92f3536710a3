//! Poképédia MediaWiki API client
//!
//! Only `action=parse&prop=wikitext` is used: one GET per species page.

use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use crate::config::Pokepedia as PokepediaConfig;

/// Poképédia API client
pub struct WikiClient {
    api_url: String,
    http: reqwest::Client,
}

impl WikiClient {
    pub fn new(config: &PokepediaConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("wingadex-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("could not build poképédia http client")?;

        Ok(Self {
            api_url: config.api_url.clone(),
            http,
        })
    }

    /// Raw wikitext of the page titled `page`.
    ///
    /// `Ok(None)` when the wiki reports that the page does not exist. A page whose
    /// response carries no wikitext yields `Ok(Some(""))`.
    pub async fn fetch_wikitext(&self, page: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "parse"),
                ("page", page),
                ("prop", "wikitext"),
                ("format", "json"),
                ("origin", "*"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Poképédia API error: {} - {}", status, body);
        }

        let body: Value = response
            .json()
            .await
            .context("could not decode Poképédia response")?;

        if !body.is_object() {
            anyhow::bail!("unexpected Poképédia response shape: {}", body);
        }

        if let Some(error) = body.get("error") {
            tracing::debug!(page, ?error, "Poképédia reported an error");
            return Ok(None);
        }

        let wikitext = body
            .get("parse")
            .and_then(|parse| parse.get("wikitext"))
            .and_then(|wikitext| wikitext.get("*"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(Some(wikitext.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WikiClient {
        WikiClient::new(&PokepediaConfig {
            api_url: format!("{}/api.php", server.uri()),
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sends_parse_query_for_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("action", "parse"))
            .and(query_param("page", "Mr. Mime"))
            .and(query_param("prop", "wikitext"))
            .and(query_param("format", "json"))
            .and(query_param("origin", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "parse": { "title": "Mr. Mime", "wikitext": { "*": "|numéro kanto=122" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).fetch_wikitext("Mr. Mime").await.unwrap();
        assert_eq!(text.as_deref(), Some("|numéro kanto=122"));
    }

    #[tokio::test]
    async fn error_field_means_missing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": { "code": "missingtitle", "info": "The page you specified doesn't exist." }
            })))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).fetch_wikitext("Nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn absent_wikitext_defaults_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "parse": {} })))
            .mount(&server)
            .await;

        let text = client_for(&server).fetch_wikitext("Pikachu").await.unwrap();
        assert_eq!(text.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn failures_are_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "Status"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "Html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "Array"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.fetch_wikitext("Status").await.is_err());
        assert!(client.fetch_wikitext("Html").await.is_err());
        assert!(client.fetch_wikitext("Array").await.is_err());
    }
}
