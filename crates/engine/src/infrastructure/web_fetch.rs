//! Source page fetcher.
//!
//! Downloads a page and reduces it to readable text for the extraction prompt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::infrastructure::ports::{ContentFetchPort, FetchError};

/// Page chrome dropped before text extraction.
const STRIPPED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

#[derive(Clone)]
pub struct WebPageFetcher {
    client: Client,
}

impl WebPageFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for WebPageFetcher {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl ContentFetchPort for WebPageFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let text = html_to_text(&html);
        tracing::debug!(url = %url, chars = text.len(), "Fetched source page");
        Ok(text)
    }
}

/// Text of `<body>`, one text node per line, with page chrome removed.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = doc.select(&selector).next() else {
        return String::new();
    };

    let mut out = String::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_chrome = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| STRIPPED_TAGS.contains(&el.name()))
        });
        if in_chrome {
            continue;
        }
        let s = text.trim();
        if s.is_empty() {
            continue;
        }
        out.push_str(s);
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>Tabaxi</title><style>p { color: red }</style></head>
<body>
  <header>Site Header</header>
  <nav><a href="/">Home</a></nav>
  <h1>Tabaxi</h1>
  <p><strong>Darkvision.</strong> You can see in dim light within 60 feet.</p>
  <script>trackVisit();</script>
  <footer>Copyright</footer>
</body></html>"#;

    #[test]
    fn strips_page_chrome() {
        let text = html_to_text(PAGE);

        assert!(text.contains("Tabaxi"));
        assert!(text.contains("Darkvision."));
        assert!(text.contains("You can see in dim light within 60 feet."));
        assert!(!text.contains("Site Header"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("trackVisit"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("color: red"));
    }

    #[tokio::test]
    async fn fetches_and_converts_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/races/tabaxi"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&format!("{}/races/tabaxi", mock_server.uri())).unwrap();
        let text = WebPageFetcher::default().fetch_text(&url).await.unwrap();

        assert!(text.starts_with("Tabaxi"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
        let err = WebPageFetcher::default().fetch_text(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(404)));
    }
}
