//! HTTP client for a single WebDriver session

use base64::Engine;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::common::config::WebDriverConfig;
use crate::common::{join_url, Error, Result};

use super::protocol::{
    new_session_request, ElementRef, Envelope, ErrorValue, Locator, NewSession,
};

/// One browser session on a remote WebDriver server
///
/// The session is not closed on drop; callers must call [`WebDriverClient::quit`].
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Start a new browser session
    pub async fn connect(config: &WebDriverConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let url = join_url(&config.url, "session");

        tracing::debug!(url = %url, browser = config.browser.capability_name(), "Creating WebDriver session");

        let response = http
            .post(&url)
            .json(&new_session_request(config))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::SessionNotCreated(config.url.clone())
                } else {
                    Error::WebDriverTransport(e)
                }
            })?;

        let session: NewSession = decode(response).await?;

        tracing::info!(session = %session.session_id, "WebDriver session created");

        Ok(Self {
            http,
            base_url: config.url.clone(),
            session_id: session.session_id,
        })
    }

    /// Send a session-scoped command and decode its `value`
    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = if path.is_empty() {
            join_url(&self.base_url, &format!("session/{}", self.session_id))
        } else {
            join_url(
                &self.base_url,
                &format!("session/{}/{}", self.session_id, path),
            )
        };

        tracing::trace!(%method, url = %url, "WebDriver request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        decode(response).await
    }

    /// Navigate the session to a URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        let _: Value = self
            .command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    /// Find all matching elements; an empty list is not an error
    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.command(Method::POST, "elements", Some(locator.to_request()))
            .await
    }

    pub async fn click(&self, element: &ElementRef) -> Result<()> {
        let _: Value = self
            .command(
                Method::POST,
                &format!("element/{}/click", element.id),
                Some(json!({})),
            )
            .await?;
        Ok(())
    }

    pub async fn clear(&self, element: &ElementRef) -> Result<()> {
        let _: Value = self
            .command(
                Method::POST,
                &format!("element/{}/clear", element.id),
                Some(json!({})),
            )
            .await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        let _: Value = self
            .command(
                Method::POST,
                &format!("element/{}/value", element.id),
                Some(json!({ "text": text })),
            )
            .await?;
        Ok(())
    }

    /// Visible text of an element
    pub async fn text(&self, element: &ElementRef) -> Result<String> {
        self.command(Method::GET, &format!("element/{}/text", element.id), None)
            .await
    }

    /// Current `value` property, used for form inputs and text areas
    pub async fn value(&self, element: &ElementRef) -> Result<Option<String>> {
        self.command(
            Method::GET,
            &format!("element/{}/property/value", element.id),
            None,
        )
        .await
    }

    pub async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.command(
            Method::GET,
            &format!("element/{}/displayed", element.id),
            None,
        )
        .await
    }

    pub async fn is_enabled(&self, element: &ElementRef) -> Result<bool> {
        self.command(
            Method::GET,
            &format!("element/{}/enabled", element.id),
            None,
        )
        .await
    }

    /// Capture the viewport as PNG bytes
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let encoded: String = self.command(Method::GET, "screenshot", None).await?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::Internal(format!("Invalid screenshot encoding: {}", e)))
    }

    /// End the session and close the browser
    pub async fn quit(&self) -> Result<()> {
        let _: Value = self.command(Method::DELETE, "", None).await?;
        tracing::debug!(session = %self.session_id, "WebDriver session closed");
        Ok(())
    }
}

/// Decode a WebDriver response, mapping error payloads to typed errors
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body: Value = response.json().await?;
    decode_value(status.is_success(), body)
}

fn decode_value<T: DeserializeOwned>(success: bool, body: Value) -> Result<T> {
    if !success || body["value"].get("error").is_some() {
        let envelope: Envelope<ErrorValue> = serde_json::from_value(body).map_err(|e| {
            Error::Internal(format!("Unrecognized WebDriver error response: {}", e))
        })?;
        return Err(Error::from_webdriver(
            &envelope.value.error,
            &envelope.value.message,
        ));
    }

    let envelope: Envelope<T> = serde_json::from_value(body)?;
    Ok(envelope.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_value() {
        let text: String =
            decode_value(true, json!({"value": "Workspace updated"})).unwrap();
        assert_eq!(text, "Workspace updated");

        let unit: Value = decode_value(true, json!({"value": null})).unwrap();
        assert!(unit.is_null());
    }

    #[test]
    fn test_decode_error_status() {
        let err = decode_value::<ElementRef>(
            false,
            json!({"value": {"error": "no such element", "message": "//div"}}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ElementNotFound(_)));
    }

    #[test]
    fn test_decode_error_payload_with_ok_status() {
        // Some Selenium grid versions answer 200 with an error payload
        let err = decode_value::<Value>(
            true,
            json!({"value": {"error": "stale element reference", "message": "detached"}}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::StaleElement(_)));
    }

    #[test]
    fn test_decode_garbage_error() {
        let err = decode_value::<Value>(false, json!({"oops": true})).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_decode_session() {
        let session: NewSession = decode_value(
            true,
            json!({"value": {"sessionId": "s-1", "capabilities": {"browserName": "chrome"}}}),
        )
        .unwrap();
        assert_eq!(session.session_id, "s-1");
    }
}
