//! W3C WebDriver wire types
//!
//! Every response body is `{"value": ...}`. Errors carry
//! `{"value": {"error": "...", "message": "..."}}` with a non-2xx status.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::config::WebDriverConfig;

/// Key under which the remote end returns element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Element location strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    /// W3C `using` value for this strategy
    pub fn using(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css selector",
            Locator::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(v) | Locator::XPath(v) => v,
        }
    }

    /// Request body for `POST /element` and `POST /elements`
    pub fn to_request(&self) -> Value {
        json!({ "using": self.using(), "value": self.value() })
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Opaque reference to an element in the remote browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

/// Generic response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
}

/// Error payload returned by the remote end
#[derive(Debug, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Payload of a successful `POST /session`
#[derive(Debug, Deserialize)]
pub struct NewSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Build the `POST /session` body for the configured browser
pub fn new_session_request(config: &WebDriverConfig) -> Value {
    let window = format!("--window-size={},{}", config.window_width, config.window_height);
    let browser = config.browser.capability_name();

    let mut always_match = json!({ "browserName": browser });
    match config.browser {
        crate::common::config::BrowserKind::Chrome => {
            let mut args = vec![window, "--no-sandbox".to_string()];
            if config.headless {
                args.push("--headless=new".to_string());
            }
            always_match["goog:chromeOptions"] = json!({ "args": args });
        }
        crate::common::config::BrowserKind::Firefox => {
            let mut args = vec![
                format!("--width={}", config.window_width),
                format!("--height={}", config.window_height),
            ];
            if config.headless {
                args.push("-headless".to_string());
            }
            always_match["moz:firefoxOptions"] = json!({ "args": args });
        }
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}

/// Quote a string for use inside an XPath expression
///
/// XPath 1.0 has no escape sequences, so a value containing both quote kinds
/// has to be assembled with `concat()`.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::BrowserKind;

    #[test]
    fn test_locator_request_body() {
        let loc = Locator::XPath("//button[@name='save']".into());
        assert_eq!(
            loc.to_request(),
            json!({"using": "xpath", "value": "//button[@name='save']"})
        );
        assert_eq!(Locator::Css("md-toast".into()).using(), "css selector");
    }

    #[test]
    fn test_element_ref_deserializes_from_w3c_key() {
        let body = json!({"value": {"element-6066-11e4-a52e-4f735466cecf": "abc-123"}});
        let env: Envelope<ElementRef> = serde_json::from_value(body).unwrap();
        assert_eq!(env.value.id, "abc-123");

        let many = json!({"value": [{"element-6066-11e4-a52e-4f735466cecf": "a"}, {"element-6066-11e4-a52e-4f735466cecf": "b"}]});
        let env: Envelope<Vec<ElementRef>> = serde_json::from_value(many).unwrap();
        assert_eq!(env.value.len(), 2);
    }

    #[test]
    fn test_error_value_parses() {
        let body = json!({"value": {"error": "no such element", "message": "Unable to locate", "stacktrace": ""}});
        let env: Envelope<ErrorValue> = serde_json::from_value(body).unwrap();
        assert_eq!(env.value.error, "no such element");
        assert_eq!(env.value.message, "Unable to locate");
    }

    #[test]
    fn test_new_session_request_chrome_headless() {
        let config = WebDriverConfig::default();
        let body = new_session_request(&config);
        let caps = &body["capabilities"]["alwaysMatch"];
        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
    }

    #[test]
    fn test_new_session_request_firefox_headed() {
        let config = WebDriverConfig {
            browser: BrowserKind::Firefox,
            headless: false,
            ..WebDriverConfig::default()
        };
        let body = new_session_request(&config);
        let caps = &body["capabilities"]["alwaysMatch"];
        assert_eq!(caps["browserName"], "firefox");
        let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "-headless"));
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("agent"), "'agent'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("a'b\"c"),
            "concat('a', \"'\", 'b\"c')"
        );
    }
}
