//! [`PageDriver`] over the W3C WebDriver protocol (geckodriver, chromedriver).

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::{json, Value};

use crate::page::{AutomationError, AutomationFailure, Key, PageDriver, PageElement};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const CSS_SELECTOR: &str = "css selector";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDriverSettings {
    pub endpoint: String,
    pub headless: bool,
    /// Pause after every page action.
    pub action_delay: Duration,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4444".to_string(),
            headless: false,
            action_delay: Duration::ZERO,
            user_agent:
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:105.0) Gecko/20100101 Firefox/105.0"
                    .to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

struct Connection {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    endpoint: String,
    session_id: String,
}

impl Connection {
    fn session_url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, path)
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, AutomationError> {
        let url = self.session_url(path);
        self.runtime
            .block_on(send(&self.client, method, &url, body))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        if let Err(err) = self
            .runtime
            .block_on(send(&self.client, Method::DELETE, &url, None))
        {
            engine_warn!("failed to close browser session {}: {err}", self.session_id);
        }
    }
}

async fn send(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, AutomationError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
    }
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    let mut payload: Value = serde_json::from_slice(&bytes).map_err(|err| {
        AutomationError::new(
            AutomationFailure::Protocol,
            format!("invalid response ({status}): {err}"),
        )
    })?;
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(value);
    }
    let error = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
    Err(AutomationError::new(map_error_code(error), format!("{error}: {message}")))
}

fn map_error_code(error: &str) -> AutomationFailure {
    match error {
        "no such element" | "stale element reference" => AutomationFailure::ElementNotFound,
        "timeout" | "script timeout" => AutomationFailure::Timeout,
        "insecure certificate" | "unknown command" => AutomationFailure::Navigation,
        _ => AutomationFailure::Protocol,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AutomationError {
    if err.is_timeout() {
        return AutomationError::new(AutomationFailure::Timeout, err.to_string());
    }
    AutomationError::new(AutomationFailure::Protocol, err.to_string())
}

fn protocol_error(message: impl Into<String>) -> AutomationError {
    AutomationError::new(AutomationFailure::Protocol, message)
}

/// One browser session. The session is deleted when the page and all of its
/// elements are dropped.
pub struct WebDriverPage {
    connection: Rc<Connection>,
    action_delay: Duration,
}

impl WebDriverPage {
    pub fn connect(settings: &WebDriverSettings) -> Result<Self, AutomationError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| protocol_error(err.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| protocol_error(err.to_string()))?;
        let endpoint = settings.endpoint.trim_end_matches('/').to_string();

        let created = runtime.block_on(send(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(capabilities(settings)),
        ))?;
        let session_id = created
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| protocol_error("new session response has no sessionId"))?
            .to_string();
        engine_info!("opened browser session {session_id} on {endpoint}");

        Ok(Self {
            connection: Rc::new(Connection {
                runtime,
                client,
                endpoint,
                session_id,
            }),
            action_delay: settings.action_delay,
        })
    }

    fn pause(&self) {
        if !self.action_delay.is_zero() {
            thread::sleep(self.action_delay);
        }
    }

    fn find_all(&self, selector: &str) -> Result<Vec<String>, AutomationError> {
        let found = self.connection.command(
            Method::POST,
            "/elements",
            Some(json!({ "using": CSS_SELECTOR, "value": selector })),
        )?;
        let references = found
            .as_array()
            .ok_or_else(|| protocol_error("element list expected"))?;
        references
            .iter()
            .map(|reference| {
                reference
                    .get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| protocol_error("element reference expected"))
            })
            .collect()
    }

    fn find_first(&self, selector: &str) -> Result<String, AutomationError> {
        self.find_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| AutomationError::not_found(selector))
    }
}

impl PageDriver for WebDriverPage {
    type Element = WebDriverElement;

    fn navigate(&mut self, url: &str) -> Result<(), AutomationError> {
        self.connection
            .command(Method::POST, "/url", Some(json!({ "url": url })))
            .map_err(|err| match err.kind {
                AutomationFailure::Timeout => err,
                _ => AutomationError::new(AutomationFailure::Navigation, err.message),
            })?;
        self.pause();
        Ok(())
    }

    fn query_all(&mut self, selector: &str) -> Result<Vec<Self::Element>, AutomationError> {
        Ok(self
            .find_all(selector)?
            .into_iter()
            .map(|id| WebDriverElement {
                connection: Rc::clone(&self.connection),
                id,
            })
            .collect())
    }

    fn click(&mut self, selector: &str) -> Result<(), AutomationError> {
        let id = self.find_first(selector)?;
        self.connection
            .command(Method::POST, &format!("/element/{id}/click"), Some(json!({})))?;
        self.pause();
        Ok(())
    }

    fn fill(&mut self, selector: &str, text: &str) -> Result<(), AutomationError> {
        let id = self.find_first(selector)?;
        self.connection
            .command(Method::POST, &format!("/element/{id}/clear"), Some(json!({})))?;
        self.connection.command(
            Method::POST,
            &format!("/element/{id}/value"),
            Some(json!({ "text": text })),
        )?;
        self.pause();
        Ok(())
    }

    fn press_key(&mut self, key: Key) -> Result<(), AutomationError> {
        let value = key_code(key);
        let actions = json!({
            "actions": [{
                "type": "key",
                "id": "keyboard",
                "actions": [
                    { "type": "keyDown", "value": value },
                    { "type": "keyUp", "value": value }
                ]
            }]
        });
        self.connection.command(Method::POST, "/actions", Some(actions))?;
        self.pause();
        Ok(())
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool, AutomationError> {
        let Some(id) = self.find_all(selector)?.into_iter().next() else {
            return Ok(false);
        };
        let displayed = self
            .connection
            .command(Method::GET, &format!("/element/{id}/displayed"), None)?;
        engine_debug!("{selector} displayed: {displayed}");
        Ok(displayed.as_bool().unwrap_or(false))
    }
}

fn key_code(key: Key) -> &'static str {
    match key {
        Key::End => "\u{E010}",
        Key::Enter => "\u{E007}",
    }
}

fn capabilities(settings: &WebDriverSettings) -> Value {
    let args: Vec<&str> = if settings.headless {
        vec!["-headless"]
    } else {
        Vec::new()
    };
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "firefox",
                "moz:firefoxOptions": {
                    "args": args,
                    "prefs": { "general.useragent.override": settings.user_agent }
                }
            }
        }
    })
}

pub struct WebDriverElement {
    connection: Rc<Connection>,
    id: String,
}

impl WebDriverElement {
    fn read(&self, path: &str) -> Result<Value, AutomationError> {
        self.connection
            .command(Method::GET, &format!("/element/{}{}", self.id, path), None)
    }
}

impl PageElement for WebDriverElement {
    fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        let value = self.read(&format!("/attribute/{name}"))?;
        Ok(value.as_str().map(str::to_string))
    }

    fn inner_markup(&self) -> Result<String, AutomationError> {
        let value = self.read("/property/innerHTML")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn tag_name(&self) -> Result<String, AutomationError> {
        let value = self.read("/name")?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| protocol_error("tag name expected"))
    }
}
