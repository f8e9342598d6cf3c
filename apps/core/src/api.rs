use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::Selection;
use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Events,
    Results,
    Positions,
    TrackStats,
    TyreStrategy,
    PitstopAnalysis,
    TrackInfo,
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Events => "/events",
            Self::Results => "/results",
            Self::Positions => "/positions",
            Self::TrackStats => "/track_stats",
            Self::TyreStrategy => "/tyre_strategy",
            Self::PitstopAnalysis => "/pitstop_analysis",
            Self::TrackInfo => "/track_info",
            Self::Replay => "/replay",
        }
    }

    /// The event list is the only query-string endpoint; everything else is a
    /// form POST of the selection.
    pub const fn method(self) -> Method {
        match self {
            Self::Events => Method::Get,
            _ => Method::Post,
        }
    }
}

/// A request with unencoded parameters. Backends escape them with their own
/// encoder: query string for `GET`, `application/x-www-form-urlencoded` body
/// for `POST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn events(year: &str) -> Self {
        Self {
            endpoint: Endpoint::Events,
            params: vec![("year", year.to_string())],
        }
    }

    pub fn for_selection(endpoint: Endpoint, selection: &Selection) -> Self {
        Self {
            endpoint,
            params: vec![
                ("year", selection.year.clone()),
                ("event", selection.event_name().to_string()),
            ],
        }
    }

    pub const fn method(&self) -> Method {
        self.endpoint.method()
    }

    pub const fn path(&self) -> &'static str {
        self.endpoint.path()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    fn ensure_success(&self) -> Result<(), FetchError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(FetchError::Http {
                status: self.status,
            })
        }
    }
}

/// Transport to the dashboard server. Runs on the single UI thread, so the
/// futures need not be `Send`.
#[async_trait(?Send)]
pub trait Backend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError>;
}

/// Opaque HTML fragment, inserted verbatim by the caller.
pub fn decode_html(response: &ApiResponse) -> Result<String, FetchError> {
    response.ensure_success()?;
    Ok(response.body.clone())
}

/// Decodes a JSON payload, treating a top-level `error` field as a failure
/// rather than render input.
pub fn decode_json<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, FetchError> {
    response.ensure_success()?;

    let probe: Value = serde_json::from_str(&response.body)
        .map_err(|err| FetchError::Decode(err.to_string()))?;
    if let Some(message) = application_error(&probe) {
        return Err(FetchError::Application(message));
    }

    // Decoded from the text, not the probe, so object key order survives.
    serde_json::from_str(&response.body).map_err(|err| FetchError::Decode(err.to_string()))
}

fn application_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_list_is_a_get_with_year() {
        let request = ApiRequest::events("2023");

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "/events");
        assert_eq!(request.param("year"), Some("2023"));
    }

    #[test]
    fn panel_requests_post_year_and_event() {
        let selection = Selection::new("2023", Some("São Paulo Grand Prix".to_string()));
        let request = ApiRequest::for_selection(Endpoint::TyreStrategy, &selection);

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "/tyre_strategy");
        assert_eq!(request.param("event"), Some("São Paulo Grand Prix"));
    }

    #[test]
    fn error_field_is_an_application_failure() {
        let response = ApiResponse::ok(r#"{"error": "session not found"}"#);
        let decoded = decode_json::<Vec<String>>(&response);

        assert_eq!(
            decoded,
            Err(FetchError::Application("session not found".to_string()))
        );
    }

    #[test]
    fn error_field_wins_over_a_matching_shape() {
        let response =
            ApiResponse::ok(r#"{"error": "no laps", "teams": {}, "total_pitstops": 0}"#);
        let decoded = decode_json::<crate::models::PitstopAnalysis>(&response);

        assert!(matches!(decoded, Err(FetchError::Application(_))));
    }

    #[test]
    fn non_success_status_is_an_http_failure() {
        let response = ApiResponse::new(502, "<html>bad gateway</html>");

        assert_eq!(
            decode_json::<Vec<String>>(&response),
            Err(FetchError::Http { status: 502 })
        );
        assert_eq!(decode_html(&response), Err(FetchError::Http { status: 502 }));
    }

    #[test]
    fn wrong_shape_is_a_decode_failure() {
        let response = ApiResponse::ok("null");

        assert!(matches!(
            decode_json::<crate::models::TrackStats>(&response),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn empty_error_field_is_not_a_failure() -> Result<(), FetchError> {
        let response = ApiResponse::ok(r#"{"error": "", "coordinates": []}"#);
        let stats = decode_json::<crate::models::TrackStats>(&response)?;

        assert!(stats.coordinates.is_empty());
        Ok(())
    }
}
