use async_trait::async_trait;
use pitwall_core::{ApiRequest, ApiResponse, Backend, FetchError, Method};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `window.fetch` against the page's own origin.
#[derive(Debug, Clone, Default)]
pub struct FetchBackend {
    base_url: String,
}

impl FetchBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait(?Send)]
impl Backend for FetchBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let window =
            web_sys::window().ok_or_else(|| FetchError::Network("no window".to_string()))?;
        let encoded = encode_params(&request.params);

        let opts = RequestInit::new();
        opts.set_method(request.method().as_str());
        opts.set_mode(RequestMode::SameOrigin);

        let mut url = format!("{}{}", self.base_url, request.path());
        match request.method() {
            Method::Get => {
                url.push('?');
                url.push_str(&encoded);
            }
            Method::Post => opts.set_body(&JsValue::from_str(&encoded)),
        }

        let fetch_request = Request::new_with_str_and_init(&url, &opts).map_err(js_failure)?;
        if request.method() == Method::Post {
            fetch_request
                .headers()
                .set("Content-Type", FORM_CONTENT_TYPE)
                .map_err(js_failure)?;
        }

        let response: Response = JsFuture::from(window.fetch_with_request(&fetch_request))
            .await
            .map_err(js_failure)?
            .dyn_into()
            .map_err(js_failure)?;
        let status = response.status();
        let body = JsFuture::from(response.text().map_err(js_failure)?)
            .await
            .map_err(js_failure)?
            .as_string()
            .unwrap_or_default();
        Ok(ApiResponse::new(status, body))
    }
}

/// `key=value&...` with both sides escaped by `encodeURIComponent`.
fn encode_params(params: &[(&'static str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                String::from(js_sys::encode_uri_component(key)),
                String::from(js_sys::encode_uri_component(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn js_failure(value: JsValue) -> FetchError {
    FetchError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}
