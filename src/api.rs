use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use gloo::timers::future::TimeoutFuture;
use js_sys::{Date, Math};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlScriptElement, Request, RequestInit, RequestMode, UrlSearchParams};

use morfi_core::{
    load_catalog, MealItem, MealsResponse, ResetAck, ResultsPayload, StatusResponse,
    StatusSummary, SubmitVotes,
};

/// Reads fail after this long without the callback firing.
pub(crate) const READ_TIMEOUT_MS: u32 = 12_000;
/// Heuristic pause after an opaque reset so the sheet can catch up; there is
/// no confirmation on this path.
pub(crate) const RESET_SETTLE_MS: u32 = 600;

const DEFAULT_API_BASE: &str = "https://script.google.com/macros/s/MORFI_WEBAPP_DEPLOYMENT/exec";

/// The web-app endpoint, overridable at build time.
pub(crate) fn api_base() -> String {
    if let Some(raw) =
        option_env!("MORFI_API_BASE").or(option_env!("TRUNK_PUBLIC_MORFI_API_BASE"))
    {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.trim_end_matches('/').to_string();
        }
    }
    DEFAULT_API_BASE.to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ApiError {
    NoWindow,
    Transport(String),
    Timeout,
    BadPayload(String),
    Backend(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NoWindow => write!(f, "no browser window available"),
            ApiError::Transport(message) => write!(f, "request failed: {message}"),
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::BadPayload(message) => write!(f, "unexpected response: {message}"),
            ApiError::Backend(message) => write!(f, "{message}"),
        }
    }
}

fn js_err(err: JsValue) -> ApiError {
    ApiError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// The web app only answers readable cross-origin GETs through a script
/// callback, so reads register a uniquely-named global function and inject a
/// `<script>` whose URL names it. Unique names keep concurrent reads
/// independent; completion order between them is unspecified.
pub(crate) async fn read_action<T: DeserializeOwned>(
    action: &str,
    params: &[(&str, &str)],
) -> Result<T, ApiError> {
    let raw = jsonp_request(action, params).await?;
    let text: String = js_sys::JSON::stringify(&raw)
        .map_err(|_| ApiError::BadPayload("response not serializable".to_string()))?
        .into();
    serde_json::from_str(&text).map_err(|err| ApiError::BadPayload(err.to_string()))
}

fn unique_callback_name() -> String {
    let now = Date::now() as u64;
    let salt = (Math::random() * 1e6) as u32;
    format!("morfi_cb_{now}_{salt}")
}

fn build_read_url(
    action: &str,
    params: &[(&str, &str)],
    callback_name: &str,
) -> Result<String, ApiError> {
    let query = UrlSearchParams::new().map_err(js_err)?;
    query.set("action", action);
    for (key, value) in params {
        query.set(key, value);
    }
    query.set("callback", callback_name);
    // cache buster: the Apps Script CDN is aggressive about GETs
    query.set("_", &format!("{}", Date::now() as u64));
    Ok(format!("{}?{}", api_base(), String::from(query.to_string())))
}

async fn jsonp_request(action: &str, params: &[(&str, &str)]) -> Result<JsValue, ApiError> {
    let window = web_sys::window().ok_or(ApiError::NoWindow)?;
    let document = window.document().ok_or(ApiError::NoWindow)?;
    let body = document.body().ok_or(ApiError::NoWindow)?;

    let callback_name = unique_callback_name();
    let url = build_read_url(action, params, &callback_name)?;

    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| ApiError::Transport("not a script element".to_string()))?;
    script.set_src(&url);

    let timer: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

    // Runs exactly once across the success, error, and timeout paths.
    let cleanup: Rc<dyn Fn()> = {
        let window = window.clone();
        let script = script.clone();
        let timer = timer.clone();
        let callback_name = callback_name.clone();
        let cleaned = Rc::new(Cell::new(false));
        Rc::new(move || {
            if cleaned.replace(true) {
                return;
            }
            let _ = js_sys::Reflect::delete_property(&window, &JsValue::from_str(&callback_name));
            script.remove();
            timer.borrow_mut().take();
        })
    };

    let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function,
                                             reject: js_sys::Function| {
        let on_payload = {
            let cleanup = cleanup.clone();
            Closure::once_into_js(move |data: JsValue| {
                cleanup();
                let _ = resolve.call1(&JsValue::NULL, &data);
            })
        };
        if js_sys::Reflect::set(&window, &JsValue::from_str(&callback_name), &on_payload).is_err() {
            cleanup();
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("callback registration"));
            return;
        }

        let onerror = {
            let cleanup = cleanup.clone();
            let reject = reject.clone();
            Closure::once(move || {
                cleanup();
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("script error"));
            })
        };
        script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        let timeout = {
            let cleanup = cleanup.clone();
            Timeout::new(READ_TIMEOUT_MS, move || {
                cleanup();
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("timeout"));
            })
        };
        *timer.borrow_mut() = Some(timeout);

        let _ = body.append_child(&script);
    });

    match JsFuture::from(promise).await {
        Ok(data) => Ok(data),
        Err(err) => {
            let message = err
                .as_string()
                .unwrap_or_else(|| "request failed".to_string());
            if message == "timeout" {
                Err(ApiError::Timeout)
            } else {
                Err(ApiError::Transport(message))
            }
        }
    }
}

/// Fire-and-forget write. The endpoint cannot answer readable bodies for
/// cross-origin POSTs, so the response is opaque: only failures before
/// dispatch are observable.
pub(crate) async fn write_action<T: Serialize>(action: &str, payload: &T) -> Result<(), ApiError> {
    let window = web_sys::window().ok_or(ApiError::NoWindow)?;
    let body =
        serde_json::to_string(payload).map_err(|err| ApiError::BadPayload(err.to_string()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::NoCors);
    init.set_body(&JsValue::from_str(&body));

    let url = format!("{}?action={action}", api_base());
    let request = Request::new_with_str_and_init(&url, &init).map_err(js_err)?;
    let _ = request.headers().set("Content-Type", "text/plain;charset=utf-8");

    JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    Ok(())
}

pub(crate) async fn fetch_meals() -> Result<Vec<MealItem>, ApiError> {
    let response: MealsResponse = read_action("getMeals", &[]).await?;
    if !response.ok {
        return Err(ApiError::Backend(
            response.failure_message("getMeals failed"),
        ));
    }
    Ok(load_catalog(response.meals))
}

pub(crate) async fn fetch_results() -> Result<ResultsPayload, ApiError> {
    let payload: ResultsPayload = read_action("getResults", &[]).await?;
    if !payload.ok {
        return Err(ApiError::Backend(
            payload.failure_message("getResults failed"),
        ));
    }
    Ok(payload)
}

pub(crate) async fn fetch_status() -> Result<StatusSummary, ApiError> {
    let response: StatusResponse = read_action("status", &[]).await?;
    if !response.ok {
        return Err(ApiError::Backend(
            response
                .error
                .unwrap_or_else(|| "status failed".to_string()),
        ));
    }
    Ok(response.status)
}

pub(crate) async fn submit_votes(submission: &SubmitVotes) -> Result<(), ApiError> {
    write_action("submitVotes", submission).await
}

/// Reset is read-first: newer backend versions confirm over the readable
/// path. When that does not pan out, fall back to the opaque write and wait
/// a beat for the sheet to apply it.
pub(crate) async fn reset_votes() -> Result<(), ApiError> {
    match read_action::<ResetAck>("resetVotes", &[]).await {
        Ok(ack) if ack.ok => return Ok(()),
        Ok(_) => {}
        Err(err) => {
            gloo::console::warn!("readable reset unavailable", err.to_string());
        }
    }

    write_action("resetVotes", &serde_json::json!({})).await?;
    TimeoutFuture::new(RESET_SETTLE_MS).await;
    Ok(())
}
