//! Network response capture for the `get-response` variant.
//!
//! Enables the CDP Network domain, subscribes to `Network.responseReceived`,
//! waits for the matching request to finish loading, and returns the
//! JSON-decoded body of the first response whose URL contains the
//! caller-supplied fragment. Later matches are ignored.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams,
    GetResponseBodyReturns, RequestId,
};
use chromiumoxide::page::Page;
use futures::{Stream, StreamExt};
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::error::{connection_lost, FetchError};
use crate::gate::DEFAULT_WAIT;

const BODY_RETRIES: usize = 5;
const BODY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Wait for the first matching response and return its body parsed as JSON.
///
/// Responses are observed from the moment this is called; the matching window
/// is [`DEFAULT_WAIT`].
pub async fn first_json_response(
    page: &Page,
    fragment: &str,
) -> Result<serde_json::Value, FetchError> {
    page.execute(EnableParams::default()).await?;
    let mut responses = page.event_listener::<EventResponseReceived>().await?;
    let mut finished = page.event_listener::<EventLoadingFinished>().await?;

    let deadline = Instant::now() + DEFAULT_WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let event = match timeout(remaining, responses.next()).await {
            Ok(Some(event)) => event,
            // Stream closed or window elapsed: the response never arrived.
            Ok(None) | Err(_) => {
                return Err(FetchError::ResponseNotObserved {
                    fragment: fragment.to_string(),
                    timeout_ms: DEFAULT_WAIT.as_millis() as u64,
                })
            }
        };

        if !event.response.url.contains(fragment) {
            continue;
        }
        debug!(url = %event.response.url, "matching response observed");

        // `Network.getResponseBody` is only guaranteed to succeed once loading
        // has finished for the request; asking earlier fails on streamed
        // bodies ("No data found for resource ...").
        if !await_loading_finished(&mut finished, &event.request_id, deadline).await {
            debug!(url = %event.response.url, "loadingFinished not observed, trying body anyway");
        }

        let reply = fetch_body(page, &event.request_id).await?;
        let text = if reply.base64_encoded {
            let bytes = BASE64
                .decode(reply.body.as_bytes())
                .map_err(|e| FetchError::Script(format!("base64 response body: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|e| FetchError::Script(format!("response body not UTF-8: {e}")))?
        } else {
            reply.body.clone()
        };

        return serde_json::from_str(&text).map_err(FetchError::ResponseDecode);
    }
}

/// Drain loading-finished events until the one for `request_id` shows up.
/// Returns `false` when the window elapses or the stream closes first; the
/// caller then falls back to the retrying body fetch.
async fn await_loading_finished<S>(
    finished: &mut S,
    request_id: &RequestId,
    deadline: Instant,
) -> bool
where
    S: Stream<Item = Arc<EventLoadingFinished>> + Unpin,
{
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, finished.next()).await {
            Ok(Some(event)) if event.request_id == *request_id => return true,
            // Some other request finished; keep draining.
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => return false,
        }
    }
}

/// Fetch the response body, retrying briefly when the browser reports the
/// data as not yet available. Transport loss propagates immediately.
async fn fetch_body(
    page: &Page,
    request_id: &RequestId,
) -> Result<GetResponseBodyReturns, FetchError> {
    let mut attempt = 0;
    loop {
        match page
            .execute(GetResponseBodyParams::new(request_id.clone()))
            .await
        {
            Ok(reply) => return Ok(reply.result),
            Err(e) if connection_lost(&e) => return Err(FetchError::Cdp(e)),
            Err(e) => {
                attempt += 1;
                if attempt >= BODY_RETRIES {
                    return Err(FetchError::Cdp(e));
                }
                debug!(attempt, "response body not ready yet, retrying");
                sleep(BODY_RETRY_DELAY).await;
            }
        }
    }
}
