use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::types::CallbackOutcome;

/// OAuth redirect target.
///
/// Success arrives with a `code` query parameter, denial with an `error`
/// parameter; both are stored for the waiting launcher. A request with
/// neither is answered with a hint instead of being treated as a failure,
/// since the provider may be retried from the same browser window.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<CallbackOutcome>>>>,
) -> Html<&'static str> {
    if let Some(code) = params.get("code") {
        let mut state = shared_state.lock().await;
        *state = Some(CallbackOutcome::Code(code.clone()));
        Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
    } else if let Some(reason) = params.get("error") {
        let mut state = shared_state.lock().await;
        *state = Some(CallbackOutcome::Denied(reason.clone()));
        Html("<h4>Login was denied.</h4><p>You can close this browser window.</p>")
    } else {
        Html("<h4>Missing authorization code.</h4>")
    }
}
