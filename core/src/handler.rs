//! Error handling for rejected results.
//!
//! # Design
//! The handler rewrites the result's `message` into something presentable,
//! notifies the user through the registered hooks, and then either defers
//! to the host's `on_error` hook or rejects with the send descriptor
//! attached. Login invalidation is decided before `code_map` lookup, so a
//! code map entry can never hide an expired session.

use crate::hooks::{Hooks, Outcome};
use crate::http::SendData;
use crate::options::{ErrorType, RequestOptions};
use crate::result::ResponseResult;
use crate::status::{messages, RequestStatus};

pub async fn handle_error(
    mut error: ResponseResult,
    send: &SendData,
    options: &RequestOptions,
    hooks: &Hooks,
) -> Outcome {
    let mut message = error
        .display_message()
        .unwrap_or(messages::SYSTEM_BUSY)
        .to_string();

    if error.status_matches(RequestStatus::ServiceUnavailable.code()) {
        message = messages::MAINTENANCE.to_string();
    }

    if !hooks.is_online() {
        message = messages::OFFLINE.to_string();
    }

    error.message = Some(message);

    if error.code_matches(options.login_invalid_code_or_default()) {
        error.message = Some(messages::LOGIN_EXPIRED.to_string());
        hooks.on_login_invalid.notify(&error, send, options);
    } else {
        let mapped = error.code.as_ref().and_then(|code| {
            options
                .code_map
                .as_ref()
                .and_then(|map| map.get(&code.to_string()))
        });
        if let Some(mapped) = mapped {
            error.message = Some(mapped.clone());
        }
        show_error_message(&error, send, options, hooks);
    }

    if let Some(on_error) = &hooks.on_error {
        return on_error.on_error(error, send, options).await;
    }

    let message = error.message.clone().unwrap_or_default();
    match &hooks.logger {
        Some(logger) => logger.error(&message, &error),
        None => tracing::error!(
            request_id = %send.request_id,
            url = %send.url,
            code = ?error.code,
            "{message}"
        ),
    }

    error.send_data = Some(send.clone());
    Outcome::Rejected(error)
}

/// Show `error` through the notifier selected by `error_type`.
pub fn show_error_message(
    error: &ResponseResult,
    send: &SendData,
    options: &RequestOptions,
    hooks: &Hooks,
) {
    match options.error_type_or_default() {
        ErrorType::Silent => {}
        ErrorType::Modal => hooks.open_modal.notify(error, send, options),
        ErrorType::Toast => hooks.open_toast.notify(error, send, options),
    }
}
