//! Uniform outcome of a unit of work.
//!
//! # Data Flow
//! ```text
//! Dispatch capability
//!     → Status (ok | fail(code, message))
//!     → http::response (HTTP status + body)
//!     → LogSink (structured log record)
//! ```
//!
//! # Design Decisions
//! - Immutable after construction, cheap to clone, Send + Sync
//! - Consumers branch on `is_ok()` only
//! - An OK status always carries `Code::OK` and no message

pub mod code;

pub use code::Code;

use axum::http::StatusCode;
use serde::Serialize;

/// Whether a [`Status`] reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Ok,
    Error,
}

/// Result value returned by every dispatch capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    kind: StatusKind,
    code: Code,
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
}

impl Status {
    /// A successful status.
    pub fn ok() -> Self {
        Self {
            kind: StatusKind::Ok,
            code: Code::OK,
            message: String::new(),
        }
    }

    /// A failed status. `Code::OK` is not a failure code and becomes `Code::UNKNOWN`.
    pub fn fail(code: Code, message: impl Into<String>) -> Self {
        let code = if code == Code::OK { Code::UNKNOWN } else { code };
        Self {
            kind: StatusKind::Error,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::fail(Code::NOT_FOUND, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::fail(Code::UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::fail(Code::INTERNAL, message)
    }

    pub fn is_ok(&self) -> bool {
        self.kind == StatusKind::Ok
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for this outcome: 200 when OK, the code's mapping otherwise.
    pub fn http_status(&self) -> StatusCode {
        if self.is_ok() {
            StatusCode::OK
        } else {
            self.code.http_status()
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ok() {
            return f.write_str("OK");
        }
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_has_zero_code_and_no_message() {
        let status = Status::ok();
        assert!(status.is_ok());
        assert_eq!(status.code(), Code::OK);
        assert!(status.message().is_empty());
        assert_eq!(status.http_status(), StatusCode::OK);
    }

    #[test]
    fn fail_is_not_ok() {
        let status = Status::fail(Code::INVALID_ARGUMENT, "bad id");
        assert!(!status.is_ok());
        assert_eq!(status.kind(), StatusKind::Error);
        assert_eq!(status.message(), "bad id");
        assert_eq!(status.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(status.to_string(), "InvalidArgument: bad id");
    }

    #[test]
    fn fail_with_ok_code_stays_a_failure() {
        let status = Status::fail(Code::OK, "confused caller");
        assert!(!status.is_ok());
        assert_eq!(status.code(), Code::UNKNOWN);
        assert!(!status.http_status().is_success());
    }

    #[test]
    fn serializes_for_log_records() {
        let json = serde_json::to_value(Status::not_found("no route")).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["code"], 5);
        assert_eq!(json["message"], "no route");

        let json = serde_json::to_value(Status::ok()).unwrap();
        assert!(json.get("message").is_none());
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Status>();
    }
}
