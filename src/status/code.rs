//! Status codes and their HTTP mapping.
//!
//! # Design Decisions
//! - Code space follows the canonical RPC codes (0 = OK)
//! - Codes in 400..=599 are HTTP codes and pass through unchanged
//! - Anything unmapped is a 500

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Domain-defined status code carried by a failed [`Status`](super::Status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(u16);

impl Code {
    pub const OK: Code = Code(0);
    pub const CANCELLED: Code = Code(1);
    pub const UNKNOWN: Code = Code(2);
    pub const INVALID_ARGUMENT: Code = Code(3);
    pub const DEADLINE_EXCEEDED: Code = Code(4);
    pub const NOT_FOUND: Code = Code(5);
    pub const ALREADY_EXISTS: Code = Code(6);
    pub const PERMISSION_DENIED: Code = Code(7);
    pub const RESOURCE_EXHAUSTED: Code = Code(8);
    pub const UNIMPLEMENTED: Code = Code(12);
    pub const INTERNAL: Code = Code(13);
    pub const UNAVAILABLE: Code = Code(14);
    pub const UNAUTHENTICATED: Code = Code(16);

    /// Wrap a raw code value.
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Raw code value.
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// HTTP status used when a failed status with this code is written.
    pub fn http_status(&self) -> StatusCode {
        match *self {
            Code::OK => StatusCode::OK,
            Code::INVALID_ARGUMENT => StatusCode::BAD_REQUEST,
            Code::UNAUTHENTICATED => StatusCode::UNAUTHORIZED,
            Code::PERMISSION_DENIED => StatusCode::FORBIDDEN,
            Code::NOT_FOUND => StatusCode::NOT_FOUND,
            Code::ALREADY_EXISTS => StatusCode::CONFLICT,
            Code::RESOURCE_EXHAUSTED => StatusCode::TOO_MANY_REQUESTS,
            Code::UNIMPLEMENTED => StatusCode::NOT_IMPLEMENTED,
            Code::UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            Code::DEADLINE_EXCEEDED => StatusCode::GATEWAY_TIMEOUT,
            // 499 is not registered but is the conventional "client closed request".
            Code::CANCELLED => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Code(value @ 400..=599) => {
                StatusCode::from_u16(value).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            Code::OK => "OK",
            Code::CANCELLED => "Cancelled",
            Code::UNKNOWN => "Unknown",
            Code::INVALID_ARGUMENT => "InvalidArgument",
            Code::DEADLINE_EXCEEDED => "DeadlineExceeded",
            Code::NOT_FOUND => "NotFound",
            Code::ALREADY_EXISTS => "AlreadyExists",
            Code::PERMISSION_DENIED => "PermissionDenied",
            Code::RESOURCE_EXHAUSTED => "ResourceExhausted",
            Code::UNIMPLEMENTED => "Unimplemented",
            Code::INTERNAL => "Internal",
            Code::UNAVAILABLE => "Unavailable",
            Code::UNAUTHENTICATED => "Unauthenticated",
            Code(value) => return write!(f, "{}", value),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_codes_map_to_http() {
        assert_eq!(Code::OK.http_status(), StatusCode::OK);
        assert_eq!(Code::NOT_FOUND.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(Code::UNAVAILABLE.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(Code::DEADLINE_EXCEEDED.http_status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(Code::CANCELLED.http_status().as_u16(), 499);
        assert_eq!(Code::INTERNAL.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Code::UNKNOWN.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn http_range_passes_through() {
        assert_eq!(Code::new(418).http_status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(Code::new(502).http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(Code::new(9000).http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn display_names() {
        assert_eq!(Code::NOT_FOUND.to_string(), "NotFound");
        assert_eq!(Code::new(418).to_string(), "418");
    }
}
