//! Reserved result codes and the user-facing messages tied to them.
//!
//! # Design
//! The numeric values are part of the wire contract with existing backends
//! and must not change. `MalformedData` and `BadStatus` are synthetic: they
//! never come from a server, the classifier stamps them when the response
//! itself is unusable.

/// Reserved result codes understood by the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum RequestStatus {
    Success = 200,
    NotLoggedIn = 401,
    ServerError = 500,
    ServiceUnavailable = 503,
    /// Transport failures that never produced a response.
    Unknown = 4000,
    /// The body could not be parsed as a JSON object.
    MalformedData = 4001,
    /// Non-2xx transport status without an application code.
    BadStatus = 4002,
}

impl RequestStatus {
    pub const fn code(self) -> i64 {
        self as i64
    }
}

/// Fixed messages written into results by the classifier and error handler.
pub mod messages {
    pub const NOT_JSON: &str = "Response data is not in JSON format";
    pub const STATUS_SUFFIX: &str = "status code:";
    pub const SYSTEM_BUSY: &str = "System busy, please try again later";
    pub const MAINTENANCE: &str = "Service under maintenance, please try again later";
    pub const OFFLINE: &str = "Network unavailable, please check your connection";
    pub const LOGIN_EXPIRED: &str = "Login has expired, please sign in again";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_codes_match_wire_values() {
        assert_eq!(RequestStatus::Success.code(), 200);
        assert_eq!(RequestStatus::NotLoggedIn.code(), 401);
        assert_eq!(RequestStatus::ServerError.code(), 500);
        assert_eq!(RequestStatus::ServiceUnavailable.code(), 503);
        assert_eq!(RequestStatus::Unknown.code(), 4000);
        assert_eq!(RequestStatus::MalformedData.code(), 4001);
        assert_eq!(RequestStatus::BadStatus.code(), 4002);
    }
}
