use reqwest::header::InvalidHeaderValue;

use thiserror::Error;

/// Result type for `e6api`, using [`Error`].
pub type Result<T> = ::std::result::Result<T, Error>;

/// Enum for `e6api` errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The given value for the some option is above the maximum value allowed in its context.
    /// E.g.: `limit:350` is an invalid request because the maximum limit is 320.
    ///
    /// The first value is the name of the option, the second is the value that was given to it and
    /// the third is the biggest value allowed.
    #[error("{0}:{1} is above the maximum value allowed in this context ({2})")]
    AboveLimit(String, u64, u64),

    /// The API explicitly rejected the request (invalid tag syntax, missing record, permission
    /// denied...). `message` is the reason given by the API.
    #[error("the API rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The server answered with an unsuccessful HTTP status and no error message of its own.
    #[error("HTTP error {code}{}", status_reason(.code))]
    Http { code: u16 },

    /// The response body isn't valid JSON.
    #[error("couldn't decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response is valid JSON but a field holds an unexpected value, e.g. an unknown rating.
    #[error("unexpected value in response payload: {0}")]
    Mapping(#[source] serde_json::Error),

    /// The action requires an API key but the client is anonymous. No request was sent.
    #[error("this action requires a username and an API key")]
    Unauthenticated,

    /// The request couldn't be sent, or its response couldn't be read.
    #[error("couldn't send request: {0}")]
    CannotSendRequest(#[from] reqwest::Error),

    /// The client couldn't be created. Contains a description of the error.
    #[error("couldn't create client: {0}")]
    CannotCreateClient(String),

    /// The base URL or an endpoint path is invalid.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The query couldn't be encoded.
    #[error("couldn't encode query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
}

impl Error {
    /// Whether the API itself reported the failure, as opposed to something breaking on the way.
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Whether the failure happened at the HTTP level or below.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::CannotSendRequest(_))
    }
}

impl From<InvalidHeaderValue> for Error {
    fn from(e: InvalidHeaderValue) -> Error {
        Error::CannotCreateClient(format!("Invalid header value: {}", e))
    }
}

// Give em a generic reason
fn status_reason(code: &u16) -> &'static str {
    match *code {
        403 => " Forbidden: Access denied. May indicate that your request lacks a User-Agent header.",
        404 => " Not Found",
        420 => " Invalid Record: Record could not be saved",
        421 => " User Throttled: User is throttled, try again later",
        422 => " Locked: The resource is locked and cannot be modified",
        423 => " Already Exists: Resource already exists",
        424 => " Invalid Parameters: The given parameters were invalid",
        500 => " Internal Server Error: Some unknown error occurred on the server",
        502 => " Bad Gateway: A gateway server received an invalid response from the e621 servers",
        503 => " Service Unavailable: Server cannot currently handle the request or you have exceeded the request rate limit. Try again later or decrease your rate of requests.",
        520 => " Unknown Error: Unexpected server response which violates protocol",
        522 => " Origin Connection Time-out: CloudFlare's attempt to connect to the e621 servers timed out",
        524 => " Origin Connection Time-out: A connection was established between CloudFlare and the e621 servers, but it timed out before an HTTP response was received",
        525 => " SSL Handshake Failed: The SSL handshake between CloudFlare and the e621 servers failed",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_has_generic_reason() {
        assert_eq!(
            Error::Http { code: 404 }.to_string(),
            "HTTP error 404 Not Found"
        );
        assert_eq!(Error::Http { code: 418 }.to_string(), "HTTP error 418");
    }

    #[test]
    fn api_error_carries_message() {
        let err = Error::Api {
            status: 200,
            message: String::from("Invalid tag"),
        };

        assert!(err.is_api());
        assert!(!err.is_transport());
        assert_eq!(
            err.to_string(),
            "the API rejected the request (200): Invalid tag"
        );
    }

    #[test]
    fn above_limit_display() {
        assert_eq!(
            Error::AboveLimit(String::from("limit"), 350, 320).to_string(),
            "limit:350 is above the maximum value allowed in this context (320)"
        );
    }
}
