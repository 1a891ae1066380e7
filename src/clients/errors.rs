use thiserror::Error;

/// Errors returned by the catalog clients and the screens built on them.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, timeout or body-read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("iTunes API returned status {status} for {url}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response is not a `{ "results": [...] }` envelope.
    #[error("Failed to decode iTunes response: {0}")]
    Decode(String),

    /// Bad setting; retrying will not help.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fixture or stdin read failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether retrying the same trigger later could succeed.
    /// Only a broken configuration is permanent.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Configuration(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(ToString::to_string).unwrap_or_default(),
            },
            None => Error::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_is_fatal() {
        assert!(Error::Network("reset".into()).is_recoverable());
        assert!(
            Error::HttpStatus {
                status: 503,
                url: "https://itunes.apple.com/search".into()
            }
            .is_recoverable()
        );
        assert!(Error::Decode("missing field `results`".into()).is_recoverable());
        assert!(!Error::Configuration("bad url".into()).is_recoverable());
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(Error::from(err), Error::Decode(_)));
    }
}
