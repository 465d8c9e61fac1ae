use serde::Deserialize;

use crate::error::BridgeError;

/// Which optional codecs a registry includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Include the `GEOMETRY` codec.
    pub geometry: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            geometry: cfg!(feature = "geometry"),
        }
    }
}

/// Options for a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    pub codecs: CodecOptions,
    /// Row limit handed to the engine for every query; `0` means unbounded.
    pub max_rows: usize,
    /// Thread name for the session worker; generated when `None`.
    pub worker_name: Option<String>,
    /// Close the session when the last handle is dropped without an explicit `close()`.
    pub close_session_on_drop: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            codecs: CodecOptions::default(),
            max_rows: 0,
            worker_name: None,
            close_session_on_drop: true,
        }
    }
}

impl ConnectionOptions {
    #[must_use]
    pub fn builder() -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::new()
    }

    /// Parse options from JSON; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `BridgeError::InvalidArgument` if the document does not describe valid options.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(json)
            .map_err(|e| BridgeError::InvalidArgument(format!("invalid connection options: {e}")))
    }
}

/// Fluent builder for [`ConnectionOptions`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptionsBuilder {
    opts: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn geometry(mut self, enabled: bool) -> Self {
        self.opts.codecs.geometry = enabled;
        self
    }

    #[must_use]
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.opts.max_rows = max_rows;
        self
    }

    #[must_use]
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.opts.worker_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn close_session_on_drop(mut self, close: bool) -> Self {
        self.opts.close_session_on_drop = close;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionOptions {
        self.opts
    }
}
