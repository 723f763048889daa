//! Runs parses off the caller's task and hands back exactly one reply.
//!
//! Each submission gets its own [`GeocodeXmlParser`] on tokio's blocking
//! pool. The reply crosses back through a oneshot channel, so it is
//! delivered at most once by construction; the dispatcher always sends one.

use std::time::Duration;

use geocode_core::{AppConfig, GeoLocation, GeoShape};
use tokio::sync::oneshot;

use crate::error::GeocodeParseError;
use crate::parser::GeocodeXmlParser;

/// One parse job: optional bounds plus the raw response body.
#[derive(Debug, Clone, Default)]
pub struct GeocodeRequest {
    pub bounds: GeoShape,
    pub data: Vec<u8>,
}

impl GeocodeRequest {
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            bounds: GeoShape::Unset,
            data: data.into(),
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: GeoShape) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn into_parser(self) -> GeocodeXmlParser {
        let mut parser = GeocodeXmlParser::new();
        parser.set_bounds(self.bounds);
        parser.parse(self.data);
        parser
    }
}

/// Terminal outcome of a submission: the places, or why there are none.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeReply {
    Results(Vec<GeoLocation>),
    Error(String),
}

impl GeocodeReply {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, GeocodeReply::Error(_))
    }

    /// Convert back into a `Result`, keeping the error text.
    ///
    /// # Errors
    ///
    /// Returns the error description for [`GeocodeReply::Error`].
    pub fn into_result(self) -> Result<Vec<GeoLocation>, String> {
        match self {
            GeocodeReply::Results(locations) => Ok(locations),
            GeocodeReply::Error(message) => Err(message),
        }
    }
}

impl From<Result<Vec<GeoLocation>, GeocodeParseError>> for GeocodeReply {
    fn from(result: Result<Vec<GeoLocation>, GeocodeParseError>) -> Self {
        match result {
            Ok(locations) => GeocodeReply::Results(locations),
            Err(error) => GeocodeReply::Error(error.to_string()),
        }
    }
}

/// Submits parse jobs to the blocking pool.
///
/// The optional timeout is the dispatcher's, not the parser's: the parse
/// itself cannot be interrupted, so on expiry the caller gets an error reply
/// and the eventual parse result is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    timeout: Option<Duration>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.parse_timeout,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Start parsing `request` and return the receiving end of its reply.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn submit(&self, request: GeocodeRequest) -> oneshot::Receiver<GeocodeReply> {
        let bytes = request.data.len();
        self.dispatch(bytes, move || request.into_parser().run())
    }

    fn dispatch<F>(&self, bytes: usize, work: F) -> oneshot::Receiver<GeocodeReply>
    where
        F: FnOnce() -> Result<Vec<GeoLocation>, GeocodeParseError> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let job = tokio::task::spawn_blocking(work);

            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, job).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        tracing::warn!(
                            bytes,
                            timeout_ms = limit.as_millis(),
                            "geocode parse timed out, discarding result"
                        );
                        let message = format!(
                            "geocode parse did not finish within {} ms",
                            limit.as_millis()
                        );
                        deliver(tx, GeocodeReply::Error(message));
                        return;
                    }
                },
                None => job.await,
            };

            let reply = match joined {
                Ok(result) => GeocodeReply::from(result),
                Err(error) => {
                    tracing::error!(%error, bytes, "geocode parse worker failed");
                    GeocodeReply::Error(format!("geocode parse worker failed: {error}"))
                }
            };
            deliver(tx, reply);
        });

        rx
    }

    /// Like [`submit`](Self::submit), but hands the reply to `on_complete`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn submit_with<F>(&self, request: GeocodeRequest, on_complete: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(GeocodeReply) + Send + 'static,
    {
        let rx = self.submit(request);
        tokio::spawn(async move {
            match rx.await {
                Ok(reply) => on_complete(reply),
                Err(_) => tracing::error!("geocode dispatcher dropped a reply"),
            }
        })
    }

    /// Submit and wait for the reply.
    pub async fn parse(&self, request: GeocodeRequest) -> GeocodeReply {
        match self.submit(request).await {
            Ok(reply) => reply,
            Err(_) => GeocodeReply::Error("geocode dispatcher dropped the reply".to_string()),
        }
    }
}

fn deliver(tx: oneshot::Sender<GeocodeReply>, reply: GeocodeReply) {
    if tx.send(reply).is_err() {
        tracing::debug!("caller stopped waiting for the geocode reply");
    }
}
