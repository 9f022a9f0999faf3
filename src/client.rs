//! Research Backend Client
//!
//! Opens a research stream over HTTP and drives a [`StreamEngine`] with the
//! response body. The read is the only suspension point: each awaited chunk
//! is applied synchronously before the next await, so frame order matches
//! arrival order. A stall watchdog turns prolonged silence into a transport
//! error instead of hanging forever.

use futures_util::StreamExt;

use docmind_core::Session;

use crate::config::{ClientConfig, ResearchRequest};
use crate::engine::{FeedStatus, StreamEngine};
use crate::error::{StreamError, StreamResult};

pub struct ResearchClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ResearchClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Run one research turn to completion and return the reconstructed
    /// session. On transport failure the partial session is inside the
    /// returned engine state; use [`ResearchClient::stream`] to keep it.
    pub async fn run(&self, request: ResearchRequest) -> StreamResult<Session> {
        let mut engine = StreamEngine::new(&request.query);
        self.stream(&request, &mut engine).await?;
        Ok(engine.into_session())
    }

    /// Open the stream and feed every chunk into the caller's engine. The
    /// engine retains its partial session even when this returns an error.
    pub async fn stream(
        &self,
        request: &ResearchRequest,
        engine: &mut StreamEngine,
    ) -> StreamResult<()> {
        let response = self
            .client
            .post(self.config.research_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = if status.as_u16() == 400 || status.as_u16() == 422 {
                StreamError::InvalidRequest { message: body }
            } else {
                StreamError::ServerError {
                    message: body,
                    status: Some(status.as_u16()),
                }
            };
            engine.fail(&error);
            return Err(error);
        }

        let mut stream = response.bytes_stream();
        loop {
            let next = match self.config.stall_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, stream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        let error = StreamError::Stalled {
                            after_secs: timeout.as_secs(),
                        };
                        tracing::warn!(%error, "Research stream stalled");
                        engine.fail(&error);
                        return Err(error);
                    }
                },
                None => stream.next().await,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    let error = StreamError::from(err);
                    tracing::warn!(%error, "Research stream read failed");
                    engine.fail(&error);
                    return Err(error);
                }
            };

            if engine.feed(&chunk) == FeedStatus::Finished {
                break;
            }
        }

        // Clean EOF without a sentinel still ends the turn normally.
        engine.finish();
        Ok(())
    }
}
