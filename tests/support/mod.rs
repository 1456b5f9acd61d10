//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use chainscan_core::{HttpClient, HttpError, HttpRequest, HttpResponse};

pub const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

/// Replays scripted responses in order, optionally after a delay, and records every request.
#[derive(Debug, Default)]
pub struct RecordingHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl RecordingHttpClient {
    pub fn json(bodies: &[&str]) -> Self {
        Self::with_responses(bodies.iter().map(|body| Ok(HttpResponse::ok_json(*body))))
    }

    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<HttpResponse, HttpError>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.recorded_requests().len()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("response queue should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("no scripted response left")));
        let delay = self.delay;

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}
