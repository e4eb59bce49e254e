//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{HttpMethod, RawResponse, Transport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

type Scripted = (Duration, Result<RawResponse, TransportError>);

/// Answers calls in order from a queue; an exhausted queue answers with a network error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.respond_after(Duration::ZERO, body)
    }

    pub fn respond_after(self, delay: Duration, body: Value) -> Self {
        self.push(delay, Ok(RawResponse { status: 200, body }))
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.fail_after(Duration::ZERO, err)
    }

    pub fn fail_after(self, delay: Duration, err: TransportError) -> Self {
        self.push(delay, Err(err))
    }

    fn push(self, delay: Duration, outcome: Result<RawResponse, TransportError>) -> Self {
        self.responses.lock().unwrap().push_back((delay, outcome));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some((delay, outcome)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => Err(TransportError::network("no scripted response")),
        }
    }
}
