//! In-memory transport for driving the client and session without a network.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::client::Operation;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail,
}

#[derive(Default)]
struct Inner {
    queues: HashMap<Operation, VecDeque<Scripted>>,
    log: Vec<HttpRequest>,
}

/// Replays queued responses per endpoint. The last queued entry for an
/// endpoint repeats forever; an endpoint with nothing queued fails the call.
#[derive(Default)]
pub struct ScriptedTransport {
    inner: Mutex<Inner>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, op: Operation, status: u16, body: &str) {
        self.lock()
            .queues
            .entry(op)
            .or_default()
            .push_back(Scripted::Respond(HttpResponse::new(status, body)));
    }

    /// Queue a network-level failure.
    pub fn push_failure(&self, op: Operation) {
        self.lock()
            .queues
            .entry(op)
            .or_default()
            .push_back(Scripted::Fail);
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().log.clone()
    }

    pub fn count(&self, op: Operation) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|r| r.url.ends_with(op.path()))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut inner = self.lock();
        let op = [Operation::Balance, Operation::StartPlay, Operation::Claim]
            .into_iter()
            .find(|op| request.url.ends_with(op.path()));
        let url = request.url.clone();
        inner.log.push(request);

        let next = op.and_then(|op| {
            let queue = inner.queues.get_mut(&op)?;
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });

        match next {
            Some(Scripted::Respond(resp)) => Ok(resp),
            Some(Scripted::Fail) => Err(TransportError::Other(format!("connection reset: {}", url))),
            None => Err(TransportError::Other(format!("nothing scripted for {}", url))),
        }
    }
}
