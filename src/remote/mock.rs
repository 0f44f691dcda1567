//! Scripted in-memory client shared by the tracking and power tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::client::RemoteStatusClient;
use super::error::ClientError;
use super::types::RemoteResponse;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Ok(RemoteResponse),
    Transient(String),
    Fatal,
}

impl Reply {
    pub(crate) fn doc(body: Value) -> Self {
        Reply::Ok(RemoteResponse::new(200, body))
    }

    fn into_result(self) -> Result<RemoteResponse, ClientError> {
        match self {
            Reply::Ok(resp) => Ok(resp),
            Reply::Transient(message) => Err(ClientError::Http {
                status: 503,
                message,
            }),
            Reply::Fatal => Err(ClientError::Unauthorized { status: 401 }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub uri: String,
    pub payload: Option<Value>,
}

/// GET replies are scripted per URI and the last one repeats forever.
/// POST replies default to an empty 204 once the script runs out.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    gets: RefCell<HashMap<String, VecDeque<Reply>>>,
    posts: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_get(self, uri: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.gets
            .borrow_mut()
            .entry(uri.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub(crate) fn on_post(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.posts.borrow_mut().extend(replies);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn get_count(&self) -> usize {
        self.calls.borrow().iter().filter(|c| c.method == "GET").count()
    }

    /// `ResetType` values of every POST, in order.
    pub(crate) fn posted_reset_types(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method == "POST")
            .filter_map(|c| c.payload.as_ref()?.get("ResetType")?.as_str().map(str::to_string))
            .collect()
    }
}

impl RemoteStatusClient for ScriptedClient {
    async fn get(&self, uri: &str) -> Result<RemoteResponse, ClientError> {
        self.calls.borrow_mut().push(Call {
            method: "GET",
            uri: uri.to_string(),
            payload: None,
        });
        let mut gets = self.gets.borrow_mut();
        let reply = match gets.get_mut(uri) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        reply
            .unwrap_or_else(|| Reply::Transient(format!("no script for {uri}")))
            .into_result()
    }

    async fn post(&self, uri: &str, payload: &Value) -> Result<RemoteResponse, ClientError> {
        self.calls.borrow_mut().push(Call {
            method: "POST",
            uri: uri.to_string(),
            payload: Some(payload.clone()),
        });
        self.posts
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Reply::Ok(RemoteResponse::new(204, Value::Null)))
            .into_result()
    }
}
