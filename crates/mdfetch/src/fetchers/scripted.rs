//! In-memory fetcher for unit tests

use crate::error::FetchError;
use crate::fetchers::{FetchedBody, Fetcher};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Canned response for a URL prefix
pub(crate) enum Canned {
    Body(&'static str, Option<u64>),
    Delayed(u64, &'static str),
    Status(u16),
}

/// Fetcher that serves canned responses and records requested URLs
pub(crate) struct ScriptedFetcher {
    responses: Vec<(&'static str, Canned)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn new(responses: Vec<(&'static str, Canned)>) -> Self {
        Self {
            responses,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<FetchedBody, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let canned = self
            .responses
            .iter()
            .find(|(prefix, _)| url.as_str().starts_with(prefix))
            .map(|(_, canned)| canned);

        let (content, tokens) = match canned {
            Some(Canned::Body(content, tokens)) => (*content, *tokens),
            Some(Canned::Delayed(millis, content)) => {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
                (*content, None)
            }
            Some(Canned::Status(status)) => {
                return Err(FetchError::HttpStatus {
                    status: *status,
                    reason: "Scripted".to_string(),
                })
            }
            None => return Err(FetchError::Transport("no route".to_string())),
        };

        Ok(FetchedBody {
            content: content.to_string(),
            tokens,
            final_url: url.clone(),
        })
    }
}
