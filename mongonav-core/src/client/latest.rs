//! Last-issued-wins request coordination
//!
//! Starting a request through a [`LatestOnly`] slot cancels whatever the slot
//! had in flight. A superseded request resolves to [`ClientError::Cancelled`]
//! even if its response already arrived, so stale data is never observed.

use parking_lot::Mutex;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

#[derive(Debug)]
struct SlotState {
    generation: u64,
    token: CancellationToken,
}

/// A single request slot where only the most recent request may complete
#[derive(Debug)]
pub struct LatestOnly {
    name: &'static str,
    state: Mutex<SlotState>,
}

impl LatestOnly {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(SlotState {
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut state = self.state.lock();
        state.token.cancel();
        state.generation += 1;
        state.token = CancellationToken::new();
        (state.generation, state.token.clone())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    /// Generation of the most recently started request
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Run `request`, superseding any request already in flight in this slot
    pub async fn run<F, T>(&self, request: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let (generation, token) = self.begin();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ClientError::Cancelled),
            result = request => result,
        };

        if !self.is_current(generation) {
            debug!(slot = self.name, generation, "discarding superseded response");
            return Err(ClientError::Cancelled);
        }

        result
    }

    /// Cancel the request in flight, if any
    pub fn cancel(&self) {
        self.begin();
    }
}
