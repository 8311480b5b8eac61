/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Per-key ordering of in-flight transport calls.
//!
//! Every subscribe/unsubscribe call registers itself for the keys it touches while
//! the dispatcher lock is held. A call waits for the previous call on each of its
//! keys before talking to the transport, so at most one call per key is in flight
//! and calls for one key reach the transport in decision order.

use crate::observability::{events, fields};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

const COMPONENT: &str = "pending_ops";

type DoneSignal = Shared<oneshot::Receiver<()>>;

struct PendingTail {
    ticket: u64,
    done: DoneSignal,
}

#[derive(Default)]
struct PendingState {
    next_ticket: u64,
    tails: HashMap<String, PendingTail>,
}

/// Registry of the most recent pending op per subscription key.
#[derive(Clone, Default)]
pub(crate) struct PendingOps {
    state: Arc<Mutex<PendingState>>,
}

impl PendingOps {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a new op for `keys`, chaining it behind any op still pending on them.
    pub(crate) fn register(&self, keys: &[String]) -> PendingSubscriptionOp {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        let (done_tx, done_rx) = oneshot::channel();
        let done = done_rx.shared();

        let mut predecessors = Vec::new();
        for key in keys {
            let previous = state.tails.insert(
                key.clone(),
                PendingTail {
                    ticket,
                    done: done.clone(),
                },
            );
            if let Some(previous) = previous {
                predecessors.push(previous.done);
            }
        }

        PendingSubscriptionOp {
            registry: self.state.clone(),
            keys: keys.to_vec(),
            ticket,
            predecessors,
            done: Some(done_tx),
        }
    }

    /// Number of keys with an op still pending.
    pub(crate) fn pending_keys(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tails
            .len()
    }
}

/// Slot held by one in-flight transport call. Releases on drop.
pub(crate) struct PendingSubscriptionOp {
    registry: Arc<Mutex<PendingState>>,
    keys: Vec<String>,
    ticket: u64,
    predecessors: Vec<DoneSignal>,
    done: Option<oneshot::Sender<()>>,
}

impl PendingSubscriptionOp {
    /// Resolves once every earlier op on the same keys has finished.
    pub(crate) async fn wait_for_predecessors(&mut self) {
        if self.predecessors.is_empty() {
            return;
        }

        debug!(
            event = events::PENDING_OP_WAIT,
            component = COMPONENT,
            keys = fields::format_keys(&self.keys),
            predecessors = self.predecessors.len(),
            "waiting for earlier transport call on the same key"
        );

        // Popped only once resolved so a cancelled wait can be resumed.
        while let Some(predecessor) = self.predecessors.first().cloned() {
            // A cancelled sender means the earlier op was dropped, which also releases it.
            let _ = predecessor.await;
            self.predecessors.remove(0);
        }
    }
}

impl Drop for PendingSubscriptionOp {
    fn drop(&mut self) {
        {
            let mut state = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            for key in &self.keys {
                if state
                    .tails
                    .get(key)
                    .is_some_and(|tail| tail.ticket == self.ticket)
                {
                    state.tails.remove(key);
                }
            }
        }

        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}
