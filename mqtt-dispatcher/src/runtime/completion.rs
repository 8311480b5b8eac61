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

//! Phase-two futures returned by dispatcher operations.

use crate::error::{TransportError, TransportErrorKind};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

enum CompletionState<T> {
    Ready(Option<Result<T, TransportError>>),
    Spawned(JoinHandle<Result<T, TransportError>>),
}

/// Resolves when the transport call decided by an operation has finished.
///
/// Operations that need no transport call hand out an already-resolved
/// completion. Otherwise the call runs as a task on the dispatcher's runtime and
/// keeps running if the completion is dropped.
#[must_use = "completions report transport failures and should be awaited"]
pub struct Completion<T> {
    state: CompletionState<T>,
}

impl<T> Completion<T>
where
    T: Send + 'static,
{
    pub(crate) fn ready(result: Result<T, TransportError>) -> Self {
        Self {
            state: CompletionState::Ready(Some(result)),
        }
    }

    pub(crate) fn spawn<F>(runtime: &Handle, call: F) -> Self
    where
        F: Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        Self {
            state: CompletionState::Spawned(runtime.spawn(call)),
        }
    }

    /// `true` when no transport call is involved.
    pub fn is_immediate(&self) -> bool {
        matches!(self.state, CompletionState::Ready(_))
    }
}

impl<T> Unpin for Completion<T> {}

impl<T> Future for Completion<T> {
    type Output = Result<T, TransportError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            CompletionState::Ready(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(TransportError::new(
                    TransportErrorKind::Internal,
                    "completion polled after it resolved",
                ))
            })),
            CompletionState::Spawned(task) => Pin::new(task).poll(cx).map(|joined| {
                joined.unwrap_or_else(|err| {
                    Err(TransportError::with_source(
                        TransportErrorKind::Internal,
                        "transport call task failed",
                        err,
                    ))
                })
            }),
        }
    }
}
