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

//! Error taxonomy of dispatcher operations and transport calls.

use crate::routing::topic_pattern::PatternError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Broad classification of a transport failure.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransportErrorKind {
    /// The client is not connected or the request could not be sent.
    Unavailable,
    /// The broker refused the request.
    Rejected,
    Internal,
}

impl Display for TransportErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportErrorKind::Unavailable => write!(f, "unavailable"),
            TransportErrorKind::Rejected => write!(f, "rejected"),
            TransportErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// Failure reported by a transport subscribe/unsubscribe call.
///
/// The dispatcher hands these back to the caller exactly as the transport
/// produced them.
#[derive(Debug)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: TransportErrorKind,
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

/// Failures of `add_rule`, `remove_rule` and `destroy`.
#[derive(Debug)]
pub enum DispatcherError {
    /// The dispatcher was destroyed; every later call fails with this.
    Destroyed,
    /// The (pattern, handler) pair is already registered.
    DuplicateRule { pattern: String },
    /// No live rule matches the removal request.
    ExtraneousRule { pattern: String },
    InvalidPattern(PatternError),
    Transport(TransportError),
}

impl Display for DispatcherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatcherError::Destroyed => write!(f, "dispatcher was destroyed"),
            DispatcherError::DuplicateRule { pattern } => {
                write!(f, "handler already registered with pattern `{pattern}`")
            }
            DispatcherError::ExtraneousRule { pattern } => {
                write!(f, "extraneous pattern or handler provided: `{pattern}`")
            }
            DispatcherError::InvalidPattern(err) => write!(f, "invalid topic pattern: {err}"),
            DispatcherError::Transport(err) => write!(f, "transport call failed: {err}"),
        }
    }
}

impl Error for DispatcherError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatcherError::InvalidPattern(err) => Some(err),
            DispatcherError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for DispatcherError {
    fn from(err: TransportError) -> Self {
        DispatcherError::Transport(err)
    }
}

impl From<PatternError> for DispatcherError {
    fn from(err: PatternError) -> Self {
        DispatcherError::InvalidPattern(err)
    }
}
