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

//! Message handlers and their identity.

use crate::transport::Message;
use std::error::Error;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub type HandlerError = Box<dyn Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// Receives every inbound message whose topic matches one of the handler's rules.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: &Message) -> HandlerResult;
}

impl<F> MessageHandler for F
where
    F: Fn(&Message) -> HandlerResult + Send + Sync,
{
    fn handle(&self, message: &Message) -> HandlerResult {
        self(message)
    }
}

///
/// [`HandlerRef`] is a shared handle to a [`MessageHandler`] compared by identity.
///
/// Clones of one `HandlerRef` are the same handler. Wrapping the same closure
/// twice yields two different handlers, so keep the handle around to remove the
/// rule later.
///
/// # Examples
///
/// ```
/// use mqtt_dispatcher::{HandlerRef, HandlerResult, Message};
///
/// let handler = HandlerRef::new(|message: &Message| -> HandlerResult {
///     println!("got {} bytes on {}", message.payload.len(), message.topic);
///     Ok(())
/// });
/// let same = handler.clone();
/// let other = HandlerRef::new(|_message: &Message| -> HandlerResult { Ok(()) });
///
/// assert_eq!(handler, same);
/// assert_ne!(handler, other);
/// ```
#[derive(Clone)]
pub struct HandlerRef {
    handler: Arc<dyn MessageHandler>,
}

impl HandlerRef {
    pub fn new<H>(handler: H) -> Self
    where
        H: MessageHandler + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn from_arc(handler: Arc<dyn MessageHandler>) -> Self {
        Self { handler }
    }

    pub(crate) fn invoke(&self, message: &Message) -> HandlerResult {
        self.handler.handle(message)
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.handler).cast::<()>()
    }
}

impl From<Arc<dyn MessageHandler>> for HandlerRef {
    fn from(handler: Arc<dyn MessageHandler>) -> Self {
        Self::from_arc(handler)
    }
}

impl Hash for HandlerRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.address(), other.address())
    }
}

impl Eq for HandlerRef {}

impl Debug for HandlerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRef")
            .field("address", &self.address())
            .finish()
    }
}
