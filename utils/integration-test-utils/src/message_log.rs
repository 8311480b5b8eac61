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

use mqtt_dispatcher::{HandlerRef, HandlerResult, Message};
use std::sync::{Arc, Mutex};

/// Messages received by a handler, in delivery order.
#[derive(Clone, Default)]
pub struct MessageLog {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh handler appending to this log. Each call returns a distinct handler.
    pub fn handler(&self) -> HandlerRef {
        let messages = self.messages.clone();
        HandlerRef::new(move |message: &Message| -> HandlerResult {
            messages.lock().unwrap().push(message.clone());
            Ok(())
        })
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|message| message.topic.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A handler plus the log it writes into.
pub fn recording_handler() -> (HandlerRef, MessageLog) {
    let log = MessageLog::new();
    (log.handler(), log)
}
