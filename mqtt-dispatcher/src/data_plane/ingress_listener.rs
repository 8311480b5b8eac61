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

//! Transport listener adapter feeding inbound messages into dispatcher fan-out.

use crate::dispatcher::DispatcherCore;
use crate::observability::events;
use crate::transport::{Message, MessageListener};
use std::sync::Weak;
use tracing::{debug, warn};

const COMPONENT: &str = "ingress_listener";

/// The single listener a dispatcher attaches to its transport.
///
/// Holds the dispatcher weakly so a transport that outlives the dispatcher does
/// not keep its rules alive.
pub(crate) struct IngressListener {
    core: Weak<DispatcherCore>,
}

impl IngressListener {
    pub(crate) fn new(core: Weak<DispatcherCore>) -> Self {
        Self { core }
    }
}

impl MessageListener for IngressListener {
    fn on_message(&self, message: &Message) {
        let Some(core) = self.core.upgrade() else {
            return;
        };

        debug!(
            event = events::INGRESS_RECEIVE,
            component = COMPONENT,
            topic = message.topic.as_str(),
            payload_len = message.payload.len(),
            "received inbound message"
        );

        let report = core.dispatch(message);
        for failure in &report.failures {
            warn!(
                event = events::HANDLER_FAILED,
                component = COMPONENT,
                topic = message.topic.as_str(),
                pattern = failure.pattern.as_str(),
                err = %failure.error,
                "message handler failed"
            );
        }
    }
}
