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

//! Transport collaborator contract.
//!
//! The dispatcher never speaks a wire protocol itself; it drives any client that
//! can subscribe, unsubscribe and push inbound messages to one listener.

use crate::config::QoS;
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Delivery details of one inbound message, passed through untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MessageMetadata {
    pub qos: QoS,
    pub retain: bool,
    pub dup: bool,
}

/// One inbound message as delivered by the transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub topic: String,
    pub payload: Bytes,
    pub metadata: MessageMetadata,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            metadata: MessageMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Options forwarded verbatim on every subscribe call.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SubscribeOptions {
    pub qos: QoS,
}

/// One subscription as acknowledged by the transport.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GrantedSubscription {
    pub topic: String,
    pub qos: QoS,
}

/// Receives every message the transport delivers.
pub trait MessageListener: Send + Sync {
    fn on_message(&self, message: &Message);
}

/// Capability set the dispatcher needs from a hierarchical pub/sub client.
#[async_trait]
pub trait PubSubTransport: Send + Sync {
    /// Subscribes to every topic filter in `topics` in one request.
    async fn subscribe(
        &self,
        topics: &[String],
        options: SubscribeOptions,
    ) -> Result<Vec<GrantedSubscription>, TransportError>;

    /// Unsubscribes from every topic filter in `topics` in one request.
    async fn unsubscribe(&self, topics: &[String]) -> Result<(), TransportError>;

    /// Attaches the inbound message callback.
    fn add_message_listener(&self, listener: Arc<dyn MessageListener>);

    /// Detaches a callback previously passed to `add_message_listener`, compared by identity.
    fn remove_message_listener(&self, listener: &Arc<dyn MessageListener>);
}
