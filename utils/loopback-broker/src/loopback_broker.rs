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

use async_trait::async_trait;
use bytes::Bytes;
use mqtt_dispatcher::{
    GrantedSubscription, Message, MessageListener, MessageMetadata, PubSubTransport, QoS,
    SubscribeOptions, TopicPattern, TransportError, TransportErrorKind,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process broker with a single client connection.
///
/// Messages published through [`LoopbackBroker::publish`] reach the attached
/// listeners only when one of the client's subscriptions matches the topic,
/// delivered once even when several subscriptions overlap.
#[derive(Default)]
pub struct LoopbackBroker {
    subscriptions: Mutex<BTreeMap<String, (TopicPattern, QoS)>>,
    listeners: Mutex<Vec<Arc<dyn MessageListener>>>,
}

impl LoopbackBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `payload` on `topic`. Returns `true` when the client received it.
    pub fn publish(&self, topic: &str, payload: impl Into<Bytes>) -> bool {
        let granted_qos = lock(&self.subscriptions)
            .values()
            .filter(|(filter, _)| filter.matches(topic))
            .map(|(_, qos)| *qos)
            .max();

        let Some(qos) = granted_qos else {
            debug!(topic, "no matching subscription, dropping publish");
            return false;
        };

        let message = Message::new(topic, payload).with_metadata(MessageMetadata {
            qos,
            ..MessageMetadata::default()
        });
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener.on_message(&message);
        }
        true
    }

    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.subscriptions).keys().cloned().collect()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

#[async_trait]
impl PubSubTransport for LoopbackBroker {
    async fn subscribe(
        &self,
        topics: &[String],
        options: SubscribeOptions,
    ) -> Result<Vec<GrantedSubscription>, TransportError> {
        let filters = topics
            .iter()
            .map(|topic| {
                TopicPattern::parse(topic).map_err(|err| {
                    TransportError::with_source(
                        TransportErrorKind::Rejected,
                        format!("invalid topic filter `{topic}`"),
                        err,
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut subscriptions = lock(&self.subscriptions);
        Ok(filters
            .into_iter()
            .map(|filter| {
                let topic = filter.to_string();
                subscriptions.insert(topic.clone(), (filter, options.qos));
                GrantedSubscription {
                    topic,
                    qos: options.qos,
                }
            })
            .collect())
    }

    async fn unsubscribe(&self, topics: &[String]) -> Result<(), TransportError> {
        let mut subscriptions = lock(&self.subscriptions);
        for topic in topics {
            subscriptions.remove(topic);
        }
        Ok(())
    }

    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) {
        lock(&self.listeners).push(listener);
    }

    fn remove_message_listener(&self, listener: &Arc<dyn MessageListener>) {
        lock(&self.listeners).retain(|attached| !Arc::ptr_eq(attached, listener));
    }
}
