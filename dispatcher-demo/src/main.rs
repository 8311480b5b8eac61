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

mod config;

use crate::config::DemoConfig;
use clap::Parser;
use loopback_broker::LoopbackBroker;
use mqtt_dispatcher::{Dispatcher, HandlerRef, HandlerResult, Message};
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command()]
struct DemoArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

fn printing_handler(rule: &str) -> HandlerRef {
    let rule = rule.to_string();
    HandlerRef::new(move |message: &Message| -> HandlerResult {
        info!(
            rule = rule.as_str(),
            topic = message.topic.as_str(),
            payload = %String::from_utf8_lossy(&message.payload),
            "received message"
        );
        Ok(())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started dispatcher-demo");

    let args = DemoArgs::parse();
    let contents = std::fs::read_to_string(&args.config)
        .map_err(|e| format!("Unable to read config file {}: {e}", args.config))?;
    let config: DemoConfig =
        json5::from_str(&contents).map_err(|e| format!("Unable to parse config file: {e}"))?;

    let broker = Arc::new(LoopbackBroker::new());
    let dispatcher = Dispatcher::new(broker.clone(), config.dispatcher.clone());

    for rule in &config.rules {
        let outcome = dispatcher
            .add_rule(&rule.pattern, printing_handler(&rule.pattern), rule.options())?
            .await?;
        info!(
            pattern = outcome.pattern.as_str(),
            subscribed = outcome.subscribed.len(),
            "rule added"
        );
    }

    for publish in &config.publish {
        let delivered = broker.publish(&publish.topic, publish.payload.clone());
        info!(topic = publish.topic.as_str(), delivered, "published");
    }

    let mut removed = HashSet::new();
    for rule in &config.rules {
        if !removed.insert(rule.pattern.as_str()) {
            continue;
        }
        let outcome = dispatcher.remove_rule(&rule.pattern, None)?.await?;
        info!(
            pattern = outcome.pattern.as_str(),
            unsubscribed = ?outcome.unsubscribed,
            "rule removed"
        );
    }

    let outcome = dispatcher.destroy()?.await?;
    info!(unsubscribed = ?outcome.unsubscribed, "dispatcher destroyed");

    Ok(())
}
