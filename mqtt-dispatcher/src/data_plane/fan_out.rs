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

//! Isolated delivery of one message to every matched handler.

use crate::handler::HandlerError;
use crate::routing::pattern_matcher::MatchedHandler;
use crate::transport::Message;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// One handler invocation that returned an error or panicked.
#[derive(Debug)]
pub struct HandlerFailure {
    /// Pattern the failing handler was matched through.
    pub pattern: String,
    pub error: HandlerError,
}

/// Result of fanning one message out to its handlers.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of handler invocations, including failed ones.
    pub matched: usize,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.matched - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A handler panicked while processing a message.
#[derive(Debug)]
pub struct HandlerPanicked {
    message: String,
}

impl HandlerPanicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HandlerPanicked {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "handler panicked: {}", self.message)
    }
}

impl Error for HandlerPanicked {}

pub(crate) fn deliver(matched: Vec<MatchedHandler>, message: &Message) -> DispatchReport {
    let mut report = DispatchReport {
        matched: matched.len(),
        failures: Vec::new(),
    };

    for MatchedHandler { pattern, handler } in matched {
        let error = match catch_unwind(AssertUnwindSafe(|| handler.invoke(message))) {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => err,
            Err(payload) => Box::new(HandlerPanicked::from_payload(payload)),
        };
        report.failures.push(HandlerFailure {
            pattern: pattern.to_string(),
            error,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::{deliver, HandlerPanicked};
    use crate::handler::{HandlerRef, HandlerResult};
    use crate::routing::pattern_matcher::MatchedHandler;
    use crate::transport::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn matched(pattern: &str, handler: HandlerRef) -> MatchedHandler {
        MatchedHandler {
            pattern: Arc::from(pattern),
            handler,
        }
    }

    #[test]
    fn failures_do_not_stop_sibling_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let counting = HandlerRef::new(move |_message: &Message| -> HandlerResult {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let failing =
            HandlerRef::new(|_message: &Message| -> HandlerResult { Err("bad payload".into()) });
        let panicking = HandlerRef::new(|_message: &Message| -> HandlerResult {
            panic!("handler bug");
        });

        let report = deliver(
            vec![
                matched("a/+", failing),
                matched("#", panicking),
                matched("a/b", counting.clone()),
                matched("a/#", counting),
            ],
            &Message::new("a/b", "x"),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.matched, 4);
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].pattern, "a/+");
        assert_eq!(report.failures[0].error.to_string(), "bad payload");
        assert_eq!(report.failures[1].pattern, "#");
        let panicked = report.failures[1]
            .error
            .downcast_ref::<HandlerPanicked>()
            .expect("panic is captured");
        assert_eq!(panicked.message(), "handler bug");
    }

    #[test]
    fn empty_match_set_is_a_clean_report() {
        let report = deliver(Vec::new(), &Message::new("nobody/home", ""));

        assert!(report.is_clean());
        assert_eq!(report.matched, 0);
    }
}
