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

//! Trie-backed pattern -> handler associations.
//!
//! Lookup visits at most one literal and one `+` branch per level, so wildcard-heavy
//! tries can fan out; `#` registrations are collected on the way down.

use crate::handler::HandlerRef;
use crate::routing::topic_pattern::{topic_levels, Segment, TopicPattern};
use std::collections::HashMap;
use std::sync::Arc;

/// A handler returned by [`PatternMatcher::matches`] with the pattern it matched through.
#[derive(Clone, Debug)]
pub struct MatchedHandler {
    pub pattern: Arc<str>,
    pub handler: HandlerRef,
}

#[derive(Clone, Debug)]
struct Registration {
    pattern: Arc<str>,
    handler: HandlerRef,
}

#[derive(Debug, Default)]
struct TrieNode {
    literal: HashMap<String, TrieNode>,
    single_level: Option<Box<TrieNode>>,
    // Patterns ending in `#` right below this node.
    multi_level: Vec<Registration>,
    // Patterns ending exactly at this node.
    terminal: Vec<Registration>,
}

impl TrieNode {
    fn is_empty(&self) -> bool {
        self.literal.is_empty()
            && self.single_level.is_none()
            && self.multi_level.is_empty()
            && self.terminal.is_empty()
    }

    fn insert(&mut self, segments: &[Segment<'_>], registration: Registration) {
        match segments.split_first() {
            None => self.terminal.push(registration),
            Some((Segment::MultiLevel, _)) => self.multi_level.push(registration),
            Some((Segment::SingleLevel, rest)) => self
                .single_level
                .get_or_insert_with(Default::default)
                .insert(rest, registration),
            Some((Segment::Literal(level), rest)) => self
                .literal
                .entry((*level).to_string())
                .or_default()
                .insert(rest, registration),
        }
    }

    fn remove(&mut self, segments: &[Segment<'_>], handler: Option<&HandlerRef>) -> usize {
        match segments.split_first() {
            None => retain_other_handlers(&mut self.terminal, handler),
            Some((Segment::MultiLevel, _)) => {
                retain_other_handlers(&mut self.multi_level, handler)
            }
            Some((Segment::SingleLevel, rest)) => {
                let Some(child) = self.single_level.as_mut() else {
                    return 0;
                };
                let removed = child.remove(rest, handler);
                if child.is_empty() {
                    self.single_level = None;
                }
                removed
            }
            Some((Segment::Literal(level), rest)) => {
                let Some(child) = self.literal.get_mut(*level) else {
                    return 0;
                };
                let removed = child.remove(rest, handler);
                if child.is_empty() {
                    self.literal.remove(*level);
                }
                removed
            }
        }
    }

    fn collect(&self, levels: &[&str], matched: &mut Vec<MatchedHandler>) {
        matched.extend(self.multi_level.iter().map(Registration::to_match));

        match levels.split_first() {
            None => matched.extend(self.terminal.iter().map(Registration::to_match)),
            Some((level, rest)) => {
                if let Some(child) = self.literal.get(*level) {
                    child.collect(rest, matched);
                }
                if let Some(child) = self.single_level.as_deref() {
                    child.collect(rest, matched);
                }
            }
        }
    }

    fn count(&self) -> usize {
        self.terminal.len()
            + self.multi_level.len()
            + self.single_level.as_deref().map_or(0, TrieNode::count)
            + self.literal.values().map(TrieNode::count).sum::<usize>()
    }
}

impl Registration {
    fn to_match(&self) -> MatchedHandler {
        MatchedHandler {
            pattern: self.pattern.clone(),
            handler: self.handler.clone(),
        }
    }
}

fn retain_other_handlers(
    registrations: &mut Vec<Registration>,
    handler: Option<&HandlerRef>,
) -> usize {
    let before = registrations.len();
    match handler {
        Some(handler) => registrations.retain(|registration| &registration.handler != handler),
        None => registrations.clear(),
    }
    before - registrations.len()
}

/// Pattern -> handler-set associations answering "who wants this topic".
///
/// Knows nothing about transport subscriptions. Several handlers may share one
/// pattern; a handler registered under two matching patterns is reported twice.
#[derive(Debug, Default)]
pub struct PatternMatcher {
    root: TrieNode,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: &TopicPattern, handler: HandlerRef) {
        let segments: Vec<_> = pattern.segments().collect();
        self.root.insert(
            &segments,
            Registration {
                pattern: Arc::from(pattern.as_str()),
                handler,
            },
        );
    }

    /// Removes `handler` from `pattern`, or every handler under `pattern` when
    /// `handler` is `None`. Returns how many associations were dropped.
    pub fn remove(&mut self, pattern: &TopicPattern, handler: Option<&HandlerRef>) -> usize {
        let segments: Vec<_> = pattern.segments().collect();
        self.root.remove(&segments, handler)
    }

    /// Every handler whose pattern matches `topic`, in a deterministic order for
    /// a given matcher state.
    pub fn matches(&self, topic: &str) -> Vec<MatchedHandler> {
        let mut matched = Vec::new();
        self.root.collect(&topic_levels(topic), &mut matched);
        matched
    }

    pub fn clear(&mut self) {
        self.root = TrieNode::default();
    }

    pub fn len(&self) -> usize {
        self.root.count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
