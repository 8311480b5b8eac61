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

//! Topic pattern syntax: separators, wildcard segments and validation.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Separator between topic levels.
pub const SEPARATOR: char = '/';
/// Matches exactly one topic level.
pub const SINGLE_LEVEL_WILDCARD: &str = "+";
/// Matches zero or more trailing topic levels. Only legal as the last segment.
pub const MULTI_LEVEL_WILDCARD: &str = "#";

/// Reasons a string is not a usable topic pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PatternError {
    Empty,
    MisplacedMultiLevelWildcard,
    MixedWildcardSegment,
}

impl Display for PatternError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::Empty => write!(f, "pattern must not be empty"),
            PatternError::MisplacedMultiLevelWildcard => {
                write!(f, "`#` is only allowed as the last segment")
            }
            PatternError::MixedWildcardSegment => {
                write!(f, "wildcards must occupy a whole segment")
            }
        }
    }
}

impl Error for PatternError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    SingleLevel,
    MultiLevel,
}

impl<'a> Segment<'a> {
    fn classify(segment: &'a str) -> Self {
        match segment {
            SINGLE_LEVEL_WILDCARD => Segment::SingleLevel,
            MULTI_LEVEL_WILDCARD => Segment::MultiLevel,
            literal => Segment::Literal(literal),
        }
    }
}

/// A validated subscription pattern such as `sensors/+/temperature` or `cmd/#`.
///
/// ```
/// use mqtt_dispatcher::TopicPattern;
///
/// let pattern = TopicPattern::parse("+/mqtt").unwrap();
/// assert!(pattern.matches("hello/mqtt"));
/// assert!(!pattern.matches("hello/mqtt/test"));
///
/// assert!(TopicPattern::parse("#/foo").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TopicPattern {
    raw: String,
}

impl TopicPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut segments = pattern.split(SEPARATOR).peekable();
        while let Some(segment) = segments.next() {
            match Segment::classify(segment) {
                Segment::MultiLevel if segments.peek().is_some() => {
                    return Err(PatternError::MisplacedMultiLevelWildcard);
                }
                Segment::Literal(literal)
                    if literal.contains(SINGLE_LEVEL_WILDCARD)
                        || literal.contains(MULTI_LEVEL_WILDCARD) =>
                {
                    return Err(PatternError::MixedWildcardSegment);
                }
                _ => {}
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_wildcard(&self) -> bool {
        self.segments()
            .any(|segment| !matches!(segment, Segment::Literal(_)))
    }

    pub(crate) fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.raw.split(SEPARATOR).map(Segment::classify)
    }

    /// Structural match of one concrete topic against this pattern.
    pub fn matches(&self, topic: &str) -> bool {
        let mut levels = topic.split(SEPARATOR);
        for segment in self.segments() {
            match segment {
                Segment::MultiLevel => return true,
                Segment::SingleLevel => {
                    if levels.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if levels.next() != Some(literal) {
                        return false;
                    }
                }
            }
        }
        levels.next().is_none()
    }
}

impl FromStr for TopicPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for TopicPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for TopicPattern {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

pub(crate) fn topic_levels(topic: &str) -> Vec<&str> {
    topic.split(SEPARATOR).collect()
}
