// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error types for bloomset operations

use std::fmt;

/// ErrorKind is all kinds of Error of bloomset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The argument provided is invalid.
    InvalidArgument,
    /// The digest primitive used to derive bit indices cannot be used.
    ///
    /// Never returned today: the SHA-1 implementation is built in and cannot fail.
    HashingUnavailable,
    /// Two filters with different size or hash count were combined.
    IncompatibleFilters,
    /// A bit index lies outside of the bit store.
    IndexOutOfRange,
    /// Two bit stores of different length were combined.
    SizeMismatch,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::HashingUnavailable => "HashingUnavailable",
            ErrorKind::IncompatibleFilters => "IncompatibleFilters",
            ErrorKind::IndexOutOfRange => "IndexOutOfRange",
            ErrorKind::SizeMismatch => "SizeMismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all bloomset functions.
///
/// # Examples
///
/// ```
/// # use bloomset::error::Error;
/// # use bloomset::error::ErrorKind;
/// let err = Error::new(ErrorKind::InvalidArgument, "bad input");
/// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
/// assert_eq!(err.message(), "bad input");
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::default(),
            source: None,
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set source for error.
    ///
    /// # Panics
    ///
    /// Panics if the source has been set.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::error::Error as _;
    /// use bloomset::error::{Error, ErrorKind};
    ///
    /// let mut error = Error::new(ErrorKind::HashingUnavailable, "failed to initialize digest");
    /// assert!(error.source().is_none());
    /// error = error.set_source(std::io::Error::new(std::io::ErrorKind::Other, "IO error"));
    /// assert!(error.source().is_some());
    /// ```
    pub fn set_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(src.into());
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Return the value recorded for a context key, if any.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

// Convenient constructors used within bloomset crate.
impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, msg)
    }

    pub(crate) fn incompatible_filters(
        (size, num_hashes): (u64, u16),
        (other_size, other_num_hashes): (u64, u16),
    ) -> Self {
        Self::new(
            ErrorKind::IncompatibleFilters,
            "both filters must have the same size and hash count",
        )
        .with_context("size", size)
        .with_context("num_hashes", num_hashes)
        .with_context("other_size", other_size)
        .with_context("other_num_hashes", other_num_hashes)
    }

    pub(crate) fn index_out_of_range(index: u64, len: u64) -> Self {
        Self::new(
            ErrorKind::IndexOutOfRange,
            format!("bit index {index} out of range for {len} bits"),
        )
        .with_context("index", index)
        .with_context("len", len)
    }

    pub(crate) fn size_mismatch(expected: u64, actual: u64) -> Self {
        Self::new(
            ErrorKind::SizeMismatch,
            format!("bit store size mismatch: expected {expected}, got {actual}"),
        )
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "   {source:#}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = Error::incompatible_filters((20, 2), (32, 2));
        let msg = err.to_string();
        assert!(msg.starts_with("IncompatibleFilters, context: { size: 20"));
        assert!(msg.ends_with("=> both filters must have the same size and hash count"));
        assert_eq!(err.context("other_size"), Some("32"));
        assert_eq!(err.context("missing"), None);
    }

    #[test]
    fn test_debug_lists_context_and_source() {
        let err = Error::index_out_of_range(25, 20).set_source(anyhow::anyhow!("probe 1"));
        let debug = format!("{err:?}");
        assert!(debug.starts_with("IndexOutOfRange => bit index 25 out of range for 20 bits"));
        assert!(debug.contains("   index: 25"));
        assert!(debug.contains("Source:"));
        assert!(debug.contains("probe 1"));
    }

    #[test]
    #[should_panic(expected = "the source error has been set")]
    fn test_set_source_twice_panics() {
        let _ = Error::size_mismatch(20, 21)
            .set_source(anyhow::anyhow!("first"))
            .set_source(anyhow::anyhow!("second"));
    }
}
