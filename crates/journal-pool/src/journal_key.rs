// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Locator types accepted by [`crate::ReaderPool::reader`].
//!
//! The pool's stable semantic surface names four call shapes: `reader(name)`,
//! `reader(key)`, `reader(class, name)`, and `reader(class, name, hint)` --
//! all of them convenience forms that resolve some metadata descriptor down
//! to a journal name and then run the same acquisition protocol. Rust has no
//! overloading, so these collapse into one generic entry point,
//! `reader<K: Into<JournalKey>>`, with a `From` impl per call shape.

/// A resolved locator for [`crate::ReaderPool::reader`].
///
/// `class` and `hint` are optional qualifiers folded into the cache key
/// alongside `name`; `hint` is carried through for diagnostics only and does
/// not affect which slot a lookup resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalKey {
    /// Optional namespace qualifier (the `class` in `reader(class, name)`).
    pub class: Option<String>,
    /// The journal name proper.
    pub name: String,
    /// Optional advisory hint (the third argument of `reader(class, name,
    /// hint)`); logged but not part of the cache key.
    pub hint: Option<String>,
}

impl JournalKey {
    /// Build a bare name locator, equivalent to `reader(name)`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: None,
            name: name.into(),
            hint: None,
        }
    }

    /// Qualify this locator with a class namespace, equivalent to
    /// `reader(class, name)`.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Attach an advisory hint, equivalent to `reader(class, name, hint)`.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The journal name this locator resolves to, folding `class` in as a
    /// path-style qualifier. This is the pool's cache key.
    pub fn resolved_name(&self) -> String {
        match &self.class {
            Some(class) => format!("{class}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl From<&str> for JournalKey {
    /// `reader(name)`.
    fn from(name: &str) -> Self {
        JournalKey::new(name)
    }
}

impl From<String> for JournalKey {
    /// `reader(key)`, where `key` is already a resolved name.
    fn from(name: String) -> Self {
        JournalKey::new(name)
    }
}

impl From<&String> for JournalKey {
    fn from(name: &String) -> Self {
        JournalKey::new(name.as_str())
    }
}

impl From<(&str, &str)> for JournalKey {
    /// `reader(class, name)`.
    fn from((class, name): (&str, &str)) -> Self {
        JournalKey::new(name).with_class(class)
    }
}

impl From<(&str, &str, &str)> for JournalKey {
    /// `reader(class, name, hint)`.
    fn from((class, name, hint): (&str, &str, &str)) -> Self {
        JournalKey::new(name).with_class(class).with_hint(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_resolves_to_itself() {
        let key: JournalKey = "trades".into();
        assert_eq!(key.resolved_name(), "trades");
        assert_eq!(key.hint, None);
    }

    #[test]
    fn class_and_name_fold_into_a_qualified_name() {
        let key: JournalKey = ("marketdata", "trades").into();
        assert_eq!(key.resolved_name(), "marketdata/trades");
    }

    #[test]
    fn class_name_and_hint_carry_the_hint_without_affecting_the_key() {
        let key: JournalKey = ("marketdata", "trades", "latest").into();
        assert_eq!(key.resolved_name(), "marketdata/trades");
        assert_eq!(key.hint.as_deref(), Some("latest"));
    }
}
