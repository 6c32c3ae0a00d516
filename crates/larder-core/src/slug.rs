//! Recipe slugs.
//!
//! A slug names a recipe directory under `content/recipes/`, so it must be a
//! single path component. [`Slug`] enforces that; [`slugify`] derives one
//! from a title.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A validated recipe slug.
///
/// # Examples
///
/// ```
/// use larder_core::Slug;
///
/// assert!(Slug::new("lemon-tart").is_ok());
/// assert!(Slug::new("../etc").is_err());
/// assert!(Slug::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Create a new validated slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the slug is empty, contains a path
    /// separator or `..`, starts with a dot, or contains control characters.
    pub fn new(slug: impl Into<String>) -> Result<Self, Error> {
        let slug = slug.into();
        validate_slug(&slug)?;
        Ok(Self(slug))
    }

    /// Get the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the `Slug` and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for Slug {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Slug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for Slug {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

fn invalid(slug: &str, reason: &str) -> Error {
    Error::Validation(format!("invalid slug '{slug}': {reason}"))
}

fn validate_slug(slug: &str) -> Result<(), Error> {
    if slug.trim().is_empty() {
        return Err(invalid(slug, "slug cannot be empty"));
    }

    if slug.contains('/') || slug.contains('\\') {
        return Err(invalid(slug, "slug cannot contain a path separator"));
    }

    if slug.contains("..") {
        return Err(invalid(slug, "slug cannot contain '..'"));
    }

    if slug.starts_with('.') {
        return Err(invalid(slug, "slug cannot start with '.'"));
    }

    if slug.chars().any(char::is_control) {
        return Err(invalid(slug, "slug cannot contain control characters"));
    }

    Ok(())
}

/// Derive a URL-friendly slug from a title.
///
/// Lowercases, keeps ASCII letters, digits and `_`, turns runs of whitespace
/// and hyphens into a single `-`, and drops everything else. The result never
/// starts or ends with `-` and may be empty.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug
}
