//! The sanitize seam and the sanitizers shipped with the crate.
//!
//! [`Sanitize`] is the single capability the scanner depends on: turn the raw
//! (still JSON-escaped) content of one string literal into replacement
//! content, or fail. Any `Fn(&str) -> String` closure is a sanitizer;
//! [`FallibleFn`] adapts closures that can fail.
//!
//! [`XssSanitizer`] is the default pipeline for JSON bodies:
//! 1. canonicalize (decode JSON, HTML-entity and percent escapes);
//! 2. clean against a [`Safelist`];
//! 3. re-escape for embedding in a JSON string.
//!
//! [`TextSanitizer`] applies a [`TextPolicy`] to header, path and query
//! values.
use serde::{Deserialize, Serialize};

use crate::SanitizeError;

pub mod canonicalize;
pub mod encode;
pub mod safelist;

use canonicalize::Canonicalizer;
use encode::{escape_html, escape_javascript, escape_json_string, escape_xml};
use safelist::{Safelist, SafelistPreset};

/// A function from one string literal's raw content to its replacement.
///
/// The input is the literal exactly as it appeared between its delimiters,
/// escape sequences included. The output is written between a fresh pair of
/// delimiters, so an implementation that wants valid JSON out must return
/// JSON-escaped content.
pub trait Sanitize {
    /// Produces the replacement for `literal`.
    ///
    /// # Errors
    ///
    /// Implementations may reject a literal; the scan is aborted and the error
    /// returned to the caller unchanged.
    fn sanitize(&self, literal: &str) -> Result<String, SanitizeError>;
}

impl<F> Sanitize for F
where
    F: Fn(&str) -> String,
{
    fn sanitize(&self, literal: &str) -> Result<String, SanitizeError> {
        Ok(self(literal))
    }
}

/// Adapts a fallible closure into a [`Sanitize`] implementation.
///
/// ```rust
/// use jsonscrub::{FallibleFn, Sanitize, SanitizeError};
///
/// let reject_markup = FallibleFn(|s: &str| {
///     if s.contains('<') {
///         Err(SanitizeError::msg("markup"))
///     } else {
///         Ok(s.to_string())
///     }
/// });
/// assert!(reject_markup.sanitize("<b>").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FallibleFn<F>(pub F);

impl<F> Sanitize for FallibleFn<F>
where
    F: Fn(&str) -> Result<String, SanitizeError>,
{
    fn sanitize(&self, literal: &str) -> Result<String, SanitizeError> {
        (self.0)(literal)
    }
}

/// Returns every literal unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Sanitize for Identity {
    fn sanitize(&self, literal: &str) -> Result<String, SanitizeError> {
        Ok(literal.to_string())
    }
}

/// Canonicalize, clean and re-escape; the default pipeline for JSON bodies.
#[derive(Debug, Clone)]
pub struct XssSanitizer {
    canonicalizer: Canonicalizer,
    safelist: Safelist,
    json_escape: bool,
}

impl XssSanitizer {
    /// Builds a sanitizer from its parts.
    #[must_use]
    pub fn new(canonicalizer: Canonicalizer, safelist: Safelist, json_escape: bool) -> Self {
        Self {
            canonicalizer,
            safelist,
            json_escape,
        }
    }

    /// Strict JSON canonicalization, the relaxed safelist and JSON
    /// re-escaping.
    #[must_use]
    pub fn json_body() -> Self {
        Self::new(Canonicalizer::json(), Safelist::relaxed(), true)
    }

    /// Builds the sanitizer described by a `[sanitize]` config section.
    #[must_use]
    pub fn from_config(config: &SanitizeConfig) -> Self {
        let canonicalizer = Canonicalizer::json()
            .allow_multiple(config.allow_multiple_encoding)
            .allow_mixed(config.allow_mixed_encoding);
        Self::new(canonicalizer, config.safelist.build(), config.json_escape)
    }

    /// Canonicalizes and cleans `value`, without the final JSON escaping.
    ///
    /// # Errors
    ///
    /// Returns the canonicalizer's error for multiply or mixed encoded input.
    pub fn clean(&self, value: &str) -> Result<String, SanitizeError> {
        let canonical = self.canonicalizer.canonicalize(value)?;
        Ok(self.safelist.clean(&canonical))
    }
}

impl Default for XssSanitizer {
    fn default() -> Self {
        Self::json_body()
    }
}

impl Sanitize for XssSanitizer {
    fn sanitize(&self, literal: &str) -> Result<String, SanitizeError> {
        if literal.is_empty() {
            return Ok(String::new());
        }
        let clean = self.clean(literal)?;
        Ok(if self.json_escape {
            escape_json_string(&clean)
        } else {
            clean
        })
    }
}

/// `[sanitize]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizeConfig {
    /// Safelist applied to JSON string literals.
    ///
    /// # Default
    ///
    /// [`SafelistPreset::Relaxed`]
    pub safelist: SafelistPreset,
    /// Re-escape cleaned literals so the output stays valid JSON.
    ///
    /// # Default
    ///
    /// `true`
    pub json_escape: bool,
    /// Decode values that were encoded more than once instead of rejecting
    /// them.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_encoding: bool,
    /// Decode values that interleave encoding schemes instead of rejecting
    /// them.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_mixed_encoding: bool,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            safelist: SafelistPreset::default(),
            json_escape: true,
            allow_multiple_encoding: false,
            allow_mixed_encoding: false,
        }
    }
}

/// How a [`TextSanitizer`] treats a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPolicy {
    /// Canonicalize, then strip everything but simple formatting tags.
    #[default]
    Clean,
    /// [`Clean`](Self::Clean), then HTML-escape the result.
    CleanAndEscape,
    /// Escape for JavaScript, then XML, then HTML. Nothing is removed.
    Escape,
}

/// Sanitizer for header, path and query values.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    policy: TextPolicy,
    canonicalizer: Canonicalizer,
    safelist: Safelist,
}

impl TextSanitizer {
    /// Creates a sanitizer applying `policy` with the strict text
    /// canonicalizer and the simple-text safelist.
    #[must_use]
    pub fn new(policy: TextPolicy) -> Self {
        Self {
            policy,
            canonicalizer: Canonicalizer::text(),
            safelist: Safelist::simple_text(),
        }
    }

    /// The policy used by [`Sanitize::sanitize`].
    #[must_use]
    pub fn policy(&self) -> TextPolicy {
        self.policy
    }

    /// Sanitizes `value` under an explicit policy.
    ///
    /// # Errors
    ///
    /// Returns the canonicalizer's error for multiply or mixed encoded input
    /// under the cleaning policies.
    pub fn sanitize_with(&self, policy: TextPolicy, value: &str) -> Result<String, SanitizeError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        match policy {
            TextPolicy::Clean => self.clean(value),
            TextPolicy::CleanAndEscape => Ok(escape_html(&self.clean(value)?)),
            TextPolicy::Escape => Ok(escape_html(&escape_xml(&escape_javascript(value)))),
        }
    }

    fn clean(&self, value: &str) -> Result<String, SanitizeError> {
        let canonical = self.canonicalizer.canonicalize(value)?;
        Ok(self.safelist.clean(&canonical))
    }
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new(TextPolicy::default())
    }
}

impl Sanitize for TextSanitizer {
    fn sanitize(&self, literal: &str) -> Result<String, SanitizeError> {
        self.sanitize_with(self.policy, literal)
    }
}

#[cfg(test)]
mod tests;
