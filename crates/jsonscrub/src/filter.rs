//! Request filter: sanitize an incoming request before any handler sees it.
//!
//! [`XssFilter::filter`] is a pure `Request -> Request` stage. It leaves
//! excluded paths alone and otherwise rewrites, in order:
//! - every UTF-8 header value, with the configured [`TextPolicy`];
//! - the path, cleaned and HTML-escaped, then percent-encoded;
//! - every query key and value, pair order kept;
//! - a JSON body, through the string-literal scanner and [`XssSanitizer`];
//! - a form body (`application/x-www-form-urlencoded`), pair by pair like the
//!   query.
//!
//! Query and form components are decoded the way form data is: `+` is a
//! space, then percent escapes are resolved.
use bytes::Bytes;
use http::{
    HeaderMap, HeaderValue, Request, Uri,
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    uri::PathAndQuery,
};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    FilterError, ScrubConfig,
    options::ScanOptions,
    sanitize::{Sanitize, TextPolicy, TextSanitizer, XssSanitizer},
    stream::scrub_bytes,
};

const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const QUERY_VALUE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`');

/// `[filter]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Path prefixes that bypass the filter. A trailing `*` is ignored.
    ///
    /// # Default
    ///
    /// `["/v3/api-docs", "/swagger-ui/"]`
    pub excluded_paths: Vec<String>,
    /// Policy for header and query values.
    ///
    /// # Default
    ///
    /// [`TextPolicy::Clean`]
    pub text_policy: TextPolicy,
    /// Largest JSON or form body, in bytes, the filter will scan.
    ///
    /// # Default
    ///
    /// `1048576` (1 MiB)
    pub max_body_bytes: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_paths: vec!["/v3/api-docs".to_string(), "/swagger-ui/".to_string()],
            text_policy: TextPolicy::default(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Sanitizes headers, URI and JSON or form body of HTTP requests.
///
/// Build it once and share it; filtering does not mutate the filter.
#[derive(Debug, Clone)]
pub struct XssFilter {
    excluded: Vec<String>,
    text: TextSanitizer,
    body: XssSanitizer,
    scan: ScanOptions,
    max_body_bytes: usize,
}

impl XssFilter {
    /// Builds a filter from the `[scan]`, `[sanitize]` and `[filter]`
    /// sections of `config`.
    #[must_use]
    pub fn new(config: &ScrubConfig) -> Self {
        let excluded = config
            .filter
            .excluded_paths
            .iter()
            .map(|p| p.strip_suffix('*').unwrap_or(p).to_string())
            .collect();
        Self {
            excluded,
            text: TextSanitizer::new(config.filter.text_policy),
            body: XssSanitizer::from_config(&config.sanitize),
            scan: config.scan,
            max_body_bytes: config.filter.max_body_bytes,
        }
    }

    /// Whether requests for `path` bypass the filter.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Returns `request` with its headers, URI and body sanitized.
    ///
    /// # Errors
    ///
    /// - [`FilterError::BodyTooLarge`] if a JSON or form body exceeds
    ///   `max_body_bytes`.
    /// - [`FilterError::InvalidHeader`], [`FilterError::InvalidUri`] or
    ///   [`FilterError::InvalidUriParts`] if a sanitized value cannot be put
    ///   back into the request.
    /// - [`FilterError::Scrub`] if sanitizing rejects a value.
    pub fn filter(&self, request: Request<Bytes>) -> Result<Request<Bytes>, FilterError> {
        let path = request.uri().path();
        debug!(path, "filtering request");
        if self.is_excluded(path) {
            debug!(path, "path excluded from filtering");
            return Ok(request);
        }

        let (mut parts, body) = request.into_parts();
        self.sanitize_headers(&mut parts.headers)?;
        parts.uri = self.sanitize_uri(&parts.uri)?;
        let body = if has_media_type(&parts.headers, JSON) {
            self.sanitize_json_body(&mut parts.headers, &body)?
        } else if has_media_type(&parts.headers, FORM) {
            self.sanitize_form_body(&mut parts.headers, &body)?
        } else {
            trace!("body is neither JSON nor a form, passing through");
            body
        };
        Ok(Request::from_parts(parts, body))
    }

    fn sanitize_headers(&self, headers: &mut HeaderMap) -> Result<(), FilterError> {
        for (name, value) in headers.iter_mut() {
            let Ok(text) = value.to_str() else {
                trace!(header = %name, "skipping non-UTF-8 header value");
                continue;
            };
            let clean = self.text.sanitize(text)?;
            if clean == text {
                continue;
            }
            let mut replacement =
                HeaderValue::from_str(&clean).map_err(|_| FilterError::InvalidHeader {
                    name: name.to_string(),
                })?;
            replacement.set_sensitive(value.is_sensitive());
            *value = replacement;
            trace!(header = %name, "sanitized header value");
        }
        Ok(())
    }

    fn sanitize_uri(&self, uri: &Uri) -> Result<Uri, FilterError> {
        let Some(path_and_query) = uri.path_and_query() else {
            return Ok(uri.clone());
        };

        let path = self
            .text
            .sanitize_with(TextPolicy::CleanAndEscape, path_and_query.path())?;
        let mut target = utf8_percent_encode(&path, PATH_SET).to_string();
        trace!(path = %target, "sanitized path");

        if let Some(query) = path_and_query.query() {
            target.push('?');
            target.push_str(&self.sanitize_query(query)?);
        }

        let mut uri_parts = uri.clone().into_parts();
        uri_parts.path_and_query = Some(PathAndQuery::try_from(target)?);
        Ok(Uri::from_parts(uri_parts)?)
    }

    fn sanitize_query(&self, query: &str) -> Result<String, FilterError> {
        let mut out = String::with_capacity(query.len());
        for (i, pair) in query.split('&').enumerate() {
            if i > 0 {
                out.push('&');
            }
            match pair.split_once('=') {
                Some((key, value)) => {
                    self.push_component(&mut out, key)?;
                    out.push('=');
                    self.push_component(&mut out, value)?;
                }
                None => self.push_component(&mut out, pair)?,
            }
        }
        trace!(query = %out, "sanitized query");
        Ok(out)
    }

    fn push_component(&self, out: &mut String, raw: &str) -> Result<(), FilterError> {
        let spaced = raw.replace('+', " ");
        let decoded = percent_decode_str(&spaced).decode_utf8_lossy();
        let clean = self.text.sanitize(&decoded)?;
        out.extend(utf8_percent_encode(&clean, QUERY_VALUE_SET));
        Ok(())
    }

    fn sanitize_json_body(
        &self,
        headers: &mut HeaderMap,
        body: &Bytes,
    ) -> Result<Bytes, FilterError> {
        self.check_body_size(body)?;
        let clean = scrub_bytes(body, &self.body, self.scan)?;
        trace!(before = body.len(), after = clean.len(), "sanitized JSON body");
        Ok(replace_body(headers, clean))
    }

    fn sanitize_form_body(
        &self,
        headers: &mut HeaderMap,
        body: &Bytes,
    ) -> Result<Bytes, FilterError> {
        self.check_body_size(body)?;
        let clean = self.sanitize_query(&String::from_utf8_lossy(body))?;
        trace!(before = body.len(), after = clean.len(), "sanitized form body");
        Ok(replace_body(headers, clean))
    }

    fn check_body_size(&self, body: &Bytes) -> Result<(), FilterError> {
        if body.len() > self.max_body_bytes {
            return Err(FilterError::BodyTooLarge {
                limit: self.max_body_bytes,
                actual: body.len(),
            });
        }
        Ok(())
    }
}

fn replace_body(headers: &mut HeaderMap, body: String) -> Bytes {
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    Bytes::from(body)
}

impl Default for XssFilter {
    fn default() -> Self {
        Self::new(&ScrubConfig::default())
    }
}

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

fn has_media_type(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(expected))
}
