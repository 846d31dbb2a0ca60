//! Allow-list markup cleaner built on [`ammonia`].
//!
//! A [`Safelist`] names the tags, attributes and URL schemes that may
//! survive cleaning. Input is parsed as an HTML5 fragment, so misnested and
//! unclosed tags are repaired the way a browser would. Everything else is
//! removed:
//! - a disallowed tag is dropped but the text inside it is kept;
//! - `<script>` and `<style>` are dropped together with their content;
//! - comments are dropped;
//! - URL attributes without an allowed scheme, relative URLs included, are
//!   dropped.
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use ammonia::{Builder, UrlRelative};
use serde::{Deserialize, Serialize};

const CLEAN_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// Named allow-list presets, as selected from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafelistPreset {
    /// Text only; every tag is removed.
    None,
    /// Simple inline formatting: `b em i strong u`.
    SimpleText,
    /// Text formatting, lists, quotes and links.
    Basic,
    /// [`Basic`](Self::Basic) plus headings, `div`, tables and images.
    #[default]
    Relaxed,
}

impl SafelistPreset {
    /// Builds the safelist this preset names.
    #[must_use]
    pub fn build(self) -> Safelist {
        match self {
            SafelistPreset::None => Safelist::none(),
            SafelistPreset::SimpleText => Safelist::simple_text(),
            SafelistPreset::Basic => Safelist::basic(),
            SafelistPreset::Relaxed => Safelist::relaxed(),
        }
    }
}

/// Tags, attributes and URL schemes allowed through [`Safelist::clean`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Safelist {
    tags: BTreeSet<&'static str>,
    tag_attributes: BTreeMap<&'static str, BTreeSet<&'static str>>,
    url_schemes: BTreeSet<&'static str>,
    link_rel: Option<&'static str>,
}

impl Safelist {
    /// A safelist that allows no markup at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            tags: BTreeSet::new(),
            tag_attributes: BTreeMap::new(),
            url_schemes: BTreeSet::new(),
            link_rel: None,
        }
    }

    /// Allows `b em i strong u`, without attributes.
    #[must_use]
    pub fn simple_text() -> Self {
        Self::none().add_tags(&["b", "em", "i", "strong", "u"])
    }

    /// Allows inline formatting, lists, quotes and links.
    ///
    /// URLs must use `ftp`, `http`, `https` or `mailto`, and links get
    /// `rel="nofollow"`.
    #[must_use]
    pub fn basic() -> Self {
        Self::none()
            .add_tags(&[
                "a", "b", "blockquote", "br", "cite", "code", "dd", "dl", "dt", "em", "i", "li",
                "ol", "p", "pre", "q", "small", "span", "strike", "strong", "sub", "sup", "u",
                "ul",
            ])
            .add_attributes("a", &["href"])
            .add_attributes("blockquote", &["cite"])
            .add_attributes("q", &["cite"])
            .add_url_schemes(&["ftp", "http", "https", "mailto"])
            .link_rel(Some("nofollow"))
    }

    /// Allows a wide range of text and structural markup, including tables
    /// and images. Links are not forced to `nofollow`.
    #[must_use]
    pub fn relaxed() -> Self {
        Self::none()
            .add_tags(&[
                "a", "b", "blockquote", "br", "caption", "cite", "code", "col", "colgroup", "dd",
                "div", "dl", "dt", "em", "h1", "h2", "h3", "h4", "h5", "h6", "i", "img", "li",
                "ol", "p", "pre", "q", "small", "span", "strike", "strong", "sub", "sup",
                "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u", "ul",
            ])
            .add_attributes("a", &["href", "title"])
            .add_attributes("blockquote", &["cite"])
            .add_attributes("col", &["span", "width"])
            .add_attributes("colgroup", &["span", "width"])
            .add_attributes("img", &["align", "alt", "height", "src", "title", "width"])
            .add_attributes("ol", &["start", "type"])
            .add_attributes("q", &["cite"])
            .add_attributes("table", &["summary", "width"])
            .add_attributes("td", &["abbr", "axis", "colspan", "rowspan", "width"])
            .add_attributes("th", &["abbr", "axis", "colspan", "rowspan", "scope", "width"])
            .add_attributes("ul", &["type"])
            .add_url_schemes(&["ftp", "http", "https", "mailto"])
    }

    /// Allows additional tags. `script` and `style` are never allowed.
    #[must_use]
    pub fn add_tags(mut self, tags: &[&'static str]) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Allows attributes on `tag`, allowing the tag too.
    #[must_use]
    pub fn add_attributes(mut self, tag: &'static str, attributes: &[&'static str]) -> Self {
        self.tags.insert(tag);
        self.tag_attributes.entry(tag).or_default().extend(attributes);
        self
    }

    /// Allows URL schemes in URL attributes such as `href`, `src` and `cite`.
    #[must_use]
    pub fn add_url_schemes(mut self, schemes: &[&'static str]) -> Self {
        self.url_schemes.extend(schemes);
        self
    }

    /// Sets the `rel` value forced onto every `a`. Any `rel` from the input
    /// is dropped while this is set.
    #[must_use]
    pub fn link_rel(mut self, rel: Option<&'static str>) -> Self {
        self.link_rel = rel;
        self
    }

    /// Whether `tag` (lowercase) is allowed.
    #[must_use]
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag) && !CLEAN_CONTENT_TAGS.contains(&tag)
    }

    /// Removes everything from `input` that this safelist does not allow.
    #[must_use]
    pub fn clean(&self, input: &str) -> String {
        let tags: HashSet<&str> = self
            .tags
            .iter()
            .copied()
            .filter(|tag| !CLEAN_CONTENT_TAGS.contains(tag))
            .collect();
        // ammonia refuses a `rel` attribute on `a` alongside `link_rel`.
        let tag_attributes: HashMap<&str, HashSet<&str>> = self
            .tag_attributes
            .iter()
            .map(|(&tag, attributes)| {
                let attributes = attributes
                    .iter()
                    .copied()
                    .filter(|&a| !(self.link_rel.is_some() && tag == "a" && a == "rel"))
                    .collect();
                (tag, attributes)
            })
            .collect();

        Builder::empty()
            .tags(tags)
            .clean_content_tags(CLEAN_CONTENT_TAGS.into_iter().collect())
            .tag_attributes(tag_attributes)
            .url_schemes(self.url_schemes.iter().copied().collect())
            .url_relative(UrlRelative::Deny)
            .link_rel(self.link_rel)
            .strip_comments(true)
            .clean(input)
            .to_string()
    }
}

impl Default for Safelist {
    fn default() -> Self {
        Self::relaxed()
    }
}
