/*!
 * HTML do-not-translate codec.
 *
 * Protection rewrites the pieces of a document that a translation service
 * must not touch into inert markup; restoration reverses every rewrite. Both
 * directions parse the document (see [`super::dom`]), rewrite nodes in place
 * and serialize the result.
 */

use log::debug;
use markup5ever_rcdom::{Handle, RcDom};
use once_cell::sync::Lazy;
use regex::Regex;

use super::dom;
use super::json;
use super::{DntCodec, DntOptions, FileType, TranslateConfig};
use crate::errors::DntError;

/// Icon shorthand in text, e.g. `:happy:`
static ICON_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([a-zA-Z][a-zA-Z0-9_-]*):").expect("Invalid icon token regex")
});

/// Class list of an icon placeholder produced by protection
static ICON_CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*icon\s+icon-([a-zA-Z0-9_-]+)\s*$").expect("Invalid icon class regex")
});

/// Stand-in for the translatable segment inside protected alt metadata
pub const ALT_PLACEHOLDER: &str = "*alt-placeholder*";

/// Side attribute holding protected alt metadata
pub const DNT_ALT_ATTRIBUTE: &str = "dnt-alt-content";

/// Class of a wrapped do-not-translate term
const DNT_TERM_CLASS: &str = "dnt-term";

/// Attributes that carry media references
const MEDIA_ATTRIBUTES: [&str; 2] = ["src", "srcset"];

/// Site chrome dropped when it carries no content
const CHROME_ELEMENTS: [&str; 2] = ["header", "footer"];

/// Default codec for HTML documents and JSON sheets
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDntCodec;

impl DntCodec for HtmlDntCodec {
    fn add_dnt(&self, content: &str, config: &TranslateConfig, opts: &DntOptions) -> Result<String, DntError> {
        let html = match opts.file_type {
            FileType::Json => json::to_envelope(content, config)?,
            FileType::Html => content.to_string(),
        };

        let doc = dom::parse(&html);
        drop_empty_chrome(&doc);
        protect_text(&doc, config);

        let media = match (opts.org.as_deref(), opts.site.as_deref()) {
            (Some(org), Some(site)) => Some(site_media_regex(org, site)),
            _ => None,
        };
        for element in dom::elements(&doc.document) {
            protect_alt(&element);
            if let Some(re) = media.as_ref() {
                relativize_media(&element, re);
            }
        }

        let html = dom::to_html(&doc)?;
        debug!("Protected {} bytes of {:?} content", html.len(), opts.file_type);
        Ok(html)
    }

    fn remove_dnt(&self, content: &str, org: &str, site: &str, opts: &DntOptions) -> Result<String, DntError> {
        if org.trim().is_empty() {
            return Err(DntError::MissingContext("org"));
        }
        if site.trim().is_empty() {
            return Err(DntError::MissingContext("site"));
        }

        let doc = dom::parse(content);
        restore_spans(&doc);

        let origin = format!("https://main--{}--{}.aem.live/media_", site, org);
        for element in dom::elements(&doc.document) {
            restore_alt(&element);
            absolutize_media(&element, &origin);
        }

        match opts.file_type {
            FileType::Json => json::from_dom(&doc),
            FileType::Html => dom::to_html(&doc),
        }
    }
}

/// Parse and re-serialize with explicit `<html>`, `<head>` and `<body>`,
/// dropping empty site chrome
pub fn canonicalize(input: &str) -> Result<String, DntError> {
    let doc = dom::parse(input);
    drop_empty_chrome(&doc);
    dom::to_html(&doc)
}

fn drop_empty_chrome(doc: &RcDom) {
    for element in dom::elements(&doc.document) {
        let is_chrome = dom::get_node_name(&element).is_some_and(|name| CHROME_ELEMENTS.contains(&name));
        if is_chrome
            && dom::child_elements(&element).is_empty()
            && dom::text_content(&element).trim().is_empty()
        {
            dom::replace_node(&element, Vec::new());
        }
    }
}

/// Matcher for the current site's published media origin
fn site_media_regex(org: &str, site: &str) -> Regex {
    let pattern = format!(
        r"(?i)https://main--{}--{}\.aem\.live/media_",
        regex::escape(site),
        regex::escape(org)
    );
    Regex::new(&pattern).expect("Escaped site media pattern is always valid")
}

/// A run of text split around icons and protected terms
enum Piece<'a> {
    Text(&'a str),
    Icon(&'a str),
    Term(&'a str),
}

/// Replace icon tokens and wrap configured terms in every text node
fn protect_text(doc: &RcDom, config: &TranslateConfig) {
    let terms = config.term_regex();
    for node in dom::text_nodes(&doc.document) {
        let text = dom::text_content(&node);
        let pieces = split_text(&text, terms.as_ref());
        if pieces.iter().all(|piece| matches!(piece, Piece::Text(_))) {
            continue;
        }

        let replacements = pieces
            .into_iter()
            .map(|piece| match piece {
                Piece::Text(text) => dom::create_text(text),
                Piece::Icon(name) => dom::create_span(doc, &[("class", format!("icon icon-{}", name))]),
                Piece::Term(term) => {
                    let span = dom::create_span(
                        doc,
                        &[("class", DNT_TERM_CLASS.to_string()), ("translate", "no".to_string())],
                    );
                    dom::append_child(&span, dom::create_text(term));
                    span
                }
            })
            .collect();
        dom::replace_node(&node, replacements);
    }
}

fn split_text<'a>(text: &'a str, terms: Option<&Regex>) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for cap in ICON_TOKEN_REGEX.captures_iter(text) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        split_terms(&text[last..whole.start()], terms, &mut pieces);
        pieces.push(Piece::Icon(name.as_str()));
        last = whole.end();
    }
    split_terms(&text[last..], terms, &mut pieces);
    pieces
}

fn split_terms<'a>(text: &'a str, terms: Option<&Regex>, pieces: &mut Vec<Piece<'a>>) {
    let mut last = 0;
    if let Some(re) = terms {
        for m in re.find_iter(text) {
            if m.start() > last {
                pieces.push(Piece::Text(&text[last..m.start()]));
            }
            pieces.push(Piece::Term(m.as_str()));
            last = m.end();
        }
    }
    if last < text.len() {
        pieces.push(Piece::Text(&text[last..]));
    }
}

/// Turn icon placeholders back into tokens and unwrap protected terms
fn restore_spans(doc: &RcDom) {
    for element in dom::elements(&doc.document) {
        if dom::get_node_name(&element) != Some("span") {
            continue;
        }
        let class = dom::get_node_attr(&element, "class").unwrap_or_default();
        if let Some(cap) = ICON_CLASS_REGEX.captures(&class) {
            if dom::child_elements(&element).is_empty() {
                let token = dom::create_text(&format!(":{}:", &cap[1]));
                dom::replace_node(&element, vec![token]);
            }
        } else if class == DNT_TERM_CLASS {
            dom::unwrap_node(&element);
        }
    }
}

/// Move pipe-delimited alt metadata into the side attribute
fn protect_alt(node: &Handle) {
    let Some(alt) = dom::get_node_attr(node, "alt") else {
        return;
    };
    let mut parts: Vec<String> = alt.split('|').map(str::to_string).collect();
    if parts.len() < 2 {
        return;
    }

    let segment = &parts[1];
    let display = segment.trim().to_string();
    let leading = segment[..segment.len() - segment.trim_start().len()].to_string();
    let trailing = if display.is_empty() {
        String::new()
    } else {
        segment[segment.trim_end().len()..].to_string()
    };
    parts[1] = format!("{}{}{}", leading, ALT_PLACEHOLDER, trailing);

    dom::set_node_attr(node, "alt", Some(display));
    dom::set_node_attr(node, DNT_ALT_ATTRIBUTE, Some(parts.join("|")));
}

/// Rebuild alt metadata around the translated display text
fn restore_alt(node: &Handle) {
    let Some(protected) = dom::get_node_attr(node, DNT_ALT_ATTRIBUTE) else {
        return;
    };
    let translated = dom::get_node_attr(node, "alt").unwrap_or_default();
    dom::set_node_attr(node, DNT_ALT_ATTRIBUTE, None);
    dom::set_node_attr(node, "alt", Some(protected.replacen(ALT_PLACEHOLDER, &translated, 1)));
}

/// Rewrite current-site media references to relative form
fn relativize_media(node: &Handle, site_media: &Regex) {
    for name in MEDIA_ATTRIBUTES {
        if let Some(value) = dom::get_node_attr(node, name) {
            if site_media.is_match(&value) {
                let relative = site_media.replace_all(&value, "./media_").into_owned();
                dom::set_node_attr(node, name, Some(relative));
            }
        }
    }
}

/// Rewrite relative media references back to the site origin
fn absolutize_media(node: &Handle, origin: &str) {
    for name in MEDIA_ATTRIBUTES {
        if let Some(value) = dom::get_node_attr(node, name) {
            if value.contains("./media_") {
                let absolute = value
                    .split(',')
                    .map(|candidate| {
                        let trimmed = candidate.trim_start();
                        let indent = &candidate[..candidate.len() - trimmed.len()];
                        match trimmed.strip_prefix("./media_") {
                            Some(rest) => format!("{}{}{}", indent, origin, rest),
                            None => candidate.to_string(),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                dom::set_node_attr(node, name, Some(absolute));
            }
        }
    }
}
