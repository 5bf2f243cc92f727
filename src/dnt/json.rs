/*!
 * HTML envelope for JSON documents.
 *
 * Sheets and other JSON documents are carried through translation as HTML so
 * they share the HTML protection rules. Every JSON value becomes a `div`:
 * containers nest, object members carry their key in `data-key`, and every
 * value carries its JSON type in `data-type`. Only string values are
 * translatable; numbers, booleans, nulls and strings under configured keys are
 * marked `translate="no"`.
 */

use markup5ever_rcdom::{Handle, RcDom};
use serde_json::{Map, Value};

use super::dom;
use super::TranslateConfig;
use crate::errors::DntError;

/// Convert a JSON document into its HTML envelope
pub fn to_envelope(json: &str, config: &TranslateConfig) -> Result<String, DntError> {
    let value: Value = serde_json::from_str(json).map_err(|e| DntError::InvalidJson(e.to_string()))?;

    let mut out = String::from("<html><head></head><body>\n<main>\n");
    write_value(&mut out, None, &value, config, 0);
    out.push_str("</main>\n</body></html>");
    Ok(out)
}

fn write_value(out: &mut String, key: Option<&str>, value: &Value, config: &TranslateConfig, depth: usize) {
    let indent = "  ".repeat(depth);
    let key_attr = key
        .map(|k| format!(r#" data-key="{}""#, escape(k, true)))
        .unwrap_or_default();

    match value {
        Value::Object(map) => {
            out.push_str(&format!("{}<div{} data-type=\"object\">\n", indent, key_attr));
            for (child_key, child) in map {
                write_value(out, Some(child_key), child, config, depth + 1);
            }
            out.push_str(&format!("{}</div>\n", indent));
        }
        Value::Array(items) => {
            out.push_str(&format!("{}<div{} data-type=\"array\">\n", indent, key_attr));
            for item in items {
                write_value(out, None, item, config, depth + 1);
            }
            out.push_str(&format!("{}</div>\n", indent));
        }
        Value::String(text) => {
            let protected = key.is_some_and(|k| config.is_dnt_json_key(k));
            let translate = if protected { r#" translate="no""# } else { "" };
            out.push_str(&format!(
                "{}<div{} data-type=\"string\"{}>{}</div>\n",
                indent,
                key_attr,
                translate,
                escape(text, false)
            ));
        }
        scalar => {
            let type_name = match scalar {
                Value::Number(_) => "number",
                Value::Bool(_) => "boolean",
                _ => "null",
            };
            out.push_str(&format!(
                "{}<div{} data-type=\"{}\" translate=\"no\">{}</div>\n",
                indent, key_attr, type_name, scalar
            ));
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode an HTML envelope back into a JSON document
pub fn from_envelope(html: &str) -> Result<String, DntError> {
    from_dom(&dom::parse(html))
}

/// Decode an already parsed envelope
pub fn from_dom(doc: &RcDom) -> Result<String, DntError> {
    let root = dom::elements(&doc.document)
        .into_iter()
        .find(|node| dom::get_node_attr(node, "data-type").is_some())
        .ok_or_else(|| DntError::MalformedEnvelope("no JSON value found".to_string()))?;
    let value = decode_value(&root)?;
    serde_json::to_string(&value).map_err(|e| DntError::MalformedEnvelope(e.to_string()))
}

/// Nearest typed descendants, looking through tags a translator may have added
fn typed_children(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    for child in dom::child_elements(node) {
        if dom::get_node_attr(&child, "data-type").is_some() {
            found.push(child);
        } else {
            found.extend(typed_children(&child));
        }
    }
    found
}

fn decode_value(node: &Handle) -> Result<Value, DntError> {
    let kind = dom::get_node_attr(node, "data-type").unwrap_or_else(|| "string".to_string());

    let value = match kind.as_str() {
        "object" => {
            let mut map = Map::new();
            for child in typed_children(node) {
                let key = dom::get_node_attr(&child, "data-key")
                    .ok_or_else(|| DntError::MalformedEnvelope("object member without data-key".to_string()))?;
                map.insert(key, decode_value(&child)?);
            }
            Value::Object(map)
        }
        "array" => Value::Array(
            typed_children(node)
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        "string" => Value::String(dom::text_content(node)),
        scalar => {
            let text = dom::text_content(node);
            serde_json::from_str(text.trim())
                .map_err(|e| DntError::MalformedEnvelope(format!("invalid {} value: {}", scalar, e)))?
        }
    };

    Ok(value)
}
