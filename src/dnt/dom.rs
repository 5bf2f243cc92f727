/*!
 * DOM helpers for the DNT codec.
 *
 * Documents are parsed with html5ever into an `RcDom`, rewritten in place and
 * serialized back. Parsing always yields explicit `<html>`, `<head>` and
 * `<body>` elements.
 */

use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, parse_document, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::DntError;

/// Elements whose text content is never rewritten
const OPAQUE_ELEMENTS: [&str; 4] = ["script", "style", "title", "textarea"];

/// Parse a full document or fragment
pub fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Serialize a parsed document back to markup
pub fn to_html(dom: &RcDom) -> Result<String, DntError> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| DntError::Serialize(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| DntError::Serialize(e.to_string()))
}

pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Value of an attribute on an element node
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Set an attribute in place, appending it when absent; `None` removes it
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();

    match (attrs.iter().position(|attr| &*attr.name.local == attr_name), attr_value) {
        (Some(i), Some(value)) => {
            attrs[i].value.clear();
            attrs[i].value.push_slice(&value);
        }
        (Some(i), None) => {
            attrs.remove(i);
        }
        (None, Some(value)) => attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(attr_name)),
            value: format_tendril!("{}", value),
        }),
        (None, None) => {}
    }
}

/// New `<span>` carrying the given attributes
pub fn create_span(dom: &RcDom, attrs: &[(&str, String)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: format_tendril!("{}", value),
        })
        .collect();
    create_element(dom, QualName::new(None, ns!(html), LocalName::from("span")), attrs)
}

pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// Attach `child` as the last child of `parent`
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Parent of a node, leaving its parent link untouched
pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Swap `node` for `replacements` inside its parent
pub fn replace_node(node: &Handle, replacements: Vec<Handle>) {
    let Some(parent) = parent_of(node) else {
        return;
    };
    for replacement in &replacements {
        replacement.parent.set(Some(Rc::downgrade(&parent)));
    }

    let mut children = parent.children.borrow_mut();
    if let Some(i) = children.iter().position(|child| Rc::ptr_eq(child, node)) {
        children.splice(i..=i, replacements);
        node.parent.set(None);
    }
}

/// Replace an element with its own children
pub fn unwrap_node(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    replace_node(node, children);
}

/// Every element under `node`, in document order
pub fn elements(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_elements(node, &mut found);
    found
}

fn collect_elements(node: &Handle, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if let NodeData::Element { .. } = child.data {
            found.push(child.clone());
        }
        collect_elements(child, found);
    }
}

/// Every text node under `node` outside script-like elements
pub fn text_nodes(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_text(node, &mut found);
    found
}

fn collect_text(node: &Handle, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { .. } => found.push(child.clone()),
            NodeData::Element { name, .. } if OPAQUE_ELEMENTS.contains(&name.local.as_ref()) => {}
            _ => collect_text(child, found),
        }
    }
}

/// Concatenated text of a node and all its descendants
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

fn push_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        push_text(child, out);
    }
}

/// Element children of a node
pub fn child_elements(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}
