use domtape_tree::{AttrKey, Document, NodeRef};

use crate::error::ApplyError;

/// HTML boolean attributes: present means true, absent means false. Setting
/// one to the literal string "false" must remove it rather than store the
/// string. Sorted for binary search.
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "allowpaymentrequest",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
    "truespeed",
];

pub(crate) fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES.binary_search(&name).is_ok()
}

/// Applies one attribute write. `value`, `checked` and `selected` are live
/// UI state and land on element properties; the `style` namespace writes
/// style properties; `inner_html` is the raw-content escape hatch; boolean
/// attributes set to "false" are removed; everything else is a plain
/// (optionally namespaced) attribute.
pub(crate) fn set_attribute(
    document: &mut Document,
    node: NodeRef,
    name: &str,
    namespace: Option<&str>,
    value: &str,
) -> Result<(), ApplyError> {
    match namespace {
        Some("style") => {
            document.element_mut(node)?.set_style_property(name, value);
        }
        Some(ns) => {
            document
                .element_mut(node)?
                .set_attribute(AttrKey::namespaced(name, ns), value);
        }
        None => match name {
            "value" => {
                let element = document.element_mut(node)?;
                if element.props.value.as_deref() != Some(value) {
                    element.props.value = Some(value.to_string());
                }
            }
            "checked" => document.element_mut(node)?.props.checked = value == "true",
            "selected" => document.element_mut(node)?.props.selected = value == "true",
            "inner_html" => document.set_raw_inner(node, value)?,
            _ if value == "false" && is_boolean_attribute(name) => {
                document.element_mut(node)?.remove_attribute(&AttrKey::new(name));
            }
            _ => {
                document
                    .element_mut(node)?
                    .set_attribute(AttrKey::new(name), value);
            }
        },
    }
    Ok(())
}

/// The inverse of [`set_attribute`]: properties reset to their defaults,
/// style properties and plain attributes are cleared. Removal without a
/// namespace never touches namespaced entries.
pub(crate) fn remove_attribute(
    document: &mut Document,
    node: NodeRef,
    name: &str,
    namespace: Option<&str>,
) -> Result<(), ApplyError> {
    match namespace {
        Some("style") => {
            document.element_mut(node)?.remove_style_property(name);
        }
        Some(ns) => {
            document
                .element_mut(node)?
                .remove_attribute(&AttrKey::namespaced(name, ns));
        }
        None => match name {
            "value" => document.element_mut(node)?.props.value = None,
            "checked" => document.element_mut(node)?.props.checked = false,
            "selected" => document.element_mut(node)?.props.selected = false,
            "inner_html" => document.clear_inner(node)?,
            _ => {
                document.element_mut(node)?.remove_attribute(&AttrKey::new(name));
            }
        },
    }
    Ok(())
}
