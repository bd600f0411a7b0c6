use domtape_tree::{AttrKey, Document, NodeRef};
use smol_str::SmolStr;

use crate::{
    error::ApplyError,
    interpreter::Options,
    ipc::{IpcMessage, IpcSender},
};

/// Whether an event type bubbles, so a single root-level listener can
/// observe it for all descendants.
pub fn event_bubbles(name: &str) -> bool {
    !matches!(
        name,
        "focus"
            | "blur"
            | "dragenter"
            | "dragexit"
            | "mouseenter"
            | "mouseleave"
            | "scroll"
            | "pointerenter"
            | "pointerleave"
            | "abort"
            | "canplay"
            | "canplaythrough"
            | "durationchange"
            | "emptied"
            | "ended"
            | "error"
            | "loadeddata"
            | "loadedmetadata"
            | "loadstart"
            | "pause"
            | "play"
            | "playing"
            | "progress"
            | "ratechange"
            | "seeked"
            | "seeking"
            | "stalled"
            | "suspend"
            | "timeupdate"
            | "volumechange"
            | "waiting"
    )
}

/// A native input event after the host mapped it to a generic payload.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub name: SmolStr,
    pub target: NodeRef,
    pub contents: serde_json::Value,
}

/// What dispatch decided: whether a `user_event` envelope went out, and
/// whether the host should suppress the platform default action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub delivered: bool,
    pub prevent_default: bool,
}

/// Everything dispatch needs, passed explicitly: no captured interpreter
/// state, no way to re-enter the VM loop.
pub(crate) struct DispatchContext<'a> {
    pub document: &'a Document,
    pub options: &'a Options,
    pub ipc: &'a IpcSender,
}

/// Resolves a dispatched event to a logical node id by walking from the
/// originating node up through ancestors to the first identity marker, then
/// posts the `user_event` envelope. Link clicks are redirected to
/// host-level navigation via `browser_open`.
pub(crate) fn dispatch(
    ctx: &DispatchContext<'_>,
    event: &DomEvent,
) -> Result<EventOutcome, ApplyError> {
    let document = ctx.document;
    let mut outcome = EventOutcome::default();

    let Some(origin) = nearest_element(document, event.target)? else {
        return Ok(outcome);
    };
    if !listener_in_reach(document, origin, &event.name)? {
        tracing::debug!("no listener in reach for \"{}\", dropping event", event.name);
        return Ok(outcome);
    }

    let prevent_key = AttrKey::new(ctx.options.prevent_default_attribute.clone());
    let suppressed = format!("on{}", event.name);

    if event.name == "click" {
        let element = document.element(origin)?;
        if element.attribute(&prevent_key) != Some(suppressed.as_str()) && element.tag == "a" {
            if let Some(href) = element
                .attribute(&AttrKey::new("href"))
                .filter(|href| !href.is_empty())
            {
                ctx.ipc.post(IpcMessage::browser_open(href));
            }
            outcome.prevent_default = true;
        }
    }
    if event.name == "submit" {
        outcome.prevent_default = true;
    }

    let marker_key = AttrKey::new(ctx.options.marker_attribute.clone());
    let mut current = origin;
    let mounted_dom_id = loop {
        let marker = document
            .element(current)
            .ok()
            .and_then(|element| element.attribute(&marker_key));
        if let Some(marker) = marker {
            break marker
                .parse::<u64>()
                .map_err(|_| ApplyError::MalformedMarker(marker.to_string()))?;
        }
        match document.parent(current)? {
            Some(parent) => current = parent,
            // reached the root without a marker: nothing to deliver to
            None => return Ok(outcome),
        }
    };

    if document.element(current)?.attribute(&prevent_key) == Some(suppressed.as_str()) {
        outcome.prevent_default = true;
    }

    ctx.ipc.post(IpcMessage::user_event(
        &event.name,
        mounted_dom_id,
        event.contents.clone(),
    ));
    outcome.delivered = true;
    Ok(outcome)
}

fn nearest_element(document: &Document, node: NodeRef) -> Result<Option<NodeRef>, ApplyError> {
    let mut current = Some(node);
    while let Some(node) = current {
        if document.kind(node)?.is_element() {
            return Ok(Some(node));
        }
        current = document.parent(node)?;
    }
    Ok(None)
}

/// True when a root-level (bubbling) attachment exists for the event, or a
/// local attachment sits on the origin or one of its ancestors.
fn listener_in_reach(
    document: &Document,
    origin: NodeRef,
    event: &str,
) -> Result<bool, ApplyError> {
    if document.has_listener(document.root(), event)? {
        return Ok(true);
    }
    let mut current = Some(origin);
    while let Some(node) = current {
        if document.has_listener(node, event)? {
            return Ok(true);
        }
        current = document.parent(node)?;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("click", true)]
    #[case("input", true)]
    #[case("keydown", true)]
    #[case("focus", false)]
    #[case("blur", false)]
    #[case("scroll", false)]
    #[case("mouseenter", false)]
    #[case("mouseleave", false)]
    #[case("pointerenter", false)]
    #[case("timeupdate", false)]
    #[case("encrypted", true)]
    fn test_event_bubbles(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(event_bubbles(name), expected);
    }
}
