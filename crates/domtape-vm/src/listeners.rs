use domtape_tree::{Document, NodeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::error::ApplyError;

/// Event-listener bookkeeping over the host tree's attach points.
///
/// Bubbling events share a single root-level attachment per event name,
/// reference-counted across logical listeners; non-bubbling events attach
/// directly to their node and are tracked per node id.
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    global: FxHashMap<SmolStr, u32>,
    local: FxHashMap<u64, FxHashSet<SmolStr>>,
}

impl ListenerRegistry {
    pub fn create(
        &mut self,
        document: &mut Document,
        root: NodeRef,
        node: NodeRef,
        node_id: u64,
        event: &str,
        bubbles: bool,
    ) -> Result<(), ApplyError> {
        if bubbles {
            match self.global.get_mut(event) {
                Some(active) => *active += 1,
                None => {
                    document.add_listener(root, event)?;
                    self.global.insert(event.into(), 1);
                }
            }
        } else {
            document.add_listener(node, event)?;
            self.local.entry(node_id).or_default().insert(event.into());
        }
        Ok(())
    }

    pub fn remove(
        &mut self,
        document: &mut Document,
        root: NodeRef,
        node: NodeRef,
        node_id: Option<u64>,
        event: &str,
        bubbles: bool,
    ) -> Result<(), ApplyError> {
        if bubbles {
            let Some(active) = self.global.get_mut(event) else {
                return Err(ApplyError::imbalance(event, true));
            };
            *active -= 1;
            if *active == 0 {
                self.global.remove(event);
                document.remove_listener(root, event)?;
            }
        } else {
            let Some(id) = node_id else {
                return Err(ApplyError::imbalance(event, false));
            };
            let Some(events) = self.local.get_mut(&id) else {
                return Err(ApplyError::imbalance(event, false));
            };
            if !events.remove(event) {
                return Err(ApplyError::imbalance(event, false));
            }
            if events.is_empty() {
                self.local.remove(&id);
            }
            document.remove_listener(node, event)?;
        }
        Ok(())
    }

    pub fn active_count(&self, event: &str) -> Option<u32> {
        self.global.get(event).copied()
    }

    pub fn has_local(&self, node_id: u64, event: &str) -> bool {
        self.local
            .get(&node_id)
            .is_some_and(|events| events.contains(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Document, NodeRef, NodeRef) {
        let mut doc = Document::new();
        let root = doc.root();
        let button = doc.create_element("button");
        doc.append_child(root, button).unwrap();
        (doc, root, button)
    }

    #[test]
    fn test_bubbling_listeners_share_one_attachment() {
        let (mut doc, root, button) = setup();
        let mut registry = ListenerRegistry::default();

        registry
            .create(&mut doc, root, button, 1, "click", true)
            .unwrap();
        registry
            .create(&mut doc, root, button, 2, "click", true)
            .unwrap();

        assert_eq!(registry.active_count("click"), Some(2));
        assert!(doc.has_listener(root, "click").unwrap());
        assert!(!doc.has_listener(button, "click").unwrap());

        registry
            .remove(&mut doc, root, button, Some(1), "click", true)
            .unwrap();
        assert_eq!(registry.active_count("click"), Some(1));
        assert!(doc.has_listener(root, "click").unwrap());

        registry
            .remove(&mut doc, root, button, Some(2), "click", true)
            .unwrap();
        assert_eq!(registry.active_count("click"), None);
        assert!(!doc.has_listener(root, "click").unwrap());
    }

    #[test]
    fn test_local_listeners_attach_to_the_node() {
        let (mut doc, root, button) = setup();
        let mut registry = ListenerRegistry::default();

        registry
            .create(&mut doc, root, button, 4, "focus", false)
            .unwrap();

        assert!(registry.has_local(4, "focus"));
        assert!(doc.has_listener(button, "focus").unwrap());
        assert!(!doc.has_listener(root, "focus").unwrap());

        registry
            .remove(&mut doc, root, button, Some(4), "focus", false)
            .unwrap();
        assert!(!registry.has_local(4, "focus"));
        assert!(!doc.has_listener(button, "focus").unwrap());
    }

    #[test]
    fn test_unbalanced_removal_is_reported() {
        let (mut doc, root, button) = setup();
        let mut registry = ListenerRegistry::default();

        assert_eq!(
            registry.remove(&mut doc, root, button, Some(1), "click", true),
            Err(ApplyError::imbalance("click", true))
        );
        assert_eq!(
            registry.remove(&mut doc, root, button, Some(1), "focus", false),
            Err(ApplyError::imbalance("focus", false))
        );
    }
}
