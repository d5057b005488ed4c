//! A small mutable document tree with mutation records.
//!
//! Nodes are shared handles ([`NodeRef`]) over reference-counted storage.
//! Children are owned by their parent; the parent link is weak, so dropping a
//! detached subtree frees it. Every edit goes through [`Document`], which
//! queues a [`MutationRecord`] while observation is enabled, mirroring what a
//! browser mutation observer would be told.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::DomError;

/// Elements whose text content is never HTML-escaped when serialised.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];
const VOID_ELEMENTS: [&str; 6] = ["br", "hr", "img", "input", "link", "meta"];

enum NodeData {
    Element {
        tag: String,
        attrs: RefCell<Vec<(String, String)>>,
    },
    Text(RefCell<String>),
}

struct Node {
    data: NodeData,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<NodeRef>>,
}

/// Shared handle to a node. Equality is identity.
#[derive(Clone)]
pub struct NodeRef(Rc<Node>);

/// Non-owning handle to a node.
#[derive(Clone)]
pub struct WeakNodeRef(Weak<Node>);

impl WeakNodeRef {
    pub fn upgrade(&self) -> Option<NodeRef> {
        self.0.upgrade().map(NodeRef)
    }
}

impl fmt::Debug for WeakNodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "Weak({node:?})"),
            None => f.write_str("Weak(<dropped>)"),
        }
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { tag, .. } => {
                write!(f, "<{tag}> ({} children)", self.child_count())
            }
            NodeData::Text(text) => write!(f, "#text {:?}", text.borrow()),
        }
    }
}

impl NodeRef {
    fn new(data: NodeData) -> Self {
        NodeRef(Rc::new(Node {
            data,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    /// Identity key, stable for as long as any handle (strong or weak) exists.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn downgrade(&self) -> WeakNodeRef {
        WeakNodeRef(Rc::downgrade(&self.0))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.data, NodeData::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.data, NodeData::Text(_))
    }

    /// Lower-cased tag name of an element.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Character data of a text node.
    pub fn text(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Text(text) => Some(text.borrow().clone()),
            NodeData::Element { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone()),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.0.parent.borrow().upgrade().map(NodeRef)
    }

    pub fn children(&self) -> Vec<NodeRef> {
        self.0.children.borrow().clone()
    }

    pub fn first_child(&self) -> Option<NodeRef> {
        self.0.children.borrow().first().cloned()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    /// This node, then its parent, grandparent and so on.
    pub fn inclusive_ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Nearest inclusive ancestor whose tag is one of `tags`.
    pub fn closest(&self, tags: &[&str]) -> Option<NodeRef> {
        self.inclusive_ancestors()
            .find(|node| node.tag().is_some_and(|tag| tags.contains(&tag)))
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &NodeRef) -> bool {
        other.inclusive_ancestors().any(|node| node == *self)
    }

    /// HTML editing host resolution: the nearest `contenteditable` decides.
    pub fn is_content_editable(&self) -> bool {
        for node in self.inclusive_ancestors() {
            if let Some(value) = node.attribute("contenteditable") {
                match value.trim().to_ascii_lowercase().as_str() {
                    "" | "true" | "plaintext-only" => return true,
                    "false" => return false,
                    _ => {}
                }
            }
        }
        false
    }

    /// Every node of this subtree, this one first, in document order.
    pub fn descendants(&self) -> Vec<NodeRef> {
        let mut found = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.0.children.borrow().iter().rev().cloned());
            found.push(node);
        }
        found
    }

    /// Text nodes of this subtree in document order.
    pub fn text_descendants(&self) -> Vec<NodeRef> {
        self.descendants()
            .into_iter()
            .filter(NodeRef::is_text)
            .collect()
    }

    /// Concatenated character data of the subtree.
    pub fn text_content(&self) -> String {
        self.text_descendants()
            .iter()
            .filter_map(NodeRef::text)
            .collect()
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    fn write_html(&self, out: &mut String, raw: bool) {
        match &self.0.data {
            NodeData::Text(text) => {
                let text = text.borrow();
                if raw {
                    out.push_str(&text);
                } else {
                    escape_into(out, &text, false);
                }
            }
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs.borrow().iter() {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_into(out, value, true);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                let raw_children = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
                for child in self.0.children.borrow().iter() {
                    child.write_html(out, raw_children);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Iterator returned by [`NodeRef::inclusive_ancestors`].
pub struct Ancestors {
    next: Option<NodeRef>,
}

impl Iterator for Ancestors {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes,
}

/// One queued change notification.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// Parent for `ChildList`, the text node for `CharacterData`, the element
    /// for `Attributes`.
    pub target: NodeRef,
    pub added: Vec<NodeRef>,
    pub removed: Vec<NodeRef>,
}

impl MutationRecord {
    fn child_list(target: NodeRef, added: Vec<NodeRef>, removed: Vec<NodeRef>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
        }
    }

    fn single(kind: MutationKind, target: NodeRef) -> Self {
        Self {
            kind,
            target,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Owner of a tree rooted at `<body>` and of its mutation queue.
pub struct Document {
    body: NodeRef,
    observing: Cell<bool>,
    records: RefCell<Vec<MutationRecord>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("body", &self.body)
            .field("observing", &self.observing.get())
            .field("pending_records", &self.records.borrow().len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: NodeRef::new(NodeData::Element {
                tag: "body".to_string(),
                attrs: RefCell::new(Vec::new()),
            }),
            observing: Cell::new(false),
            records: RefCell::new(Vec::new()),
        }
    }

    pub fn body(&self) -> NodeRef {
        self.body.clone()
    }

    pub fn create_element(&self, tag: &str) -> NodeRef {
        NodeRef::new(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: RefCell::new(Vec::new()),
        })
    }

    pub fn create_text(&self, text: &str) -> NodeRef {
        NodeRef::new(NodeData::Text(RefCell::new(text.to_string())))
    }

    /// Start queueing mutation records.
    pub fn observe(&self) {
        self.observing.set(true);
    }

    /// Stop queueing and drop anything pending.
    pub fn disconnect(&self) {
        self.observing.set(false);
        self.records.borrow_mut().clear();
    }

    pub fn is_observed(&self) -> bool {
        self.observing.get()
    }

    pub fn take_records(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut *self.records.borrow_mut())
    }

    pub fn pending_records(&self) -> usize {
        self.records.borrow().len()
    }

    fn record(&self, record: MutationRecord) {
        if self.observing.get() {
            self.records.borrow_mut().push(record);
        }
    }

    fn check_insert(&self, parent: &NodeRef, child: &NodeRef) -> Result<(), DomError> {
        if !parent.is_element() {
            return Err(DomError::NotAnElement);
        }
        if child.contains(parent) {
            return Err(DomError::HierarchyCycle);
        }
        Ok(())
    }

    fn detach(&self, node: &NodeRef) {
        if let Some(old_parent) = node.parent() {
            old_parent.0.children.borrow_mut().retain(|c| c != node);
            node.0.parent.replace(Weak::new());
            self.record(MutationRecord::child_list(
                old_parent,
                Vec::new(),
                vec![node.clone()],
            ));
        }
    }

    /// Append `child` to `parent`, moving it out of any previous parent.
    pub fn append_child(&self, parent: &NodeRef, child: &NodeRef) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        child.0.parent.replace(Rc::downgrade(&parent.0));
        parent.0.children.borrow_mut().push(child.clone());
        self.record(MutationRecord::child_list(
            parent.clone(),
            vec![child.clone()],
            Vec::new(),
        ));
        Ok(())
    }

    pub fn remove_child(&self, parent: &NodeRef, child: &NodeRef) -> Result<(), DomError> {
        if child.parent().as_ref() != Some(parent) {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    /// Put `new_child` where `old_child` is. `old_child` ends up detached.
    pub fn replace_child(
        &self,
        parent: &NodeRef,
        new_child: &NodeRef,
        old_child: &NodeRef,
    ) -> Result<(), DomError> {
        if old_child.parent().as_ref() != Some(parent) {
            return Err(DomError::NotAChild);
        }
        if new_child == old_child {
            return Ok(());
        }
        self.check_insert(parent, new_child)?;
        self.detach(new_child);

        let index = parent
            .0
            .children
            .borrow()
            .iter()
            .position(|c| c == old_child)
            .ok_or(DomError::NotAChild)?;
        parent.0.children.borrow_mut()[index] = new_child.clone();
        old_child.0.parent.replace(Weak::new());
        new_child.0.parent.replace(Rc::downgrade(&parent.0));
        self.record(MutationRecord::child_list(
            parent.clone(),
            vec![new_child.clone()],
            vec![old_child.clone()],
        ));
        Ok(())
    }

    /// Replace the character data of a text node.
    pub fn set_text(&self, node: &NodeRef, text: &str) -> Result<(), DomError> {
        match &node.0.data {
            NodeData::Text(data) => {
                *data.borrow_mut() = text.to_string();
                self.record(MutationRecord::single(
                    MutationKind::CharacterData,
                    node.clone(),
                ));
                Ok(())
            }
            NodeData::Element { .. } => Err(DomError::NotAText),
        }
    }

    pub fn set_attribute(&self, element: &NodeRef, name: &str, value: &str) -> Result<(), DomError> {
        let NodeData::Element { attrs, .. } = &element.0.data else {
            return Err(DomError::NotAnElement);
        };
        {
            let mut attrs = attrs.borrow_mut();
            match attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_ascii_lowercase(), value.to_string())),
            }
        }
        self.record(MutationRecord::single(
            MutationKind::Attributes,
            element.clone(),
        ));
        Ok(())
    }

    /// Create `<tag>` and append it to `parent`.
    pub fn append_element(&self, parent: &NodeRef, tag: &str) -> Result<NodeRef, DomError> {
        let element = self.create_element(tag);
        self.append_child(parent, &element)?;
        Ok(element)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&self, parent: &NodeRef, text: &str) -> Result<NodeRef, DomError> {
        let node = self.create_text(text);
        self.append_child(parent, &node)?;
        Ok(node)
    }

    /// Serialised `<body>`.
    pub fn to_html(&self) -> String {
        self.body.outer_html()
    }
}
