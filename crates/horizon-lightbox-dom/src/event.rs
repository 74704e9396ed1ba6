//! DOM event types and listener storage.
//!
//! Events are dispatched by
//! [`Document::dispatch_event`](crate::Document::dispatch_event)
//! along the bubble path: the target first, then each ancestor, then the
//! document itself. Every listener registered on a hop runs, even if an
//! earlier one on the same hop calls [`DomEvent::stop_propagation`]; the
//! walk stops before the next hop.

use std::fmt;
use std::sync::Arc;

use crate::{Document, NodeId};

/// The event types the document model dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A primary-button click (or synthetic activation).
    Click,
    /// A key press.
    KeyDown,
}

impl EventKind {
    /// The DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched event.
#[derive(Debug, Clone)]
pub struct DomEvent {
    kind: EventKind,
    target: NodeId,
    current_target: Option<NodeId>,
    key: Option<String>,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl DomEvent {
    /// Create a click event aimed at `target`.
    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target, None)
    }

    /// Create a keydown event aimed at `target`.
    ///
    /// `key` uses the `KeyboardEvent.key` vocabulary (`"Enter"`, `" "`,
    /// `"Escape"`, ...).
    pub fn key_down(target: NodeId, key: impl Into<String>) -> Self {
        Self::new(EventKind::KeyDown, target, Some(key.into()))
    }

    fn new(kind: EventKind, target: NodeId, key: Option<String>) -> Self {
        Self {
            kind,
            target,
            current_target: Some(target),
            key,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// The event type.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The node the event was dispatched to.
    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listeners are running, or `None` while document-level
    /// listeners run.
    #[inline]
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// The key for keyboard events.
    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Stop the event from reaching further hops of the bubble path.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether [`stop_propagation`](Self::stop_propagation) was called.
    #[inline]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Cancel the event's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    #[inline]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub(crate) fn set_current_target(&mut self, current: Option<NodeId>) {
        self.current_target = current;
    }
}

/// Callback invoked for each matching event.
///
/// Listeners receive the document mutably so they can react by changing the
/// tree, including removing nodes that are still on the bubble path.
pub type EventCallback = Arc<dyn Fn(&mut Document, &mut DomEvent) + Send + Sync>;

/// Identifies a registered listener so it can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// A registered listener.
#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) kind: EventKind,
    pub(crate) callback: EventCallback,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Result of dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event reached the end of its path without being cancelled.
    Completed,
    /// A listener called `prevent_default`.
    DefaultPrevented,
    /// The target node does not exist.
    TargetNotFound,
}

impl DispatchOutcome {
    /// Check whether the default action should run.
    pub fn should_run_default(&self) -> bool {
        matches!(self, Self::Completed)
    }
}
