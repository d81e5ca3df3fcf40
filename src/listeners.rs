//! Explicit event bindings.
//!
//! Every surface the controller listens to is bound through the registry,
//! which hands back a [`Registration`]. Disposing a registration removes its
//! bindings; the controller disposes all of them on teardown.

use serde::{Deserialize, Serialize};

/// A UI surface that produces events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    FileInput,
    DropZone,
    ColorCount,
    FormatSelector,
    Palette,
    ThemeToggle,
    SystemTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Change,
    Input,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    Activate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    bound: Vec<(ListenerId, Surface, EventKind)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind one `(surface, kind)` pair.
    pub fn register(&mut self, surface: Surface, kind: EventKind) -> Registration {
        self.register_all(surface, &[kind])
    }

    /// Bind several kinds on one surface under a single disposer.
    pub fn register_all(&mut self, surface: Surface, kinds: &[EventKind]) -> Registration {
        let ids = kinds
            .iter()
            .map(|&kind| {
                let id = ListenerId(self.next_id);
                self.next_id += 1;
                self.bound.push((id, surface, kind));
                id
            })
            .collect();
        Registration { ids }
    }

    pub fn is_bound(&self, surface: Surface, kind: EventKind) -> bool {
        self.bound.iter().any(|&(_, s, k)| s == surface && k == kind)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    fn remove(&mut self, ids: &[ListenerId]) {
        self.bound.retain(|(id, _, _)| !ids.contains(id));
    }
}

/// Disposer for the bindings created by one `register` call.
#[must_use = "dropping a Registration without disposing it leaks its bindings"]
#[derive(Debug)]
pub struct Registration {
    ids: Vec<ListenerId>,
}

impl Registration {
    pub fn dispose(self, registry: &mut ListenerRegistry) {
        registry.remove(&self.ids);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
