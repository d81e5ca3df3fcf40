use crate::listeners::{EventKind, ListenerRegistry, Registration, Surface};
use crate::validate::CandidateFile;

const IDLE_LABEL: &str = "Image upload area";
const ACTIVE_LABEL: &str = "Release to upload image";

/// Drag lifecycle events over the drop zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    /// Files in the order the host reported them.
    Drop(Vec<CandidateFile>),
}

impl DragEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DragEvent::Enter => EventKind::DragEnter,
            DragEvent::Over => EventKind::DragOver,
            DragEvent::Leave => EventKind::DragLeave,
            DragEvent::Drop(_) => EventKind::Drop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Hover state changed, nothing to hand over.
    Ignored,
    /// Nothing dropped, or not an image.
    Rejected,
    /// Feed this file into the regular intake path.
    Accepted(CandidateFile),
}

/// Drop-zone state: the hover affordance and its accessible label.
#[derive(Debug, Clone, Default)]
pub struct DropZone {
    active: bool,
}

impl DropZone {
    /// Bind the four drag events; the returned disposer unbinds all of them.
    pub fn attach(registry: &mut ListenerRegistry) -> Registration {
        registry.register_all(
            Surface::DropZone,
            &[
                EventKind::DragEnter,
                EventKind::DragOver,
                EventKind::DragLeave,
                EventKind::Drop,
            ],
        )
    }

    pub fn handle(&mut self, event: DragEvent) -> DropOutcome {
        match event {
            DragEvent::Enter | DragEvent::Over => {
                self.active = true;
                DropOutcome::Ignored
            }
            DragEvent::Leave => {
                self.active = false;
                DropOutcome::Ignored
            }
            DragEvent::Drop(files) => {
                self.active = false;
                match files.into_iter().next() {
                    Some(file) if file.media_type.starts_with("image/") => {
                        DropOutcome::Accepted(file)
                    }
                    _ => DropOutcome::Rejected,
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn aria_label(&self) -> &'static str {
        if self.active { ACTIVE_LABEL } else { IDLE_LABEL }
    }
}
