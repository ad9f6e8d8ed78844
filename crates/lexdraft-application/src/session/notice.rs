use lexdraft_core::document::DocumentId;

/// Out-of-band events for the UI layer.
///
/// Delivered through an optional `mpsc::UnboundedSender`; a closed or absent
/// receiver never affects the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    /// A document was persisted. `previous_id` is set when the save replaced
    /// a temporary identity.
    Saved {
        id: DocumentId,
        previous_id: Option<DocumentId>,
    },
    /// An autosave attempt failed; the document is still dirty.
    AutosaveFailed { id: DocumentId, error: String },
    /// A suggestion's original text is no longer in the document.
    SuggestionConflict { id: DocumentId, original: String },
    /// The recent documents log could not be persisted.
    RecentLogUnavailable { error: String },
}
