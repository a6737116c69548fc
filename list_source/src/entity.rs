//! Entity contract
//!
//! Records offered as selectable candidates only need a stable id,
//! a display label and the text the local search matches against.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A remote record offered as a selectable candidate
pub trait Entity: Clone + Send + Sync + Debug + 'static {
    /// Stable unique identifier, handed to the form field on selection
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Primary line shown in the list and on the picker trigger
    fn label(&self) -> String;

    /// Text matched by the client-side search filter
    fn searchable_text(&self) -> String;

    /// Optional secondary line
    fn detail(&self) -> Option<String> {
        None
    }
}
