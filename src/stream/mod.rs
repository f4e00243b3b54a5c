//! The write and read lifecycles.
//!
//! A [`PlyWriter`] moves through `Created → DeclaringHeader → HeaderFinalized
//! → WritingElement → Closed`, a [`PlyReader`] through `Opened → HeaderParsed
//! → ReadingElement → Closed`. Calls made in the wrong state fail with
//! [`PlyError::InvalidStateTransition`](crate::PlyError::InvalidStateTransition)
//! instead of corrupting the file. A failed row leaves the stream `Failed`,
//! where only `close` is accepted. `Failed` remembers how many rows the
//! interrupted element still owed, so `close` can report the short element.

use std::fmt;

mod reader;
mod writer;

pub use reader::PlyReader;
pub use writer::PlyWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Created,
    DeclaringHeader,
    HeaderFinalized,
    WritingElement {
        element: String,
        rows: usize,
        count: usize,
    },
    Opened,
    HeaderParsed,
    ReadingElement {
        element: String,
        rows: usize,
        count: usize,
    },
    Failed {
        pending: usize,
    },
    Closed,
}

impl StreamState {
    /// The failed state, keeping the rows this state still owed.
    pub(crate) fn failed(&self) -> Self {
        StreamState::Failed {
            pending: self.pending_rows(),
        }
    }

    /// Rows still owed by the current element, if any.
    pub(crate) fn pending_rows(&self) -> usize {
        match self {
            StreamState::WritingElement { rows, count, .. }
            | StreamState::ReadingElement { rows, count, .. } => count - rows,
            StreamState::Failed { pending } => *pending,
            _ => 0,
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Created => write!(f, "created"),
            StreamState::DeclaringHeader => write!(f, "declaring the header"),
            StreamState::HeaderFinalized => write!(f, "the header is finalized"),
            StreamState::WritingElement {
                element,
                rows,
                count,
            } => write!(f, "writing element '{element}' ({rows} of {count} rows)"),
            StreamState::Opened => write!(f, "opened"),
            StreamState::HeaderParsed => write!(f, "the header is parsed"),
            StreamState::ReadingElement {
                element,
                rows,
                count,
            } => write!(f, "reading element '{element}' ({rows} of {count} rows)"),
            StreamState::Failed { pending: 0 } => write!(f, "failed"),
            StreamState::Failed { pending } => write!(f, "failed with {pending} rows owed"),
            StreamState::Closed => write!(f, "closed"),
        }
    }
}
