//! Structure block handling
//!
//! The structure block describes the devicetree itself: a sequence of
//! big-endian 32-bit tokens organized into a linear tree of nodes with
//! properties. Every token, node name, and property value is padded to a
//! 4-byte boundary.

use crate::fdt::strings::StringsError;
use thiserror_no_std::Error;

/// Marks the beginning of a node. It is followed by the node's unit name
/// as a nul-terminated string (unit address included, if any), padded up
/// to the next token boundary.
pub(crate) const FDT_BEGIN_NODE: u32 = 0x00000001;

/// Marks the end of a node. Carries no extra data.
pub(crate) const FDT_END_NODE: u32 = 0x00000002;

/// Marks a property. It is followed by the value length and the name
/// offset into the strings block (32 bits each), then the value bytes
/// padded up to the next token boundary.
pub(crate) const FDT_PROP: u32 = 0x00000003;

/// Ignored wherever it appears. Used by producers to blank out nodes or
/// properties without moving the rest of the stream.
pub(crate) const FDT_NOP: u32 = 0x00000004;

/// Terminates the whole structure block. Exactly one, as the last token.
pub(crate) const FDT_END: u32 = 0x00000009;

/// Ways the structure block can turn out to be corrupt.
///
/// Traversal reports these as errors, distinct from a search that simply
/// finds nothing in a well-formed tree. Callers that treat the blob as
/// trusted may still want to tell the two apart: an error here means the
/// blob is damaged, not that the hardware lacks the node.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum StructureError {
    /// The block ended in the middle of a token, name, or value
    #[error("The structure block ended unexpectedly")]
    Truncated,
    /// A token that is not part of the format appeared at the given offset
    #[error("Unexpected token {0:#010x} at offset {1} in the structure block")]
    UnexpectedToken(u32, usize),
    /// More nodes were closed than opened, or the block ended inside a node
    #[error("Node begin/end tokens in the structure block are not balanced")]
    Unbalanced,
    /// Node nesting exceeds [`MAX_NODE_DEPTH`](crate::fdt::MAX_NODE_DEPTH)
    #[error("Node nesting exceeds the supported depth of {0}")]
    TooDeep(usize),
    /// A node name is not valid UTF-8
    #[error("A node or property name is not valid UTF-8")]
    InvalidName,
    /// A property name could not be resolved through the strings block
    #[error("A property name could not be resolved: {0}")]
    BadPropertyName(#[from] StringsError),
}

mod cursor;
pub(crate) mod property;
pub(crate) mod value;
pub(crate) mod walk;
