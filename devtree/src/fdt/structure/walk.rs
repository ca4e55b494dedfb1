//! Depth-first traversal of the structure block
//!
//! The token stream already lists nodes in pre-order, so searching does
//! not need recursion at all: a single forward pass with a depth counter
//! visits every node. The counter doubles as the nesting guard, so a blob
//! with runaway or unbalanced nesting is rejected instead of walked.

use crate::fdt::strings::Strings;
use crate::fdt::structure::cursor::Cursor;
use crate::fdt::structure::{
    StructureError, FDT_BEGIN_NODE, FDT_END, FDT_END_NODE, FDT_PROP,
};

/// Deepest node nesting accepted before a blob is considered damaged.
///
/// Real trees are a handful of levels deep; the cap only exists so that a
/// corrupt or hostile blob cannot drive traversal state without limit.
pub const MAX_NODE_DEPTH: usize = 32;

/// A handle to one node of the tree.
///
/// The handle borrows the blob; it stays valid for as long as the blob
/// mapping does. Its cursor sits just past the node's name, at the start
/// of the node's property list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Node<'blob> {
    /// The node's unit name, including the unit address suffix if any
    /// (e.g. `memory@40000000`)
    pub name: &'blob str,
    pub(crate) cursor: Cursor<'blob>,
    pub(crate) strings: Strings<'blob>,
}

/// How a node name is compared against the searched-for name
#[derive(Debug, Clone, Copy)]
pub(crate) enum NameMatch {
    /// The node name must equal the target exactly
    Exact,
    /// The node name must start with the full target. Useful because unit
    /// names commonly carry an address suffix the caller does not know.
    Prefix,
}

impl NameMatch {
    fn matches(self, name: &str, target: &str) -> bool {
        match self {
            NameMatch::Exact => name == target,
            NameMatch::Prefix => name.starts_with(target),
        }
    }
}

/// Search the structure block for a node, depth-first in pre-order.
///
/// The first match wins and ends the whole traversal; siblings and
/// cousins after it are never scanned. `Ok(None)` means the tree is well
/// formed but holds no such node. Any damage to the stream is reported as
/// an error, never folded into "not found".
pub(crate) fn find_node<'blob>(
    struct_buf: &'blob [u8],
    strings: Strings<'blob>,
    target: &str,
    policy: NameMatch,
) -> Result<Option<Node<'blob>>, StructureError> {
    let mut cursor = Cursor::new(struct_buf);
    let mut depth = 0usize;

    loop {
        let (offset, tag) = cursor.take_token()?;
        match tag {
            FDT_BEGIN_NODE => {
                depth += 1;
                if depth > MAX_NODE_DEPTH {
                    return Err(StructureError::TooDeep(MAX_NODE_DEPTH));
                }
                let name = cursor.take_name()?;
                if policy.matches(name, target) {
                    return Ok(Some(Node {
                        name,
                        cursor,
                        strings,
                    }));
                }
            }
            FDT_END_NODE => {
                depth = depth.checked_sub(1).ok_or(StructureError::Unbalanced)?;
            }
            FDT_PROP => skip_property(&mut cursor)?,
            FDT_END => {
                if depth != 0 {
                    return Err(StructureError::Unbalanced);
                }
                return Ok(None);
            }
            tag => {
                log::warn!("unexpected token {tag:#010x} at offset {offset} in the structure block");
                return Err(StructureError::UnexpectedToken(tag, offset));
            }
        }
    }
}

/// Advance past a property body (length word, name offset, padded value)
/// without inspecting it. Node search never resolves property names.
pub(crate) fn skip_property(cursor: &mut Cursor<'_>) -> Result<(), StructureError> {
    let len = cursor.take_u32()? as usize;
    let _nameoff = cursor.take_u32()?;
    cursor.skip_bytes(len)
}

/// Log the whole tree at debug level, one line per node and property.
///
/// Handy while bringing up a new board: it shows what firmware actually
/// handed over without attaching a debugger.
pub(crate) fn dump_tree(struct_buf: &[u8], strings: Strings<'_>) -> Result<(), StructureError> {
    let mut cursor = Cursor::new(struct_buf);
    let mut depth = 0usize;

    loop {
        let (offset, tag) = cursor.take_token()?;
        match tag {
            FDT_BEGIN_NODE => {
                depth += 1;
                if depth > MAX_NODE_DEPTH {
                    return Err(StructureError::TooDeep(MAX_NODE_DEPTH));
                }
                let name = cursor.take_name()?;
                log::debug!("{:indent$}{name} {{", "", indent = (depth - 1) * 2);
            }
            FDT_END_NODE => {
                depth = depth.checked_sub(1).ok_or(StructureError::Unbalanced)?;
                log::debug!("{:indent$}}}", "", indent = depth * 2);
            }
            FDT_PROP => {
                let len = cursor.take_u32()? as usize;
                let nameoff = cursor.take_u32()?;
                cursor.skip_bytes(len)?;
                let name = strings.get(nameoff as usize)?;
                log::debug!(
                    "{:indent$}property {} len={len}",
                    "",
                    name.to_str().unwrap_or("<non-utf8>"),
                    indent = depth * 2
                );
            }
            FDT_END => {
                if depth != 0 {
                    return Err(StructureError::Unbalanced);
                }
                return Ok(());
            }
            tag => {
                log::warn!("unexpected token {tag:#010x} at offset {offset} in the structure block");
                return Err(StructureError::UnexpectedToken(tag, offset));
            }
        }
    }
}
