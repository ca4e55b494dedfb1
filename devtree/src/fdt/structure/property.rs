//! Property lookup within a node's subtree

use crate::fdt::structure::walk::{Node, MAX_NODE_DEPTH};
use crate::fdt::structure::{
    StructureError, FDT_BEGIN_NODE, FDT_END, FDT_END_NODE, FDT_PROP,
};

/// One property of a node: a name resolved through the strings block and
/// an opaque value. The value borrows the blob.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Property<'blob> {
    /// The property's name
    pub name: &'blob str,
    /// The raw value bytes, exactly as stored in the blob
    pub value: &'blob [u8],
}

impl<'blob> Node<'blob> {
    /// Search this node for a property with the given name.
    ///
    /// The scan starts at the node's own property list and, when nothing
    /// matches there, carries on through the properties of every
    /// descendant node until this node's closing token. A property
    /// defined on a child is therefore found through its ancestor's
    /// handle; the first match in stream order wins. Callers that need a
    /// property of this exact node should check the handle they search
    /// from is the node that defines it.
    ///
    /// `Ok(None)` means the subtree is well formed and holds no such
    /// property; corruption of the stream is reported as an error.
    pub fn find_property(&self, name: &str) -> Result<Option<Property<'blob>>, StructureError> {
        let mut cursor = self.cursor;
        let mut depth = 0usize;

        loop {
            let (offset, tag) = cursor.take_token()?;
            match tag {
                FDT_PROP => {
                    let len = cursor.take_u32()? as usize;
                    let nameoff = cursor.take_u32()?;
                    let value = cursor.take_bytes(len)?;

                    let prop_name = self
                        .strings
                        .get(nameoff as usize)?
                        .to_str()
                        .map_err(|_| StructureError::InvalidName)?;
                    if prop_name == name {
                        return Ok(Some(Property {
                            name: prop_name,
                            value,
                        }));
                    }
                }
                FDT_BEGIN_NODE => {
                    depth += 1;
                    if depth > MAX_NODE_DEPTH {
                        return Err(StructureError::TooDeep(MAX_NODE_DEPTH));
                    }
                    cursor.take_name()?;
                }
                FDT_END_NODE => {
                    if depth == 0 {
                        // this node's own closing token, the subtree is exhausted
                        return Ok(None);
                    }
                    depth -= 1;
                }
                FDT_END => {
                    // the block must not end while a node is still open
                    return Err(StructureError::Unbalanced);
                }
                tag => {
                    log::warn!(
                        "unexpected token {tag:#010x} at offset {offset} in the structure block"
                    );
                    return Err(StructureError::UnexpectedToken(tag, offset));
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fdt::strings::Strings;
    use crate::fdt::structure::walk::{find_node, NameMatch};
    extern crate std;
    use std::vec::Vec;

    // strings block shared by all test streams
    const STRINGS: &[u8] = b"device_type\0reg\0";
    const OFF_DEVICE_TYPE: u32 = 0;
    const OFF_REG: u32 = 12;

    fn begin(buf: &mut Vec<u8>, name: &str) {
        buf.extend_from_slice(&FDT_BEGIN_NODE.to_be_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    fn end(buf: &mut Vec<u8>) {
        buf.extend_from_slice(&FDT_END_NODE.to_be_bytes());
    }

    fn prop(buf: &mut Vec<u8>, nameoff: u32, value: &[u8]) {
        buf.extend_from_slice(&FDT_PROP.to_be_bytes());
        buf.extend_from_slice(&(value.len() as u32).to_be_bytes());
        buf.extend_from_slice(&nameoff.to_be_bytes());
        buf.extend_from_slice(value);
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    fn sample_tree() -> Vec<u8> {
        let mut buf = Vec::new();
        begin(&mut buf, "");
        begin(&mut buf, "memory@40000000");
        prop(&mut buf, OFF_DEVICE_TYPE, b"memory\0");
        prop(&mut buf, OFF_REG, &[0xab; 16]);
        end(&mut buf);
        end(&mut buf);
        buf.extend_from_slice(&FDT_END.to_be_bytes());
        buf
    }

    fn node<'b>(buf: &'b [u8], name: &str) -> Node<'b> {
        find_node(buf, Strings::from_buffer(STRINGS), name, NameMatch::Prefix)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn finds_a_direct_property() {
        let buf = sample_tree();
        let memory = node(&buf, "memory");

        let prop = memory.find_property("device_type").unwrap().unwrap();
        assert_eq!(prop.name, "device_type");
        assert_eq!(prop.value, b"memory\0");

        let reg = memory.find_property("reg").unwrap().unwrap();
        assert_eq!(reg.value, &[0xab; 16]);
    }

    #[test]
    fn descendant_properties_are_found_from_an_ancestor() {
        // "reg" lives on the memory child, yet searching from the root
        // handle finds it. The scan deliberately covers the whole
        // subtree, not just the node's own property list.
        let buf = sample_tree();
        let root = node(&buf, "");

        let reg = root.find_property("reg").unwrap().unwrap();
        assert_eq!(reg.value, &[0xab; 16]);
    }

    #[test]
    fn missing_property_reports_none() {
        let buf = sample_tree();
        let memory = node(&buf, "memory");
        assert_eq!(memory.find_property("compatible").unwrap(), None);
    }

    #[test]
    fn search_stops_at_the_nodes_closing_token() {
        // reg is defined on the sibling after "empty", so a search from
        // "empty" must not see it
        let mut buf = Vec::new();
        begin(&mut buf, "");
        begin(&mut buf, "empty");
        end(&mut buf);
        begin(&mut buf, "other");
        prop(&mut buf, OFF_REG, &[1, 2, 3, 4]);
        end(&mut buf);
        end(&mut buf);
        buf.extend_from_slice(&FDT_END.to_be_bytes());

        let empty = node(&buf, "empty");
        assert_eq!(empty.find_property("reg").unwrap(), None);
    }

    #[test]
    fn truncated_value_is_rejected_within_bounds() {
        let mut buf = Vec::new();
        begin(&mut buf, "");
        buf.extend_from_slice(&FDT_PROP.to_be_bytes());
        buf.extend_from_slice(&64u32.to_be_bytes()); // length far past the buffer
        buf.extend_from_slice(&OFF_REG.to_be_bytes());
        buf.extend_from_slice(&[0; 4]);

        let root = node(&buf, "");
        assert_eq!(
            root.find_property("reg"),
            Err(StructureError::Truncated)
        );
    }
}
