//! Arena storage (C2): a node arena and a long-string arena, both owned by a
//! single `Document` (defined in the `vjson` crate) and released as a unit
//! with it.
//!
//! The node arena stores references as `u32` offsets rather than raw
//! pointers (the preferred strategy from the design notes): growth is then
//! just an ordinary `Vec` reallocation-and-copy, and no node ever needs to
//! be patched or treated as unsound after a grow. The string arena is a
//! byte-level bump allocator built on `bumpalo`, the same crate this
//! codebase already depends on for its own arena-backed string type.

use crate::node::Node;
use bumpalo::Bump;

/// A reference to a [`Node`] within a single [`NodeArena`].
///
/// `u32::MAX` is reserved as the "no reference" sentinel (`None`), matching
/// the convention this codebase uses for other small-index handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub(crate) u32);

const NIL: u32 = u32::MAX;

impl NodeRef {
    pub const NONE: NodeRef = NodeRef(NIL);

    #[inline]
    pub(crate) fn from_raw(raw: u32) -> Option<NodeRef> {
        if raw == NIL { None } else { Some(NodeRef(raw)) }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for NodeRef {
    fn default() -> Self {
        NodeRef::NONE
    }
}

/// A reference to a NUL-terminated byte run within a single [`StringArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(pub(crate) u32);

/// Bump-allocated storage for [`Node`] records, addressed by [`NodeRef`].
///
/// Initial capacity defaults to enough nodes to cover a 64 KiB-class
/// document without a grow; callers that know the input length up front can
/// pre-size more precisely via [`NodeArena::with_capacity`].
pub struct NodeArena {
    nodes: Vec<Node>,
}

/// `64 KiB / size_of::<Node>()`, rounded down.
const DEFAULT_NODE_CAPACITY: usize = 64 * 1024 / std::mem::size_of::<Node>();

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::with_capacity(DEFAULT_NODE_CAPACITY) }
    }

    /// Pre-size for an estimated node count, e.g. `input_len / 4` the way
    /// this representation's source implementation estimates.
    pub fn with_capacity(estimated_nodes: usize) -> NodeArena {
        NodeArena { nodes: Vec::with_capacity(estimated_nodes.max(16)) }
    }

    /// Allocate a new node, returning its stable [`NodeRef`]. Growth (if the
    /// backing `Vec` is full) reallocates and copies existing nodes, but
    /// safely: every reference into this arena is an offset, never a
    /// pointer, so nothing needs to be patched up.
    pub fn alloc(&mut self, node: Node) -> NodeRef {
        let idx = self.nodes.len();
        assert!(idx < NIL as usize, "node arena exhausted (more than u32::MAX - 1 nodes)");
        self.nodes.push(node);
        NodeRef(idx as u32)
    }

    #[inline]
    pub fn get(&self, r: NodeRef) -> &Node {
        &self.nodes[r.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, r: NodeRef) -> &mut Node {
        &mut self.nodes[r.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        NodeArena::new()
    }
}

/// Bump-allocated, NUL-terminated byte storage for long strings.
///
/// Each allocation reserves `len + 1` bytes; the caller writes `len` bytes
/// of content and the arena appends the terminating NUL, so every
/// [`StringRef`] resolves to a valid NUL-terminated C string as well as a
/// `&[u8]`/`&str` of known length.
pub struct StringArena {
    bump: Bump,
    // Offset (from the start of the bump's first chunk, tracked manually
    // since bumpalo itself is chunked) of each allocation's start, indexed
    // by StringRef. We keep a side table of (offset-independent) slices
    // instead of raw pointers so growth never invalidates a StringRef.
    slices: Vec<*const [u8]>,
}

// Safety: `slices` holds pointers into `bump`'s own allocations, which are
// never moved or freed while the arena (and therefore the Bump) is alive;
// `StringArena` is only ever accessed through `&self`/`&mut self`, so these
// pointers are never read after the owning `Bump` is dropped.
unsafe impl Send for StringArena {}

impl StringArena {
    pub fn new() -> StringArena {
        StringArena { bump: Bump::new(), slices: Vec::new() }
    }

    /// Allocate `len` bytes plus a trailing NUL, returning a [`StringRef`]
    /// and a mutable view of the `len` content bytes for the caller to fill.
    pub fn alloc(&mut self, bytes: &[u8]) -> StringRef {
        let mut buf = bumpalo::collections::Vec::with_capacity_in(bytes.len() + 1, &self.bump);
        buf.extend_from_slice(bytes);
        buf.push(0u8);
        let slice: &[u8] = buf.into_bump_slice();
        let idx = self.slices.len();
        assert!(idx < NIL as usize, "string arena exhausted");
        self.slices.push(slice as *const [u8]);
        StringRef(idx as u32)
    }

    /// Borrow the content bytes (excluding the trailing NUL) for a
    /// previously allocated string.
    pub fn get(&self, r: StringRef) -> &[u8] {
        // Safety: the pointer was produced by `self.bump.alloc` (via the
        // bumpalo Vec above) and `self.bump` outlives every borrow of `self`.
        let full: &[u8] = unsafe { &*self.slices[r.0 as usize] };
        &full[..full.len() - 1]
    }

    pub fn len_bytes(&self, r: StringRef) -> usize {
        self.get(r).len()
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for StringArena {
    fn default() -> Self {
        StringArena::new()
    }
}
