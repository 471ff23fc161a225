//! The (single) block group descriptor, at block 2.

/// Block group descriptor. This core assumes exactly one group (§1 Non-goals).
///
/// `repr(C)`, not `packed`: see the note on [`super::superblock::SuperBlock`].
#[repr(C)]
pub struct GroupDesc {
    /// Block number where the block usage bitmap starts.
    pub block_bitmap: u32,
    /// Block number where the inode usage bitmap starts.
    pub inode_bitmap: u32,
    /// Block number where the inode table starts.
    pub inode_table: u32,
    /// Number of unallocated blocks in the group.
    pub free_blocks_count: u16,
    /// Number of unallocated inodes in the group.
    pub free_inodes_count: u16,
    /// Number of directories in the group.
    pub used_dirs_count: u16,

    _padding: [u8; 14],
}

const _: () = assert!(std::mem::size_of::<GroupDesc>() == 32);
