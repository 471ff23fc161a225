//! The ext2 superblock, at block 1.

/// The filesystem's signature (`EXT2_MAGIC`).
pub const EXT2_SIGNATURE: u16 = 0xef53;

/// The ext2 superblock structure.
///
/// Field names and layout follow the on-disk ext2 superblock exactly, so offsets line up with
/// any other tool that reads this image; only the fields named in the data model are read or
/// written by this core, the rest are carried for on-disk fidelity.
///
/// `repr(C)` without `packed`: every field here already falls on a naturally aligned offset (the
/// real ext2 superblock was designed that way), so the compiler inserts no padding and this
/// layout is still byte-identical to the on-disk format — while still allowing ordinary `&mut`
/// field access, which `packed` would forbid.
#[repr(C)]
pub struct SuperBlock {
    /// Total number of inodes in the filesystem.
    pub inodes_count: u32,
    /// Total number of blocks in the filesystem.
    pub blocks_count: u32,
    /// Number of blocks reserved for the superuser.
    pub r_blocks_count: u32,
    /// Total number of unallocated blocks.
    pub free_blocks_count: u32,
    /// Total number of unallocated inodes.
    pub free_inodes_count: u32,
    /// Block number of the block containing the superblock.
    pub first_data_block: u32,
    /// log2(block_size) - 10.
    pub log_block_size: u32,
    /// log2(fragment_size) - 10.
    pub log_frag_size: u32,
    /// Number of blocks per block group.
    pub blocks_per_group: u32,
    /// Number of fragments per block group.
    pub frags_per_group: u32,
    /// Number of inodes per block group.
    pub inodes_per_group: u32,
    /// Timestamp of the last mount.
    pub mtime: u32,
    /// Timestamp of the last write.
    pub wtime: u32,
    /// Number of mounts since the last consistency check.
    pub mnt_count: u16,
    /// Number of mounts allowed before a consistency check is required.
    pub max_mnt_count: u16,
    /// The ext2 signature, see [`EXT2_SIGNATURE`].
    pub magic: u16,
    /// Filesystem state.
    pub state: u16,
    /// Action to perform when an error is detected.
    pub errors: u16,
    /// Minor revision level.
    pub minor_rev_level: u16,
    /// Timestamp of the last consistency check.
    pub lastcheck: u32,
    /// Interval in seconds between mandatory consistency checks.
    pub checkinterval: u32,
    /// OS that created the filesystem.
    pub creator_os: u32,
    /// Major revision level.
    pub rev_level: u32,
    /// Reserved-blocks default UID.
    pub def_resuid: u16,
    /// Reserved-blocks default GID.
    pub def_resgid: u16,

    // -- dynamic-revision fields --
    /// Smallest inode number available for allocation; see [`crate::layout::FIRST_INO`].
    pub first_ino: u32,
    /// Size of the on-disk inode record in bytes.
    pub inode_size: u16,
    /// The block group containing this superblock.
    pub block_group_nr: u16,
    /// Compatible feature set.
    pub feature_compat: u32,
    /// Incompatible feature set.
    pub feature_incompat: u32,
    /// Read-only-compatible feature set.
    pub feature_ro_compat: u32,
    /// Volume UUID.
    pub uuid: [u8; 16],
    /// Volume name.
    pub volume_name: [u8; 16],
    /// Path the volume was last mounted at.
    pub last_mounted: [u8; 64],
    /// Bitmap of compression algorithms in use.
    pub algo_bitmap: u32,
    /// Blocks to preallocate for files.
    pub prealloc_blocks: u8,
    /// Blocks to preallocate for directories.
    pub prealloc_dir_blocks: u8,
    _padding1: u16,
    /// Journal UUID.
    pub journal_uuid: [u8; 16],
    /// Journal inode.
    pub journal_inum: u32,
    /// Journal device.
    pub journal_dev: u32,
    /// Head of the orphan inode list.
    pub last_orphan: u32,

    _reserved: [u8; 788],
}

const _: () = assert!(std::mem::size_of::<SuperBlock>() == 1024);
