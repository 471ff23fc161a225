//! Builds small, freshly formatted images in memory for tests.
//!
//! This mirrors `Ext2Factory::create`'s job, scaled down to the single-group, 1024-byte-block
//! parameters this core assumes; it exists only to give tests a starting image; it is not one of
//! the six commands and is not exposed outside `#[cfg(test)]`.

use crate::alloc::FIRST_INO;
use crate::image::Image;
use crate::image::IMAGE_SIZE;
use crate::layout::dirent::physical_size;
use crate::layout::dirent::DirEntryRef;
use crate::layout::dirent::FT_DIR;
use crate::layout::inode::S_IFDIR;
use crate::layout::superblock::EXT2_SIGNATURE;
use crate::layout::Layout;
use crate::layout::BLOCK_SIZE;
use crate::layout::ROOT_INO;
use crate::util::ceil_division;
use crate::util::get_timestamp;

const BLOCK_BITMAP_BLOCK: u32 = 3;
const INODE_BITMAP_BLOCK: u32 = 4;
const INODE_TABLE_BLOCK: u32 = 5;

/// Formats a fresh `inodes_count`/`blocks_count` image and returns it mapped and ready to use.
pub fn format_fresh_image(inodes_count: u32, blocks_count: u32) -> Image {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("image.img");
    std::fs::write(&path, vec![0u8; IMAGE_SIZE]).expect("write image");
    let mut image = Image::open(&path).expect("open image");
    format(&mut image, inodes_count, blocks_count);
    // Safe on Linux: the still-open mapping keeps the inode alive after the directory
    // that named it is removed.
    drop(dir);
    image
}

fn format(image: &mut Image, inodes_count: u32, blocks_count: u32) {
    let layout = Layout::new(image);
    let inode_size = std::mem::size_of::<crate::layout::inode::Inode>() as u32;
    let inode_table_blocks = ceil_division(inodes_count * inode_size, BLOCK_SIZE);
    let first_data_block = INODE_TABLE_BLOCK + inode_table_blocks;

    let free_inodes = inodes_count - 10;
    let free_blocks = blocks_count - first_data_block;

    let sb = layout.superblock();
    sb.inodes_count = inodes_count;
    sb.blocks_count = blocks_count;
    sb.first_data_block = 1;
    sb.log_block_size = 0;
    sb.blocks_per_group = blocks_count;
    sb.inodes_per_group = inodes_count;
    sb.magic = EXT2_SIGNATURE;
    sb.rev_level = 1;
    sb.first_ino = FIRST_INO;
    sb.inode_size = inode_size as u16;
    sb.free_inodes_count = free_inodes;
    sb.free_blocks_count = free_blocks;

    let gd = layout.group_desc();
    gd.block_bitmap = BLOCK_BITMAP_BLOCK;
    gd.inode_bitmap = INODE_BITMAP_BLOCK;
    gd.inode_table = INODE_TABLE_BLOCK;
    gd.free_inodes_count = free_inodes as u16;
    gd.free_blocks_count = free_blocks as u16;
    gd.used_dirs_count = 1;

    {
        let mut bbm = layout.block_bitmap().unwrap();
        for blocknum in 1..=first_data_block {
            bbm.set(blocknum - 1);
        }
    }
    {
        let mut ibm = layout.inode_bitmap().unwrap();
        for i in 0..10 {
            ibm.set(i);
        }
    }

    let now = get_timestamp();
    let root = layout.inode(ROOT_INO).unwrap();
    root.clear();
    root.mode = S_IFDIR | 0o755;
    root.links_count = 2;
    root.size = BLOCK_SIZE;
    root.atime = now;
    root.ctime = now;
    root.mtime = now;
    root.block[0] = first_data_block;

    let blk = layout.block(first_data_block).unwrap();
    let dot_phys = physical_size(1);
    {
        let mut e = DirEntryRef::new(&mut blk[..]);
        e.write(ROOT_INO, dot_phys, b".", FT_DIR);
    }
    {
        let mut e = DirEntryRef::new(&mut blk[dot_phys as usize..]);
        e.write(ROOT_INO, BLOCK_SIZE as u16 - dot_phys, b"..", FT_DIR);
    }
}
