//! Inode and block allocation, keeping the superblock and group-descriptor counters in sync
//! with the bitmaps (§4.4).

use crate::error::Error;
use crate::error::Result;
use crate::layout::Layout;
use crate::util::get_timestamp;

/// Smallest inode number available for allocation; inodes 1..10 are reserved, 2 is root.
pub const FIRST_INO: u32 = 11;

/// Hands out and reclaims inodes and blocks while keeping the five-way accounting consistent.
pub struct Allocator<'a> {
    layout: &'a Layout,
}

impl<'a> Allocator<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Allocates the lowest-numbered free inode at or above [`FIRST_INO`], zero-initializes its
    /// record, and decrements both free-inode counters.
    pub fn alloc_inode(&self) -> Result<u32> {
        let mut bitmap = self.layout.inode_bitmap()?;
        let idx = bitmap
            .first_clear_from(FIRST_INO - 1)
            .ok_or(Error::NoSpace)?;
        bitmap.set(idx);

        let sb = self.layout.superblock();
        sb.free_inodes_count -= 1;
        let gd = self.layout.group_desc();
        gd.free_inodes_count -= 1;

        let ino_no = idx + 1;
        let now = get_timestamp();
        let inode = self.layout.inode(ino_no)?;
        inode.clear();
        inode.atime = now;
        inode.ctime = now;
        Ok(ino_no)
    }

    /// Allocates the lowest-numbered free block and decrements both free-block counters. The
    /// block's contents are left untouched.
    pub fn alloc_block(&self) -> Result<u32> {
        let mut bitmap = self.layout.block_bitmap()?;
        let idx = bitmap.first_clear().ok_or(Error::NoSpace)?;
        bitmap.set(idx);

        let sb = self.layout.superblock();
        sb.free_blocks_count -= 1;
        let gd = self.layout.group_desc();
        gd.free_blocks_count -= 1;

        Ok(idx + 1)
    }

    /// Releases inode `n`: clears its bitmap bit and increments both free-inode counters.
    pub fn free_inode(&self, n: u32) -> Result<()> {
        let mut bitmap = self.layout.inode_bitmap()?;
        bitmap.clear(n - 1);

        let sb = self.layout.superblock();
        sb.free_inodes_count += 1;
        let gd = self.layout.group_desc();
        gd.free_inodes_count += 1;
        Ok(())
    }

    /// Releases block `n`: clears its bitmap bit and increments both free-block counters.
    pub fn free_block(&self, n: u32) -> Result<()> {
        let mut bitmap = self.layout.block_bitmap()?;
        bitmap.clear(n - 1);

        let sb = self.layout.superblock();
        sb.free_blocks_count += 1;
        let gd = self.layout.group_desc();
        gd.free_blocks_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::testutil::format_fresh_image;

    #[test]
    fn alloc_inode_starts_at_first_ino() {
        let mut image = format_fresh_image(32, 128);
        let layout = crate::layout::Layout::new(&mut image);
        let alloc = super::Allocator::new(&layout);
        let ino = alloc.alloc_inode().unwrap();
        assert_eq!(ino, super::FIRST_INO);
        assert!(layout.inode_bitmap().unwrap().test(ino - 1));
        assert_eq!(layout.superblock().free_inodes_count, 32 - 11 - 1);
    }

    #[test]
    fn alloc_block_is_lowest_free() {
        let mut image = format_fresh_image(32, 128);
        let layout = crate::layout::Layout::new(&mut image);
        let alloc = super::Allocator::new(&layout);
        let before = layout.superblock().free_blocks_count;
        let blk = alloc.alloc_block().unwrap();
        assert!(layout.block_bitmap().unwrap().test(blk - 1));
        assert_eq!(layout.superblock().free_blocks_count, before - 1);
    }

    #[test]
    fn free_inode_restores_counters() {
        let mut image = format_fresh_image(32, 128);
        let layout = crate::layout::Layout::new(&mut image);
        let alloc = super::Allocator::new(&layout);
        let ino = alloc.alloc_inode().unwrap();
        let before = layout.superblock().free_inodes_count;
        alloc.free_inode(ino).unwrap();
        assert!(!layout.inode_bitmap().unwrap().test(ino - 1));
        assert_eq!(layout.superblock().free_inodes_count, before + 1);
    }

    #[test]
    fn exhaustion_reports_no_space() {
        let mut image = format_fresh_image(12, 128);
        let layout = crate::layout::Layout::new(&mut image);
        let alloc = super::Allocator::new(&layout);
        // Only inode 11 is free to start with (inodes_count=12, first_ino=11).
        alloc.alloc_inode().unwrap();
        assert!(matches!(alloc.alloc_inode(), Err(crate::error::Error::NoSpace)));
    }
}
