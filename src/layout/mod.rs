//! Typed views over an [`Image`](crate::image::Image)'s bytes: superblock, group descriptor,
//! bitmaps, inode table, and data blocks.
//!
//! Every accessor here is an unsafe raw-pointer cast into the image's mapped bytes, the same
//! idiom the source uses via its global `disk` pointer. The views this module hands out never
//! overlap for a well-formed image (superblock, group descriptor, bitmaps, inode table, and data
//! blocks occupy disjoint block ranges by construction), which is what makes simultaneous `&mut`
//! views into one buffer sound despite the borrow checker not being able to see it.

pub mod bitmap;
pub mod dirent;
pub mod group_desc;
pub mod inode;
pub mod superblock;

use crate::error::Error;
use crate::error::Result;
use crate::image::Image;
use bitmap::BitmapView;
use group_desc::GroupDesc;
use inode::Inode;
use superblock::SuperBlock;

/// Block size, fixed by this core (§1 Non-goals).
pub const BLOCK_SIZE: u32 = 1024;
/// Block holding the superblock.
pub const SUPERBLOCK_BLOCK: u32 = 1;
/// Block holding the (single) group descriptor.
pub const GROUP_DESC_BLOCK: u32 = 2;
/// The root directory's inode number.
pub const ROOT_INO: u32 = 2;

/// Typed view aggregator over an image's bytes.
pub struct Layout {
    base: *mut u8,
    len: usize,
}

unsafe fn cast_mut<'a, T>(ptr: *mut u8) -> &'a mut T {
    &mut *(ptr as *mut T)
}

impl Layout {
    /// Builds a layout over `image`'s mapped bytes.
    pub fn new(image: &mut Image) -> Self {
        let len = image.bytes().len();
        Self {
            base: image.as_mut_ptr(),
            len,
        }
    }

    fn offset(&self, byte_offset: usize, size: usize) -> Result<*mut u8> {
        if byte_offset + size > self.len {
            return Err(Error::Corrupt);
        }
        Ok(unsafe { self.base.add(byte_offset) })
    }

    /// The superblock, at block 1.
    pub fn superblock(&self) -> &mut SuperBlock {
        let ptr = unsafe { self.base.add((SUPERBLOCK_BLOCK * BLOCK_SIZE) as usize) };
        unsafe { cast_mut(ptr) }
    }

    /// The (single) group descriptor, at block 2.
    pub fn group_desc(&self) -> &mut GroupDesc {
        let ptr = unsafe { self.base.add((GROUP_DESC_BLOCK * BLOCK_SIZE) as usize) };
        unsafe { cast_mut(ptr) }
    }

    /// A raw 1024-byte view of block `n` (1-based). Block 0 and out-of-range blocks are refused.
    pub fn block(&self, n: u32) -> Result<&mut [u8; 1024]> {
        let blocks_count = self.superblock().blocks_count;
        if n == 0 || n > blocks_count {
            return Err(Error::Corrupt);
        }
        let ptr = self.offset((n * BLOCK_SIZE) as usize, BLOCK_SIZE as usize)?;
        Ok(unsafe { cast_mut(ptr) })
    }

    /// The inode table record for inode `n` (1-based).
    pub fn inode(&self, n: u32) -> Result<&mut Inode> {
        let inodes_count = self.superblock().inodes_count;
        if n == 0 || n > inodes_count {
            return Err(Error::Corrupt);
        }
        let inode_table = self.group_desc().inode_table;
        let byte_offset =
            (inode_table * BLOCK_SIZE) as usize + (n - 1) as usize * std::mem::size_of::<Inode>();
        let ptr = self.offset(byte_offset, std::mem::size_of::<Inode>())?;
        Ok(unsafe { cast_mut(ptr) })
    }

    /// The inode usage bitmap, bound by `inodes_count`.
    pub fn inode_bitmap(&self) -> Result<BitmapView<'_>> {
        let inodes_count = self.superblock().inodes_count;
        let block = self.group_desc().inode_bitmap;
        let bytes = self.block(block)?;
        Ok(BitmapView::new(&mut bytes[..], inodes_count))
    }

    /// The block usage bitmap, bound by `blocks_count`.
    pub fn block_bitmap(&self) -> Result<BitmapView<'_>> {
        let blocks_count = self.superblock().blocks_count;
        let block = self.group_desc().block_bitmap;
        let bytes = self.block(block)?;
        Ok(BitmapView::new(&mut bytes[..], blocks_count))
    }
}
