//! `cp-in(host_path, image_abs_path)` (§4.7).

use crate::alloc::Allocator;
use crate::dirstream::DirStream;
use crate::error::Error;
use crate::error::Result;
use crate::layout::dirent::FT_REG;
use crate::layout::inode::S_IFREG;
use crate::layout::Layout;
use crate::layout::BLOCK_SIZE;
use crate::path::PathResolver;
use crate::util::ceil_division;
use crate::util::get_timestamp;
use std::path::Path;

/// Copies a regular host file into the image at `image_abs_path`.
pub fn cp_in(layout: &Layout, host_path: &Path, image_abs_path: &[u8]) -> Result<()> {
    let metadata = std::fs::metadata(host_path).map_err(|_| Error::NotFound)?;
    if !metadata.is_file() {
        return Err(Error::NotFound);
    }
    let contents = std::fs::read(host_path)?;
    let size = contents.len() as u32;

    let resolver = PathResolver::new(layout);
    let (parent_ino, leaf) = resolver.resolve_parent(image_abs_path)?;
    let parent_stream = DirStream::new(layout, parent_ino);
    if parent_stream.lookup(&leaf).is_ok() {
        return Err(Error::Exists);
    }

    let needed = ceil_division(size, BLOCK_SIZE).max(1);
    if needed > layout.superblock().free_blocks_count {
        return Err(Error::NoSpace);
    }

    let alloc = Allocator::new(layout);
    let new_ino = alloc.alloc_inode()?;
    let now = get_timestamp();
    {
        let inode = layout.inode(new_ino)?;
        inode.mode = S_IFREG | 0o644;
        inode.links_count = 1;
        inode.size = size;
        inode.ctime = now;
        inode.mtime = now;
        inode.blocks = needed;
    }

    for i in 0..needed as usize {
        let block_no = match alloc.alloc_block() {
            Ok(b) => b,
            Err(e) => {
                free_partial(&alloc, layout, new_ino, i)?;
                return Err(e);
            }
        };
        layout.inode(new_ino)?.block[i] = block_no;
        let blk = layout.block(block_no)?;
        let start = i * BLOCK_SIZE as usize;
        let end = (start + BLOCK_SIZE as usize).min(contents.len());
        let n = end - start;
        blk[..n].copy_from_slice(&contents[start..end]);
        blk[n..].fill(0);
    }

    parent_stream.insert(new_ino, &leaf, FT_REG)
}

fn free_partial(alloc: &Allocator<'_>, layout: &Layout, ino: u32, written: usize) -> Result<()> {
    for i in 0..written {
        let b = layout.inode(ino)?.block[i];
        if b != 0 {
            alloc.free_block(b)?;
        }
    }
    alloc.free_inode(ino)
}
