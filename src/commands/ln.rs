//! `ln` (hard link) and `ln -s` (symlink) (§4.7).

use crate::alloc::Allocator;
use crate::commands::file_type_for_mode;
use crate::dirstream::DirStream;
use crate::error::Error;
use crate::error::Result;
use crate::layout::dirent::FT_SYMLINK;
use crate::layout::inode::S_IFDIR;
use crate::layout::inode::S_IFLNK;
use crate::layout::Layout;
use crate::layout::BLOCK_SIZE;
use crate::path::PathResolver;
use crate::util::ceil_division;
use crate::util::get_timestamp;

/// Creates a hard link: a new entry at `dst_abs` pointing at `src_abs`'s inode, incrementing its
/// `links_count` (corrected behavior, see spec §9). Refuses to link a directory (`IsDir`).
pub fn ln(layout: &Layout, src_abs: &[u8], dst_abs: &[u8]) -> Result<()> {
    let resolver = PathResolver::new(layout);
    let src_ino = resolver.resolve(src_abs)?;
    if layout.inode(src_ino)?.file_type_bits() == S_IFDIR {
        return Err(Error::IsDir);
    }
    let (parent_ino, leaf) = resolver.resolve_parent(dst_abs)?;
    let parent_stream = DirStream::new(layout, parent_ino);
    if parent_stream.lookup(&leaf).is_ok() {
        return Err(Error::Exists);
    }

    let file_type = file_type_for_mode(layout.inode(src_ino)?.file_type_bits());
    parent_stream.insert(src_ino, &leaf, file_type)?;
    layout.inode(src_ino)?.links_count += 1;
    Ok(())
}

/// Creates a symbolic link: a new LNK inode whose data blocks hold `target`'s raw bytes,
/// `links_count = 1` (corrected; source sets 2, see spec §9). `target` is stored verbatim and is
/// never resolved or required to exist.
pub fn ln_s(layout: &Layout, target: &[u8], dst_abs: &[u8]) -> Result<()> {
    let resolver = PathResolver::new(layout);
    let (parent_ino, leaf) = resolver.resolve_parent(dst_abs)?;
    let parent_stream = DirStream::new(layout, parent_ino);
    if parent_stream.lookup(&leaf).is_ok() {
        return Err(Error::Exists);
    }

    let size = target.len() as u32;
    let needed = ceil_division(size, BLOCK_SIZE).max(1);
    if needed > layout.superblock().free_blocks_count {
        return Err(Error::NoSpace);
    }

    let alloc = Allocator::new(layout);
    let new_ino = alloc.alloc_inode()?;
    let now = get_timestamp();
    {
        let inode = layout.inode(new_ino)?;
        inode.mode = S_IFLNK | 0o777;
        inode.links_count = 1;
        inode.size = size;
        inode.ctime = now;
        inode.mtime = now;
        inode.blocks = needed;
    }

    for i in 0..needed as usize {
        let block_no = alloc.alloc_block()?;
        layout.inode(new_ino)?.block[i] = block_no;
        let blk = layout.block(block_no)?;
        let start = i * BLOCK_SIZE as usize;
        let end = (start + BLOCK_SIZE as usize).min(target.len());
        let n = end - start;
        blk[..n].copy_from_slice(&target[start..end]);
        blk[n..].fill(0);
    }

    parent_stream.insert(new_ino, &leaf, FT_SYMLINK)
}
