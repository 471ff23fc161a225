//! `mkdir(path)` (§4.7).

use crate::alloc::Allocator;
use crate::dirstream::DirStream;
use crate::error::Error;
use crate::error::Result;
use crate::layout::dirent::physical_size;
use crate::layout::dirent::DirEntryRef;
use crate::layout::dirent::FT_DIR;
use crate::layout::inode::S_IFDIR;
use crate::layout::Layout;
use crate::layout::BLOCK_SIZE;
use crate::path::PathResolver;
use crate::util::get_timestamp;

/// Creates a new, empty directory at `path`. Fails `Exists` if the leaf is already present in its
/// parent, `NotFound` if any parent component is missing.
pub fn mkdir(layout: &Layout, path: &[u8]) -> Result<()> {
    let resolver = PathResolver::new(layout);
    let (parent_ino, leaf) = resolver.resolve_parent(path)?;
    let parent_stream = DirStream::new(layout, parent_ino);
    if parent_stream.lookup(&leaf).is_ok() {
        return Err(Error::Exists);
    }

    let alloc = Allocator::new(layout);
    let new_ino = alloc.alloc_inode()?;
    let new_block = match alloc.alloc_block() {
        Ok(b) => b,
        Err(e) => {
            alloc.free_inode(new_ino)?;
            return Err(e);
        }
    };

    let now = get_timestamp();
    {
        let inode = layout.inode(new_ino)?;
        inode.mode = S_IFDIR | 0o755;
        inode.links_count = 2;
        inode.size = BLOCK_SIZE;
        inode.blocks = 1;
        inode.ctime = now;
        inode.mtime = now;
        inode.block[0] = new_block;
    }

    let dot_phys = physical_size(1);
    let blk = layout.block(new_block)?;
    {
        let mut e = DirEntryRef::new(&mut blk[..]);
        e.write(new_ino, dot_phys, b".", FT_DIR);
    }
    {
        let mut e = DirEntryRef::new(&mut blk[dot_phys as usize..]);
        e.write(parent_ino, BLOCK_SIZE as u16 - dot_phys, b"..", FT_DIR);
    }

    layout.inode(parent_ino)?.links_count += 1;
    layout.group_desc().used_dirs_count += 1;

    parent_stream.insert(new_ino, &leaf, FT_DIR)
}
