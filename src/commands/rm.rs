//! `rm(path)` (§4.7).

use crate::alloc::Allocator;
use crate::dirstream::DirStream;
use crate::error::Error;
use crate::error::Result;
use crate::layout::inode::S_IFDIR;
use crate::layout::Layout;
use crate::path::PathResolver;
use crate::util::get_timestamp;

/// Removes the directory entry for `path` and, once its inode's `links_count` reaches 0,
/// deletes the inode. Refuses directories (`IsDir`; there is no `rmdir`).
pub fn rm(layout: &Layout, path: &[u8]) -> Result<()> {
    let resolver = PathResolver::new(layout);
    let (parent_ino, leaf) = resolver.resolve_parent(path)?;
    let parent_stream = DirStream::new(layout, parent_ino);
    let target_ino = parent_stream.lookup(&leaf)?;

    if layout.inode(target_ino)?.file_type_bits() == S_IFDIR {
        return Err(Error::IsDir);
    }

    parent_stream.remove(&leaf)?;

    let inode = layout.inode(target_ino)?;
    inode.links_count -= 1;
    if inode.links_count == 0 {
        inode.dtime = get_timestamp();
        let blocks: Vec<u32> = inode.block.iter().copied().filter(|&b| b != 0).collect();
        let alloc = Allocator::new(layout);
        alloc.free_inode(target_ino)?;
        for b in blocks {
            alloc.free_block(b)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::ROOT_INO;
    use crate::testutil::format_fresh_image;

    #[test]
    fn rm_directory_is_is_dir() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        crate::commands::mkdir::mkdir(&layout, b"/a").unwrap();
        assert!(matches!(rm(&layout, b"/a"), Err(Error::IsDir)));
    }

    #[test]
    fn rm_matches_scenario_3() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        let dir = tempfile::tempdir().unwrap();
        let host_path = dir.path().join("src");
        let contents = vec![9u8; 1500];
        std::fs::write(&host_path, &contents).unwrap();
        crate::commands::cp_in::cp_in(&layout, &host_path, b"/x").unwrap();
        let ino = DirStream::new(&layout, ROOT_INO).lookup(b"x").unwrap();
        let blocks: Vec<u32> = layout
            .inode(ino)
            .unwrap()
            .block
            .iter()
            .copied()
            .filter(|&b| b != 0)
            .collect();

        rm(&layout, b"/x").unwrap();

        assert!(DirStream::new(&layout, ROOT_INO).lookup(b"x").is_err());
        let inode = layout.inode(ino).unwrap();
        assert_eq!(inode.links_count, 0);
        assert!(inode.dtime != 0);
        assert!(!layout.inode_bitmap().unwrap().test(ino - 1));
        for b in &blocks {
            assert!(!layout.block_bitmap().unwrap().test(b - 1));
        }
    }
}
