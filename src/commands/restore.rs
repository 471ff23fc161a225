//! `restore(path)` (§4.7).

use crate::dirstream::DirStream;
use crate::error::Error;
use crate::error::Result;
use crate::layout::Layout;
use crate::path::PathResolver;

/// Undeletes the most recently removed entry named `path`'s leaf within its parent directory.
/// Fails `Exists` if a live entry of that name already occupies the slot.
pub fn restore(layout: &Layout, path: &[u8]) -> Result<u32> {
    let resolver = PathResolver::new(layout);
    let (parent_ino, leaf) = resolver.resolve_parent(path)?;
    let parent_stream = DirStream::new(layout, parent_ino);
    if parent_stream.lookup(&leaf).is_ok() {
        return Err(Error::Exists);
    }
    parent_stream.restore(&leaf)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::ROOT_INO;
    use crate::testutil::format_fresh_image;

    #[test]
    fn restore_round_trip_matches_scenario_3() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        let dir = tempfile::tempdir().unwrap();
        let host_path = dir.path().join("src");
        let contents = vec![3u8; 1500];
        std::fs::write(&host_path, &contents).unwrap();
        crate::commands::cp_in::cp_in(&layout, &host_path, b"/x").unwrap();
        let ino = DirStream::new(&layout, ROOT_INO).lookup(b"x").unwrap();
        let blocks_before = layout.inode(ino).unwrap().block;
        let size_before = layout.inode(ino).unwrap().size;
        let mode_before = layout.inode(ino).unwrap().mode;

        crate::commands::rm::rm(&layout, b"/x").unwrap();
        let restored = restore(&layout, b"/x").unwrap();

        assert_eq!(restored, ino);
        assert_eq!(DirStream::new(&layout, ROOT_INO).lookup(b"x").unwrap(), ino);
        let inode = layout.inode(ino).unwrap();
        assert_eq!(inode.links_count, 1);
        assert_eq!(inode.dtime, 0);
        assert_eq!(inode.block, blocks_before);
        assert_eq!(inode.size, size_before);
        assert_eq!(inode.mode, mode_before);
        for b in blocks_before.iter().filter(|&&b| b != 0) {
            assert!(layout.block_bitmap().unwrap().test(b - 1));
        }
    }

    #[test]
    fn restore_of_still_live_name_is_exists() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        crate::commands::mkdir::mkdir(&layout, b"/a").unwrap();
        assert!(matches!(restore(&layout, b"/a"), Err(Error::Exists)));
    }
}
