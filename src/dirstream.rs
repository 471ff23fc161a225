//! Packed directory-entry reader, inserter, splicer, and undelete-walker over a single
//! directory inode's direct data blocks (§4.5).

use crate::alloc::Allocator;
use crate::error::Error;
use crate::error::Result;
use crate::layout::dirent::physical_size;
use crate::layout::dirent::DirEntryRef;
use crate::layout::inode::DIRECT_PTRS;
use crate::layout::Layout;
use crate::layout::BLOCK_SIZE;
use crate::util::get_timestamp;

/// Operates on one directory inode's direct blocks.
pub struct DirStream<'a> {
    layout: &'a Layout,
    dir_ino: u32,
}

impl<'a> DirStream<'a> {
    pub fn new(layout: &'a Layout, dir_ino: u32) -> Self {
        Self { layout, dir_ino }
    }

    /// Returns the inode number of the first live entry named `name`.
    pub fn lookup(&self, name: &[u8]) -> Result<u32> {
        let inode = self.layout.inode(self.dir_ino)?;
        let blocks = used_blocks(inode);
        for block_no in blocks {
            let blk = self.layout.block(block_no)?;
            let mut off = 0usize;
            loop {
                let rec_len;
                let hit;
                {
                    let e = DirEntryRef::new(&mut blk[off..]);
                    rec_len = e.rec_len() as usize;
                    hit = e.is_used() && e.name() == name;
                }
                if hit {
                    return Ok(DirEntryRef::new(&mut blk[off..]).inode());
                }
                if off + rec_len >= BLOCK_SIZE as usize {
                    break;
                }
                off += rec_len;
            }
        }
        Err(Error::NotFound)
    }

    /// Places a new entry for `child_ino`/`name`/`file_type` in the directory's terminal slot,
    /// allocating a new block if the highest-indexed allocated block has no room (§4.5 insert).
    pub fn insert(&self, child_ino: u32, name: &[u8], file_type: u8) -> Result<()> {
        let need = physical_size(name.len() as u8);
        let inode = self.layout.inode(self.dir_ino)?;
        let slot = (0..DIRECT_PTRS)
            .rev()
            .find(|&i| inode.block[i] != 0)
            .ok_or(Error::Corrupt)?;
        let block_no = inode.block[slot];
        let blk = self.layout.block(block_no)?;

        let mut off = 0usize;
        loop {
            let rec_len = DirEntryRef::new(&mut blk[off..]).rec_len() as usize;
            if off + rec_len >= BLOCK_SIZE as usize {
                break;
            }
            off += rec_len;
        }
        let (phys, rec_len) = {
            let e = DirEntryRef::new(&mut blk[off..]);
            (e.physical_size(), e.rec_len())
        };

        if rec_len - phys >= need {
            {
                let mut e = DirEntryRef::new(&mut blk[off..]);
                e.set_rec_len(phys);
            }
            let mut e = DirEntryRef::new(&mut blk[off + phys as usize..]);
            e.write(child_ino, rec_len - phys, name, file_type);
            return Ok(());
        }

        if slot + 1 >= DIRECT_PTRS {
            return Err(Error::NoSpace);
        }
        let new_block_no = Allocator::new(self.layout).alloc_block()?;
        inode.block[slot + 1] = new_block_no;
        inode.size += BLOCK_SIZE;
        let new_blk = self.layout.block(new_block_no)?;
        let mut e = DirEntryRef::new(&mut new_blk[..]);
        e.write(child_ino, BLOCK_SIZE as u16, name, file_type);
        Ok(())
    }

    /// Absorbs `name`'s entry into its predecessor's `rec_len`, or frees the block if it was the
    /// first entry (§4.5 remove). The removed bytes are left intact for [`Self::restore`].
    pub fn remove(&self, name: &[u8]) -> Result<()> {
        let inode = self.layout.inode(self.dir_ino)?;
        for slot in 0..DIRECT_PTRS {
            let block_no = inode.block[slot];
            if block_no == 0 {
                continue;
            }
            let blk = self.layout.block(block_no)?;
            let mut prev_off: Option<usize> = None;
            let mut off = 0usize;
            loop {
                let (rec_len, hit) = {
                    let e = DirEntryRef::new(&mut blk[off..]);
                    (e.rec_len() as usize, e.is_used() && e.name() == name)
                };
                if hit {
                    match prev_off {
                        Some(p_off) => {
                            let mut p = DirEntryRef::new(&mut blk[p_off..]);
                            let p_rec = p.rec_len();
                            p.set_rec_len(p_rec + rec_len as u16);
                        }
                        None => {
                            inode.block[slot] = 0;
                            Allocator::new(self.layout).free_block(block_no)?;
                        }
                    }
                    return Ok(());
                }
                if off + rec_len >= BLOCK_SIZE as usize {
                    break;
                }
                prev_off = Some(off);
                off += rec_len;
            }
        }
        Err(Error::NotFound)
    }

    /// Walks the slack region after each live entry looking for an orphaned entry named `name`,
    /// and reverses the splice `remove` performed (§4.5 restore).
    ///
    /// Returns `Error::Exists` if the name's inode is already live (not actually orphaned), or
    /// `Error::NotFound` if the slot was since reused by an unrelated live inode.
    pub fn restore(&self, name: &[u8]) -> Result<u32> {
        let inode = self.layout.inode(self.dir_ino)?;
        for slot in 0..DIRECT_PTRS {
            let block_no = inode.block[slot];
            if block_no == 0 {
                continue;
            }
            let blk = self.layout.block(block_no)?;
            let mut off = 0usize;
            loop {
                let (rec_len, phys) = {
                    let e = DirEntryRef::new(&mut blk[off..]);
                    (e.rec_len() as usize, e.physical_size() as usize)
                };
                let block_end = off + rec_len;
                let mut orphan_off = off + phys;
                while orphan_off + 8 <= block_end {
                    let (orphan_name_len, orphan_ino) = {
                        let oe = DirEntryRef::new(&mut blk[orphan_off..]);
                        (oe.name_len(), oe.inode())
                    };
                    if orphan_name_len == 0 {
                        break;
                    }
                    let orphan_phys = physical_size(orphan_name_len) as usize;
                    let name_matches = {
                        let oe = DirEntryRef::new(&mut blk[orphan_off..]);
                        oe.name() == name
                    };
                    if name_matches {
                        return self.splice_restore(block_no, off, orphan_off, block_end, orphan_ino);
                    }
                    orphan_off += orphan_phys;
                }
                if block_end >= BLOCK_SIZE as usize {
                    break;
                }
                off += rec_len;
            }
        }
        Err(Error::NotFound)
    }

    fn splice_restore(
        &self,
        block_no: u32,
        host_off: usize,
        orphan_off: usize,
        block_end: usize,
        orphan_ino: u32,
    ) -> Result<u32> {
        if self.layout.inode_bitmap()?.test(orphan_ino - 1) {
            return Err(Error::Exists);
        }
        let target = self.layout.inode(orphan_ino)?;
        if target.dtime == 0 {
            return Err(Error::NotFound);
        }

        let blk = self.layout.block(block_no)?;
        {
            let mut h = DirEntryRef::new(&mut blk[host_off..]);
            h.set_rec_len((orphan_off - host_off) as u16);
        }
        {
            let mut o = DirEntryRef::new(&mut blk[orphan_off..]);
            o.set_rec_len((block_end - orphan_off) as u16);
        }

        let mut ibm = self.layout.inode_bitmap()?;
        ibm.set(orphan_ino - 1);
        let sb = self.layout.superblock();
        sb.free_inodes_count -= 1;
        let gd = self.layout.group_desc();
        gd.free_inodes_count -= 1;

        let now = get_timestamp();
        let target = self.layout.inode(orphan_ino)?;
        target.links_count += 1;
        target.dtime = 0;
        target.mtime = now;
        let blocks = target.block;

        for b in blocks {
            if b == 0 {
                continue;
            }
            let mut bbm = self.layout.block_bitmap()?;
            if !bbm.test(b - 1) {
                bbm.set(b - 1);
                let sb = self.layout.superblock();
                sb.free_blocks_count -= 1;
                let gd = self.layout.group_desc();
                gd.free_blocks_count -= 1;
            }
        }
        Ok(orphan_ino)
    }
}

fn used_blocks(inode: &crate::layout::inode::Inode) -> Vec<u32> {
    inode
        .block
        .iter()
        .copied()
        .filter(|&b| b != 0)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alloc::Allocator;
    use crate::layout::dirent::FT_REG;
    use crate::layout::ROOT_INO;
    use crate::testutil::format_fresh_image;

    #[test]
    fn insert_then_lookup() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        let alloc = Allocator::new(&layout);
        let ino = alloc.alloc_inode().unwrap();
        let stream = DirStream::new(&layout, ROOT_INO);
        stream.insert(ino, b"x", FT_REG).unwrap();
        assert_eq!(stream.lookup(b"x").unwrap(), ino);
    }

    #[test]
    fn insert_fills_block_then_allocates_a_new_one() {
        let mut image = format_fresh_image(200, 256);
        let layout = Layout::new(&mut image);
        let alloc = Allocator::new(&layout);
        let stream = DirStream::new(&layout, ROOT_INO);
        // Each "fNN" entry takes 12 bytes; the root block starts with `.`/`..` (12 + 1012).
        // Enough insertions exhaust the first block's slack and force a second direct block.
        for i in 0..100 {
            let ino = alloc.alloc_inode().unwrap();
            stream.insert(ino, format!("f{i}").as_bytes(), FT_REG).unwrap();
        }
        let root = layout.inode(ROOT_INO).unwrap();
        assert!(root.block[1] != 0, "expected a second direct block to be allocated");
        for i in 0..100 {
            assert!(stream.lookup(format!("f{i}").as_bytes()).is_ok());
        }
    }

    #[test]
    fn remove_then_restore_round_trip() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        let alloc = Allocator::new(&layout);
        let ino = alloc.alloc_inode().unwrap();
        {
            let inode = layout.inode(ino).unwrap();
            inode.links_count = 1;
        }
        let stream = DirStream::new(&layout, ROOT_INO);
        stream.insert(ino, b"x", FT_REG).unwrap();

        // Removing `x` does not shift anything; its bytes remain in `.`'s slack.
        stream.remove(b"x").unwrap();
        assert!(stream.lookup(b"x").is_err());
        {
            let target = layout.inode(ino).unwrap();
            target.dtime = 1; // `rm` sets this; emulate it directly here.
            target.links_count = 0;
        }
        let restored = stream.restore(b"x").unwrap();
        assert_eq!(restored, ino);
        assert_eq!(stream.lookup(b"x").unwrap(), ino);
        let target = layout.inode(ino).unwrap();
        assert_eq!(target.links_count, 1);
        assert_eq!(target.dtime, 0);
    }

    #[test]
    fn restore_of_still_live_name_is_exists() {
        let mut image = format_fresh_image(32, 128);
        let layout = Layout::new(&mut image);
        let alloc = Allocator::new(&layout);
        let ino = alloc.alloc_inode().unwrap();
        let stream = DirStream::new(&layout, ROOT_INO);
        stream.insert(ino, b"x", FT_REG).unwrap();
        assert!(matches!(stream.restore(b"x"), Err(Error::NotFound)));
    }
}
