//! `fsck` (§4.7): a read/write sweep enforcing invariants 1, 3, 4, 5, 6, 7 in that order.
//!
//! Unlike the other five commands, `fsck` never aborts on inconsistency: it repairs what it
//! finds and reports a count. Its stdout lines are a literal contract (§8 scenario 6), not a
//! logging concern, so they're plain `println!` calls here rather than anything routed through a
//! logging facade.

use crate::commands::file_type_for_mode;
use crate::error::Result;
use crate::layout::dirent::DirEntryRef;
use crate::layout::inode::S_IFDIR;
use crate::layout::Layout;
use crate::layout::ROOT_INO;
use crate::layout::BLOCK_SIZE;

/// Runs a full consistency sweep, printing `Fixed: ...` lines as it repairs, and a final summary
/// line. Returns the total repair count.
pub fn fsck(layout: &Layout) -> Result<u32> {
    let mut repairs = 0u32;
    recount_counters(layout, &mut repairs)?;
    walk_dir(layout, ROOT_INO, &mut repairs)?;

    if repairs > 0 {
        println!("{repairs} file system inconsistencies repaired!");
    } else {
        println!("No file system inconsistencies detected!");
    }
    Ok(repairs)
}

fn recount_counters(layout: &Layout, repairs: &mut u32) -> Result<()> {
    let inode_free = layout.inode_bitmap()?.count_clear();
    let block_free = layout.block_bitmap()?.count_clear();

    let sb = layout.superblock();
    if sb.free_inodes_count != inode_free {
        *repairs += sb.free_inodes_count.abs_diff(inode_free);
        sb.free_inodes_count = inode_free;
        println!("Fixed: superblock free inode count corrected to {inode_free}");
    }
    if sb.free_blocks_count != block_free {
        *repairs += sb.free_blocks_count.abs_diff(block_free);
        sb.free_blocks_count = block_free;
        println!("Fixed: superblock free block count corrected to {block_free}");
    }

    let gd = layout.group_desc();
    let gd_inode_free = inode_free as u16;
    let gd_block_free = block_free as u16;
    if gd.free_inodes_count != gd_inode_free {
        *repairs += gd.free_inodes_count.abs_diff(gd_inode_free) as u32;
        gd.free_inodes_count = gd_inode_free;
        println!("Fixed: group descriptor free inode count corrected to {gd_inode_free}");
    }
    if gd.free_blocks_count != gd_block_free {
        *repairs += gd.free_blocks_count.abs_diff(gd_block_free) as u32;
        gd.free_blocks_count = gd_block_free;
        println!("Fixed: group descriptor free block count corrected to {gd_block_free}");
    }
    Ok(())
}

/// Walks `dir_ino`'s live entries (skipping `.`/`..`), repairing each, and recurses into
/// sub-directories. Uses direct pointers only, matching the source and spec's Non-goal.
fn walk_dir(layout: &Layout, dir_ino: u32, repairs: &mut u32) -> Result<()> {
    let blocks: Vec<u32> = layout
        .inode(dir_ino)?
        .block
        .iter()
        .copied()
        .filter(|&b| b != 0)
        .collect();

    for block_no in blocks {
        let mut off = 0usize;
        loop {
            let (child_ino, file_type_tag, name, rec_len) = {
                let blk = layout.block(block_no)?;
                let e = DirEntryRef::new(&mut blk[off..]);
                (e.inode(), e.file_type(), e.name().to_vec(), e.rec_len())
            };
            if child_ino != 0 && name != b"." && name != b".." {
                check_entry(layout, block_no, off, child_ino, file_type_tag, repairs)?;
                if layout.inode(child_ino)?.file_type_bits() == S_IFDIR {
                    walk_dir(layout, child_ino, repairs)?;
                }
            }
            if off + rec_len as usize >= BLOCK_SIZE as usize {
                break;
            }
            off += rec_len as usize;
        }
    }
    Ok(())
}

fn check_entry(
    layout: &Layout,
    block_no: u32,
    off: usize,
    child_ino: u32,
    file_type_tag: u8,
    repairs: &mut u32,
) -> Result<()> {
    // check_mode
    let correct_ft = file_type_for_mode(layout.inode(child_ino)?.file_type_bits());
    if file_type_tag != correct_ft {
        let blk = layout.block(block_no)?;
        let mut e = DirEntryRef::new(&mut blk[off..]);
        e.set_file_type(correct_ft);
        *repairs += 1;
        println!("Fixed: directory entry file_type mismatch for inode {child_ino}");
    }

    // check_allocated
    if !layout.inode_bitmap()?.test(child_ino - 1) {
        layout.inode_bitmap()?.set(child_ino - 1);
        layout.superblock().free_inodes_count -= 1;
        layout.group_desc().free_inodes_count -= 1;
        *repairs += 1;
        println!("Fixed: inode {child_ino} was live but clear in the inode bitmap");
    }

    // check_dtime
    if layout.inode(child_ino)?.dtime != 0 {
        layout.inode(child_ino)?.dtime = 0;
        *repairs += 1;
        println!("Fixed: inode {child_ino} was live but had a nonzero dtime");
    }

    // check_blocks
    let block_ptrs: Vec<u32> = layout
        .inode(child_ino)?
        .block
        .iter()
        .copied()
        .filter(|&b| b != 0)
        .collect();
    let mut fixed_blocks = 0u32;
    for b in block_ptrs {
        if !layout.block_bitmap()?.test(b - 1) {
            layout.block_bitmap()?.set(b - 1);
            layout.superblock().free_blocks_count -= 1;
            layout.group_desc().free_blocks_count -= 1;
            fixed_blocks += 1;
        }
    }
    if fixed_blocks > 0 {
        *repairs += 1;
        println!("Fixed: inode {child_ino} had {fixed_blocks} block(s) missing from the block bitmap");
    }
    Ok(())
}
