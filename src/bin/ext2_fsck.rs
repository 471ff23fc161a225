//! `ext2_fsck IMAGE` — check and repair a small, enumerated set of inconsistencies.
//!
//! Unlike the other five commands, `fsck` never fails on an inconsistent image: it always exits
//! 0 after printing its repair summary (§4.7, §8 scenario 6).

use ext2ops::commands::fsck::fsck;
use ext2ops::error::exit_code;
use ext2ops::layout::Layout;
use ext2ops::Error;
use ext2ops::Image;
use std::env;
use std::path::PathBuf;
use std::process::exit;

fn usage(bin: &str) -> ! {
    eprintln!("usage: {bin} IMAGE");
    exit(libc::EINVAL);
}

fn die(bin: &str, err: Error) -> ! {
    eprintln!("{bin}: {err}");
    exit(exit_code(&err));
}

fn main() {
    let mut args = env::args();
    let bin = args.next().unwrap_or_else(|| "ext2_fsck".to_string());
    let image_path = args.next().map(PathBuf::from).unwrap_or_else(|| usage(&bin));
    if args.next().is_some() {
        usage(&bin);
    }

    let mut image = Image::open(&image_path).unwrap_or_else(|e| die(&bin, e));
    let layout = Layout::new(&mut image);
    if let Err(e) = fsck(&layout) {
        die(&bin, e);
    }
}
