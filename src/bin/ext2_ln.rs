//! `ext2_ln IMAGE SRC DST` — hard link; `ext2_ln -s IMAGE TARGET DST` — symlink.

use ext2ops::commands::ln::ln;
use ext2ops::commands::ln::ln_s;
use ext2ops::error::exit_code;
use ext2ops::layout::Layout;
use ext2ops::Error;
use ext2ops::Image;
use std::env;
use std::path::PathBuf;
use std::process::exit;

fn usage(bin: &str) -> ! {
    eprintln!("usage: {bin} [-s] IMAGE SRC DST");
    exit(libc::EINVAL);
}

fn die(bin: &str, err: Error) -> ! {
    eprintln!("{bin}: {err}");
    exit(exit_code(&err));
}

fn main() {
    let mut args = env::args();
    let bin = args.next().unwrap_or_else(|| "ext2_ln".to_string());

    let mut rest: Vec<String> = args.collect();
    let symbolic = if rest.first().map(String::as_str) == Some("-s") {
        rest.remove(0);
        true
    } else {
        false
    };
    if rest.len() != 3 {
        usage(&bin);
    }
    let image_path = PathBuf::from(&rest[0]);
    let src = &rest[1];
    let dst = &rest[2];

    let mut image = Image::open(&image_path).unwrap_or_else(|e| die(&bin, e));
    let layout = Layout::new(&mut image);
    let result = if symbolic {
        ln_s(&layout, src.as_bytes(), dst.as_bytes())
    } else {
        ln(&layout, src.as_bytes(), dst.as_bytes())
    };
    if let Err(e) = result {
        die(&bin, e);
    }
}
