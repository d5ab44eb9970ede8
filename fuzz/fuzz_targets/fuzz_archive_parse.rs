#![no_main]

use assetfs::{walk, AssetFs, FileSystem};
use libfuzzer_sys::fuzz_target;
use std::io::{Read, Seek, SeekFrom};

fuzz_target!(|data: &[u8]| {
    // Construction must fail cleanly on anything malformed
    let fs = match AssetFs::from_bytes(data) {
        Ok(fs) => fs,
        Err(_) => return,
    };

    // Every indexed path must open, stat and read without panicking
    let paths: Vec<String> = fs.paths().map(str::to_string).collect();
    for path in &paths {
        let Ok(mut file) = fs.open(path) else {
            continue;
        };
        let _ = file.stat();
        let _ = file.read_dir(2);
        let mut buf = Vec::new();
        let _ = file.read_to_end(&mut buf);
        let _ = file.seek(SeekFrom::Start(0));
        let _ = file.close();
    }

    let _ = walk(&fs, "/", |_, _, _| Ok(()));

    // Lookups of hostile names
    let _ = fs.open("");
    let _ = fs.open("//");
    let _ = fs.open("/../../etc/passwd");
});
