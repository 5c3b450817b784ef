use std::fs::File;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use flate2::write::GzEncoder;
use flate2::Compression;

// Default templates and assets are embedded in the binary so `blogfront bootstrap`
// can unpack them without the source tree around.
const RESOURCE_DIR: &str = "res";
const ARCHIVE_NAME: &str = "res.tar.gz";

fn archive_path() -> PathBuf {
    let out_dir = env::var("OUT_DIR").unwrap();
    PathBuf::from(out_dir).join(ARCHIVE_NAME)
}

fn compress_dir(path: &Path, archive_path: &Path) -> io::Result<()> {
    let tar_gz = File::create(archive_path)?;
    let enc = GzEncoder::new(tar_gz, Compression::default());
    let mut tar = tar::Builder::new(enc);
    tar.append_dir_all(".", path)?;
    tar.into_inner()?.finish()?;
    Ok(())
}

fn main() {
    let current_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let res_dir = PathBuf::from(&current_dir).join(RESOURCE_DIR);
    println!("cargo:rerun-if-changed={}", RESOURCE_DIR);

    let archive = archive_path();
    let _ = fs::remove_file(&archive);
    compress_dir(&res_dir, &archive).unwrap()
}
