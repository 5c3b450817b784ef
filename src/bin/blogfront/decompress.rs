use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

pub fn decompress_files(output: &Path) -> Result<(), std::io::Error> {
    let tar_gz = include_bytes!(concat!(env!("OUT_DIR"), "/res.tar.gz"));
    let tar = GzDecoder::new(tar_gz.as_ref());
    let mut archive = Archive::new(tar);
    archive.unpack(output)?;

    Ok(())
}
