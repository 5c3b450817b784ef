use std::fs;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::decompress::decompress_files;
use crate::{BootstrapArgs, CFG_FILE_NAME};

fn get_sample_cfg() -> &'static str {
    include_str!("../../../blogfront.toml")
}

fn write_blogfront_cfg(out_dir: &Path) -> io::Result<()> {
    let cfg_path = out_dir.join(CFG_FILE_NAME);
    if cfg_path.exists() {
        return Err(io::Error::new(io::ErrorKind::AlreadyExists, format!("{} already exists", cfg_path.display())));
    }

    let file = File::create(cfg_path)?;
    let mut writer = BufWriter::new(file);

    let sample_cfg = replace_paths(out_dir, get_sample_cfg());
    writer.write_all(sample_cfg.as_bytes())?;

    writer.flush()
}

fn replace_paths(prefix: &Path, config_data: &str) -> String {
    let prefix = prefix.to_string_lossy();
    let prefix = prefix.trim_end_matches('/');

    // Only the `res/<dir>` values of the [paths] section
    let res_regex = Regex::new(r#""res/(\w+)""#).unwrap();
    res_regex.replace_all(config_data, |captures: &regex::Captures| {
        format!(r#""{}/{}""#, prefix, &captures[1])
    }).to_string()
}

pub fn bootstrap_cmd(args: BootstrapArgs) {
    let out_path = PathBuf::from(&args.out_dir);
    let out_path = match fs::canonicalize(&out_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error converting path to absolute: {} - {}", &args.out_dir, e);
            return;
        }
    };

    if !out_path.is_dir() {
        eprintln!("Output path must be a directory: {}", out_path.display());
        return;
    }

    if let Err(e) = decompress_files(&out_path) {
        eprintln!("Error bootstrapping: {}", e);
        return;
    };

    if let Err(e) = write_blogfront_cfg(&out_path) {
        eprintln!("Error writing Blogfront configuration: {}", e);
        return;
    }

    println!("New blog created in {}", out_path.display());
    println!("Set [source].endpoint in {} and run blogfront -c {}", CFG_FILE_NAME, out_path.join(CFG_FILE_NAME).display());
}

#[cfg(test)]
mod tests {
    use blogfront::config::parse_config;

    use super::*;

    #[test]
    fn test_sample_cfg() {
        let cfg = get_sample_cfg();
        let res = replace_paths(&PathBuf::from("/abs/path/"), cfg);
        assert!(res.contains(r##"template_dir = "/abs/path/template""##));
        assert!(res.contains(r##"public_dir = "/abs/path/public""##));
        assert!(res.contains(r##"output_dir = "/abs/path/site""##));

        let config = parse_config(&res).unwrap();
        assert_eq!(config.paths.template_dir, PathBuf::from("/abs/path/template"));
        assert_eq!(config.source.document_type, "posts");
    }
}
