use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct SourceConfig {
    /// API entry point, e.g. `https://my-blog.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    #[serde(default = "default_document_type")]
    pub document_type: String,
    /// Extra attempts for failed requests. 0 disables retrying.
    #[serde(default)]
    pub retries: u32,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Defaults {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: i64,
    #[serde(default = "default_true")]
    pub rendering_cache_enabled: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            page_size: default_page_size(),
            words_per_minute: default_words_per_minute(),
            revalidate_secs: default_revalidate_secs(),
            rendering_cache_enabled: true,
        }
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// utterances widget settings, see https://utteranc.es
#[derive(Deserialize, Clone)]
pub struct Comments {
    pub repo: String,
    #[serde(default = "default_issue_term")]
    pub issue_term: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    pub label: Option<String>,
}

#[derive(Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    pub server: Server,
    pub log: Option<Log>,
    pub comments: Option<Comments>,
}

fn default_document_type() -> String { "posts".to_string() }

fn default_page_size() -> u32 { 2 }

fn default_words_per_minute() -> u32 { 200 }

fn default_revalidate_secs() -> i64 { 60 * 60 * 10 }

fn default_true() -> bool { true }

fn default_issue_term() -> String { "pathname".to_string() }

fn default_theme() -> String { "github-dark".to_string() }

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy()))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if cfg.defaults.page_size == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "defaults.page_size must be greater than 0"));
    }
    if cfg.defaults.words_per_minute == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "defaults.words_per_minute must be greater than 0"));
    }

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
        output_dir: parse_path(cfg.paths.output_dir),
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
