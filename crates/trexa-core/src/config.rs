use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Component, Path, PathBuf};

use crate::chunking::DEFAULT_CHUNK_SIZE;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub index_dir: String,
    pub table_name: String,
    pub graph_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_id: String,
    pub model_dir: Option<String>,
    pub chunk_size: usize,
    pub max_len: usize,
    pub batch_size: usize,
    pub use_fake: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub overfetch: usize,
    pub max_candidates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub eager_init: bool,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            index_dir: "./data/lancedb".to_string(),
            table_name: "trexa_index".to_string(),
            graph_output: "./data/file_tree_graph.json".to_string(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_id: "intfloat/e5-small-v2".to_string(),
            model_dir: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_len: 512,
            batch_size: 32,
            use_fake: false,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_top_k: 5, max_top_k: 20, overfetch: 4, max_candidates: 500 }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000, eager_init: true }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let e = &self.embedding;
        let s = &self.search;
        if e.chunk_size == 0 {
            return Err(Error::InvalidConfig("embedding.chunk_size must be >= 1".into()));
        }
        if e.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be >= 1".into()));
        }
        if s.default_top_k == 0 || s.default_top_k > s.max_top_k {
            return Err(Error::InvalidConfig(format!(
                "search.default_top_k must be within 1..={} (got {})",
                s.max_top_k, s.default_top_k
            )));
        }
        if s.overfetch == 0 {
            return Err(Error::InvalidConfig("search.overfetch must be >= 1".into()));
        }
        if self.data.table_name.trim().is_empty() {
            return Err(Error::InvalidConfig("data.table_name must not be empty".into()));
        }
        Ok(())
    }

    pub fn index_dir(&self) -> PathBuf {
        expand_path(&self.data.index_dir)
    }

    pub fn graph_output(&self) -> PathBuf {
        expand_path(&self.data.graph_output)
    }
}

impl Config {
    /// Load `config.toml` + `config.<env>.toml` + `APP_*` from the working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(format!("Failed to extract settings: {e}")))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

/// Absolute, lexically normalized form of `path` relative to the current
/// directory.
///
/// Unlike `canonicalize` this works for paths that no longer exist, which
/// deletes of removed documents depend on. Symlinks are not resolved.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_lexically(path);
    }
    match env::current_dir() {
        Ok(cwd) => normalize_lexically(&resolve_with_base(&cwd, path.to_string_lossy())),
        Err(_) => normalize_lexically(path),
    }
}

/// Drop `.` components and fold `name/..` pairs without touching the disk.
/// `..` at the root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Toml;

    #[test]
    fn defaults_apply_when_keys_missing() {
        let cfg = Config::from_figment(
            Figment::from(Serialized::defaults(Settings::default()))
                .merge(Toml::string("[embedding]\nchunk_size = 128\n")),
        );
        let s = cfg.settings().unwrap();
        assert_eq!(s.embedding.chunk_size, 128);
        assert_eq!(s.embedding.batch_size, 32);
        assert_eq!(s.data.table_name, "trexa_index");
        assert_eq!(s.search.max_top_k, 20);
        assert_eq!(cfg.get::<usize>("embedding.chunk_size").unwrap(), 128);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut s = Settings::default();
        assert!(s.validate().is_ok());
        s.embedding.chunk_size = 0;
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));
        let mut s = Settings::default();
        s.search.default_top_k = 50;
        assert!(s.validate().is_err());
    }

    #[test]
    fn load_from_reads_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[data]\nindex_dir = \"/var/lib/trexa\"\n[server]\nport = 9100\n",
        )
        .unwrap();
        let s = Config::load_from(tmp.path()).unwrap().settings().unwrap();
        assert_eq!(s.index_dir(), PathBuf::from("/var/lib/trexa"));
        assert_eq!(s.server.port, 9100);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/docs");
        assert_eq!(resolve_with_base(base, "a/b.txt"), PathBuf::from("/srv/docs/a/b.txt"));
        assert_eq!(resolve_with_base(base, "/etc/x.txt"), PathBuf::from("/etc/x.txt"));
        assert!(absolutize(Path::new("rel.txt")).is_absolute());
    }

    #[test]
    fn equivalent_spellings_share_one_absolute_path() {
        let plain = absolutize(Path::new("docs/a.txt"));
        assert_eq!(absolutize(Path::new("./docs/a.txt")), plain);
        assert_eq!(absolutize(Path::new("docs/../docs/./a.txt")), plain);
        assert_eq!(absolutize(Path::new("/srv/./docs/x/../a.txt")), PathBuf::from("/srv/docs/a.txt"));
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_lexically(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }
}
