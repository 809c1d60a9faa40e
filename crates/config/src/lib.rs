//! Layered configuration for folio.
//!
//! Later layers override earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. `config.toml` in the platform config directory, if present.
//! 3. An explicitly requested file (`.toml`, `.yaml`/`.yml` or `.json`).
//! 4. Environment variables prefixed with `FOLIO_`, nested with `__`
//!    (`FOLIO_LIBRARY__ROOT=/srv/library`).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use folio_extract::Normalize;
use folio_extract::models::ContentKind;
use folio_library::LibraryOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FOLIO_";
const USER_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryOptions,
    pub extract: ExtractConfig,
    /// Display names of books never loaded or extracted
    pub skip_books: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Content kinds extracted when none are requested explicitly
    pub kinds: Vec<ContentKind>,
    /// Clean-up applied to every page before extraction
    pub normalize: Normalize,
}
impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            kinds: ContentKind::ALL.to_vec(),
            normalize: Normalize::default(),
        }
    }
}

impl Config {
    /// Loads every layer, with `explicit` as the requested config file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_layers(user_config_file().as_deref(), explicit)
    }

    fn from_layers(user: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user
            && user.is_file()
        {
            tracing::debug!(path = %user.display(), "using user config file");
            figment = figment.merge(Toml::file(user));
        }
        if let Some(explicit) = explicit {
            if !explicit.is_file() {
                exn::bail!(ErrorKind::NotFound(explicit.to_path_buf()));
            }
            figment = match explicit.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(explicit)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(explicit)),
                Some("json") => figment.merge(Json::file(explicit)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(explicit.to_path_buf())),
            };
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(figment.extract().or_raise(|| ErrorKind::Invalid)?)
    }
}

fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "folio").map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::from_layers(None, None).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.library.name, "library");
            assert_eq!(config.library.sources_file, Path::new("sources.html"));
            assert_eq!(config.library.state_file, Path::new("library.json"));
            assert_eq!(config.extract.kinds, ContentKind::ALL);
            Ok(())
        });
    }

    #[rstest]
    #[case("folio.toml", "[library]\nname = \"home\"\n\n[extract]\nkinds = [\"spell\"]\n")]
    #[case("folio.yaml", "library:\n  name: home\nextract:\n  kinds: [spell]\n")]
    #[case("folio.yml", "library:\n  name: home\nextract:\n  kinds: [spell]\n")]
    #[case("folio.json", r#"{"library": {"name": "home"}, "extract": {"kinds": ["spell"]}}"#)]
    fn test_explicit_file(#[case] file: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(file, contents)?;
            let config = Config::from_layers(None, Some(Path::new(file))).unwrap();
            assert_eq!(config.library.name, "home");
            assert_eq!(config.library.root, Path::new("."));
            assert_eq!(config.extract.kinds, [ContentKind::Spell]);
            Ok(())
        });
    }

    #[test]
    fn test_layer_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "user.toml",
                "skip_books = [\"Basic Rules (2014)\"]\n[library]\nname = \"user\"\nroot = \"/srv/user\"\n",
            )?;
            jail.create_file("explicit.toml", "[library]\nroot = \"/srv/explicit\"\n[extract.normalize]\nremove_comments = true\n")?;
            jail.set_env("FOLIO_LIBRARY__NAME", "env");
            let config = Config::from_layers(Some(Path::new("user.toml")), Some(Path::new("explicit.toml"))).unwrap();
            assert_eq!(config.library.name, "env");
            assert_eq!(config.library.root, Path::new("/srv/explicit"));
            assert_eq!(config.skip_books, ["Basic Rules (2014)"]);
            assert!(config.extract.normalize.remove_comments);
            assert!(!config.extract.normalize.main_body_only);
            Ok(())
        });
    }

    #[test]
    fn test_missing_user_file_is_ignored() {
        Jail::expect_with(|_jail| {
            let config = Config::from_layers(Some(Path::new("nonexistent.toml")), None).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("folio.ini", "")?;
            let err = Config::from_layers(None, Some(Path::new("folio.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Config::from_layers(None, Some(Path::new("folio.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid() {
        Jail::expect_with(|jail| {
            jail.create_file("folio.toml", "[extract]\nkinds = [\"dragon\"]\n")?;
            let err = Config::from_layers(None, Some(Path::new("folio.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid));
            Ok(())
        });
    }
}
