use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::embeddings::loader::ModelFormat;
use crate::registry::DEFAULT_SLOTS;

/// A model to load: display name, file path and format.
///
/// Written as `name=path[:format]`. Without a format the file extension
/// decides (`.bin` is binary word2vec, anything else word2vec text).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub path: PathBuf,
    pub format: ModelFormat,
}

impl FromStr for ModelSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, rest) = s
            .split_once('=')
            .with_context(|| format!("Invalid model spec '{s}', expected name=path[:format]"))?;
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Model spec '{s}' has an empty name");
        }

        // Only treat the suffix as a format if it parses as one, so paths
        // like C:\models\glove.txt survive
        let (path, format) = match rest.rsplit_once(':') {
            Some((path, fmt)) if !path.is_empty() => match fmt.parse::<ModelFormat>() {
                Ok(format) => (PathBuf::from(path.trim()), format),
                Err(_) => {
                    let path = PathBuf::from(rest.trim());
                    let format = ModelFormat::from_path(&path);
                    (path, format)
                }
            },
            _ => {
                let path = PathBuf::from(rest.trim());
                let format = ModelFormat::from_path(&path);
                (path, format)
            }
        };
        if path.as_os_str().is_empty() {
            anyhow::bail!("Model spec '{s}' has an empty path");
        }

        Ok(Self {
            name: name.to_string(),
            path,
            format,
        })
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command
/// line flags override individual fields afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Models to load, in slot order (EMBIAS_MODELS, `;`-separated)
    pub models: Vec<ModelSpec>,
    /// Base directory for relative model paths (EMBIAS_MODEL_DIR)
    pub model_dir: PathBuf,
    /// Bias axis table (EMBIAS_GROUP_WORDS)
    pub group_words_path: PathBuf,
    /// Neutral-word categories (EMBIAS_NEUTRAL_WORDS)
    pub neutral_words_path: PathBuf,
    /// Max vectors read per model (EMBIAS_MODEL_LIMIT); unset reads all
    pub model_limit: Option<usize>,
    /// Registry capacity (EMBIAS_SLOTS)
    pub slots: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let models = match env::var("EMBIAS_MODELS") {
            Ok(raw) => parse_model_list(&raw)?,
            Err(_) => Vec::new(),
        };

        let model_dir = env::var("EMBIAS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_dir());

        let model_limit = match env::var("EMBIAS_MODEL_LIMIT") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<usize>()
                    .with_context(|| format!("EMBIAS_MODEL_LIMIT must be a number, got '{v}'"))?,
            ),
            _ => None,
        };

        let slots = match env::var("EMBIAS_SLOTS") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("EMBIAS_SLOTS must be a number, got '{v}'"))?,
            Err(_) => DEFAULT_SLOTS,
        };

        Ok(Self {
            models,
            model_dir,
            group_words_path: env::var("EMBIAS_GROUP_WORDS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./group_words.csv")),
            neutral_words_path: env::var("EMBIAS_NEUTRAL_WORDS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./neutral_words.csv")),
            model_limit,
            slots,
        })
    }

    /// Resolve a model path: absolute paths and paths that exist relative
    /// to the working directory are used as given, anything else is looked
    /// up under `model_dir`.
    pub fn resolve_model_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.model_dir.join(path)
        }
    }

    /// Check that at least one model is configured and that every model
    /// fits into the registry.
    pub fn require_models(&self) -> Result<()> {
        if self.models.is_empty() {
            anyhow::bail!(
                "No models configured. Set EMBIAS_MODELS in your .env file\n\
                 (e.g. EMBIAS_MODELS=\"news=GoogleNews-vectors-negative300.bin\")\n\
                 or pass --model name=path[:format]."
            );
        }
        if self.models.len() > self.slots {
            anyhow::bail!(
                "{} models configured but only {} slots available. Raise EMBIAS_SLOTS.",
                self.models.len(),
                self.slots
            );
        }
        Ok(())
    }

    /// Check that both word list files exist.
    pub fn require_word_lists(&self) -> Result<()> {
        for (var, path) in [
            ("EMBIAS_GROUP_WORDS", &self.group_words_path),
            ("EMBIAS_NEUTRAL_WORDS", &self.neutral_words_path),
        ] {
            if !path.exists() {
                anyhow::bail!(
                    "Word list not found: {}\nSet {var} to the file's location.",
                    path.display()
                );
            }
        }
        Ok(())
    }
}

/// Parse a `;`-separated list of model specs, ignoring empty entries.
pub fn parse_model_list(raw: &str) -> Result<Vec<ModelSpec>> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ModelSpec>())
        .collect()
}

/// Returns the default directory for model files.
/// Uses the platform data directory: ~/.local/share/embias/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("embias")
        .join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_with_format() {
        let spec: ModelSpec = "glove=vectors/glove.6B.300d.txt:glove".parse().unwrap();
        assert_eq!(spec.name, "glove");
        assert_eq!(spec.path, PathBuf::from("vectors/glove.6B.300d.txt"));
        assert_eq!(spec.format, ModelFormat::GloveText);
    }

    #[test]
    fn test_spec_format_by_ordinal() {
        let spec: ModelSpec = "news=news.txt:1".parse().unwrap();
        assert_eq!(spec.format, ModelFormat::Word2VecBinary);
    }

    #[test]
    fn test_spec_format_from_extension() {
        let spec: ModelSpec = "news=GoogleNews-vectors-negative300.bin".parse().unwrap();
        assert_eq!(spec.format, ModelFormat::Word2VecBinary);
        let spec: ModelSpec = "wiki=wiki.txt".parse().unwrap();
        assert_eq!(spec.format, ModelFormat::Word2VecText);
    }

    #[test]
    fn test_spec_windows_path_without_format() {
        let spec: ModelSpec = r"news=D:\Datasets\vectors.bin".parse().unwrap();
        assert_eq!(spec.path, PathBuf::from(r"D:\Datasets\vectors.bin"));
        assert_eq!(spec.format, ModelFormat::Word2VecBinary);
    }

    #[test]
    fn test_spec_errors() {
        assert!("no-equals-sign".parse::<ModelSpec>().is_err());
        assert!("=path.txt".parse::<ModelSpec>().is_err());
        assert!("name=".parse::<ModelSpec>().is_err());
    }

    #[test]
    fn test_model_list() {
        let specs = parse_model_list("a=a.txt; b=b.bin ;;").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].name, "b");
        assert_eq!(specs[1].path, PathBuf::from("b.bin"));
    }
}
