/// Word catalog sources.
///
/// ## Sources (priority order):
///   1. A word pack file (`words.toml` by default) found on the config
///      search path — replaces the built-in words entirely.
///   2. Built-in embedded words.
///
/// ## Pack format:
///   ```toml
///   [[words]]
///   id = "mujin"
///   word = "木槿"
///   pinyin = "mù jǐn"
///   ```
///
/// Validation is fatal: a malformed pack refuses to load rather than
/// letting a session start over bad data.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::config::{candidate_dirs, GameConfig};
use crate::domain::word::{CatalogError, Word, WordCatalog};

#[derive(Debug, Error)]
pub enum PackError {
    #[error("could not read word pack {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse word pack {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

#[derive(Deserialize, Debug)]
struct PackFile {
    #[serde(default)]
    words: Vec<PackWord>,
}

#[derive(Deserialize, Debug)]
struct PackWord {
    id: String,
    word: String,
    pinyin: String,
}

/// The six built-in plant words the game ships with.
pub fn embedded_catalog() -> WordCatalog {
    let words = vec![
        Word::new("mujin", "木槿", "mù jǐn"),
        Word::new("xiangrikui", "向日葵", "xiàng rì kuí"),
        Word::new("liulianshu", "榴梿树", "liú lián shù"),
        Word::new("niaochaojue", "鸟巢蕨", "niǎo cháo jué"),
        Word::new("xiangjiaoshu", "香蕉树", "xiāng jiāo shù"),
        Word::new("yushushu", "玉蜀黍", "yù shǔ shǔ"),
    ];
    WordCatalog::new(words).expect("embedded word list is valid")
}

/// Load the catalog: the first word pack found on the search path wins,
/// otherwise the embedded words.
pub fn load_catalog(config: &GameConfig) -> Result<WordCatalog, PackError> {
    for dir in candidate_dirs() {
        let path = dir.join(&config.words_file);
        if path.exists() {
            return load_pack(&path);
        }
    }
    Ok(embedded_catalog())
}

fn load_pack(path: &PathBuf) -> Result<WordCatalog, PackError> {
    let text = std::fs::read_to_string(path).map_err(|source| PackError::Read {
        path: path.clone(),
        source,
    })?;
    parse_pack(&text, path)
}

fn parse_pack(text: &str, path: &PathBuf) -> Result<WordCatalog, PackError> {
    let pack: PackFile = toml::from_str(text).map_err(|source| PackError::Parse {
        path: path.clone(),
        source,
    })?;
    let words = pack
        .words
        .iter()
        .map(|w| Word::new(&w.id, &w.word, &w.pinyin))
        .collect();
    Ok(WordCatalog::new(words)?)
}
