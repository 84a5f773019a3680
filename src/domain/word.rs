/// Target words and the validated catalog.
///
/// A `Word` is an ordered glyph sequence plus its pinyin transliteration.
/// The catalog is read-only after construction; `WordCatalog::new` is the
/// single validation gate, so a session never starts over malformed data.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    pub id: String,
    pub glyphs: Vec<char>,
    pub pinyin: String,
}

impl Word {
    /// Build a word from its display string; glyphs are the string's chars.
    pub fn new(id: &str, text: &str, pinyin: &str) -> Self {
        Word {
            id: id.to_string(),
            glyphs: text.chars().collect(),
            pinyin: pinyin.to_string(),
        }
    }
}

/// Malformed catalog data. Fatal at load time: the game refuses to start
/// rather than run a session over a corrupt word list.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("word list is empty")]
    Empty,
    #[error("word entry {0} has an empty id")]
    EmptyId(usize),
    #[error("duplicate word id '{0}'")]
    DuplicateId(String),
    #[error("word '{0}' needs at least two characters")]
    TooShort(String),
    #[error("word '{0}' has no pinyin")]
    MissingPinyin(String),
}

/// Ordered, validated list of target words for one session.
#[derive(Clone, Debug)]
pub struct WordCatalog {
    words: Vec<Word>,
}

impl WordCatalog {
    pub fn new(words: Vec<Word>) -> Result<Self, CatalogError> {
        if words.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, word) in words.iter().enumerate() {
            if word.id.is_empty() {
                return Err(CatalogError::EmptyId(i));
            }
            if words[..i].iter().any(|w| w.id == word.id) {
                return Err(CatalogError::DuplicateId(word.id.clone()));
            }
            if word.glyphs.len() < 2 {
                return Err(CatalogError::TooShort(word.id.clone()));
            }
            if word.pinyin.trim().is_empty() {
                return Err(CatalogError::MissingPinyin(word.id.clone()));
            }
        }
        Ok(WordCatalog { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Panics when out of range: a bad word index is a caller bug, not a
    /// recoverable condition.
    pub fn word(&self, index: usize) -> &Word {
        &self.words[index]
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_splits_into_glyphs() {
        let w = Word::new("xiangrikui", "向日葵", "xiàng rì kuí");
        assert_eq!(w.glyphs, vec!['向', '日', '葵']);
    }

    #[test]
    fn valid_catalog_accepted() {
        let cat = WordCatalog::new(vec![
            Word::new("mujin", "木槿", "mù jǐn"),
            Word::new("xiangrikui", "向日葵", "xiàng rì kuí"),
        ])
        .unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.word(1).glyphs.len(), 3);
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(WordCatalog::new(vec![]), Err(CatalogError::Empty)));
    }

    #[test]
    fn single_glyph_word_rejected() {
        let err = WordCatalog::new(vec![Word::new("shu", "树", "shù")]);
        assert!(matches!(err, Err(CatalogError::TooShort(id)) if id == "shu"));
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = WordCatalog::new(vec![
            Word::new("mujin", "木槿", "mù jǐn"),
            Word::new("mujin", "向日葵", "xiàng rì kuí"),
        ]);
        assert!(matches!(err, Err(CatalogError::DuplicateId(id)) if id == "mujin"));
    }

    #[test]
    fn blank_pinyin_rejected() {
        let err = WordCatalog::new(vec![Word::new("mujin", "木槿", "  ")]);
        assert!(matches!(err, Err(CatalogError::MissingPinyin(_))));
    }

    #[test]
    fn empty_id_rejected() {
        let err = WordCatalog::new(vec![Word::new("", "木槿", "mù jǐn")]);
        assert!(matches!(err, Err(CatalogError::EmptyId(0))));
    }
}
