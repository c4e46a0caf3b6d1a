//! Per-language asset map loaded from `translations_<lang>.json`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::NarratorError;

const TRANSLATIONS_PREFIX: &str = "translations_";
const TRANSLATIONS_SUFFIX: &str = ".json";
const EASY_READ_PREFIX: &str = "easyread-";

/// On-disk shape of a translation file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationFile {
    #[serde(default)]
    pub texts: HashMap<String, String>,
    #[serde(default)]
    pub audio_files: HashMap<String, String>,
}

/// Text and audio assets for one language, keyed by content identifier
#[derive(Clone, Debug, Default)]
pub struct AssetMap {
    lang: String,
    texts: HashMap<String, String>,
    audio: HashMap<String, PathBuf>,
}

impl AssetMap {
    pub fn load(translations_dir: &Path, lang: &str, audio_root: &Path) -> Result<Self, NarratorError> {
        let path = Self::translation_path(translations_dir, lang);
        let raw = std::fs::read_to_string(&path)?;
        let file: TranslationFile = serde_json::from_str(&raw)?;
        let assets = Self::from_translations(lang, file, audio_root);
        tracing::info!(
            lang,
            path = %path.display(),
            texts = assets.texts.len(),
            audio = assets.audio.len(),
            "Translations loaded"
        );
        Ok(assets)
    }

    pub fn from_translations(lang: &str, file: TranslationFile, audio_root: &Path) -> Self {
        let audio = file
            .audio_files
            .into_iter()
            .filter(|(_, relative)| !relative.trim().is_empty())
            .map(|(id, relative)| (id, audio_root.join(relative)))
            .collect();

        Self {
            lang: lang.to_string(),
            texts: file.texts,
            audio,
        }
    }

    pub fn translation_path(translations_dir: &Path, lang: &str) -> PathBuf {
        translations_dir.join(format!("{TRANSLATIONS_PREFIX}{lang}{TRANSLATIONS_SUFFIX}"))
    }

    /// Language codes for which a translation file exists, sorted
    pub fn available_languages(translations_dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(translations_dir) else {
            return Vec::new();
        };

        let mut langs: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_prefix(TRANSLATIONS_PREFIX)
                    .and_then(|rest| rest.strip_suffix(TRANSLATIONS_SUFFIX))
                    .map(str::to_string)
            })
            .collect();
        langs.sort();
        langs
    }

    pub fn easy_read_key(id: &str) -> String {
        format!("{EASY_READ_PREFIX}{id}")
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn audio(&self, id: &str) -> Option<&Path> {
        self.audio.get(id).map(PathBuf::as_path)
    }

    pub fn has_audio(&self, id: &str) -> bool {
        self.audio.contains_key(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    /// Display text for an item, preferring the easy-read wording when asked
    pub fn display_text(&self, id: &str, easy_read: bool) -> Option<&str> {
        if easy_read {
            if let Some(text) = self.text(&Self::easy_read_key(id)) {
                return Some(text);
            }
        }
        self.text(id)
    }

    #[cfg(test)]
    pub fn with_audio(lang: &str, entries: &[(&str, &str)]) -> Self {
        let file = TranslationFile {
            texts: HashMap::new(),
            audio_files: entries
                .iter()
                .map(|(id, path)| (id.to_string(), path.to_string()))
                .collect(),
        };
        Self::from_translations(lang, file, Path::new("audio"))
    }
}
