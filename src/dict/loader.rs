//! Dictionary word-list ingestion / 词典导入
//!
//! Payload shape:
//! `{ groupName, baseLang, lemmas: [{ base, homonym, text, words: [{ word, attr, lang, order }] }] }`

use serde::{Deserialize, Serialize};

use super::rebuild::RebuildScheduler;
use crate::error::IngestError;
use crate::models::{LemmaRow, Topic, TopicKind};
use crate::store::LemmaStore;
use crate::utils::split_file_name;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictData {
    pub group_name: String,
    pub base_lang: String,
    pub lemmas: Vec<DictLemma>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictLemma {
    pub base: String,
    #[serde(default)]
    pub homonym: i64,
    pub text: String,
    pub words: Vec<DictWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictWord {
    pub word: String,
    pub attr: String,
    pub lang: String,
    pub order: i64,
}

/// Parsed dictionary file / 解析后的词典文件
#[derive(Debug, Clone)]
pub struct DictUpload {
    pub topic: Topic,
    pub data: DictData,
}

/// Parse a `.dict.json` payload / 解析词典文件
pub fn parse_file(content: &str, file_name: &str) -> Result<DictUpload, IngestError> {
    if split_file_name(file_name).is_none() {
        return Err(IngestError::InvalidFilename(file_name.to_string()));
    }

    let data: DictData = serde_json::from_str(content)?;
    let topic = Topic::new(TopicKind::Dict, file_name, &data.group_name);

    Ok(DictUpload { topic, data })
}

/// One row per (lemma, word-form) pair / 展开为词条行
pub fn flatten(topic: &Topic, data: &DictData) -> Vec<LemmaRow> {
    data.lemmas
        .iter()
        .flat_map(|lemma| {
            lemma.words.iter().map(move |word| LemmaRow {
                word: word.word.clone(),
                lang: word.lang.clone(),
                base_word: lemma.base.clone(),
                base_lang: data.base_lang.clone(),
                order: word.order,
                homonym: lemma.homonym,
                attr: word.attr.clone(),
                text: lemma.text.clone(),
                group_name: topic.group_name.clone(),
                topic_id: topic.id.clone(),
            })
        })
        .collect()
}

/// Bulk insert the rows, then schedule an index rebuild / 批量写入并安排重建
pub async fn create_data<S>(
    store: &S,
    rebuild: &RebuildScheduler,
    topic: &Topic,
    upload: &DictUpload,
) -> Result<usize, IngestError>
where
    S: LemmaStore + ?Sized,
{
    let rows = flatten(topic, &upload.data);
    for row in &rows {
        row.validate().map_err(IngestError::Validation)?;
    }

    store.insert_lemmas(&rows).await?;
    rebuild.request();

    tracing::debug!("Inserted {} lemma rows for {}", rows.len(), topic.file_name);
    Ok(rows.len())
}

/// Delete every row of the topic; no-op without a topic
pub async fn remove_data<S>(store: &S, topic: Option<&Topic>) -> Result<(), IngestError>
where
    S: LemmaStore + ?Sized,
{
    if let Some(topic) = topic {
        let removed = store.delete_lemmas(&topic.id).await?;
        tracing::debug!("Removed {} lemma rows of {}", removed, topic.file_name);
    }
    Ok(())
}
