use serde::{Deserialize, Serialize};

/// Group every anonymous caller belongs to / 公共分组
pub const PUBLIC_GROUP: &str = "public";

/// Topic type / 主题类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TopicKind {
    Article,
    Dict,
}

impl TopicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKind::Article => "article",
            TopicKind::Dict => "dict",
        }
    }
}

/// One ingested document and its metadata, unique by `file_name` / 主题
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TopicKind,
    pub file_name: String,
    pub publication: Option<String>,
    pub chapter: Option<String>,
    pub part: Option<String>,
    pub foreign_lang: Option<String>,
    pub base_lang: Option<String>,
    pub group_name: String,
    pub sort_index: i64,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub publisher: Option<String>,
    pub pub_date: Option<String>,
    pub isbn: Option<String>,
    pub categories: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_modified: Option<i64>,
}

impl Topic {
    /// Bare topic with every optional field cleared / 空白主题
    pub fn new(kind: TopicKind, file_name: &str, group_name: &str) -> Self {
        Self {
            id: String::new(),
            kind,
            file_name: file_name.to_string(),
            publication: None,
            chapter: None,
            part: None,
            foreign_lang: None,
            base_lang: None,
            group_name: group_name.to_string(),
            sort_index: 0,
            title: None,
            subtitle: None,
            author: None,
            copyright: None,
            publisher: None,
            pub_date: None,
            isbn: None,
            categories: None,
            hash: None,
            last_modified: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("topic fileName is required".to_string());
        }
        if self.group_name.trim().is_empty() {
            return Err(format!("topic '{}': groupName is required", self.file_name));
        }
        Ok(())
    }
}

/// A tag mention tied to the nearest preceding section heading / 话题标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashTagOccurrence {
    pub tag: String,
    pub subtitle: String,
}

/// Article content linked to its topic / 文章内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub topic_id: String,
    pub file_name: String,
    pub group_name: String,
    pub title: String,
    pub md_text: String,
    pub html_text: String,
    pub index_text: String,
    #[serde(default)]
    pub hash_tags: Vec<HashTagOccurrence>,
}

impl ArticleRecord {
    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("article fileName is required".to_string());
        }
        if self.title.trim().is_empty() {
            return Err(format!("article '{}': title is required", self.file_name));
        }
        if self.group_name.trim().is_empty() {
            return Err(format!("article '{}': groupName is required", self.file_name));
        }
        Ok(())
    }
}

/// Stored hashtag row (one per occurrence) / 标签记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HashTagRow {
    pub name: String,
    pub subtitle: String,
    pub group_name: String,
    pub topic_id: String,
}

/// One (word-form, attribute, order) entry under a base lemma / 词条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LemmaRow {
    pub word: String,
    pub lang: String,
    pub base_word: String,
    pub base_lang: String,
    #[sqlx(rename = "word_order")]
    pub order: i64,
    pub homonym: i64,
    pub attr: String,
    pub text: String,
    pub group_name: String,
    pub topic_id: String,
}

impl LemmaRow {
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("word", &self.word),
            ("lang", &self.lang),
            ("baseWord", &self.base_word),
            ("baseLang", &self.base_lang),
            ("attr", &self.attr),
            ("text", &self.text),
            ("groupName", &self.group_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("lemma '{}': {} is required", self.text, field));
            }
        }
        Ok(())
    }
}

/// Derived autocomplete entry / 自动补全条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AutoCompleteItem {
    pub word: String,
    pub lang: String,
}

/// Result of a successful ingestion / 导入结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub file_name: String,
    #[serde(rename = "type")]
    pub kind: TopicKind,
    pub title: Option<String>,
    pub hash: Option<String>,
}

impl From<&Topic> for TopicSummary {
    fn from(topic: &Topic) -> Self {
        Self {
            file_name: topic.file_name.clone(),
            kind: topic.kind,
            title: topic.title.clone(),
            hash: topic.hash.clone(),
        }
    }
}

/// Caller identity supplied by the auth collaborator / 调用者身份
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Caller {
    pub groups: Vec<String>,
    pub is_admin: bool,
    pub authenticated: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(groups: Vec<String>) -> Self {
        Self { groups, is_admin: false, authenticated: true }
    }

    pub fn admin() -> Self {
        Self { groups: Vec::new(), is_admin: true, authenticated: true }
    }

    /// Groups the caller may read; `None` means unrestricted (admin)
    pub fn authorized_groups(&self) -> Option<Vec<String>> {
        if self.is_admin {
            return None;
        }
        let mut groups = if self.authenticated { self.groups.clone() } else { Vec::new() };
        if !groups.iter().any(|g| g == PUBLIC_GROUP) {
            groups.push(PUBLIC_GROUP.to_string());
        }
        Some(groups)
    }

    /// Groups searched by dictionary lookups. Unlike [`Caller::authorized_groups`]
    /// a signed-in user gets only their own groups, without "public".
    pub fn dictionary_groups(&self) -> Option<Vec<String>> {
        if self.is_admin {
            None
        } else if self.authenticated {
            Some(self.groups.clone())
        } else {
            Some(vec![PUBLIC_GROUP.to_string()])
        }
    }

    pub fn can_read(&self, group_name: &str) -> bool {
        match self.authorized_groups() {
            None => true,
            Some(groups) => groups.iter().any(|g| g == group_name),
        }
    }
}
