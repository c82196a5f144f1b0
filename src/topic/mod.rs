//! Topic listings / 主题列表

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::article::INDEX_CHAPTER;
use crate::error::{IngestError, StoreResult};
use crate::models::{Caller, Topic, TopicKind, PUBLIC_GROUP};
use crate::store::{TopicOrder, TopicQuery, TopicStore};

/// Publications per group / 分组包含的出版物
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: String,
    /// Comma-joined distinct publication names
    pub publications: String,
}

pub struct TopicService<S: ?Sized> {
    store: Arc<S>,
}

impl<S> TopicService<S>
where
    S: TopicStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Title pages of every readable publication / 出版物目录
    pub async fn collection(&self, caller: &Caller) -> StoreResult<Vec<Topic>> {
        let query = TopicQuery {
            kind: Some(TopicKind::Article),
            chapter: Some(INDEX_CHAPTER.to_string()),
            groups: caller.authorized_groups(),
            order: TopicOrder::Publication,
            ..Default::default()
        };
        let topics = self.store.find_topics(&query).await?;
        tracing::debug!("fetched collection ({} topics)", topics.len());
        Ok(topics)
    }

    /// Chapters of one publication; nothing readable counts as unauthorized
    pub async fn publication(&self, publication: &str, caller: &Caller) -> Result<Vec<Topic>, IngestError> {
        let query = TopicQuery {
            kind: Some(TopicKind::Article),
            publication: Some(publication.to_string()),
            groups: caller.authorized_groups(),
            order: TopicOrder::Chapter,
            ..Default::default()
        };
        let topics = self.store.find_topics(&query).await?;
        if topics.is_empty() {
            return Err(IngestError::Unauthorized(publication.to_string()));
        }
        tracing::debug!("fetched publication {} ({} topics)", publication, topics.len());
        Ok(topics)
    }

    /// Every topic, for administration / 全部主题
    pub async fn admin_topics(&self) -> StoreResult<Vec<Topic>> {
        let query = TopicQuery { order: TopicOrder::Catalog, ..Default::default() };
        self.store.find_topics(&query).await
    }

    /// Articles of the caller's own (non-public) groups / 用户专属主题
    pub async fn app_topics(&self, caller: &Caller) -> StoreResult<Vec<Topic>> {
        let groups = caller.authorized_groups().map(|groups| {
            groups.into_iter().filter(|g| g != PUBLIC_GROUP).collect::<Vec<_>>()
        });
        let query = TopicQuery {
            kind: Some(TopicKind::Article),
            groups,
            order: TopicOrder::Publication,
            ..Default::default()
        };
        let topics = self.store.find_topics(&query).await?;
        tracing::debug!("fetched app topics ({})", topics.len());
        Ok(topics)
    }

    /// Distinct publications per group name / 分组信息
    pub async fn group_info(&self) -> StoreResult<Vec<GroupInfo>> {
        let query = TopicQuery { order: TopicOrder::GroupName, ..Default::default() };
        let topics = self.store.find_topics(&query).await?;
        Ok(group_publications(&topics))
    }
}

fn group_publications(topics: &[Topic]) -> Vec<GroupInfo> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for topic in topics {
        let index = match groups.iter().position(|(name, _)| *name == topic.group_name) {
            Some(index) => index,
            None => {
                groups.push((topic.group_name.clone(), Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(publication) = &topic.publication {
            let publications = &mut groups[index].1;
            if !publications.contains(publication) {
                publications.push(publication.clone());
            }
        }
    }

    groups
        .into_iter()
        .map(|(name, publications)| GroupInfo { name, publications: publications.join(", ") })
        .collect()
}
