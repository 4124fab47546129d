//! Pronoun Queries

use crate::domain::character::PronounId;

/// 获取代词组
#[derive(Debug, Clone)]
pub struct GetPronoun {
    pub pronoun_id: PronounId,
}

/// 列出代词目录
#[derive(Debug, Clone)]
pub struct ListPronouns;

/// 批量获取代词组
#[derive(Debug, Clone)]
pub struct GetPronounsByIds {
    pub pronoun_ids: Vec<PronounId>,
}
