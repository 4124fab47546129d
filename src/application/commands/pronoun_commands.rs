//! Pronoun Commands

use crate::domain::character::UserId;

/// 向代词目录新增代词组
#[derive(Debug, Clone)]
pub struct CreatePronoun {
    pub requested_by: UserId,
    pub subject: String,
    pub object: String,
    pub possessive: String,
}
