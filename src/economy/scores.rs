//! High-score tables

use serde::Serialize;
use std::str::FromStr;

use crate::core::error::{FaunaError, Result};
use crate::core::types::AvatarId;
use crate::engine::Engine;
use crate::entity::avatar::ScoreCategory;

/// Which tables to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreQuery {
    All,
    Category(ScoreCategory),
}

impl FromStr for ScoreQuery {
    type Err = FaunaError;

    /// `*` selects every table
    fn from_str(s: &str) -> Result<Self> {
        if s == "*" {
            return Ok(ScoreQuery::All);
        }
        s.parse::<ScoreCategory>()
            .map(ScoreQuery::Category)
            .map_err(|_| FaunaError::UnknownScoreCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighScoreEntry {
    pub avatar: AvatarId,
    pub name: String,
    pub species: String,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighScoreTable {
    pub category: String,
    pub heading: String,
    pub entries: Vec<HighScoreEntry>,
}

impl Engine {
    /// Top `limit` avatars per requested category, highest first
    pub fn query_high_scores(&self, query: ScoreQuery, limit: usize) -> Result<Vec<HighScoreTable>> {
        let categories: Vec<ScoreCategory> = match query {
            ScoreQuery::All => ScoreCategory::ALL.to_vec(),
            ScoreQuery::Category(c) => vec![c],
        };

        let mut tables = Vec::with_capacity(categories.len());
        for category in categories {
            let ranked = if limit == 0 {
                Vec::new()
            } else {
                self.store
                    .zrevrange(&self.keys.scores(category.key()), 0, limit - 1)?
            };

            let mut entries = Vec::with_capacity(ranked.len());
            for (member, score) in ranked {
                let id = AvatarId::parse(&member)?;
                let avatar = self.get_avatar(id)?;
                entries.push(HighScoreEntry {
                    avatar: id,
                    name: avatar.name,
                    species: avatar.species,
                    score: score.max(0.0) as u64,
                });
            }
            tables.push(HighScoreTable {
                category: category.key().to_string(),
                heading: category.heading().to_string(),
                entries,
            });
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parse() {
        assert_eq!("*".parse::<ScoreQuery>().unwrap(), ScoreQuery::All);
        assert_eq!(
            "moved".parse::<ScoreQuery>().unwrap(),
            ScoreQuery::Category(ScoreCategory::Moved)
        );
        assert!(matches!(
            "bogus".parse::<ScoreQuery>(),
            Err(FaunaError::UnknownScoreCategory(_))
        ));
    }
}
