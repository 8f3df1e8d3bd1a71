//! Typed text filters compiled to SeaORM conditions.
//!
//! Every collection is searched with the same disjunction: each normalized
//! term against each text column, plus the whole query against each column.
//! Columns are the `*_lc` shadows written with [`fold_case`] on save, so
//! folding happens in Rust on both sides instead of in SQLite, whose `LOWER()`
//! only handles ASCII. LIKE wildcards in user input are escaped.
//!
//! [`fold_case`]: super::query::fold_case

use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

use super::query::NormalizedQuery;

const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFilter {
    /// Lowercased terms, each matched on its own.
    pub terms: Vec<String>,
    /// Lowercased whole query, matched as one substring.
    pub phrase: String,
}

impl TextFilter {
    #[must_use]
    pub fn from_query(query: &NormalizedQuery) -> Self {
        Self {
            terms: query.terms.clone(),
            phrase: query.lowered.clone(),
        }
    }

    /// Needles in match order: every term, then the phrase when it is not already a term.
    #[must_use]
    pub fn needles(&self) -> Vec<&str> {
        let mut needles: Vec<&str> = self.terms.iter().map(String::as_str).collect();
        if !self.phrase.is_empty() && !needles.contains(&self.phrase.as_str()) {
            needles.push(&self.phrase);
        }
        needles
    }

    /// `OR` of every needle against every folded column.
    pub fn condition<C, I>(&self, columns: I) -> Condition
    where
        C: ColumnTrait,
        I: IntoIterator<Item = C>,
    {
        let columns: Vec<C> = columns.into_iter().collect();
        let mut condition = Condition::any();

        for needle in self.needles() {
            for column in &columns {
                condition = condition.add(contains_folded(*column, needle));
            }
        }

        condition
    }
}

/// `OR` of JSON-array membership tests for each tag against a folded text
/// column holding a serialized `Vec<String>`.
pub fn tag_condition<C: ColumnTrait>(column: C, tags: &[String]) -> Condition {
    tags.iter().fold(Condition::any(), |condition, tag| {
        let quoted = serde_json::Value::from(tag.as_str()).to_string();
        condition.add(contains_folded(column, &quoted))
    })
}

/// Substring match of an already folded `needle` against a folded column.
pub fn contains_folded<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(needle));
    Expr::col((column.entity_name(), column)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{posts, projects};
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn filter(raw: &str) -> TextFilter {
        TextFilter::from_query(&NormalizedQuery::new(raw, 200))
    }

    #[test]
    fn test_needles_include_phrase_once() {
        assert_eq!(filter("web design").needles(), vec!["web", "design", "web design"]);
        assert_eq!(filter("Branding").needles(), vec!["branding"]);
    }

    #[test]
    fn test_needles_keep_phrase_when_all_terms_are_noise() {
        assert_eq!(filter("a b").needles(), vec!["a b"]);
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
        assert_eq!(escape_like("c:\\path"), "c:\\\\path");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_condition_matches_folded_columns() {
        let condition = filter("Web design")
            .condition([posts::Column::TitleLc, posts::Column::ExcerptLc]);
        let sql = posts::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(!sql.contains("LOWER"), "{sql}");
        assert!(sql.contains("'%web%'"), "{sql}");
        assert!(sql.contains("'%design%'"), "{sql}");
        assert!(sql.contains("'%web design%'"), "{sql}");
        assert!(sql.contains("\"excerpt_lc\""), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn test_non_ascii_needles_are_folded_in_rust() {
        let condition = filter("ÉTUDES").condition([posts::Column::TitleLc]);
        let sql = posts::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(sql.contains("'%études%'"), "{sql}");
    }

    #[test]
    fn test_tag_condition_matches_quoted_json_labels() {
        let condition = tag_condition(projects::Column::TagsLc, &["web".to_string()]);
        let sql = projects::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(sql.contains("'%\"web\"%'"), "{sql}");
        assert!(sql.contains("\"tags_lc\""), "{sql}");
    }
}
