//! SQL rendering for relational backends.
//!
//! Turns a [`CompiledQuery`] into parameterized statement text with
//! `$n` placeholders. Placeholder positions come straight from each
//! predicate's [`ParamRef`](tan_filter::ParamRef), computed once at
//! compile time, so a value referenced by several branches of one
//! predicate (the search term) renders as the same placeholder in every
//! branch - no manual position bookkeeping, no off-by-one drift between
//! the clause text and the parameter list.
//!
//! The statements target the flat `assets` view the backend exposes;
//! list parameters render as `= ANY($n)` so the whole set stays one
//! bound parameter.

use tan_filter::{CompiledQuery, ParamValue, Predicate};
use tan_model::SortOrder;

/// A rendered, parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub text: String,
    /// Bound values, in placeholder order (`$1` = `params[0]`).
    pub params: Vec<ParamValue>,
}

/// Render the page-fetch statement: predicates, deterministic sort,
/// limit and offset.
pub fn render_select(query: &CompiledQuery) -> SqlStatement {
    let mut text = String::from("SELECT * FROM assets");
    push_where(&mut text, &query.predicates);
    let direction = match query.sort.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    // Stable tiebreak: nulls last, then id, so pages never overlap.
    text.push_str(&format!(
        " ORDER BY {column} {direction} NULLS LAST, id ASC LIMIT {limit} OFFSET {offset}",
        column = query.sort.column.column_name(),
        limit = query.limit,
        offset = query.offset,
    ));
    SqlStatement {
        text,
        params: query.params.clone(),
    }
}

/// Render the count statement over the same predicate set.
pub fn render_count(query: &CompiledQuery) -> SqlStatement {
    let mut text = String::from("SELECT COUNT(*) FROM assets");
    push_where(&mut text, &query.predicates);
    SqlStatement {
        text,
        params: query.params.clone(),
    }
}

fn push_where(text: &mut String, predicates: &[Predicate]) {
    if predicates.is_empty() {
        return;
    }
    let clauses: Vec<String> = predicates.iter().map(clause).collect();
    text.push_str(" WHERE ");
    text.push_str(&clauses.join(" AND "));
}

fn clause(predicate: &Predicate) -> String {
    match predicate {
        Predicate::NotDeleted => "deleted = FALSE".to_string(),
        Predicate::TrialIn(p) => format!("trial_name = ANY(${})", p.position()),
        Predicate::SiteIn(p) => format!("site_name = ANY(${})", p.position()),
        Predicate::CountryIn(p) => format!("country_code = ANY(${})", p.position()),
        Predicate::StudyArmIn(p) => format!("study_arm_name = ANY(${})", p.position()),
        Predicate::ProcedureIn(p) => format!("procedure_name = ANY(${})", p.position()),
        Predicate::LibraryIn(p) => format!("container_name = ANY(${})", p.position()),
        Predicate::CreatedOnOrAfter(p) => format!("created_at >= ${}", p.position()),
        Predicate::CreatedBefore(p) => format!("created_at < ${}", p.position()),
        Predicate::Reviewed => "reviewed = TRUE".to_string(),
        Predicate::ReviewPending => "(reviewed = FALSE OR reviewed IS NULL)".to_string(),
        Predicate::Processed => "processed = TRUE".to_string(),
        Predicate::Unprocessed => "(processed = FALSE OR processed IS NULL)".to_string(),
        Predicate::SiteAssetsOnly => {
            "(container_type = 'Site' AND container_id IS NOT NULL)".to_string()
        }
        Predicate::LibraryAssetsOnly => {
            // IS DISTINCT FROM: a NULL container_type still counts as
            // not-Site, matching the in-memory evaluation.
            "(container_type IS DISTINCT FROM 'Site' OR container_id IS NULL)".to_string()
        }
        Predicate::Search(p) => {
            let n = p.position();
            format!(
                "(filename ILIKE ${n} OR subject_number ILIKE ${n} \
                 OR trial_name ILIKE ${n} OR container_name ILIKE ${n})"
            )
        }
    }
}
