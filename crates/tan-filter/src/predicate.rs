//! Predicates as data.
//!
//! A compiled query is an ordered list of [`Predicate`]s plus one
//! flattened, order-significant parameter list. Predicates hold
//! [`ParamRef`] indices into that list instead of placeholder text;
//! the single rendering pass in the query layer turns an index into a
//! positional placeholder exactly once, which removes the manually
//! tracked parameter-offset arithmetic that positional backends make so
//! easy to get wrong.

use chrono::{DateTime, Utc};

/// Index of a bound parameter within a query's parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamRef(pub usize);

impl ParamRef {
    /// 1-based position for `$n`-style placeholder rendering.
    pub fn position(self) -> usize {
        self.0 + 1
    }
}

/// A value bound into a compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Single text value (for example a wildcarded search pattern).
    Text(String),
    /// Whole categorical set bound as one list parameter.
    TextList(Vec<String>),
    /// Timestamp bound for a date-range comparison.
    Timestamp(DateTime<Utc>),
}

/// One filter condition of a compiled query.
///
/// Field semantics (which storage column each variant compares) are
/// fixed; only the bound values vary per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Base predicate present on every query: soft-deleted rows are
    /// never visible.
    NotDeleted,
    /// Trial name in the bound list.
    TrialIn(ParamRef),
    /// Site name in the bound list.
    SiteIn(ParamRef),
    /// Country storage code in the bound list.
    CountryIn(ParamRef),
    /// Study arm name in the bound list.
    StudyArmIn(ParamRef),
    /// Procedure name in the bound list.
    ProcedureIn(ParamRef),
    /// Library (container) name in the bound list.
    LibraryIn(ParamRef),
    /// `created_at >= bound` (start of the range's first day).
    CreatedOnOrAfter(ParamRef),
    /// `created_at < bound`, where the bound is midnight *after* the
    /// range's last day. Exclusive next-midnight is how the inclusive
    /// end-of-day rule is compiled: a record at 23:59:59 on the end
    /// date still matches.
    CreatedBefore(ParamRef),
    /// Review flag is exactly true.
    Reviewed,
    /// Awaiting review: flag is false or was never set.
    ReviewPending,
    /// Processing flag is exactly true.
    Processed,
    /// Unprocessed: flag is false or was never set.
    Unprocessed,
    /// Asset owned by a Site container (non-null container of type Site).
    SiteAssetsOnly,
    /// Asset owned by a Library container, or by no container at all.
    LibraryAssetsOnly,
    /// Case-insensitive wildcard match of one bound pattern against
    /// filename, subject number, trial name and container name. All
    /// four branches share the same parameter.
    Search(ParamRef),
}

impl Predicate {
    /// Parameter this predicate binds, if any.
    pub fn param(&self) -> Option<ParamRef> {
        match self {
            Self::TrialIn(p)
            | Self::SiteIn(p)
            | Self::CountryIn(p)
            | Self::StudyArmIn(p)
            | Self::ProcedureIn(p)
            | Self::LibraryIn(p)
            | Self::CreatedOnOrAfter(p)
            | Self::CreatedBefore(p)
            | Self::Search(p) => Some(*p),
            Self::NotDeleted
            | Self::Reviewed
            | Self::ReviewPending
            | Self::Processed
            | Self::Unprocessed
            | Self::SiteAssetsOnly
            | Self::LibraryAssetsOnly => None,
        }
    }
}

/// Accumulates predicate/parameter pairs during compilation.
///
/// `bind` hands out the parameter's final index immediately; there is
/// no later renumbering step.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    predicates: Vec<Predicate>,
    params: Vec<ParamValue>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, returning its stable index in the parameter list.
    pub fn bind(&mut self, value: ParamValue) -> ParamRef {
        self.params.push(value);
        ParamRef(self.params.len() - 1)
    }

    /// Append a predicate.
    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Bind a list parameter and append the predicate built from it in
    /// one step. Skips entirely when the set is empty: an empty
    /// categorical set is unconstrained, not exclude-all.
    pub fn push_in_list(
        &mut self,
        values: impl IntoIterator<Item = String>,
        make: impl FnOnce(ParamRef) -> Predicate,
    ) {
        let values: Vec<String> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        let param = self.bind(ParamValue::TextList(values));
        self.push(make(param));
    }

    pub fn finish(self) -> (Vec<Predicate>, Vec<ParamValue>) {
        (self.predicates, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_hands_out_sequential_indices() {
        let mut builder = QueryBuilder::new();
        let a = builder.bind(ParamValue::Text("a".to_string()));
        let b = builder.bind(ParamValue::Text("b".to_string()));
        assert_eq!(a, ParamRef(0));
        assert_eq!(b, ParamRef(1));
        assert_eq!(a.position(), 1);
        assert_eq!(b.position(), 2);
    }

    #[test]
    fn test_push_in_list_skips_empty_sets() {
        let mut builder = QueryBuilder::new();
        builder.push_in_list(Vec::new(), Predicate::TrialIn);
        let (predicates, params) = builder.finish();
        assert!(predicates.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_push_in_list_binds_whole_set_once() {
        let mut builder = QueryBuilder::new();
        builder.push_in_list(
            vec!["Trial A".to_string(), "Trial B".to_string()],
            Predicate::TrialIn,
        );
        let (predicates, params) = builder.finish();
        assert_eq!(predicates, vec![Predicate::TrialIn(ParamRef(0))]);
        assert_eq!(
            params,
            vec![ParamValue::TextList(vec![
                "Trial A".to_string(),
                "Trial B".to_string()
            ])]
        );
    }
}
