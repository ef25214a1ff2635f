//! Parsing of the listing query string and composition of the filtered,
//! sorted, paginated SQL behind `GET /transactions`.
//!
//! All filter values are bound parameters. The predicate always starts with
//! `user_id = $1`, so nothing outside the caller's rows can be counted or
//! returned.

use sqlx::{Postgres, QueryBuilder};

use super::{dto::ListTransactionsParams, repo_types::TransactionType};
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

pub const INVALID_TYPE_FILTER: &str = "invalid type filter: must be 'income' or 'expense'";
pub const INVALID_SORT: &str = "invalid sort parameter: must be 'asc' or 'desc'";
pub const INVALID_CATEGORY_ID: &str = "invalid category_id";
pub const CATEGORY_ID_NOT_POSITIVE: &str = "category_id must be positive";
pub const INVALID_MIN_AMOUNT: &str = "invalid min_amount";
pub const INVALID_MAX_AMOUNT: &str = "invalid max_amount";
pub const INVALID_PAGE: &str = "page must be a positive integer";
pub const INVALID_LIMIT: &str = "limit must be between 1 and 100";

const SELECT_COLUMNS: &str = "SELECT id, user_id, amount, type, category_id, date FROM transactions";
const SELECT_COUNT: &str = "SELECT COUNT(*) FROM transactions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Conjunctive row filter. `None` means "not constrained".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category_id: Option<i64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

/// A validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub filter: TransactionFilter,
    /// Orders by `date`; `None` keeps whatever order the database returns.
    pub sort: Option<SortOrder>,
    pub page: i64,
    pub limit: i64,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            filter: TransactionFilter::default(),
            sort: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Empty query values (`?type=`) count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A bound of zero is indistinguishable from no bound.
fn parse_amount_bound(value: Option<String>, message: &'static str) -> ApiResult<Option<f64>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok((v > 0.0).then_some(v)),
        _ => Err(ApiError::validation(message)),
    }
}

impl TransactionQuery {
    /// Validates every parameter before anything touches the database.
    /// Category ownership is checked later, by the store.
    pub fn parse(params: ListTransactionsParams) -> ApiResult<Self> {
        let category_id = match present(params.category_id) {
            Some(raw) => {
                let id = raw
                    .parse::<i64>()
                    .map_err(|_| ApiError::validation(INVALID_CATEGORY_ID))?;
                if id <= 0 {
                    return Err(ApiError::validation(CATEGORY_ID_NOT_POSITIVE));
                }
                Some(id)
            }
            None => None,
        };

        let min_amount = parse_amount_bound(params.min_amount, INVALID_MIN_AMOUNT)?;
        let max_amount = parse_amount_bound(params.max_amount, INVALID_MAX_AMOUNT)?;

        let kind = present(params.kind)
            .map(|raw| raw.parse::<TransactionType>())
            .transpose()
            .map_err(|_| ApiError::validation(INVALID_TYPE_FILTER))?;

        let sort = match present(params.sort).as_deref() {
            None => None,
            Some("asc") => Some(SortOrder::Asc),
            Some("desc") => Some(SortOrder::Desc),
            Some(_) => return Err(ApiError::validation(INVALID_SORT)),
        };

        let page = match present(params.page) {
            None => DEFAULT_PAGE,
            Some(raw) => match raw.parse::<i64>() {
                Ok(p) if p >= 1 => p,
                _ => return Err(ApiError::validation(INVALID_PAGE)),
            },
        };

        let limit = match present(params.limit) {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<i64>() {
                Ok(l) if (1..=MAX_LIMIT).contains(&l) => l,
                _ => return Err(ApiError::validation(INVALID_LIMIT)),
            },
        };

        Ok(Self {
            filter: TransactionFilter {
                kind,
                category_id,
                min_amount,
                max_amount,
            },
            sort,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, user_id: i64, filter: &TransactionFilter) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(kind) = filter.kind {
        qb.push(" AND type = ").push_bind(kind.as_str());
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(min) = filter.min_amount {
        qb.push(" AND amount >= ").push_bind(min);
    }
    if let Some(max) = filter.max_amount {
        qb.push(" AND amount <= ").push_bind(max);
    }
}

/// `COUNT(*)` over the filter, ignoring pagination.
pub fn count_query(user_id: i64, filter: &TransactionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_COUNT);
    push_predicate(&mut qb, user_id, filter);
    qb
}

/// One page of rows. Equal dates are ordered by id in the same direction so
/// consecutive pages neither repeat nor skip rows.
pub fn page_query(user_id: i64, query: &TransactionQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_COLUMNS);
    push_predicate(&mut qb, user_id, &query.filter);
    if let Some(sort) = query.sort {
        let dir = sort.sql();
        qb.push(format!(" ORDER BY date {dir}, id {dir}"));
    }
    qb.push(" LIMIT ").push_bind(query.limit);
    qb.push(" OFFSET ").push_bind(query.offset());
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListTransactionsParams {
        let mut p = ListTransactionsParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "type" => p.kind = value,
                "category_id" => p.category_id = value,
                "min_amount" => p.min_amount = value,
                "max_amount" => p.max_amount = value,
                "sort" => p.sort = value,
                "page" => p.page = value,
                "limit" => p.limit = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    fn rejection(pairs: &[(&str, &str)]) -> String {
        match TransactionQuery::parse(params(pairs)) {
            Err(ApiError::Validation(msg)) => msg,
            other => panic!("expected validation error for {pairs:?}, got {other:?}"),
        }
    }

    #[test]
    fn no_params_gives_defaults() {
        let q = TransactionQuery::parse(ListTransactionsParams::default()).unwrap();
        assert_eq!(q, TransactionQuery::default());
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn empty_values_are_ignored() {
        let q = TransactionQuery::parse(params(&[
            ("type", ""),
            ("category_id", ""),
            ("sort", ""),
            ("page", ""),
            ("limit", ""),
        ]))
        .unwrap();
        assert_eq!(q, TransactionQuery::default());
    }

    #[test]
    fn parses_every_filter() {
        let q = TransactionQuery::parse(params(&[
            ("type", "expense"),
            ("category_id", "4"),
            ("min_amount", "10.5"),
            ("max_amount", "99"),
            ("sort", "desc"),
            ("page", "3"),
            ("limit", "20"),
        ]))
        .unwrap();
        assert_eq!(
            q.filter,
            TransactionFilter {
                kind: Some(TransactionType::Expense),
                category_id: Some(4),
                min_amount: Some(10.5),
                max_amount: Some(99.0),
            }
        );
        assert_eq!(q.sort, Some(SortOrder::Desc));
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn rejects_unknown_type() {
        for bad in ["transfer", "INCOME", "incomes"] {
            assert_eq!(rejection(&[("type", bad)]), INVALID_TYPE_FILTER);
        }
    }

    #[test]
    fn rejects_unknown_sort() {
        assert_eq!(rejection(&[("sort", "newest")]), INVALID_SORT);
        assert_eq!(rejection(&[("sort", "ASC")]), INVALID_SORT);
    }

    #[test]
    fn rejects_bad_category_id() {
        assert_eq!(rejection(&[("category_id", "abc")]), INVALID_CATEGORY_ID);
        assert_eq!(rejection(&[("category_id", "0")]), CATEGORY_ID_NOT_POSITIVE);
        assert_eq!(rejection(&[("category_id", "-3")]), CATEGORY_ID_NOT_POSITIVE);
    }

    #[test]
    fn zero_amount_bounds_mean_unset() {
        let q = TransactionQuery::parse(params(&[("min_amount", "0"), ("max_amount", "0.0")]))
            .unwrap();
        assert_eq!(q.filter.min_amount, None);
        assert_eq!(q.filter.max_amount, None);
    }

    #[test]
    fn rejects_negative_or_non_numeric_amounts() {
        assert_eq!(rejection(&[("min_amount", "-1")]), INVALID_MIN_AMOUNT);
        assert_eq!(rejection(&[("min_amount", "lots")]), INVALID_MIN_AMOUNT);
        assert_eq!(rejection(&[("max_amount", "NaN")]), INVALID_MAX_AMOUNT);
        assert_eq!(rejection(&[("max_amount", "inf")]), INVALID_MAX_AMOUNT);
    }

    #[test]
    fn page_and_limit_bounds() {
        assert_eq!(rejection(&[("page", "0")]), INVALID_PAGE);
        assert_eq!(rejection(&[("page", "two")]), INVALID_PAGE);
        assert_eq!(rejection(&[("limit", "0")]), INVALID_LIMIT);
        assert_eq!(rejection(&[("limit", "101")]), INVALID_LIMIT);

        let q = TransactionQuery::parse(params(&[("limit", "100")])).unwrap();
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let page = i64::MAX.to_string();
        let q = TransactionQuery::parse(params(&[("page", page.as_str()), ("limit", "100")])).unwrap();
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn count_query_is_scoped_to_user() {
        let qb = count_query(7, &TransactionFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM transactions WHERE user_id = $1");
    }

    #[test]
    fn count_query_adds_each_filter_in_order() {
        let filter = TransactionFilter {
            kind: Some(TransactionType::Income),
            category_id: Some(2),
            min_amount: Some(1.0),
            max_amount: Some(50.0),
        };
        let qb = count_query(7, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM transactions WHERE user_id = $1 AND type = $2 \
             AND category_id = $3 AND amount >= $4 AND amount <= $5"
        );
    }

    #[test]
    fn page_query_without_sort_has_no_order_by() {
        let query = TransactionQuery {
            filter: TransactionFilter {
                max_amount: Some(20.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let qb = page_query(1, &query);
        assert_eq!(
            qb.sql(),
            "SELECT id, user_id, amount, type, category_id, date FROM transactions \
             WHERE user_id = $1 AND amount <= $2 LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn page_query_orders_by_date_then_id() {
        let query = TransactionQuery {
            sort: Some(SortOrder::Asc),
            page: 2,
            limit: 2,
            ..Default::default()
        };
        let qb = page_query(1, &query);
        assert_eq!(
            qb.sql(),
            "SELECT id, user_id, amount, type, category_id, date FROM transactions \
             WHERE user_id = $1 ORDER BY date ASC, id ASC LIMIT $2 OFFSET $3"
        );
        assert_eq!(query.offset(), 2);
    }
}
