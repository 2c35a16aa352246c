use chrono::{DateTime, Duration, Utc};
use common::SortOrder;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{BinOper, Func, IntoColumnRef};
use sea_orm::{Condition, ExprTrait, Order};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Case-insensitive substring match of `term` against any of `columns`.
/// Column and pattern are both folded by the database's `LOWER`.
pub fn search_condition<C>(term: &str, columns: &[C]) -> Condition
where
    C: IntoColumnRef + Copy,
{
    let pattern = format!("%{}%", escape_like(term));
    columns.iter().fold(Condition::any(), |cond, &column| {
        let folded_pattern = Expr::expr(Func::lower(Expr::val(pattern.clone())))
            .binary(BinOper::Escape, Expr::Constant('\\'.into()));
        cond.add(Expr::expr(Func::lower(Expr::col(column))).binary(BinOper::Like, folded_pattern))
    })
}

pub fn to_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// The non-blank search term of a list query, if any.
pub fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Serde helper for ids that clients send either as a JSON number or as a
/// string. The value is kept as text and interpreted by [`parse_id`].
pub fn raw_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}

/// Body shape used when DELETE falls back to the JSON body for its id.
#[derive(Deserialize, Default)]
pub struct IdBody {
    #[serde(default, deserialize_with = "raw_id")]
    pub id: Option<String>,
}

/// True when an optional id parameter is absent or blank.
pub fn is_blank(raw: Option<&str>) -> bool {
    raw.is_none_or(|s| s.trim().is_empty())
}

/// The first non-blank id among `candidates`, in order of precedence.
pub fn pick_id<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().copied().flatten().find(|s| !s.trim().is_empty())
}

/// Interpret a raw id parameter.
///
/// * absent or blank         => `400 "{field} parameter is missing"`
/// * not a positive integer  => `404 "{entity} not found"`
pub fn parse_id(raw: Option<&str>, field: &str, entity: &str) -> Result<i32, AppError> {
    if is_blank(raw) {
        return Err(AppError::Validation(format!("{field} parameter is missing")));
    }
    match raw.unwrap_or_default().trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::NotFound(format!("{entity} not found"))),
    }
}

/// Resolve the `resource` discriminator of an area.
///
/// An absent value resolves to `default`; an area without a default
/// rejects it. Unknown values are always rejected.
pub fn parse_resource<T: Copy>(
    raw: Option<&str>,
    table: &[(&str, T)],
    default: Option<T>,
) -> Result<T, AppError> {
    let invalid = || {
        let names: Vec<String> = table.iter().map(|(name, _)| format!("'{name}'")).collect();
        AppError::Validation(format!("Invalid resource. Use {}", names.join(" or ")))
    };
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => common::validate::lookup(name, table).ok_or_else(invalid),
        None => default.ok_or_else(invalid),
    }
}

/// Sanitize a required free-text field, rejecting it if nothing is left.
pub fn required_text(value: Option<&str>, message: &str) -> Result<String, AppError> {
    let clean = value.map(common::validate::sanitize_text).unwrap_or_default();
    if clean.is_empty() {
        return Err(AppError::Validation(message.into()));
    }
    Ok(clean)
}

/// Parse a `YYYY-MM-DD` field.
pub fn required_date(value: &str) -> Result<chrono::NaiveDate, AppError> {
    common::validate::parse_date(value.trim())
        .ok_or_else(|| AppError::Validation("Invalid date format".into()))
}

/// A timestamp for `updated_at` that is strictly later than `previous`,
/// even when the clock has not moved on.
pub fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    std::cmp::max(Utc::now(), previous + Duration::microseconds(1))
}
