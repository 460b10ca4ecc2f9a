// crates/feedflux-core/src/transform.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Suffix appended to registry columns that collide with primary columns.
pub const DEFAULT_JOIN_SUFFIX: &str = "_author";

/// Maps one string token onto the tri-state boolean. Unrecognized tokens are
/// unknown (`None`), never silently false.
pub fn parse_bool_token(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Canonicalizes string-encoded boolean columns into nullable Boolean
/// columns. Target columns absent from the input are skipped: the same call
/// must run against partially-enriched and fully-enriched datasets. Returns
/// a new frame; the input is not touched.
pub fn normalize_boolean_columns(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let mut out = df.clone();
    for &name in columns {
        if !has_column(&out, name) {
            continue;
        }
        let text = out.column(name)?.cast(&DataType::String)?;
        let tokens = text.str()?;
        let values: Vec<Option<bool>> = tokens
            .into_iter()
            .map(|token| token.and_then(parse_bool_token))
            .collect();
        out.replace(name, Series::new(name.into(), values))?;
    }
    Ok(out)
}

/// Left-joins the primary relation against the registry. Every primary row
/// survives exactly once; unmatched rows get nulls for registry columns.
/// Enrichment must never shrink the primary entity set.
pub fn enrich_with_registry(
    primary: &DataFrame,
    registry: &DataFrame,
    on: &str,
    suffix: Option<&str>,
) -> Result<DataFrame> {
    if !has_column(primary, on) {
        return Err(PipelineError::missing_column(on, "primary"));
    }
    if !has_column(registry, on) {
        return Err(PipelineError::missing_column(on, "registry"));
    }

    let suffix = suffix.unwrap_or(DEFAULT_JOIN_SUFFIX);
    let joined = primary
        .clone()
        .lazy()
        .join(
            registry.clone().lazy(),
            [col(on)],
            [col(on)],
            JoinArgs::new(JoinType::Left).with_suffix(Some(suffix.into())),
        )
        .collect()?;
    Ok(joined)
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
