//! `page` and `size` parameters. For both, the last value given wins.

use super::params::Params;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest offset a database accepts (signed 64-bit).
const MAX_OFFSET: u64 = i64::MAX as u64;

fn parse_count(value: &str) -> u64 {
    value.trim().parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0)
}

pub fn has_page(params: &Params) -> bool {
    params.contains("page")
}

/// Page size from `page=n,size`, else [`DEFAULT_PAGE_SIZE`].
pub fn page_size(params: &Params) -> u64 {
    params
        .get_all("page")
        .iter()
        .filter_map(|page| page.split_once(',').map(|(_, size)| parse_count(size)))
        .last()
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Rows to skip. Pages are numbered from 1; lower numbers mean page 1.
/// Offsets past the largest signed 64-bit value are clamped to it.
pub fn page_offset(params: &Params) -> u64 {
    let Some(page) = params.last("page") else {
        return 0;
    };
    let number = page.split(',').next().unwrap_or_default();
    let number = parse_count(number).max(1);
    (number - 1).saturating_mul(page_size(params)).min(MAX_OFFSET)
}

/// Explicit `size`, if any.
pub fn result_size(params: &Params) -> Option<u64> {
    params.last("size").map(parse_count)
}

/// Row limit: the page size when paging, capped by `size`. `None` is unlimited.
pub fn page_limit(params: &Params) -> Option<u64> {
    let page_limit = has_page(params).then(|| page_size(params));
    match (page_limit, result_size(params)) {
        (Some(page), Some(size)) => Some(page.min(size)),
        (page, size) => page.or(size),
    }
}
