// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::model::{Record, SortDirection, SortSpec, ViewState};
use crate::search::{SearchEngine, substring_filter};

/// One derived page of the grid: the rows to display plus the pagination
/// facts the footer reports. Pure function of store + view state.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub rows: Vec<&'a Record>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl PageView<'_> {
    pub fn page_label(&self) -> String {
        format!("Page {} / {}", self.page + 1, self.page_count)
    }

    pub fn total_label(&self) -> String {
        format!("{} row(s)", self.total)
    }
}

/// Stage order is fixed: filter, then sort, then paginate. The page is
/// always clamped here, regardless of what the caller last set.
pub fn derive<'a>(
    records: &'a [Record],
    keys: &[&str],
    view: &ViewState,
    engine: Option<&dyn SearchEngine>,
) -> PageView<'a> {
    let mut rows = filter_rows(records, keys, &view.search, engine);
    sort_rows(&mut rows, &view.sort);

    let total = rows.len();
    let page_count = page_count(total, view.page_size);
    let page = clamp_page(view.page, total, view.page_size);
    let rows = slice_page(&rows, page, view.page_size);

    PageView {
        rows,
        page,
        page_count,
        total,
    }
}

pub fn filter_rows<'a>(
    records: &'a [Record],
    keys: &[&str],
    query: &str,
    engine: Option<&dyn SearchEngine>,
) -> Vec<&'a Record> {
    let query = query.trim();
    if query.is_empty() {
        return records.iter().collect();
    }

    match engine {
        Some(engine) => {
            let by_id: BTreeMap<_, _> = records.iter().map(|record| (record.id, record)).collect();
            engine
                .search(records, keys, query)
                .into_iter()
                .filter_map(|id| by_id.get(&id).copied())
                .collect()
        }
        None => substring_filter(records, keys, query),
    }
}

/// Stable sort on the stringified sort-key values; ties keep filtered order
/// in both directions. Missing values compare as empty string.
pub fn sort_rows(rows: &mut [&Record], sort: &SortSpec) {
    let Some(key) = &sort.key else {
        return;
    };
    rows.sort_by(|a, b| {
        let ordering = natural_cmp(&a.text(key), &b.text(key));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.min(page_count(total, page_size) - 1)
}

/// Raw slice of one page; an out-of-range page yields an empty slice.
pub fn slice_page<'a>(rows: &[&'a Record], page: usize, page_size: usize) -> Vec<&'a Record> {
    rows.iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .copied()
        .collect()
}

/// Numeric-aware, case-insensitive ordering: digit runs compare by value
/// ("9" before "10"), everything else per lowercased char.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) if lc.is_ascii_digit() && rc.is_ascii_digit() => {
                let ordering = cmp_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(lc), Some(rc)) => {
                let lc_low = lc.to_lowercase().next().unwrap_or(lc);
                let rc_low = rc.to_lowercase().next().unwrap_or(rc);
                if lc_low != rc_low {
                    return lc_low.cmp(&rc_low);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied()
        && c.is_ascii_digit()
    {
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_value = a.trim_start_matches('0');
    let b_value = b.trim_start_matches('0');
    a_value
        .len()
        .cmp(&b_value.len())
        .then_with(|| a_value.cmp(b_value))
        .then_with(|| a.len().cmp(&b.len()))
}
