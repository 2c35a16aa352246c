//! Clear-and-rebuild table rendering.

use common::SortOrder;
use console::{Alignment, measure_text_width, pad_str, style, truncate_str};

use crate::resource::Collection;
use crate::store::Store;
use crate::table::Row;

const MAX_CELL_WIDTH: usize = 40;

/// Render every row into a fresh table. `sorted` marks the active column.
pub fn render_table<T: Row>(rows: &[T], sorted: Option<(&str, SortOrder)>) -> String {
    let headers: Vec<String> = T::COLUMNS
        .iter()
        .map(|column| match sorted {
            Some((active, SortOrder::Asc)) if active == *column => format!("{column} ^"),
            Some((active, SortOrder::Desc)) if active == *column => format!("{column} v"),
            _ => column.to_string(),
        })
        .collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            T::COLUMNS
                .iter()
                .map(|column| fit(&flatten(&row.cell(column))))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| measure_text_width(&row[i]))
                .chain(std::iter::once(measure_text_width(header)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&style(line(&headers, &widths)).bold().to_string());
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row, &widths));
        out.push('\n');
    }
    if cells.is_empty() {
        out.push_str("(no rows)\n");
    }
    out
}

/// Render the collection as currently held by the store.
pub fn render_collection(store: &Store, collection: Collection) -> String {
    let sorted = store.active_sort(collection);
    match collection {
        Collection::Students => render_table(&store.students, sorted),
        Collection::Assignments => render_table(&store.assignments, sorted),
        Collection::Weeks => render_table(&store.weeks, sorted),
        Collection::Topics => render_table(&store.topics, sorted),
    }
}

fn line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Shorten a cell to `MAX_CELL_WIDTH` columns, ending in `…`, only when it is wider.
fn fit(value: &str) -> String {
    if measure_text_width(value) > MAX_CELL_WIDTH {
        truncate_str(value, MAX_CELL_WIDTH, "…").into_owned()
    } else {
        value.to_string()
    }
}

fn flatten(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
