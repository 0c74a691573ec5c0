use serde::{Deserialize, Serialize};

/// A fetched collection after client-side filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Rows the backend returned.
    pub total: usize,
    /// Rows left after filtering.
    pub matched: usize,
}

impl<T> ListResponse<T> {
    pub fn filtered<F>(items: Vec<T>, keep: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        let total = items.len();
        let items: Vec<T> = items.into_iter().filter(|item| keep(item)).collect();
        let matched = items.len();
        Self { items, total, matched }
    }

    pub fn unfiltered(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total, matched: total }
    }
}

/// An entity that can be shown as one table row.
pub trait TableRow {
    fn columns() -> &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: usize,
    pub empty_message: Option<String>,
}

impl TableView {
    pub fn build<T: TableRow>(title: &str, listing: &ListResponse<T>) -> Self {
        let rows: Vec<Vec<String>> = listing.items.iter().map(TableRow::cells).collect();
        let empty_message = if rows.is_empty() {
            if listing.total > 0 {
                Some("No records match the current filters".to_string())
            } else {
                Some(format!("No {} found", title.to_lowercase()))
            }
        } else {
            None
        };

        Self {
            title: title.to_string(),
            columns: T::columns().iter().map(|c| c.to_string()).collect(),
            rows,
            total: listing.total,
            empty_message,
        }
    }
}
