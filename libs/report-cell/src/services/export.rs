//! Spreadsheet-style export of any report payload.
//!
//! A payload is flattened into one sheet: nested objects become dotted
//! column names, arrays of scalars are joined with ", ", and every array of
//! objects expands into one row per element with the parent's scalar
//! columns repeated. A payload without such arrays is a single row.

use std::collections::HashSet;

use serde_json::Value;

use crate::models::{ExportFormat, ReportError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

type Cells = Vec<(String, String)>;

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => item.to_string(),
                other => scalar_text(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Collects scalar cells under `prefix`. Arrays of objects go to `tables`
/// when given, otherwise they are written out as JSON text.
fn walk<'a>(prefix: &str, value: &'a Value, cells: &mut Cells, mut tables: Option<&mut Vec<(String, &'a [Value])>>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(&join_key(prefix, key), child, cells, tables.as_deref_mut());
            }
        }
        Value::Array(items) if items.iter().any(Value::is_object) => match tables {
            Some(tables) => tables.push((prefix.to_string(), items.as_slice())),
            None => cells.push((prefix.to_string(), value.to_string())),
        },
        other => {
            let key = if prefix.is_empty() { "value".to_string() } else { prefix.to_string() };
            cells.push((key, scalar_text(other)));
        }
    }
}

fn record_rows(record: &Value) -> Vec<Cells> {
    let mut parent = Cells::new();
    let mut tables = Vec::new();
    walk("", record, &mut parent, Some(&mut tables));

    if tables.is_empty() {
        return vec![parent];
    }

    let mut rows = Vec::new();
    for (key, items) in tables {
        for item in items {
            let mut row = parent.clone();
            walk(&key, item, &mut row, None);
            rows.push(row);
        }
    }
    rows
}

pub fn flatten(payload: &Value) -> Sheet {
    let records: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let cell_rows: Vec<Cells> = records.into_iter().flat_map(record_rows).collect();

    let mut headers = Vec::new();
    let mut seen = HashSet::new();
    for (key, _) in cell_rows.iter().flatten() {
        if seen.insert(key.clone()) {
            headers.push(key.clone());
        }
    }

    let rows = cell_rows
        .into_iter()
        .map(|cells| {
            headers
                .iter()
                .map(|header| {
                    cells
                        .iter()
                        .find(|(key, _)| key == header)
                        .map(|(_, text)| text.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Sheet { headers, rows }
}

pub fn to_csv(sheet: &Sheet) -> Result<String, ReportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&sheet.headers)
        .map_err(|e| ReportError::Export(e.to_string()))?;
    for row in &sheet.rows {
        wtr.write_record(row)
            .map_err(|e| ReportError::Export(e.to_string()))?;
    }

    let bytes = wtr.into_inner().map_err(|e| ReportError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Export(e.to_string()))
}

/// Renders the payload in the requested format.
pub fn render(payload: &Value, format: ExportFormat) -> Result<String, ReportError> {
    match format {
        ExportFormat::Csv => to_csv(&flatten(payload)),
        ExportFormat::Json => serde_json::to_string_pretty(payload).map_err(|e| ReportError::Export(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card() -> Value {
        json!({
            "date": "2025-03-03",
            "pulse": { "revenue": 400.0, "target": 4000 },
            "rooms": [
                { "name": "Gym", "rate": 20.5 },
                { "name": "Pool", "rate": 0 }
            ],
            "tags": ["busy", "monday"]
        })
    }

    #[test]
    fn nested_objects_become_dotted_columns() {
        let sheet = flatten(&json!({ "a": 1, "b": { "c": true, "d": null } }));

        assert_eq!(sheet.headers, vec!["a", "b.c", "b.d"]);
        assert_eq!(sheet.rows, vec![vec!["1".to_string(), "true".to_string(), String::new()]]);
    }

    #[test]
    fn object_arrays_expand_with_parent_repeated() {
        let sheet = flatten(&card());

        assert_eq!(
            sheet.headers,
            vec!["date", "pulse.revenue", "pulse.target", "tags", "rooms.name", "rooms.rate"]
        );
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0], vec!["2025-03-03", "400", "4000", "busy, monday", "Gym", "20.5"]);
        assert_eq!(sheet.rows[1][4], "Pool");
    }

    #[test]
    fn separate_tables_leave_each_others_columns_blank() {
        let sheet = flatten(&json!({
            "alerts": [{ "message": "idle" }],
            "rooms": [{ "name": "Gym" }]
        }));

        assert_eq!(sheet.headers, vec!["alerts.message", "rooms.name"]);
        assert_eq!(sheet.rows, vec![vec!["idle".to_string(), String::new()], vec![String::new(), "Gym".to_string()]]);
    }

    #[test]
    fn matrices_are_kept_readable() {
        let sheet = flatten(&json!({ "heatmap": [[1, 2], [3, 4]] }));
        assert_eq!(sheet.rows[0][0], "[1,2], [3,4]");
    }

    #[test]
    fn csv_quotes_joined_lists() {
        let csv = render(&card(), ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("date,pulse.revenue,pulse.target,tags,rooms.name,rooms.rate"));
        assert_eq!(lines.next(), Some("2025-03-03,400,4000,\"busy, monday\",Gym,20.5"));
        assert_eq!(lines.next(), Some("2025-03-03,400,4000,\"busy, monday\",Pool,0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_export_is_pretty() {
        let out = render(&json!({ "a": 1 }), ExportFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }
}
