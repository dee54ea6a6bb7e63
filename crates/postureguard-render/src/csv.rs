use crate::Table;

/// Render a table as CSV (RFC 4180 quoting, CRLF-free, trailing newline).
pub fn render_csv(table: &Table) -> String {
    let mut out = String::new();
    push_record(&mut out, table.columns.iter().copied());
    for row in &table.rows {
        push_record(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_record<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(cell));
    }
    out.push('\n');
}

/// Characters that make spreadsheet applications evaluate a cell as a formula.
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

fn escape(cell: &str) -> String {
    let cell = if cell.starts_with(FORMULA_TRIGGERS) {
        format!("'{cell}")
    } else {
        cell.to_string()
    };
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AUDIT_COLUMNS;

    #[test]
    fn quotes_cells_that_need_it() {
        let table = Table {
            columns: AUDIT_COLUMNS,
            rows: vec![vec![
                "WS01".to_string(),
                "AuditPolicy".to_string(),
                "Logon".to_string(),
                "Warn".to_string(),
                "Success only, \"consider\" Failure".to_string(),
            ]],
        };
        insta::assert_snapshot!(render_csv(&table), @r#"
        Host,Category,Item,Status,Details
        WS01,AuditPolicy,Logon,Warn,"Success only, ""consider"" Failure"
        "#);
    }

    #[test]
    fn formula_cells_are_neutralized() {
        let table = Table {
            columns: AUDIT_COLUMNS,
            rows: vec![vec![
                "=HYPERLINK(\"http://evil.example\",\"open\")".to_string(),
                "+1".to_string(),
                "-2+3".to_string(),
                "@SUM(A1)".to_string(),
                "plain = text".to_string(),
            ]],
        };
        insta::assert_snapshot!(render_csv(&table), @r#"
        Host,Category,Item,Status,Details
        "'=HYPERLINK(""http://evil.example"",""open"")",'+1,'-2+3,'@SUM(A1),plain = text
        "#);
    }

    #[test]
    fn header_only_when_no_rows() {
        let table = Table {
            columns: AUDIT_COLUMNS,
            rows: Vec::new(),
        };
        assert_eq!(render_csv(&table), "Host,Category,Item,Status,Details\n");
    }
}
