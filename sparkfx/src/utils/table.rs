//! Table formatting utilities

use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells.into_iter().map(|s| Cell::new(&s)).collect();
    table.add_row(Row::new(row_cells));
}

/// Two-column property table with the keys in bold
pub fn create_property_table(properties: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_CLEAN);
    for (key, value) in properties {
        table.add_row(Row::new(vec![
            Cell::new(key).style_spec("b"),
            Cell::new(value),
        ]));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows() {
        let mut table = create_table(&["Name", "Budget"]);
        add_table_row(&mut table, vec!["Sparks".to_string(), "100".to_string()]);
        add_table_row(&mut table, vec!["Smoke".to_string(), "40".to_string()]);
        assert_eq!(table.len(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Sparks"));
        assert!(rendered.contains("Budget"));
    }

    #[test]
    fn test_property_table() {
        let table = create_property_table(&[("Effect", "Campfire".to_string())]);
        assert!(table.to_string().contains("Campfire"));
    }
}
