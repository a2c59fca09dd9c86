use super::CatalogEntry;
use crate::schema::{resolve_columns, ColumnSpec, SchemaError};
use crate::sources::Table;
use tracing::warn;

const CATALOG_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required(
        "id",
        &["ID", "Program ID", "ID Programa", "Código", "Clave", "Code"],
    ),
    ColumnSpec::required(
        "name",
        &["Programa", "Program", "Nombre", "Name", "Nombre del programa"],
    ),
    ColumnSpec::optional("aliases", &["Alias", "Aliases", "Variantes"]),
];

pub(crate) fn parse_entries(table: &Table) -> Result<Vec<CatalogEntry>, SchemaError> {
    let columns = resolve_columns(table, CATALOG_COLUMNS)?;
    let (Some(id_col), Some(name_col)) = (columns.position("id"), columns.position("name")) else {
        return Ok(Vec::new());
    };
    let alias_col = columns.position("aliases");

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in table.data_rows() {
        let id = table.cell(row, id_col);
        let name = table.cell(row, name_col);
        if id.is_empty() || name.is_empty() {
            warn!(table = %table.name, row, "skipping catalog row without id or name");
            continue;
        }

        let aliases = alias_col
            .map(|col| {
                table
                    .cell(row, col)
                    .split(';')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        entries.push(CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            aliases,
        });
    }

    Ok(entries)
}
