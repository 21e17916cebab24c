//! Required-column validation.
//!
//! The dataset is accepted only when every required column is present. Each
//! column can be spelled with its Spanish canonical name (as exported by the
//! point-of-sale system) or an English alias.

use crate::error::AppError;

/// The columns every sales file must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredColumn {
    Branch,
    Product,
    Year,
    Month,
    UnitsSold,
    Revenue,
    Cost,
}

impl RequiredColumn {
    pub const ALL: [RequiredColumn; 7] = [
        RequiredColumn::Branch,
        RequiredColumn::Product,
        RequiredColumn::Year,
        RequiredColumn::Month,
        RequiredColumn::UnitsSold,
        RequiredColumn::Revenue,
        RequiredColumn::Cost,
    ];

    pub fn canonical(self) -> &'static str {
        match self {
            RequiredColumn::Branch => "Sucursal",
            RequiredColumn::Product => "Producto",
            RequiredColumn::Year => "Año",
            RequiredColumn::Month => "Mes",
            RequiredColumn::UnitsSold => "Unidades_vendidas",
            RequiredColumn::Revenue => "Ingreso_total",
            RequiredColumn::Cost => "Costo_total",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            RequiredColumn::Branch => "Branch",
            RequiredColumn::Product => "Product",
            RequiredColumn::Year => "Year",
            RequiredColumn::Month => "Month",
            RequiredColumn::UnitsSold => "UnitsSold",
            RequiredColumn::Revenue => "Revenue",
            RequiredColumn::Cost => "Cost",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

/// Column index of every required column in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; 7],
}

impl ColumnMap {
    pub fn index(&self, column: RequiredColumn) -> usize {
        self.indices[column.position()]
    }
}

/// Check the header row against the required columns.
///
/// On failure every missing column is reported (by canonical name), in the
/// required order.
pub fn validate_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<ColumnMap, AppError> {
    let names: Vec<&str> = headers.into_iter().map(normalize_header_name).collect();

    let mut indices = [0usize; 7];
    let mut missing = Vec::new();

    for column in RequiredColumn::ALL {
        // The canonical spelling wins when a file carries both.
        let found = names
            .iter()
            .position(|n| *n == column.canonical())
            .or_else(|| names.iter().position(|n| *n == column.alias()));

        match found {
            Some(idx) => indices[column.position()] = idx,
            None => missing.push(column.canonical()),
        }
    }

    if missing.is_empty() {
        Ok(ColumnMap { indices })
    } else {
        Err(AppError::MissingColumns { missing })
    }
}

fn normalize_header_name(name: &str) -> &str {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPANISH: [&str; 7] = [
        "Sucursal",
        "Producto",
        "Año",
        "Mes",
        "Unidades_vendidas",
        "Ingreso_total",
        "Costo_total",
    ];

    #[test]
    fn accepts_canonical_headers() {
        let map = validate_columns(SPANISH).unwrap();
        assert_eq!(map.index(RequiredColumn::Branch), 0);
        assert_eq!(map.index(RequiredColumn::Cost), 6);
    }

    #[test]
    fn accepts_aliases_bom_and_extra_columns() {
        let headers = [
            "\u{feff}Branch",
            "Notes",
            " Product ",
            "Year",
            "Month",
            "UnitsSold",
            "Revenue",
            "Cost",
        ];
        let map = validate_columns(headers).unwrap();
        assert_eq!(map.index(RequiredColumn::Branch), 0);
        assert_eq!(map.index(RequiredColumn::Product), 2);
        assert_eq!(map.index(RequiredColumn::Cost), 7);
    }

    #[test]
    fn rejects_when_any_single_column_is_missing() {
        for skip in 0..SPANISH.len() {
            let headers: Vec<&str> = SPANISH
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, h)| *h)
                .collect();
            match validate_columns(headers) {
                Err(AppError::MissingColumns { missing }) => assert_eq!(missing, vec![SPANISH[skip]]),
                other => panic!("expected missing column error, got {other:?}"),
            }
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut headers = SPANISH.to_vec();
        headers[3] = "mes";
        assert!(matches!(
            validate_columns(headers),
            Err(AppError::MissingColumns { missing }) if missing == vec!["Mes"]
        ));
    }

    #[test]
    fn empty_header_row_misses_everything() {
        match validate_columns(std::iter::empty()) {
            Err(AppError::MissingColumns { missing }) => assert_eq!(missing.len(), 7),
            other => panic!("expected missing column error, got {other:?}"),
        }
    }
}
