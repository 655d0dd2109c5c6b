// src/services/csv_import.rs

use std::collections::BTreeMap;

use csv::{ErrorKind, ReaderBuilder, Trim};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;

/// Linha do cabeçalho; linhas de dados começam em 2.
pub const HEADER_ROW: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsvRowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

/// Linha válida: coluna -> valor aparado (`None` quando vazio).
pub type CsvRecord = BTreeMap<String, Option<String>>;

#[derive(Debug, Default)]
pub struct CsvValidation {
    pub valid_rows: Vec<CsvRecord>,
    pub errors: Vec<CsvRowError>,
}

/// Valida um CSV contra a lista de campos obrigatórios.
///
/// Cabeçalho sem algum campo obrigatório invalida o arquivo inteiro. Cada
/// linha sem valor num campo obrigatório gera um erro por campo e fica de
/// fora de `valid_rows`. Uma linha ilegível (UTF-8 inválido, por exemplo) vira
/// um erro daquela linha e a leitura segue. Só um cabeçalho ilegível sobe como
/// `AppError`.
pub fn validate_csv(content: &[u8], required_fields: &[&str]) -> Result<CsvValidation, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let missing_columns: Vec<CsvRowError> = required_fields
        .iter()
        .filter(|field| !headers.iter().any(|h| h == *field))
        .map(|field| CsvRowError {
            row: HEADER_ROW,
            field: field.to_string(),
            message: format!("Missing required column '{field}'"),
        })
        .collect();

    if !missing_columns.is_empty() {
        return Ok(CsvValidation {
            valid_rows: Vec::new(),
            errors: missing_columns,
        });
    }

    let mut validation = CsvValidation::default();

    for (index, record) in reader.records().enumerate() {
        let row = index + HEADER_ROW + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                validation.errors.push(unreadable_row(row, &headers, &e));
                continue;
            }
        };

        let values: CsvRecord = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = record
                    .get(i)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                (header.clone(), value)
            })
            .collect();

        let row_errors: Vec<CsvRowError> = required_fields
            .iter()
            .filter(|field| values.get(**field).is_none_or(|v| v.is_none()))
            .map(|field| CsvRowError {
                row,
                field: field.to_string(),
                message: format!("'{field}' is required"),
            })
            .collect();

        if row_errors.is_empty() {
            validation.valid_rows.push(values);
        } else {
            validation.errors.extend(row_errors);
        }
    }

    Ok(validation)
}

fn unreadable_row(row: usize, headers: &[String], error: &csv::Error) -> CsvRowError {
    let field = match error.kind() {
        ErrorKind::Utf8 { err, .. } => headers.get(err.field()).cloned(),
        _ => None,
    };

    CsvRowError {
        row,
        field: field.unwrap_or_default(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &[&str] = &["continent", "country"];

    #[test]
    fn row_with_empty_required_field_is_rejected() {
        let content = b"continent,country,state,city\n,France,,Paris\nEurope,Italy,,Rome\n";

        let result = validate_csv(content, REQUIRED).unwrap();

        assert_eq!(
            result.errors,
            vec![CsvRowError {
                row: 2,
                field: "continent".into(),
                message: "'continent' is required".into(),
            }]
        );
        assert_eq!(result.valid_rows.len(), 1);
        assert_eq!(result.valid_rows[0]["country"], Some("Italy".to_string()));
    }

    #[test]
    fn valid_rows_are_trimmed_and_empty_optionals_become_none() {
        let content = b"continent,country,state,city\n  Europe , France ,  , Paris \n";

        let result = validate_csv(content, REQUIRED).unwrap();

        assert!(result.errors.is_empty());
        let row = &result.valid_rows[0];
        assert_eq!(row["continent"].as_deref(), Some("Europe"));
        assert_eq!(row["country"].as_deref(), Some("France"));
        assert_eq!(row["state"], None);
        assert_eq!(row["city"].as_deref(), Some("Paris"));
    }

    #[test]
    fn one_error_per_missing_field_with_header_offset() {
        let content = b"continent,country\nEurope,France\n,\nAsia,\n";

        let result = validate_csv(content, REQUIRED).unwrap();

        let found: Vec<(usize, &str)> = result
            .errors
            .iter()
            .map(|e| (e.row, e.field.as_str()))
            .collect();
        assert_eq!(found, vec![(3, "continent"), (3, "country"), (4, "country")]);
        assert_eq!(result.valid_rows.len(), 1);
    }

    #[test]
    fn missing_required_column_rejects_the_file() {
        let content = b"continent,city\nEurope,Paris\n";

        let result = validate_csv(content, REQUIRED).unwrap();

        assert!(result.valid_rows.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, HEADER_ROW);
        assert_eq!(result.errors[0].field, "country");
    }

    #[test]
    fn short_rows_count_as_missing_values() {
        let content = "\u{feff}continent,country,city\nEurope\n".as_bytes();

        let result = validate_csv(content, REQUIRED).unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "country");
    }

    #[test]
    fn unreadable_row_is_reported_and_reading_continues() {
        let content = b"continent,country\nEurope,France\nAsia,Jap\xffan\nAfrica,Kenya\n";

        let result = validate_csv(content, REQUIRED).unwrap();

        assert_eq!(result.valid_rows.len(), 2);
        assert_eq!(result.valid_rows[1]["country"].as_deref(), Some("Kenya"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 3);
        assert_eq!(result.errors[0].field, "country");
    }
}
