use crate::schema::{Category, FolderPath, TargetFolder};
use chrono::{Datelike, Utc};

pub const MONTH_NAMES: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SEPTIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

/// Derives the `[year, month name, folder]` filing location for a record.
///
/// Filing must never block record creation: an absent or malformed date, or
/// a month segment outside 1-12, falls back to the current system year and
/// `"ENERO"` instead of erroring.
pub fn folder_path(
    date: &str,
    target_folder: Option<TargetFolder>,
    category: Category,
) -> FolderPath {
    let folder = target_folder.unwrap_or_else(|| category.default_folder());

    let (year, month_name) = match parse_year_month(date) {
        Some((year, month)) => (year, MONTH_NAMES[month - 1].to_string()),
        None => (Utc::now().year().to_string(), MONTH_NAMES[0].to_string()),
    };

    FolderPath([year, month_name, folder.as_str().to_string()])
}

fn parse_year_month(date: &str) -> Option<(String, usize)> {
    let mut segments = date.split('-');
    let year = segments.next()?;
    let month = segments.next()?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let month: usize = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some((year.to_string(), month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_path_is_deterministic_for_valid_dates() {
        let path = folder_path("2024-03-15", Some(TargetFolder::Ventas), Category::Income);
        assert_eq!(path.0, ["2024", "MARZO", "VENTAS"]);

        let path = folder_path("2023-12-01", Some(TargetFolder::Servicios), Category::Expense);
        assert_eq!(path.0, ["2023", "DICIEMBRE", "SERVICIOS"]);
    }

    #[test]
    fn test_empty_date_falls_back_to_current_year_and_enero() {
        let path = folder_path("", Some(TargetFolder::Compras), Category::Expense);
        assert_eq!(path.year(), Utc::now().year().to_string());
        assert_eq!(path.month(), "ENERO");
        assert_eq!(path.folder(), "COMPRAS");
    }

    #[test]
    fn test_out_of_range_month_falls_back() {
        let path = folder_path("2024-15-10", Some(TargetFolder::Compras), Category::Expense);
        assert_eq!(path.year(), Utc::now().year().to_string());
        assert_eq!(path.month(), "ENERO");
    }

    #[test]
    fn test_malformed_date_falls_back() {
        for bad in ["15/03/2024", "hoy", "24-03-15", "2024"] {
            let path = folder_path(bad, Some(TargetFolder::Ventas), Category::Income);
            assert_eq!(path.month(), "ENERO", "expected fallback for {:?}", bad);
        }
    }

    #[test]
    fn test_folder_defaults_by_category_when_unset() {
        let path = folder_path("2024-05-02", None, Category::Income);
        assert_eq!(path.folder(), "VENTAS");

        let path = folder_path("2024-05-02", None, Category::Expense);
        assert_eq!(path.folder(), "COMPRAS");
    }
}
