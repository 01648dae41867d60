//! Question source adapters: remote spreadsheet endpoint or local CSV export.

pub mod apps_script;
pub mod csv_file;

pub use apps_script::AppsScriptSource;
pub use csv_file::CsvFileSource;
