//! User-facing error message formatting.
//!
//! Matches on typed errors (ExploreError, PolarsError variants, io::ErrorKind) rather than
//! parsing strings.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

use crate::error::ExploreError;

/// Format an ExploreError with a hint on what to change.
pub fn user_message_from_explore(err: &ExploreError) -> String {
    match err {
        ExploreError::UnreadableFile(msg) => format!(
            "Could not read the spreadsheet ({}). Supported formats: xlsx, xlsm, xlsb, xls, ods.",
            msg
        ),
        ExploreError::SheetNotFound { sheet, available } => format!(
            "Sheet '{}' not found. Use --sheet with one of: {}",
            sheet,
            available.join(", ")
        ),
        ExploreError::UnsupportedSchema { player, team } => format!(
            "This sheet has neither a '{}' nor a '{}' column. Pick another sheet or set --player-column/--team-column.",
            player, team
        ),
        ExploreError::MissingColumn { column, context } => format!(
            "Column '{}' not found ({}). Run with --describe to list usable columns.",
            column, context
        ),
        ExploreError::UnusableColumn { column, reason } => format!(
            "Column '{}' cannot be used: {}. Run with --describe to list usable columns.",
            column, reason
        ),
        ExploreError::InvalidRange { .. } => {
            format!("{}. Check --min-minutes and --max-minutes.", err)
        }
        ExploreError::EmptyDataset => {
            "No rows left after filtering. Widen the minutes range or drop --exclude-zeros."
                .to_string()
        }
        ExploreError::NoNumericValues { column } => format!(
            "Column '{}' has no numeric values after filtering; choose another axis.",
            column
        ),
        ExploreError::Polars(pe) => user_message_from_polars(pe),
    }
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!(
            "Column not found: {}. Check spelling and that the column exists.",
            msg
        ),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::ComputeError(msg) => format!("Computation failed: {}", msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types along its cause chain.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("{}: {}", p.display(), msg),
        None => msg,
    };

    for cause in report.chain() {
        if let Some(ee) = cause.downcast_ref::<ExploreError>() {
            return with_path(user_message_from_explore(ee));
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return with_path(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(io_err, None));
        }
    }

    // First line only; avoids dumping long reports
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred");
    with_path(first_line.trim().to_string())
}
