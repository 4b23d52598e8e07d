//! Live file path state

use std::path::{Path, PathBuf};

/// The path triple one pipeline run operates on
///
/// `output` is always derived from `destination`: the same base name
/// with a `processed_` prefix, placed in the output directory. It is
/// recomputed whenever the destination changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPaths {
    /// Freshly uploaded data rows are copied from here
    pub source: PathBuf,
    /// Base workbook every step mutates in place
    pub destination: PathBuf,
    /// Where the final artifact is copied after a successful run
    pub output: PathBuf,
}

impl SheetPaths {
    /// Build the triple for a new upload, deriving the output path
    pub fn derive(source: &Path, destination: &Path, output_dir: &Path) -> Self {
        let base_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sheet.xlsx".to_string());

        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            output: output_dir.join(format!("processed_{base_name}")),
        }
    }

    /// Bare file name of the output artifact, as sent to the browser
    pub fn output_file_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_derived_from_destination() {
        let paths = SheetPaths::derive(
            Path::new("uploads/new_data.xlsx"),
            Path::new("uploads/base_sheet.xlsx"),
            Path::new("output"),
        );
        assert_eq!(paths.output, Path::new("output/processed_base_sheet.xlsx"));
        assert_eq!(paths.output_file_name(), "processed_base_sheet.xlsx");
    }
}
