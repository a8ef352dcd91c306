use std::io::Cursor;
use std::path::{Path, PathBuf};

use oxidize_pdf::operations::{merge_pdfs, MergeInput, MergeOptions};
use oxidize_pdf::parser::{PdfDocument, PdfReader};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::common::error::{JobError, JobResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MergeReport {
    pub inputs: usize,
    pub pages: usize,
    #[schema(value_type = String)]
    pub output: PathBuf,
}

/// Blocking; call from `spawn_blocking`.
pub fn merge_documents(inputs: &[PathBuf], output: &Path) -> JobResult<Option<MergeReport>> {
    if inputs.is_empty() {
        warn!("No PDF files found to merge.");
        return Ok(None);
    }

    info!("Merging {} PDFs to {}", inputs.len(), output.display());

    let merge_inputs = inputs.iter().map(MergeInput::new).collect();
    merge_pdfs(merge_inputs, output, MergeOptions::default())
        .map_err(|e| JobError::Merge(e.to_string()))?;

    if !output.exists() {
        return Err(JobError::Merge(format!(
            "merge reported success but {} is missing",
            output.display()
        )));
    }

    let pages = count_pages(output)?;
    Ok(Some(MergeReport {
        inputs: inputs.len(),
        pages,
        output: output.to_path_buf(),
    }))
}

pub fn count_pages(path: &Path) -> JobResult<usize> {
    let bytes = std::fs::read(path).map_err(|e| JobError::fs(path, e))?;
    let reader = PdfReader::new(Cursor::new(bytes))
        .map_err(|e| JobError::Merge(format!("Failed to parse {}: {:?}", path.display(), e)))?;
    let document = PdfDocument::new(reader);
    document
        .page_count()
        .map(|n| n as usize)
        .map_err(|e| JobError::Merge(format!("Failed to count pages of {}: {:?}", path.display(), e)))
}
