use std::fs;
use std::path::{Path, PathBuf};

use hce_api::{parse_tree, validate_tree, TreeIssue};
use hce_core::AssistantError;
use thiserror::Error;
use walkdir::WalkDir;

use crate::CheckArgs;

#[derive(Debug, Error)]
pub(crate) enum CheckError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse dialogue tree {path}: {source}")]
    ParseTree {
        path: PathBuf,
        source: AssistantError,
    },
    #[error("No .json dialogue trees under {path}.")]
    SourceEmpty { path: PathBuf },
}

impl From<CheckError> for AssistantError {
    fn from(error: CheckError) -> Self {
        let code = match &error {
            CheckError::ReadFile { .. } => "CHECK_READ",
            CheckError::ParseTree { .. } => "CHECK_PARSE",
            CheckError::SourceEmpty { .. } => "CHECK_EMPTY",
        };
        AssistantError::new(code, error.to_string())
    }
}

/// A single file is taken as is; directories are walked for `*.json`.
pub(crate) fn collect_tree_files(root: &Path) -> Result<Vec<PathBuf>, CheckError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "json")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(CheckError::SourceEmpty {
            path: root.to_path_buf(),
        });
    }
    Ok(files)
}

pub(crate) fn check_tree_file(path: &Path, start: &str) -> Result<Vec<TreeIssue>, CheckError> {
    let raw = fs::read_to_string(path).map_err(|source| CheckError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = parse_tree(&raw).map_err(|source| CheckError::ParseTree {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(validate_tree(&tree, start))
}

pub(crate) fn check_lines(args: &CheckArgs) -> Result<(Vec<String>, usize), CheckError> {
    let mut lines = vec!["RESULT:OK".to_string()];
    let mut total = 0usize;
    for path in collect_tree_files(Path::new(&args.path))? {
        let issues = check_tree_file(&path, &args.start)?;
        lines.push(format!("FILE:{}|{}", path.display(), issues.len()));
        for issue in &issues {
            lines.push(format!("ISSUE:{}|{}", path.display(), issue));
        }
        total += issues.len();
    }
    lines.push(format!("ISSUE_COUNT:{}", total));
    Ok((lines, total))
}

/// Exit code is 1 when any tree has issues.
pub(crate) fn run_check(args: CheckArgs) -> Result<i32, AssistantError> {
    let (lines, total) = check_lines(&args)?;
    for line in lines {
        println!("{}", line);
    }
    Ok(if total == 0 { 0 } else { 1 })
}
