//! Per-file change details of a commit.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};
use vc_data_fetcher_developer_platforms::{
    models::{AccessCredential, CommitFileEntry, FileChange},
    CommitHistoryProvider,
};

use crate::{
    config::{
        FILE_DELETED_PLACEHOLDER, NEW_FILE_PLACEHOLDER, NO_PATCH_PLACEHOLDER,
        UNKNOWN_PREVIOUS_FILENAME,
    },
    errors::AnalysisError,
    repo_ref::RepoRef,
    until_cancelled,
};

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;

/// The final path segment of a repository path.
pub fn file_name_of(full_path: &str) -> &str {
    full_path.rsplit('/').next().unwrap_or(full_path)
}

/// The extension of a file name, without the dot.
///
/// Dot files such as `.gitignore` have no extension.
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(index) if index > 0 => &file_name[index + 1..],
        _ => "",
    }
}

/// The code shown for a file: its patch, or a placeholder describing the change.
pub fn code_for(entry: &CommitFileEntry) -> String {
    if let Some(patch) = &entry.patch {
        return patch.clone();
    }

    match entry.status.as_str() {
        "added" => NEW_FILE_PLACEHOLDER.to_string(),
        "removed" => FILE_DELETED_PLACEHOLDER.to_string(),
        "renamed" => format!(
            "// File renamed from: {} to: {}",
            entry
                .previous_filename
                .as_deref()
                .unwrap_or(UNKNOWN_PREVIOUS_FILENAME),
            entry.filename
        ),
        _ => NO_PATCH_PLACEHOLDER.to_string(),
    }
}

/// Converts an upstream file entry into the reported file change.
///
/// Missing statistics count as zero and `changes` falls back to their sum.
pub fn file_change_from(entry: CommitFileEntry) -> FileChange {
    let code = code_for(&entry);
    let file_name = file_name_of(&entry.filename).to_string();
    let extension = extension_of(&file_name).to_string();
    let additions = entry.additions.unwrap_or(0);
    let deletions = entry.deletions.unwrap_or(0);

    FileChange {
        file_name,
        extension,
        code,
        additions,
        deletions,
        changes: entry.changes.unwrap_or(additions + deletions),
        is_binary: entry.binary.unwrap_or(false),
        operation: entry.status,
        previous_filename: entry.previous_filename,
        full_path: entry.filename,
    }
}

/// Fetches the changed files of a commit.
///
/// Failing to load the files of one commit must not abort a report, so any
/// platform error is logged and results in an empty file list. Only
/// cancellation is returned as an error.
#[instrument(skip(provider, credential, cancel), fields(repository = %repo))]
pub async fn files_for<P: CommitHistoryProvider + ?Sized>(
    provider: &P,
    repo: &RepoRef,
    sha: &str,
    credential: &AccessCredential,
    cancel: &CancellationToken,
) -> Result<Vec<FileChange>, AnalysisError> {
    let entries = until_cancelled(
        cancel,
        provider.commit_files(repo.owner(), repo.name(), sha, credential),
    )
    .await?;

    match entries {
        Ok(entries) => {
            let files: Vec<FileChange> = entries.into_iter().map(file_change_from).collect();
            for file in &files {
                debug!(
                    file = file.file_name.as_str(),
                    status = file.operation.as_str(),
                    patch_length = file.code.len(),
                    additions = file.additions,
                    deletions = file.deletions,
                    "Processed file"
                );
            }
            Ok(files)
        }
        Err(e) => {
            error!(
                sha,
                error = e.to_string(),
                "Error fetching file details for commit"
            );
            Ok(Vec::new())
        }
    }
}
