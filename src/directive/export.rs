//! Editor state snapshots sent to the tool side.
//!
//! Field names are PascalCase on the wire. File lists keep first-seen order
//! and drop duplicates.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::commands::{VS_ACTIVE_FILES, VS_PROJECT, VS_SOLUTION};
use crate::channel::Endpoint;

/// `VS_SOLUTION`: every project of the open solution with its files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SolutionExport {
    /// Full path of the solution file.
    pub name: String,
    pub projects: Vec<ProjectExport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectExport {
    /// Full path of the project file.
    pub name: String,
    pub files: Vec<String>,
}

/// `VS_PROJECT`: the project owning the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelectedProjectExport {
    /// The selected file, when the selection is a file.
    pub active_file_in_project: Option<String>,
    pub name: String,
    pub belongs_to_solution: String,
}

/// `VS_ACTIVE_FILES`: files open in editor windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveFilesList {
    pub solution_file_name: Option<String>,
    pub active_files: Vec<String>,
}

impl SolutionExport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            projects: Vec::new(),
        }
    }

    pub fn push_project<I, S>(&mut self, name: impl Into<String>, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects.push(ProjectExport {
            name: name.into(),
            files: unique(files),
        });
    }

    pub fn send(&self, endpoint: &Endpoint) -> bool {
        endpoint.send_json(VS_SOLUTION, self)
    }
}

impl SelectedProjectExport {
    pub fn send(&self, endpoint: &Endpoint) -> bool {
        endpoint.send_json(VS_PROJECT, self)
    }
}

impl ActiveFilesList {
    /// `None` when there are no files; an empty list is never sent.
    pub fn new<I, S>(solution: Option<String>, files: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let active_files = unique(files);
        if active_files.is_empty() {
            return None;
        }
        Some(Self {
            solution_file_name: solution,
            active_files,
        })
    }

    pub fn send(&self, endpoint: &Endpoint) -> bool {
        endpoint.send_json(VS_ACTIVE_FILES, self)
    }
}

fn unique<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = FxHashSet::default();
    items
        .into_iter()
        .map(Into::into)
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::read_message;
    use crate::channel::RetryPolicy;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_solution_wire_format() {
        let mut export = SolutionExport::new("C:\\app\\app.sln");
        export.push_project("C:\\app\\core.vcxproj", ["a.cpp", "b.cpp", "a.cpp"]);

        let json = serde_json::to_string(&export).unwrap();
        assert_eq!(
            json,
            r#"{"Name":"C:\\app\\app.sln","Projects":[{"Name":"C:\\app\\core.vcxproj","Files":["a.cpp","b.cpp"]}]}"#
        );
    }

    #[test]
    fn test_selected_project_null_file() {
        let export = SelectedProjectExport {
            active_file_in_project: None,
            name: "core.vcxproj".into(),
            belongs_to_solution: "app.sln".into(),
        };
        let json = serde_json::to_string(&export).unwrap();
        assert_eq!(
            json,
            r#"{"ActiveFileInProject":null,"Name":"core.vcxproj","BelongsToSolution":"app.sln"}"#
        );
    }

    #[test]
    fn test_active_files_dedup_and_empty() {
        assert!(ActiveFilesList::new(None, Vec::<String>::new()).is_none());

        let list = ActiveFilesList::new(Some("app.sln".into()), ["b.rs", "a.rs", "b.rs"]).unwrap();
        assert_eq!(list.active_files, ["b.rs", "a.rs"]);
    }

    #[test]
    fn test_send_under_command() {
        let dir = TempDir::new().unwrap();
        let endpoint = Endpoint::new(dir.path().join("ipc"));

        let list = ActiveFilesList::new(None, ["main.rs"]).unwrap();
        assert!(list.send(&endpoint));

        let path = endpoint.message_path(VS_ACTIVE_FILES);
        let text = read_message(&path, &RetryPolicy::fixed(1, Duration::ZERO)).unwrap();
        let parsed: ActiveFilesList = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, list);
    }
}
