use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of value shapes used for starter code and harness arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "int[]")]
    IntArray,
    #[serde(rename = "int[][]")]
    IntMatrix,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "void")]
    Void,
}

impl CanonicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::Int => "int",
            CanonicalType::IntArray => "int[]",
            CanonicalType::IntMatrix => "int[][]",
            CanonicalType::String => "string",
            CanonicalType::StringArray => "string[]",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Void => "void",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CanonicalType,
}

/// Function signature derived from a catalog entry. Never mutated after derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSignature {
    pub function_name: String,
    pub params: Vec<Param>,
    pub return_type: CanonicalType,
}

impl ProblemSignature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }
}

/// One example invocation: argument values in parameter order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleCase(pub Vec<Value>);

impl ExampleCase {
    pub fn arguments(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    Python,
    Java,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::TypeScript, Language::Python, Language::Java];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "typescript" | "ts" => Some(Language::TypeScript),
            "python" | "python3" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    /// Judge0 language identifier
    pub fn judge0_id(&self) -> u32 {
        match self {
            Language::TypeScript => 74,
            Language::Python => 71,
            Language::Java => 62,
        }
    }

    pub fn from_judge0_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.judge0_id() == id)
    }

    /// Slug the catalog uses for this language's code snippet
    pub fn catalog_slug(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Python => "python3",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::TypeScript => write!(f, "typescript"),
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
        }
    }
}

/// Lifecycle of a remote execution job.
///
/// Queued -> Processing -> {Finished, Error}. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Processing,
    Finished,
    Error,
}

impl JobStatus {
    /// Map a Judge0 status id. 1 and 2 are the only non-terminal ids; 3 is a
    /// clean run and everything else is a compile, runtime or internal failure.
    pub fn from_status_id(id: u32) -> Self {
        match id {
            1 => JobStatus::Queued,
            2 => JobStatus::Processing,
            3 => JobStatus::Finished,
            _ => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (a, b) if *a == b => true,
            (JobStatus::Queued, _) => true,
            (JobStatus::Processing, JobStatus::Finished | JobStatus::Error) => true,
            _ => false,
        }
    }
}

/// Read view of a job owned by the execution service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionJob {
    pub token: String,
    pub status: JobStatus,
    /// Service-provided status label, e.g. "Accepted" or "Runtime Error (NZEC)"
    pub description: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub time: Option<String>,
    pub memory: Option<u64>,
}

/// Submission sent to the execution service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub source_code: String,
    pub language_id: u32,
    #[serde(default)]
    pub stdin: Option<String>,
}

/// Stored problem document, keyed by slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub title: String,
    pub title_slug: String,
    pub content: String,
    pub difficulty: String,
    #[serde(default)]
    pub starter_code: BTreeMap<String, String>,
    #[serde(default)]
    pub meta_data: String,
    #[serde(default)]
    pub example_testcases: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial problem used for create-or-merge; `None` fields keep stored values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPatch {
    pub title: Option<String>,
    pub title_slug: Option<String>,
    pub content: Option<String>,
    pub difficulty: Option<String>,
    pub starter_code: Option<BTreeMap<String, String>>,
    pub meta_data: Option<String>,
    pub example_testcases: Option<String>,
}

impl ProblemPatch {
    /// Merge onto an existing document, or build a fresh one with defaults
    pub fn apply(self, slug: &str, existing: Option<Problem>, now: DateTime<Utc>) -> Problem {
        let mut problem = existing.unwrap_or_else(|| Problem {
            title: String::new(),
            title_slug: slug.to_string(),
            content: String::new(),
            difficulty: "Unknown".to_string(),
            starter_code: BTreeMap::new(),
            meta_data: String::new(),
            example_testcases: String::new(),
            updated_at: None,
        });

        if let Some(title) = self.title {
            problem.title = title;
        }
        if let Some(content) = self.content {
            problem.content = content;
        }
        if let Some(difficulty) = self.difficulty {
            problem.difficulty = difficulty;
        }
        if let Some(starter_code) = self.starter_code {
            problem.starter_code = starter_code;
        }
        if let Some(meta_data) = self.meta_data {
            problem.meta_data = meta_data;
        }
        if let Some(example_testcases) = self.example_testcases {
            problem.example_testcases = example_testcases;
        }
        problem.title_slug = slug.to_string();
        problem.updated_at = Some(now);
        problem
    }
}
