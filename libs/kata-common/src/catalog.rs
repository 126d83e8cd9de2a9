//! Problem catalog client
//!
//! Read-only lookup by slug against a GraphQL catalog, plus derivation of the
//! view the editor needs: decoded signature, parsed example cases, and a
//! starter snippet for every supported language.

use crate::error::CatalogError;
use crate::metadata;
use crate::starter;
use crate::testcase;
use crate::types::{ExampleCase, Language, ProblemPatch, ProblemSignature};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const QUESTION_QUERY: &str = "query questionData($titleSlug: String!) { question(titleSlug: $titleSlug) { title titleSlug content difficulty codeSnippets { lang langSlug code } metaData exampleTestcases } }";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    #[serde(default)]
    pub lang: String,
    pub lang_slug: String,
    pub code: String,
}

/// Question record as the catalog returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuestion {
    pub title: String,
    pub title_slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub code_snippets: Vec<CodeSnippet>,
    #[serde(default)]
    pub meta_data: Option<String>,
    #[serde(default)]
    pub example_testcases: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedLanguage {
    pub slug: String,
    pub judge0_language_id: u32,
}

impl From<Language> for SupportedLanguage {
    fn from(language: Language) -> Self {
        Self {
            slug: language.to_string(),
            judge0_language_id: language.judge0_id(),
        }
    }
}

/// Editor-facing problem view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProblem {
    pub title: String,
    pub title_slug: String,
    pub difficulty: String,
    pub content: String,
    pub metadata: String,
    pub signature: Option<ProblemSignature>,
    pub supported_languages: Vec<SupportedLanguage>,
    pub starter_code: BTreeMap<String, String>,
    pub example_testcases: String,
    pub examples: Vec<ExampleCase>,
}

impl CatalogQuestion {
    pub fn into_problem(self) -> CatalogProblem {
        let metadata = self.meta_data.unwrap_or_default();
        let signature = match metadata::decode_signature(&metadata) {
            Ok(signature) => Some(signature),
            Err(e) => {
                warn!(slug = %self.title_slug, error = %e, "Catalog metadata undecodable");
                None
            }
        };

        let example_testcases = self.example_testcases.unwrap_or_default();
        let examples = signature
            .as_ref()
            .filter(|s| s.arity() > 0)
            .and_then(|s| testcase::parse(&example_testcases, s.arity()).ok())
            .unwrap_or_default();

        let mut starter_code = BTreeMap::new();
        for language in Language::ALL {
            let snippet = self
                .code_snippets
                .iter()
                .find(|s| s.lang_slug == language.catalog_slug())
                .map(|s| s.code.clone());
            let code = snippet.or_else(|| signature.as_ref().map(|s| starter::render(s, language)));
            if let Some(code) = code {
                starter_code.insert(language.to_string(), code);
            }
        }

        CatalogProblem {
            title: self.title,
            title_slug: self.title_slug,
            difficulty: self.difficulty,
            content: self.content.unwrap_or_default(),
            metadata,
            signature,
            supported_languages: Language::ALL.into_iter().map(SupportedLanguage::from).collect(),
            starter_code,
            example_testcases,
            examples,
        }
    }
}

impl CatalogProblem {
    /// Store document for this problem
    pub fn to_patch(&self) -> ProblemPatch {
        ProblemPatch {
            title: Some(self.title.clone()),
            title_slug: Some(self.title_slug.clone()),
            content: Some(self.content.clone()),
            difficulty: Some(self.difficulty.clone()),
            starter_code: Some(self.starter_code.clone()),
            meta_data: Some(self.metadata.clone()),
            example_testcases: Some(self.example_testcases.clone()),
        }
    }
}

#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    /// `Ok(None)` when the catalog has no such slug
    async fn question(&self, slug: &str) -> Result<Option<CatalogQuestion>, CatalogError>;
}

pub struct GraphqlCatalog {
    http: Client,
    endpoint: String,
}

impl GraphqlCatalog {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ProblemCatalog for GraphqlCatalog {
    async fn question(&self, slug: &str) -> Result<Option<CatalogQuestion>, CatalogError> {
        let body = json!({
            "query": QUESTION_QUERY,
            "variables": { "titleSlug": slug },
        });

        debug!(slug = %slug, "Querying catalog");
        let response = self
            .http
            .post(&self.endpoint)
            .header("Referer", "https://leetcode.com")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: Value =
            serde_json::from_str(&text).map_err(|e| CatalogError::Decode(e.to_string()))?;
        match payload.pointer("/data/question") {
            None | Some(Value::Null) => Ok(None),
            Some(question) => serde_json::from_value(question.clone())
                .map(Some)
                .map_err(|e| CatalogError::Decode(e.to_string())),
        }
    }
}
