// Decoding of the catalog's signature metadata string

use crate::canonical::canonicalize;
use crate::error::ParseError;
use crate::types::{Param, ProblemSignature};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataParam {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataReturn {
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
}

/// Raw signature metadata as the catalog encodes it:
/// `{"name": "twoSum", "params": [{"name": "nums", "type": "integer[]"}], "return": {"type": "integer[]"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMetadata {
    pub name: String,
    #[serde(default)]
    pub params: Vec<MetadataParam>,
    #[serde(rename = "return", default)]
    pub return_type: Option<MetadataReturn>,
}

impl SignatureMetadata {
    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// Canonicalize every type. Unknown or missing types become `void`.
    pub fn to_signature(&self) -> ProblemSignature {
        let type_of = |ty: &Option<String>| canonicalize(ty.as_deref().unwrap_or_default());

        ProblemSignature {
            function_name: self.name.clone(),
            params: self
                .params
                .iter()
                .map(|p| Param {
                    name: p.name.clone(),
                    ty: type_of(&p.ty),
                })
                .collect(),
            return_type: type_of(&self.return_type.as_ref().and_then(|r| r.ty.clone())),
        }
    }
}

/// Decode the metadata string. Fails unless it yields a function name and
/// non-empty parameter names.
pub fn decode(raw: &str) -> Result<SignatureMetadata, ParseError> {
    let metadata: SignatureMetadata =
        serde_json::from_str(raw).map_err(|e| ParseError::Signature(e.to_string()))?;

    if metadata.name.trim().is_empty() {
        return Err(ParseError::Signature("missing function name".to_string()));
    }
    if let Some(idx) = metadata.params.iter().position(|p| p.name.trim().is_empty()) {
        return Err(ParseError::Signature(format!("parameter {} has no name", idx)));
    }

    Ok(metadata)
}

/// Decode straight to a canonical signature
pub fn decode_signature(raw: &str) -> Result<ProblemSignature, ParseError> {
    decode(raw).map(|m| m.to_signature())
}
