//! Starter Code Renderer
//!
//! Produces the editable skeleton shown for a problem: the declared function
//! with typed parameters in signature order and a placeholder body. The text is
//! never executed.

use crate::types::{CanonicalType, Language, Param, ProblemSignature};

/// Spelling of a canonical type in the target language
pub fn type_name(language: Language, ty: CanonicalType) -> &'static str {
    match language {
        Language::TypeScript => match ty {
            CanonicalType::Int => "number",
            CanonicalType::IntArray => "number[]",
            CanonicalType::IntMatrix => "number[][]",
            CanonicalType::String => "string",
            CanonicalType::StringArray => "string[]",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Void => "void",
        },
        Language::Python => match ty {
            CanonicalType::Int => "int",
            CanonicalType::IntArray => "List[int]",
            CanonicalType::IntMatrix => "List[List[int]]",
            CanonicalType::String => "str",
            CanonicalType::StringArray => "List[str]",
            CanonicalType::Boolean => "bool",
            CanonicalType::Void => "None",
        },
        Language::Java => match ty {
            CanonicalType::Int => "int",
            CanonicalType::IntArray => "int[]",
            CanonicalType::IntMatrix => "int[][]",
            CanonicalType::String => "String",
            CanonicalType::StringArray => "String[]",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Void => "void",
        },
    }
}

fn param_list(language: Language, params: &[Param]) -> String {
    params
        .iter()
        .map(|p| match language {
            Language::TypeScript | Language::Python => {
                format!("{}: {}", p.name, type_name(language, p.ty))
            }
            Language::Java => format!("{} {}", type_name(language, p.ty), p.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render(signature: &ProblemSignature, language: Language) -> String {
    let name = &signature.function_name;
    let params = param_list(language, &signature.params);
    let ret = type_name(language, signature.return_type);

    match language {
        Language::TypeScript => format!(
            "export function {name}({params}): {ret} {{\n  // TODO: implement\n  return -1 as any;\n}}\n"
        ),
        Language::Python => {
            // `self` is the implicit receiver; no separator when there is nothing after it
            let receiver = if params.is_empty() {
                "self".to_string()
            } else {
                format!("self, {params}")
            };
            format!(
                "from typing import List\nfrom collections import deque\n\nclass Solution:\n    def {name}({receiver}) -> {ret}:\n        # TODO: implement\n        return -1\n"
            )
        }
        Language::Java => format!(
            "import java.util.*;\n\nclass Solution {{\n    public {ret} {name}({params}) {{\n        // TODO: implement\n        return -1;\n    }}\n}}\n"
        ),
    }
}
