//! Harness Synthesizer
//!
//! Wraps verbatim user source in a generated driver that decodes the embedded
//! example cases, calls the user's function once per case with arguments in
//! signature order, and prints one JSON record per completed call:
//!
//! ```text
//! {"index": 0, "arguments": {"nums": [2, 7, 11, 15], "target": 9}, "result": [0, 1]}
//! ```
//!
//! A call that raises prints its error to stderr and produces no record. The
//! user's function receives copies of the decoded arguments, so `arguments` in
//! a record is what was bound even when the solution mutates its input. A
//! result JSON cannot represent is recorded as its textual form.
//! Output is a pure function of the inputs.

use crate::error::{HarnessError, ParseError};
use crate::metadata::SignatureMetadata;
use crate::testcase;
use crate::types::{ExampleCase, Language};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

const PYTHON_DRIVER: &str = r#"{{user_source}}


# --- generated test driver ---
import copy as _kata_copy
import json as _kata_json
import sys as _kata_sys
import traceback as _kata_traceback

_KATA_CASES = _kata_json.loads({{cases_literal}})
_KATA_PARAMS = {{params_literal}}
_KATA_FUNCTION = {{function_literal}}


def _kata_bind():
    container = globals().get("Solution")
    if isinstance(container, type) and hasattr(container, _KATA_FUNCTION):
        return getattr(container(), _KATA_FUNCTION)
    return globals()[_KATA_FUNCTION]


def _kata_encode(index, arguments, result):
    record = {"index": index, "arguments": arguments, "result": result}
    try:
        return _kata_json.dumps(record, default=repr)
    except Exception:
        record["result"] = repr(result)
        return _kata_json.dumps(record)


def _kata_run():
    for index, case in enumerate(_KATA_CASES):
        arguments = dict(zip(_KATA_PARAMS, case))
        try:
            target = _kata_bind()
            result = target(*[_kata_copy.deepcopy(arguments[name]) for name in _KATA_PARAMS])
        except Exception:
            _kata_traceback.print_exc(file=_kata_sys.stderr)
            continue
        print(_kata_encode(index, arguments, result), flush=True)


_kata_run()
"#;

const TYPESCRIPT_DRIVER: &str = r#"{{user_source}}


// --- generated test driver ---
const __kataCases: any[][] = JSON.parse({{cases_literal}});
const __kataParams: string[] = {{params_literal}};

function __kataInvoke(args: any[]): any {
  return ({{function_name}} as any).apply(null, args);
}

function __kataEncode(index: number, bound: { [name: string]: any }, result: any): string {
  const value = result === undefined ? null : result;
  try {
    return JSON.stringify({ index: index, arguments: bound, result: value });
  } catch (error) {
    return JSON.stringify({ index: index, arguments: bound, result: String(value) });
  }
}

__kataCases.forEach((kataCase: any[], index: number) => {
  const bound: { [name: string]: any } = {};
  __kataParams.forEach((name: string, position: number) => {
    bound[name] = kataCase[position];
  });
  let result: any;
  try {
    result = __kataInvoke(__kataParams.map((name: string) => JSON.parse(JSON.stringify(bound[name]))));
  } catch (error) {
    console.error(error);
    return;
  }
  console.log(__kataEncode(index, bound, result));
});
"#;

/// A complete program ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessProgram {
    pub language: Language,
    pub source: String,
    pub case_count: usize,
}

/// One line of harness output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub index: usize,
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub result: Value,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// JSON text is a valid Python and JavaScript string literal once the two
/// line separators JavaScript rejects inside literals are escaped.
fn source_literal(json_text: String) -> String {
    json_text.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029")
}

/// Serialize cases once, then encode that text as a string literal. The
/// driver's decode step yields back the original values.
pub fn embed_cases(cases: &[ExampleCase]) -> Result<String, HarnessError> {
    let inner = serde_json::to_string(cases)?;
    Ok(source_literal(serde_json::to_string(&inner)?))
}

/// Mirror of the driver's decode step
pub fn decode_embedded(literal: &str) -> Result<Vec<ExampleCase>, HarnessError> {
    let inner: String = serde_json::from_str(literal)?;
    Ok(serde_json::from_str(&inner)?)
}

/// Cases for a run. A signature without parameters runs once with no arguments.
pub fn example_cases(metadata: &SignatureMetadata, raw: &str) -> Result<Vec<ExampleCase>, ParseError> {
    match metadata.params.len() {
        0 => Ok(vec![ExampleCase(Vec::new())]),
        arity => testcase::parse(raw, arity),
    }
}

pub fn synthesize(
    user_source: &str,
    metadata: &SignatureMetadata,
    cases: &[ExampleCase],
    language: Language,
) -> Result<HarnessProgram, HarnessError> {
    let template = match language {
        Language::Python => PYTHON_DRIVER,
        Language::TypeScript => TYPESCRIPT_DRIVER,
        Language::Java => return Err(HarnessError::UnsupportedLanguage(language.to_string())),
    };

    if !is_identifier(&metadata.name) {
        return Err(HarnessError::InvalidIdentifier(metadata.name.clone()));
    }
    let params = metadata.param_names();
    if let Some(bad) = params.iter().find(|p| !is_identifier(p)) {
        return Err(HarnessError::InvalidIdentifier(bad.clone()));
    }
    if let Some((index, case)) = cases.iter().enumerate().find(|(_, c)| c.len() != params.len()) {
        return Err(HarnessError::ArityMismatch {
            index,
            expected: params.len(),
            found: case.len(),
        });
    }

    let data = json!({
        "user_source": user_source,
        "cases_literal": embed_cases(cases)?,
        "params_literal": source_literal(serde_json::to_string(&params)?),
        "function_literal": serde_json::to_string(&metadata.name)?,
        "function_name": metadata.name,
    });

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    let source = handlebars.render_template(template, &data)?;

    debug!(
        language = %language,
        function = %metadata.name,
        cases = cases.len(),
        source_size = source.len(),
        "Harness synthesized"
    );

    Ok(HarnessProgram {
        language,
        source,
        case_count: cases.len(),
    })
}

/// Pull harness records out of program output. Lines that are not records
/// (the user's own prints) are skipped.
pub fn parse_records(stdout: &str) -> Vec<CaseRecord> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<CaseRecord>(line.trim()).ok())
        .collect()
}
