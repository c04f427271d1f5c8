//! Cypher scanning for binding-key validation.
//!
//! Only the lexical structure matters here: parameters are collected, while
//! string literals, comments and backtick-escaped names are skipped so a
//! `$` inside them is not mistaken for a parameter.
//!
//! ```
//! use repo_codegen::cypher::parameters;
//!
//! let names = parameters("MATCH (u {name: $name}) WHERE u.bio = '$not' RETURN u").unwrap();
//! assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["name"]);
//! ```

use std::collections::BTreeSet;

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "cypher.pest"]
struct CypherParser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not scan query text: {0}")]
pub struct ScanError(String);

/// `$name` parameters referenced by `query`, sorted.
pub fn parameters(query: &str) -> Result<BTreeSet<String>, ScanError> {
    let pairs = CypherParser::parse(Rule::Query, query).map_err(|e| ScanError(e.to_string()))?;

    let mut names = BTreeSet::new();
    for pair in pairs.flatten() {
        if matches!(pair.as_rule(), Rule::ParameterName | Rule::EscapedParameter) {
            names.insert(pair.as_str().to_string());
        }
    }
    Ok(names)
}
