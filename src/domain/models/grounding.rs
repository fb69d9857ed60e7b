//! Grounding checks for retrieval-backed answers.
//!
//! An answer is considered hallucinated when it leans on vocabulary that none
//! of the retrieved contexts contain.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// More missing answer tokens than this marks the answer as hallucinated
pub const MISSING_TOKEN_TOLERANCE: usize = 3;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// A retrieved passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub doc_id: String,
    pub text: String,
}

/// One question/answer pair to grade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingCase {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub contexts: Vec<Context>,
    /// Document that should support the answer, if any exists
    #[serde(default)]
    pub gold_doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingCheck {
    pub hallucinated: bool,
    /// Answer tokens absent from every context, in answer order
    pub missing_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseVerdict {
    pub question: String,
    pub context_ids: Vec<String>,
    pub hallucinated: bool,
    pub context_accurate: bool,
    pub missing_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingReport {
    pub total: usize,
    pub hallucination_pct: f64,
    pub context_accuracy_pct: f64,
    pub cases: Vec<CaseVerdict>,
}

/// Lowercased word tokens
pub fn tokens(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

pub fn hallucination_check(answer: &str, contexts: &[Context]) -> GroundingCheck {
    let known: HashSet<String> = contexts.iter().flat_map(|c| tokens(&c.text)).collect();
    let missing_tokens: Vec<String> = tokens(answer)
        .into_iter()
        .filter(|t| !known.contains(t))
        .collect();

    GroundingCheck {
        hallucinated: missing_tokens.len() > MISSING_TOKEN_TOLERANCE,
        missing_tokens,
    }
}

/// With no gold document the retriever should return nothing at all.
pub fn context_accuracy(contexts: &[Context], gold_doc: Option<&str>) -> bool {
    match gold_doc {
        None => contexts.is_empty(),
        Some(gold) => contexts.iter().any(|c| c.doc_id == gold),
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn evaluate(cases: &[GroundingCase]) -> GroundingReport {
    let verdicts: Vec<CaseVerdict> = cases
        .iter()
        .map(|case| {
            let check = hallucination_check(&case.answer, &case.contexts);
            CaseVerdict {
                question: case.question.clone(),
                context_ids: case.contexts.iter().map(|c| c.doc_id.clone()).collect(),
                hallucinated: check.hallucinated,
                context_accurate: context_accuracy(&case.contexts, case.gold_doc.as_deref()),
                missing_tokens: check.missing_tokens,
            }
        })
        .collect();

    let total = verdicts.len();
    let pct = |n: usize| {
        if total == 0 {
            0.0
        } else {
            n as f64 / total as f64 * 100.0
        }
    };
    let hallucinated = verdicts.iter().filter(|v| v.hallucinated).count();
    let accurate = verdicts.iter().filter(|v| v.context_accurate).count();

    GroundingReport {
        total,
        hallucination_pct: pct(hallucinated),
        context_accuracy_pct: pct(accurate),
        cases: verdicts,
    }
}
