//! Prompt construction for the generation collaborator.
//!
//! Three shapes: a starter prompt (subject → first ring of concepts), a
//! further prompt (subject + known/unknown partition → next concepts,
//! excluding everything already on the map) and a free-text explanation
//! prompt. A fourth, the suggestion prompt, asks for follow-up topics
//! without weights.

use serde::{Deserialize, Serialize};

/// Requested explanation verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationLength {
    Short,
    Long,
}

impl Default for ExplanationLength {
    fn default() -> Self {
        Self::Short
    }
}

fn comma_list(terms: &[String]) -> String {
    terms.join(", ")
}

/// Ask for the first `terms` prerequisite concepts of `subject`, each with a
/// semantic distance and a breadth, in the compact triple format the parser
/// expects.
pub fn starter_prompt(subject: &str, terms: usize) -> String {
    format!(
        "Given that I want to understand {subject}, give me a comma-separated list of concepts \
         which are necessary to understand it. Give me exactly {terms} concepts, each followed by \
         its semantic distance from {subject} and its breadth, both in the range 0.1-1.0 with a \
         step of 0.1 (0.1 is closest/narrowest). Do not include anything else in your answer and \
         answer only in English. Use exactly this format: \
         concept1,distance1,breadth1,concept2,distance2,breadth2,... \
         Example: Linear Algebra,0.1,1.0,Vectors,0.3,0.8,Rotation Matrices,0.8,0.7"
    )
}

/// Ask for `terms` more prerequisite concepts of `subject`, excluding every
/// term already on the map (both sides of the partition).
pub fn further_prompt(subject: &str, known: &[String], unknown: &[String], terms: usize) -> String {
    let excluded: Vec<String> = known.iter().chain(unknown.iter()).cloned().collect();
    format!(
        "Given that I want to understand {subject}, give me a comma-separated list of concepts \
         which are necessary to understand it. Give me exactly {terms} concepts, each followed by \
         its semantic distance from {subject} and its breadth, both in the range 0.1-1.0 with a \
         step of 0.1. Exclude the following concepts: {excluded}. Do not include anything else in \
         your answer and answer only in English. Use exactly this format: \
         concept1,distance1,breadth1,concept2,distance2,breadth2,... \
         Example: Linear Algebra,0.6,1.0,Vectors,0.7,0.8,Rotation Matrices,0.9,0.7",
        excluded = comma_list(&excluded),
    )
}

/// Ask for a free-text explanation of `subject` pitched at the current
/// partition: `known` terms may be leaned on, `unknown` terms must be
/// avoided or bridged with analogies.
pub fn explanation_prompt(
    subject: &str,
    known: &[String],
    unknown: &[String],
    length: ExplanationLength,
) -> String {
    let verbosity = match length {
        ExplanationLength::Short => {
            "Make the explanation very concise and to the point."
        }
        ExplanationLength::Long => {
            "Make the explanation detailed, but stay to the point."
        }
    };
    format!(
        "Given that I understand {known} and I do not understand {unknown}, please explain \
         {subject} to me. Take into account which topics I know and which I do not, go directly \
         to the explanation and do not repeat what I already know. If suitable, use analogies \
         related to the concepts I do know to fill the gaps caused by the terms I do not know. \
         {verbosity}",
        known = comma_list(known),
        unknown = comma_list(unknown),
    )
}

/// Ask for `terms` follow-up concepts reachable from the current knowledge,
/// as a plain comma-separated list without weights.
pub fn suggestion_prompt(known: &[String], unknown: &[String], terms: usize) -> String {
    format!(
        "Given that I understand {known} and I do not understand {unknown}, give me {terms} new \
         concepts I could learn with my current knowledge. They should be related to the concepts \
         I already know but not too similar to them. Answer only with a comma-separated list of \
         {terms} concepts and nothing else, in English. \
         Example: Linear Algebra,Vectors,4-D Coordinate System,Rotation Matrices",
        known = comma_list(known),
        unknown = comma_list(unknown),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn starter_prompt_names_subject_and_count() {
        let prompt = starter_prompt("quaternions", 4);
        assert!(prompt.contains("quaternions"));
        assert!(prompt.contains("exactly 4 concepts"));
        assert!(prompt.contains("concept1,distance1,breadth1"));
    }

    #[test]
    fn further_prompt_excludes_both_partitions() {
        let prompt = further_prompt(
            "quaternions",
            &strings(&["rotation"]),
            &strings(&["vectors", "matrices"]),
            3,
        );
        assert!(prompt.contains("Exclude the following concepts: rotation, vectors, matrices"));
        assert!(prompt.contains("exactly 3 concepts"));
    }

    #[test]
    fn explanation_prompt_varies_with_length() {
        let known = strings(&["rotation"]);
        let unknown = strings(&["vectors"]);
        let short = explanation_prompt("quaternions", &known, &unknown, ExplanationLength::Short);
        let long = explanation_prompt("quaternions", &known, &unknown, ExplanationLength::Long);
        assert!(short.contains("very concise"));
        assert!(long.contains("detailed"));
        assert!(short.contains("I understand rotation"));
        assert!(short.contains("I do not understand vectors"));
    }

    #[test]
    fn suggestion_prompt_asks_for_plain_list() {
        let prompt = suggestion_prompt(&strings(&["rotation"]), &strings(&[]), 4);
        assert!(prompt.contains("4 new"));
        assert!(prompt.contains("comma-separated list"));
        assert!(!prompt.contains("distance"));
    }
}
