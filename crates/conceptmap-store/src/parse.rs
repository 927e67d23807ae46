//! Lenient parsing of collaborator responses.
//!
//! The canonical shape is a flat comma-separated sequence of
//! `(term, distance, breadth)` triples, with newlines tolerated as
//! separators. Some models answer in a verbose `term, distance=X, breadth=Y`
//! form instead; that variant is recognized first. A response with zero
//! usable triples is a typed [`ParseError`] so the retry policy can react
//! deliberately.

use std::sync::OnceLock;

use regex::Regex;

/// One parsed candidate concept with its collaborator-asserted weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub term: String,
    pub distance: f32,
    pub breadth: f32,
}

/// Retry-eligible parse failure: nothing usable in the response.
#[derive(Debug, thiserror::Error)]
#[error("no usable candidate triples in response")]
pub struct ParseError;

fn verbose_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)([\w&][\w\s&-]*?)\s*,?\s*distance\s*=\s*([0-9.]+)\s*,\s*breadth\s*=\s*([0-9.]+)")
            .expect("verbose candidate pattern")
    })
}

fn push_unique(out: &mut Vec<Candidate>, term: &str, distance: f32, breadth: f32) {
    // First definition of a term wins, within a response as on the map.
    if out.iter().any(|c| c.term == term) {
        return;
    }
    out.push(Candidate {
        term: term.to_string(),
        distance,
        breadth,
    });
}

fn parse_weight(input: &str) -> Option<f32> {
    input.parse::<f32>().ok().filter(|value| value.is_finite())
}

/// Extract up to `max_terms` candidates from a collaborator response.
///
/// The compact fallback stops at the first malformed triple and keeps the
/// prefix parsed so far; a salvaged prefix is a success, an empty one is a
/// [`ParseError`].
pub fn parse_candidates(response: &str, max_terms: usize) -> Result<Vec<Candidate>, ParseError> {
    let mut out: Vec<Candidate> = Vec::new();

    for caps in verbose_pattern().captures_iter(response) {
        if out.len() >= max_terms {
            break;
        }
        let term = caps[1].trim();
        let (Some(distance), Some(breadth)) = (parse_weight(&caps[2]), parse_weight(&caps[3]))
        else {
            continue;
        };
        if !term.is_empty() {
            push_unique(&mut out, term, distance, breadth);
        }
    }
    if !out.is_empty() {
        return Ok(out);
    }

    let flattened = response.replace('\n', ",");
    let parts: Vec<&str> = flattened
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    for chunk in parts.chunks(3) {
        if out.len() >= max_terms {
            break;
        }
        let &[term, distance, breadth] = chunk else {
            break;
        };
        let (Some(distance), Some(breadth)) = (parse_weight(distance), parse_weight(breadth))
        else {
            break;
        };
        push_unique(&mut out, term, distance, breadth);
    }

    if out.is_empty() {
        Err(ParseError)
    } else {
        Ok(out)
    }
}

/// Extract up to `max_terms` bare suggestion terms from a plain
/// comma-separated response.
pub fn parse_suggestions(response: &str, max_terms: usize) -> Result<Vec<String>, ParseError> {
    let mut out: Vec<String> = Vec::new();
    for term in response
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        if out.len() >= max_terms {
            break;
        }
        if !out.iter().any(|seen| seen == term) {
            out.push(term.to_string());
        }
    }
    if out.is_empty() {
        Err(ParseError)
    } else {
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_triples() {
        let parsed = parse_candidates("Linear Algebra,0.1,1.0,Vectors,0.3,0.8", 4).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].term, "Linear Algebra");
        assert_eq!(parsed[0].distance, 0.1);
        assert_eq!(parsed[0].breadth, 1.0);
        assert_eq!(parsed[1].term, "Vectors");
    }

    #[test]
    fn tolerates_newline_separators() {
        let response = "Linear Algebra,0.1,1.0\nVectors,0.3,0.8\n4-D Coordinate System,0.5,0.9";
        let parsed = parse_candidates(response, 4).expect("parse");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].term, "4-D Coordinate System");
    }

    #[test]
    fn recognizes_verbose_variant() {
        let response = "Vectors, distance=0.3, breadth=0.8\nRotation, distance = 0.6, breadth = 0.5";
        let parsed = parse_candidates(response, 4).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].term, "Vectors");
        assert_eq!(parsed[0].distance, 0.3);
        assert_eq!(parsed[1].term, "Rotation");
        assert_eq!(parsed[1].breadth, 0.5);
    }

    #[test]
    fn malformed_tail_keeps_parsed_prefix() {
        let parsed = parse_candidates("Vectors,0.3,0.8,Rotation,zero point five,0.5", 4)
            .expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].term, "Vectors");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_candidates("I cannot answer that question.", 4).is_err());
        assert!(parse_candidates("", 4).is_err());
    }

    #[test]
    fn first_definition_wins_within_a_response() {
        let parsed =
            parse_candidates("Vectors,0.3,0.8,Vectors,0.9,0.1,Rotation,0.6,0.5", 4).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].distance, 0.3);
    }

    #[test]
    fn caps_at_max_terms() {
        let response = "a,0.1,0.1,b,0.2,0.2,c,0.3,0.3,d,0.4,0.4,e,0.5,0.5";
        let parsed = parse_candidates(response, 3).expect("parse");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].term, "c");
    }

    #[test]
    fn rejects_non_finite_weights() {
        assert!(parse_candidates("Vectors,NaN,0.8", 4).is_err());
        assert!(parse_candidates("Vectors,inf,0.8", 4).is_err());
    }

    #[test]
    fn suggestions_split_and_dedup() {
        let parsed = parse_suggestions("Vectors, Rotation,Vectors\nTensors", 4).expect("parse");
        assert_eq!(parsed, vec!["Vectors", "Rotation", "Tensors"]);
        assert!(parse_suggestions("  \n ", 4).is_err());
    }
}
