//! Ballots and decoding of free-form ranking responses.
//!
//! Judges are asked for a best-to-worst list of letters, but models answer in
//! many shapes: a `Ranking:` header followed by a numbered list, a bare line
//! such as `B > A > C`, or (wrongly) a fresh answer to the question. These
//! functions are pure text processing; no I/O happens here.
//!
//! | Response shape | Result |
//! |----------------|--------|
//! | has a ranking header | letters from the ranking section |
//! | no ranking header, no answer-shaped section | letters from the whole text |
//! | no ranking header, answer-shaped section | [`RejectedBallot::AnswerShaped`] |
//! | no usable letters | [`RejectedBallot::NoLabels`] |

use super::anonymize::AnonymizationMap;
use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One agent's best-first ordering of the council's final answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: AgentId,
    pub ranking: Vec<AgentId>,
}

impl Ballot {
    /// Create a ballot; repeated agents keep only their first position
    pub fn new(voter: AgentId, ranking: Vec<AgentId>) -> Self {
        let mut deduped: Vec<AgentId> = Vec::with_capacity(ranking.len());
        for agent in ranking {
            if !deduped.contains(&agent) {
                deduped.push(agent);
            }
        }
        Self {
            voter,
            ranking: deduped,
        }
    }

    /// Zero-based position of `agent`, if ranked
    pub fn position_of(&self, agent: &AgentId) -> Option<usize> {
        self.ranking.iter().position(|a| a == agent)
    }
}

/// Why a ranking response did not yield a ballot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectedBallot {
    #[error("response answers the question instead of ranking")]
    AnswerShaped,

    #[error("response contains no recognizable labels")]
    NoLabels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Ranking,
    Answer,
}

/// Phrases that mark instructional or example lines echoed from the prompt
const BOILERPLATE_MARKERS: &[&str] = &[
    "e.g.",
    "for example",
    "example:",
    "format:",
    "respond with",
    "instructions",
    "letters only",
];

/// Decode `response` from `voter` into a ballot of real agent identities
///
/// Only letters in `shown` count; an agent whose answer the judges never saw
/// cannot be ranked.
pub fn decode_ballot(
    voter: &AgentId,
    response: &str,
    labels: &AnonymizationMap,
    shown: &[char],
) -> Result<Ballot, RejectedBallot> {
    let letters = parse_ranking_letters(response, |c| labels.is_label(c) && shown.contains(&c))?;
    let ranking = letters
        .into_iter()
        .filter_map(|c| labels.agent_for(c).cloned())
        .collect();
    Ok(Ballot::new(voter.clone(), ranking))
}

/// Extract the ordered, de-duplicated labels from a ranking response
///
/// `is_label` decides which uppercase letters are valid labels.
///
/// # Examples
///
/// ```
/// use council_domain::ranking::parse_ranking_letters;
///
/// let valid = |c: char| ('A'..='C').contains(&c);
/// assert_eq!(parse_ranking_letters("Ranking:\n1. B\n2. A\n3. C", valid), Ok(vec!['B', 'A', 'C']));
/// assert_eq!(parse_ranking_letters("C > A > B", valid), Ok(vec!['C', 'A', 'B']));
/// assert!(parse_ranking_letters("Answer: it depends", valid).is_err());
/// ```
pub fn parse_ranking_letters(
    response: &str,
    is_label: impl Fn(char) -> bool,
) -> Result<Vec<char>, RejectedBallot> {
    let section = ranking_section(response)?;

    let mut letters = Vec::new();
    for line in section.iter().filter(|l| !is_boilerplate(l)) {
        for c in line_letters(line, &is_label) {
            if !letters.contains(&c) {
                letters.push(c);
            }
        }
    }

    if letters.is_empty() {
        Err(RejectedBallot::NoLabels)
    } else {
        Ok(letters)
    }
}

/// Lines that make up the ranking, or a rejection if the text is answer-shaped
fn ranking_section(response: &str) -> Result<Vec<&str>, RejectedBallot> {
    let lines: Vec<&str> = response.lines().collect();

    let Some(start) = lines
        .iter()
        .position(|l| header_of(l).map(|(s, _)| s) == Some(Section::Ranking))
    else {
        if lines.iter().any(|l| header_of(l).is_some()) {
            return Err(RejectedBallot::AnswerShaped);
        }
        return Ok(lines);
    };

    let mut section = Vec::new();
    if let Some((_, rest)) = header_of(lines[start])
        && !rest.trim().is_empty()
    {
        section.push(rest);
    }
    for line in &lines[start + 1..] {
        if header_of(line).is_some() {
            break;
        }
        section.push(*line);
    }
    Ok(section)
}

/// Recognize section headers such as `## Ranking`, `**Answer:**` or `RANKING: B, A`
///
/// Returns the section kind and any text following the header on the same line.
fn header_of(line: &str) -> Option<(Section, &str)> {
    let stripped = line
        .trim()
        .trim_start_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace());
    let (head, rest) = stripped.split_once(':').unwrap_or((stripped, ""));
    let head = head
        .trim()
        .trim_end_matches(|c: char| c == '*' || c == '_')
        .trim()
        .to_lowercase();

    let section = match head.as_str() {
        "ranking" | "rankings" | "final ranking" | "my ranking" | "ranked list" => Section::Ranking,
        "answer" | "final answer" | "rationale" | "reasoning" | "discussion" => Section::Answer,
        _ => return None,
    };
    Some((section, rest.trim_start_matches(|c: char| c == '*' || c == '_')))
}

fn is_boilerplate(line: &str) -> bool {
    let lower = line.to_lowercase();
    BOILERPLATE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Filler words that may sit next to a label without making the line prose
const LABEL_FILLERS: &[&str] = &["response", "answer", "candidate", "option"];

/// Label tokens on one line, in order
///
/// A line consisting of one compact token of distinct labels (`BAC`) is read
/// letter by letter. A list item (`1.`, `2)`, `-`, `*`) names one answer, so
/// only its first label counts. Several labels are read from a line only when
/// it holds nothing else (`B > A > C`, `Response C, Response A`); any other
/// line contributes its first label.
fn line_letters(line: &str, is_label: &impl Fn(char) -> bool) -> Vec<char> {
    let trimmed = line.trim();
    if trimmed.len() > 1
        && trimmed.chars().all(|c| c.is_ascii_uppercase() && is_label(c))
        && distinct(trimmed)
    {
        return trimmed.chars().collect();
    }

    let label_of = |token: &str| {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() && is_label(c) => Some(c),
            _ => None,
        }
    };

    if let Some(item) = list_item(trimmed) {
        return tokens(item).find_map(label_of).into_iter().collect();
    }

    let labels_only = tokens(trimmed).all(|token| {
        token.chars().count() == 1 || LABEL_FILLERS.contains(&token.to_lowercase().as_str())
    });
    if labels_only {
        tokens(trimmed).filter_map(label_of).collect()
    } else {
        tokens(trimmed).find_map(label_of).into_iter().collect()
    }
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

/// Text after a numbered or bulleted list marker
fn list_item(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix(['-', '*', '+', '•'])
        && rest.starts_with(char::is_whitespace)
    {
        return Some(rest);
    }
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return None;
    }
    rest.strip_prefix(['.', ')', ':'])
}

fn distinct(s: &str) -> bool {
    let mut seen = Vec::new();
    s.chars().all(|c| {
        if seen.contains(&c) {
            false
        } else {
            seen.push(c);
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc(c: char) -> bool {
        ('A'..='C').contains(&c)
    }

    // ==================== parse_ranking_letters Tests ====================

    #[test]
    fn test_ranking_header_with_numbered_list() {
        let response = "I compared all three.\n\n## Ranking\n1. Response B\n2. Response A\n3. Response C\n";
        assert_eq!(parse_ranking_letters(response, abc), Ok(vec!['B', 'A', 'C']));
    }

    #[test]
    fn test_ranking_inline_after_header() {
        assert_eq!(
            parse_ranking_letters("**RANKING:** C, A, B", abc),
            Ok(vec!['C', 'A', 'B'])
        );
    }

    #[test]
    fn test_ranking_section_stops_at_next_header() {
        let response = "Ranking:\nA\nB\nRationale:\nC was weakest. I think B.";
        assert_eq!(parse_ranking_letters(response, abc), Ok(vec!['A', 'B']));
    }

    #[test]
    fn test_whole_response_without_headers() {
        assert_eq!(parse_ranking_letters("B > C > A", abc), Ok(vec!['B', 'C', 'A']));
        assert_eq!(parse_ranking_letters("CAB", abc), Ok(vec!['C', 'A', 'B']));
    }

    #[test]
    fn test_answer_shaped_response_rejected() {
        let response = "ANSWER: Rust is a systems language.\nRATIONALE: because A and B said so";
        assert_eq!(
            parse_ranking_letters(response, abc),
            Err(RejectedBallot::AnswerShaped)
        );
    }

    #[test]
    fn test_boilerplate_lines_ignored() {
        let response = "Format: list letters best to worst, e.g. A, B, C\nC\nB\nA";
        assert_eq!(parse_ranking_letters(response, abc), Ok(vec!['C', 'B', 'A']));
    }

    #[test]
    fn test_duplicates_and_unknown_letters_dropped() {
        assert_eq!(
            parse_ranking_letters("A, D, A, B, Z, c", abc),
            Ok(vec!['A', 'B'])
        );
    }

    #[test]
    fn test_list_item_counts_only_its_first_label() {
        let response = "Ranking:\n1. B - A concise, correct answer\n2. C\n3. A";
        assert_eq!(parse_ranking_letters(response, abc), Ok(vec!['B', 'C', 'A']));

        let bullets = "- C: I liked it more than A\n- A\n* B";
        assert_eq!(parse_ranking_letters(bullets, abc), Ok(vec!['C', 'A', 'B']));
    }

    #[test]
    fn test_prose_line_contributes_first_label() {
        let response = "Ranking:\nC is best, then A because B is off\nA\nB";
        assert_eq!(parse_ranking_letters(response, abc), Ok(vec!['C', 'A', 'B']));
        assert_eq!(
            parse_ranking_letters("Response B > Response C > Response A", abc),
            Ok(vec!['B', 'C', 'A'])
        );
    }

    #[test]
    fn test_no_labels() {
        assert_eq!(
            parse_ranking_letters("they are all great", abc),
            Err(RejectedBallot::NoLabels)
        );
        assert_eq!(parse_ranking_letters("", abc), Err(RejectedBallot::NoLabels));
    }

    // ==================== decode_ballot Tests ====================

    #[test]
    fn test_decode_ballot_maps_letters_to_agents() {
        let agents = vec![
            AgentId::new("a", "x"),
            AgentId::new("b", "y"),
            AgentId::new("c", "z"),
        ];
        let labels = AnonymizationMap::sequential(&agents).unwrap();

        let ballot =
            decode_ballot(&agents[0], "Ranking: C > A > B", &labels, &['A', 'B', 'C']).unwrap();
        assert_eq!(ballot.voter, agents[0]);
        assert_eq!(
            ballot.ranking,
            vec![agents[2].clone(), agents[0].clone(), agents[1].clone()]
        );
        assert_eq!(ballot.position_of(&agents[1]), Some(2));
    }

    #[test]
    fn test_decode_ballot_ignores_unshown_labels() {
        let agents = vec![
            AgentId::new("a", "x"),
            AgentId::new("b", "y"),
            AgentId::new("c", "z"),
        ];
        let labels = AnonymizationMap::sequential(&agents).unwrap();

        let ballot = decode_ballot(&agents[1], "Ranking:\nC\nA\nB", &labels, &['A', 'B']).unwrap();
        assert_eq!(ballot.ranking, vec![agents[0].clone(), agents[1].clone()]);
        assert_eq!(
            decode_ballot(&agents[1], "C", &labels, &['A', 'B']),
            Err(RejectedBallot::NoLabels)
        );
    }

    #[test]
    fn test_ballot_new_dedupes() {
        let x = AgentId::new("a", "x");
        let y = AgentId::new("b", "y");
        let ballot = Ballot::new(x.clone(), vec![y.clone(), x.clone(), y.clone()]);
        assert_eq!(ballot.ranking, vec![y, x]);
    }
}
