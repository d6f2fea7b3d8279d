//! Rule-based grade extraction.
//!
//! Recognized forms, with subjects taken from the fixed subject vocabulary:
//! - a grade cluster before "in" and a subject list: `AAB in Maths, Physics and Chemistry`
//! - a subject followed by a grade: `Maths: A*`, `Physics (B)`, `Chemistry A`
//! - a grade followed by a subject: `A* Maths`
//!
//! Mentions are resolved left to right; a later grade for the same subject
//! replaces the earlier one.

use super::interests::push_unique;
use super::types::{ParsedGrades, ParsedQuery};
use super::vocabulary::{COURSES, SUBJECTS};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

/// Longest grade cluster accepted before "in"
const MAX_CLUSTER_GRADES: usize = 6;

/// Lower-case words spelled only with grade letters that are ordinary English.
const COMMON_WORDS: &[&str] = &[
    "a", "ace", "ad", "add", "am", "bad", "be", "bed", "bee", "bud", "bump", "cab", "cam",
    "came", "camp", "cap", "cape", "cub", "cube", "dab", "dad", "dam", "dame", "damp", "deed",
    "dump", "ebb", "em", "ma", "mad", "made", "me", "mud", "mum", "pa", "pace", "pad", "pea",
    "pub", "pump", "pup", "up",
];

/// Words after "in" that are never taken as an unlisted subject.
const NOT_SUBJECTS: &[&str] = &[
    "a", "addition", "all", "an", "august", "both", "case", "college", "each", "every",
    "exams", "fact", "general", "it", "january", "june", "may", "mocks", "my", "order",
    "school", "sixth", "summer", "terms", "the", "them", "these", "those", "total", "which",
    "year", "years",
];

static LEVEL_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:a|as)[\s\-]?levels?\b").unwrap());
static IN_CLUSTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<cluster>[A-Za-z][A-Za-z*]*)\s+(?:(?i:at)\s+)?(?i:in)\s+").unwrap()
});
static SUBJECT_AT_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(?:{})\b", SUBJECTS.alternation())).unwrap()
});
static UNLISTED_SUBJECT_AT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z\-]+\b").unwrap());
static LIST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:,\s*(?:and\s+|&\s*)?|and\s+|&\s*|/\s*|\+\s*)").unwrap()
});
static SUBJECT_THEN_GRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<subject>{})\b(?P<sep>\s*[:=(\-–]\s*|\s+)(?P<grade>[a-eump]\*?)",
        SUBJECTS.alternation()
    ))
    .unwrap()
});
static GRADE_THEN_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<grade>[A-EUMP]\*?)\s+(?P<subject>(?i:{}))\b",
        SUBJECTS.alternation()
    ))
    .unwrap()
});
static INTEREST_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<trigger>interested\s+in|interest\s+in|interests\s+are|passionate\s+about|passion\s+for|keen\s+on|(?:want|wanna|hoping|hope|like|love|plan|planning|going)\s+to\s+(?:study|do|take|read)|studying|study|love|enjoy)\s+(?P<phrase>[^.;!?\n]+)",
    )
    .unwrap()
});

/// Words skipped at the start of an interest phrase.
const LEADING_FILLERS: &[&str] = &[
    "a", "about", "an", "course", "courses", "degree", "degrees", "do", "doing", "in", "into",
    "learn", "learning", "more", "of", "pursue", "pursuing", "read", "reading", "some",
    "study", "studying", "take", "taking", "the", "to",
];
/// Words that end an interest phrase.
const CLAUSE_BREAKS: &[&str] = &[
    "as", "at", "because", "but", "for", "from", "i", "i'd", "i'm", "i've", "if", "im", "in",
    "is", "my", "since", "so", "that", "then", "to", "was", "when", "where", "which", "who",
    "with", "you",
];
const TRAILING_NOISE: &[&str] = &[
    "course", "courses", "degree", "degrees", "module", "modules", "please", "program",
    "programme", "programmes", "programs", "subject", "subjects",
];
const IGNORED_INTERESTS: &[&str] = &[
    "anything", "be", "everything", "get", "go", "here", "it", "lots", "much", "something",
    "stuff", "that", "them", "there", "things", "this", "uni", "university", "well",
];
const MAX_INTEREST_WORDS: usize = 4;

/// A recognized grade mention and the grades it assigns.
#[derive(Debug)]
struct GradeMention {
    span: Range<usize>,
    /// Lower wins when two mentions start at the same offset
    priority: u8,
    assignments: Vec<(String, String)>,
}

/// Extracts subject grades and stated interests from free text.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeParser;

impl GradeParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a query into grades, interests and the text left once grades are removed.
    pub fn parse(&self, query: &str) -> ParsedQuery {
        let text = mask(query, LEVEL_PHRASE.find_iter(query).map(|m| m.range()));

        let mut mentions = Vec::new();
        grades_before_in(&text, &mut mentions);
        subject_then_grade(&text, &mut mentions);
        grade_then_subject(&text, &mut mentions);
        mentions.sort_by_key(|m| (m.span.start, m.priority));

        let mut grades = ParsedGrades::new();
        let mut consumed = Vec::new();
        let mut last_end = 0;
        for mention in mentions {
            if mention.span.start < last_end {
                continue;
            }
            last_end = mention.span.end;
            for (subject, grade) in mention.assignments {
                if let Some(previous) = grades.insert(subject.clone(), grade.clone()) {
                    debug!(%subject, %previous, %grade, "Later grade mention replaces earlier one");
                }
            }
            consumed.push(mention.span);
        }

        let residual = mask(&text, consumed);
        let interests = trigger_interests(&residual);

        debug!(
            grades = grades.len(),
            interests = interests.len(),
            "Parsed query"
        );

        ParsedQuery {
            grades,
            interests,
            residual,
        }
    }
}

/// Upper-cases a grade token and checks it against the grade alphabet.
pub fn normalize_grade(token: &str) -> Option<String> {
    let grade = token.trim().to_uppercase();
    match grade.as_str() {
        "A*" | "A" | "B" | "C" | "D" | "E" | "U" | "D*" | "M" | "P" => Some(grade),
        _ => None,
    }
}

/// Splits a cluster such as `A*AB` or `D*DM` into individual grades.
fn split_grade_cluster(cluster: &str) -> Option<Vec<String>> {
    let is_upper = !cluster.chars().any(|c| c.is_ascii_lowercase());
    if !is_upper && COMMON_WORDS.contains(&cluster.to_ascii_lowercase().as_str()) {
        return None;
    }

    let chars: Vec<char> = cluster.chars().collect();
    let mut grades = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let letter = chars[i].to_ascii_uppercase();
        let starred = chars.get(i + 1) == Some(&'*');
        let token = if starred {
            format!("{letter}*")
        } else {
            letter.to_string()
        };
        grades.push(normalize_grade(&token)?);
        i += if starred { 2 } else { 1 };
    }

    (!grades.is_empty() && grades.len() <= MAX_CLUSTER_GRADES).then_some(grades)
}

fn grades_before_in(text: &str, out: &mut Vec<GradeMention>) {
    scan(&IN_CLUSTER, text, |caps| {
        let (Some(whole), Some(cluster)) = (caps.get(0), caps.name("cluster")) else {
            return false;
        };
        if !starts_at_word_edge(text, cluster.start()) {
            return false;
        }
        let Some(grades) = split_grade_cluster(cluster.as_str()) else {
            return false;
        };
        let (subjects, end) = subject_list(text, whole.end());
        if subjects.is_empty() {
            return false;
        }

        let assignments = if grades.len() == 1 {
            subjects
                .into_iter()
                .map(|subject| (subject, grades[0].clone()))
                .collect()
        } else {
            // Pairwise in order; extra grades or subjects stay unassigned
            subjects.into_iter().zip(grades).collect()
        };

        out.push(GradeMention {
            span: cluster.start()..end,
            priority: 0,
            assignments,
        });
        true
    });
}

/// Reads a subject list starting at `start`, returning the subjects and where the list ends.
///
/// Only the first entry may be a word outside the subject vocabulary.
fn subject_list(text: &str, start: usize) -> (Vec<String>, usize) {
    let mut subjects = Vec::new();
    let mut pos = start;
    let mut end = start;

    loop {
        let rest = &text[pos..];
        if let Some(m) = SUBJECT_AT_START.find(rest) {
            if let Some(subject) = SUBJECTS.canonical(m.as_str()) {
                subjects.push(subject.to_string());
            }
            pos += m.end();
        } else if subjects.is_empty() {
            match UNLISTED_SUBJECT_AT_START.find(rest) {
                Some(m) if !NOT_SUBJECTS.contains(&m.as_str().to_lowercase().as_str()) => {
                    subjects.push(m.as_str().to_lowercase());
                    pos += m.end();
                }
                _ => break,
            }
        } else {
            break;
        }

        end = pos;
        match LIST_SEPARATOR.find(&text[pos..]) {
            Some(sep) => pos += sep.end(),
            None => break,
        }
    }

    (subjects, end)
}

fn subject_then_grade(text: &str, out: &mut Vec<GradeMention>) {
    scan(&SUBJECT_THEN_GRADE, text, |caps| {
        let (Some(whole), Some(subject), Some(sep), Some(grade)) = (
            caps.get(0),
            caps.name("subject"),
            caps.name("sep"),
            caps.name("grade"),
        ) else {
            return false;
        };
        if !ends_at_word_edge(text, whole.end()) {
            return false;
        }
        // Without punctuation the grade must be written in capitals ("Maths A", not "maths a")
        let explicit = !sep.as_str().trim().is_empty();
        if !explicit && grade.as_str().chars().any(|c| c.is_ascii_lowercase()) {
            return false;
        }
        let (Some(subject), Some(grade)) = (
            SUBJECTS.canonical(subject.as_str()),
            normalize_grade(grade.as_str()),
        ) else {
            return false;
        };

        let mut end = whole.end();
        if sep.as_str().contains('(') && text[end..].starts_with(')') {
            end += 1;
        }

        out.push(GradeMention {
            span: whole.start()..end,
            priority: 1,
            assignments: vec![(subject.to_string(), grade)],
        });
        true
    });
}

fn grade_then_subject(text: &str, out: &mut Vec<GradeMention>) {
    scan(&GRADE_THEN_SUBJECT, text, |caps| {
        let (Some(whole), Some(grade), Some(subject)) =
            (caps.get(0), caps.name("grade"), caps.name("subject"))
        else {
            return false;
        };
        if !starts_at_word_edge(text, whole.start()) {
            return false;
        }
        // "A Maths degree" is an article, not a grade
        if grade.as_str() == "A" && next_word_is_noise(text, whole.end()) {
            return false;
        }
        let (Some(grade), Some(subject)) = (
            normalize_grade(grade.as_str()),
            SUBJECTS.canonical(subject.as_str()),
        ) else {
            return false;
        };

        out.push(GradeMention {
            span: whole.range(),
            priority: 2,
            assignments: vec![(subject.to_string(), grade)],
        });
        true
    });
}

/// Interests named after trigger words, canonicalized when they are known course names.
///
/// After "love" or "enjoy" only known names count; stronger triggers such as
/// "want to study" also keep unlisted phrases as written.
fn trigger_interests(text: &str) -> Vec<String> {
    let mut interests = Vec::new();

    for caps in INTEREST_TRIGGER.captures_iter(text) {
        let (Some(trigger), Some(phrase)) = (caps.name("trigger"), caps.name("phrase")) else {
            continue;
        };
        let weak = matches!(
            trigger.as_str().to_lowercase().as_str(),
            "love" | "enjoy"
        );

        for item in interest_items(phrase.as_str()) {
            match COURSES.canonical(&item) {
                Some(course) => push_unique(&mut interests, course.to_string()),
                None if !weak => push_unique(&mut interests, item),
                None => {}
            }
        }
    }

    interests
}

/// Splits an interest phrase into items on commas, "and", "or", "&" and "/".
fn interest_items(phrase: &str) -> Vec<String> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let mut items = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let skip = words
        .iter()
        .take_while(|w| LEADING_FILLERS.contains(&clean_word(w).as_str()))
        .count();

    for word in &words[skip..] {
        let lower = clean_word(word);
        if CLAUSE_BREAKS.contains(&lower.as_str()) {
            break;
        }
        if matches!(lower.as_str(), "and" | "or" | "") {
            flush_item(&mut current, &mut items);
            continue;
        }
        current.push(word.trim_matches(|c: char| !c.is_alphanumeric()));
        if word.ends_with(',') || word.ends_with('/') {
            flush_item(&mut current, &mut items);
        }
    }
    flush_item(&mut current, &mut items);

    items
}

fn flush_item(current: &mut Vec<&str>, items: &mut Vec<String>) {
    let words = std::mem::take(current);
    let mut words: Vec<&str> = words
        .into_iter()
        .skip_while(|w| LEADING_FILLERS.contains(&w.to_lowercase().as_str()))
        .collect();
    while words
        .last()
        .is_some_and(|w| TRAILING_NOISE.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }

    if words.is_empty() || words.len() > MAX_INTEREST_WORDS {
        return;
    }
    let item = words.join(" ");
    if !IGNORED_INTERESTS.contains(&item.to_lowercase().as_str()) {
        items.push(item);
    }
}

fn clean_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

/// Runs `accept` on every match of `re`, retrying one character later when it rejects.
fn scan<'t>(re: &Regex, text: &'t str, mut accept: impl FnMut(&Captures<'t>) -> bool) {
    let mut pos = 0;
    while pos < text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        pos = if accept(&caps) && whole.end() > whole.start() {
            whole.end()
        } else {
            whole.start() + text[whole.start()..].chars().next().map_or(1, char::len_utf8)
        };
    }
}

/// A contraction tail ("I'm", "she'd") never starts a grade token.
fn starts_at_word_edge(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric() && !matches!(c, '*' | '\'' | '’'))
}

fn next_word_is_noise(text: &str, end: usize) -> bool {
    text[end..]
        .split_whitespace()
        .next()
        .map(clean_word)
        .is_some_and(|word| TRAILING_NOISE.contains(&word.as_str()))
}

fn ends_at_word_edge(text: &str, end: usize) -> bool {
    text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric() && c != '*')
}

/// Replaces the given byte ranges with spaces, keeping every other offset intact.
fn mask(text: &str, ranges: impl IntoIterator<Item = Range<usize>>) -> String {
    let mut masked = text.to_string();
    for range in ranges {
        let blank = " ".repeat(range.len());
        masked.replace_range(range, &blank);
    }
    masked
}
