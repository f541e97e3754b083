//! Merges NLP entity spans, normalizer output, and line heuristics into
//! the typed résumé fields. Pure and deterministic: same inputs, same
//! fields, no randomness and no silent merging.
//!
//! Conflict policy: the normalizers own email/phone; a PERSON span owns
//! the name even when it collides with a contact-line position. Document
//! order breaks all remaining ties.

use std::collections::BTreeSet;

use crate::config::ExtractionConfig;
use crate::extract::entities::{EntityLabel, EntitySpan};
use crate::extract::normalize::{line_has_email, line_has_phone};
use crate::extract::text::ExtractedText;

const MAX_EXPERIENCE_LINES: usize = 5;

/// Section taxonomy resolved by keyword match against the configured
/// header sets. `Other` covers recognized headers that terminate capture
/// without opening a section of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Skills,
    Education,
    Other,
}

/// Typed fields produced by a single resolver pass, plus provenance notes
/// stating which heuristic filled each field.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    pub name: Option<String>,
    /// Lowercase, deduplicated, sorted.
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub summary: String,
    pub notes: Vec<String>,
}

/// Classifies a line as a section header, or `None` for ordinary text.
/// The match is case-insensitive on the trimmed text before any `:`.
pub fn section_kind(line: &str, cfg: &ExtractionConfig) -> Option<SectionKind> {
    let head = line.split(':').next().unwrap_or("").trim().to_lowercase();
    if head.is_empty() {
        return None;
    }
    if cfg.skills_headers.iter().any(|h| h == &head) {
        Some(SectionKind::Skills)
    } else if cfg.education_headers.iter().any(|h| h == &head) {
        Some(SectionKind::Education)
    } else if cfg.section_headers.iter().any(|h| h == &head) {
        Some(SectionKind::Other)
    } else {
        None
    }
}

pub fn resolve(
    text: &ExtractedText,
    spans: &[EntitySpan],
    cfg: &ExtractionConfig,
) -> ResolvedFields {
    let mut notes = Vec::new();

    let name = resolve_name(text, spans, cfg, &mut notes);
    let skills = resolve_skills(text, cfg, &mut notes);
    let education = resolve_education(text, cfg, &mut notes);
    let experience = resolve_experience(text, cfg, &mut notes);
    let summary = resolve_summary(text, name.as_deref(), cfg, &mut notes);

    ResolvedFields {
        name,
        skills,
        education,
        experience,
        summary,
        notes,
    }
}

/// Best PERSON span starting within the first `name_window` lines, highest
/// confidence first, earliest offset on ties. Falls back to the first line
/// that is not blank, not a contact line, and not a section header.
fn resolve_name(
    text: &ExtractedText,
    spans: &[EntitySpan],
    cfg: &ExtractionConfig,
    notes: &mut Vec<String>,
) -> Option<String> {
    let offsets = text.line_offsets();
    let window_end = offsets.get(cfg.name_window).copied().unwrap_or(usize::MAX);

    let mut best: Option<&EntitySpan> = None;
    for span in spans {
        if span.label != EntityLabel::Person || span.start >= window_end {
            continue;
        }
        let better = match best {
            None => true,
            Some(b) => {
                span.confidence > b.confidence
                    || (span.confidence == b.confidence && span.start < b.start)
            }
        };
        if better {
            best = Some(span);
        }
    }
    if let Some(span) = best {
        let candidate = span.text.trim();
        if !candidate.is_empty() {
            notes.push("name: person entity".to_string());
            return Some(candidate.to_string());
        }
    }

    for line in text.lines() {
        let trimmed = line.text.trim();
        if trimmed.is_empty()
            || section_kind(trimmed, cfg).is_some()
            || line_has_email(trimmed)
            || line_has_phone(trimmed)
        {
            continue;
        }
        notes.push("name: first-line heuristic".to_string());
        return Some(trimmed.to_string());
    }

    notes.push("name: undetermined".to_string());
    None
}

/// Tokens from skills sections, cross-referenced against the vocabulary
/// with case-insensitive exact matching. Unmatched tokens are dropped:
/// precision over recall. The `BTreeSet` gives set semantics with a
/// deterministic order, so re-running on identical input is idempotent.
fn resolve_skills(
    text: &ExtractedText,
    cfg: &ExtractionConfig,
    notes: &mut Vec<String>,
) -> Vec<String> {
    let lines = text.lines();
    let mut found = BTreeSet::new();
    let mut saw_section = false;

    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].text.trim();
        if section_kind(trimmed, cfg) != Some(SectionKind::Skills) {
            i += 1;
            continue;
        }
        saw_section = true;
        if let Some((_, rest)) = trimmed.split_once(':') {
            collect_skill_tokens(rest, cfg, &mut found);
        }
        i += 1;
        while i < lines.len() {
            let trimmed = lines[i].text.trim();
            if section_kind(trimmed, cfg).is_some() {
                break;
            }
            collect_skill_tokens(trimmed, cfg, &mut found);
            i += 1;
        }
    }

    if saw_section {
        notes.push(format!("skills: {} vocabulary matches", found.len()));
    } else {
        notes.push("skills: no skills section".to_string());
    }
    found.into_iter().collect()
}

fn collect_skill_tokens(chunk: &str, cfg: &ExtractionConfig, out: &mut BTreeSet<String>) {
    for token in chunk.split([',', ';']) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let lower = token.to_lowercase();
        if cfg.skill_vocab.iter().any(|v| v == &lower) {
            out.insert(lower);
        }
    }
}

/// Non-blank lines following an education header, up to the next
/// recognized header or end of document, in document order. A non-empty
/// remainder on the header line itself becomes the first entry.
fn resolve_education(
    text: &ExtractedText,
    cfg: &ExtractionConfig,
    notes: &mut Vec<String>,
) -> Vec<String> {
    let lines = text.lines();
    let mut entries = Vec::new();
    let mut saw_section = false;

    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].text.trim();
        if section_kind(trimmed, cfg) != Some(SectionKind::Education) {
            i += 1;
            continue;
        }
        saw_section = true;
        if let Some((_, rest)) = trimmed.split_once(':') {
            let rest = rest.trim();
            if !rest.is_empty() {
                entries.push(rest.to_string());
            }
        }
        i += 1;
        while i < lines.len() {
            let trimmed = lines[i].text.trim();
            if section_kind(trimmed, cfg).is_some() {
                break;
            }
            if !trimmed.is_empty() {
                entries.push(trimmed.to_string());
            }
            i += 1;
        }
    }

    if saw_section {
        notes.push(format!("education: {} lines", entries.len()));
    } else {
        notes.push("education: no education section".to_string());
    }
    entries
}

/// Lines mentioning an experience keyword, in document order, capped.
/// Header lines themselves are excluded; they structure, not describe.
fn resolve_experience(
    text: &ExtractedText,
    cfg: &ExtractionConfig,
    notes: &mut Vec<String>,
) -> Vec<String> {
    let mut entries = Vec::new();
    for line in text.lines() {
        if entries.len() >= MAX_EXPERIENCE_LINES {
            break;
        }
        let trimmed = line.text.trim();
        if trimmed.is_empty() || section_kind(trimmed, cfg).is_some() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if cfg.experience_keywords.iter().any(|k| lower.contains(k)) {
            entries.push(trimmed.to_string());
        }
    }
    notes.push(format!("experience: {} keyword lines", entries.len()));
    entries
}

/// First contiguous non-empty line block that precedes any recognized
/// section header and is not the name or a contact line. Lines of the
/// block are joined with single spaces.
fn resolve_summary(
    text: &ExtractedText,
    name: Option<&str>,
    cfg: &ExtractionConfig,
    notes: &mut Vec<String>,
) -> String {
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.text.trim();
        if section_kind(trimmed, cfg).is_some() {
            break;
        }
        let excluded = trimmed.is_empty()
            || Some(trimmed) == name
            || line_has_email(trimmed)
            || line_has_phone(trimmed);
        if excluded {
            if !block.is_empty() {
                break; // block ended
            }
            continue;
        }
        block.push(trimmed);
    }

    if block.is_empty() {
        notes.push("summary: none".to_string());
        String::new()
    } else {
        notes.push("summary: leading text block".to_string());
        block.join(" ")
    }
}
