//! Assembles the final candidate record. Pure: no I/O, no side effects.
//! Absent fields stay `None`/empty; partial extraction is a legitimate,
//! persistable outcome, never a failure.

use crate::extract::resolver::ResolvedFields;
use crate::extract::text::ExtractedText;
use crate::models::resume::NewResume;

pub fn build_record(
    resolved: ResolvedFields,
    email: Option<String>,
    phone: Option<String>,
    text: &ExtractedText,
    filename: &str,
) -> NewResume {
    let mut notes = resolved.notes;
    notes.push(match email {
        Some(_) => "email: first match in document order".to_string(),
        None => "email: not found".to_string(),
    });
    notes.push(match phone {
        Some(_) => "phone: first match in document order".to_string(),
        None => "phone: not found".to_string(),
    });

    NewResume {
        name: resolved.name,
        email,
        phone,
        skills: resolved.skills,
        education: resolved.education,
        experience: resolved.experience,
        summary: resolved.summary,
        raw_text: text.full_text(),
        source_file: filename.to_string(),
        extraction_notes: notes,
    }
}
