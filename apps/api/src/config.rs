use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Entity-extraction service endpoint. When unset the pipeline runs
    /// with heuristics only (no NER backend).
    pub ner_endpoint: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ner_endpoint: std::env::var("NER_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Default number of leading lines in which a PERSON entity may claim the
/// name field. Résumés conventionally open with the candidate's name.
pub const DEFAULT_NAME_WINDOW: usize = 5;

const DEFAULT_SKILL_VOCAB: &[&str] = &[
    "python",
    "java",
    "sql",
    "excel",
    "c++",
    "machine learning",
    "data science",
    "tensorflow",
    "pandas",
    "numpy",
    "power bi",
    "react",
    "node.js",
    "javascript",
    "typescript",
    "html",
    "css",
    "mongodb",
    "postgresql",
    "flask",
    "django",
    "rust",
    "go",
    "aws",
    "docker",
    "kubernetes",
    "git",
];

const DEFAULT_SKILLS_HEADERS: &[&str] = &["skills", "technical skills", "core competencies"];

const DEFAULT_EDUCATION_HEADERS: &[&str] = &["education", "academic background", "qualifications"];

const DEFAULT_SECTION_HEADERS: &[&str] = &[
    "experience",
    "work experience",
    "employment history",
    "professional experience",
    "projects",
    "certifications",
    "summary",
    "objective",
    "profile",
    "achievements",
    "awards",
    "publications",
    "languages",
    "interests",
    "references",
    "contact",
];

const DEFAULT_EXPERIENCE_KEYWORDS: &[&str] = &[
    "experience",
    "worked",
    "project",
    "internship",
    "job",
    "role",
    "position",
];

/// Tuning inputs for the extraction pipeline. Constructed once at startup
/// and passed into the resolver explicitly so components stay testable in
/// isolation; nothing in the pipeline reads ambient state.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Skill vocabulary, lowercase. Tokens outside it are dropped.
    pub skill_vocab: Vec<String>,
    /// Header keywords opening a skills section, lowercase.
    pub skills_headers: Vec<String>,
    /// Header keywords opening an education section, lowercase.
    pub education_headers: Vec<String>,
    /// Other recognized section headers; they terminate skills/education
    /// capture and bound the leading summary block.
    pub section_headers: Vec<String>,
    /// Keywords marking a line as experience-related, lowercase.
    pub experience_keywords: Vec<String>,
    /// Number of leading lines eligible for the PERSON-span name heuristic.
    pub name_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            skill_vocab: to_owned_lower(DEFAULT_SKILL_VOCAB),
            skills_headers: to_owned_lower(DEFAULT_SKILLS_HEADERS),
            education_headers: to_owned_lower(DEFAULT_EDUCATION_HEADERS),
            section_headers: to_owned_lower(DEFAULT_SECTION_HEADERS),
            experience_keywords: to_owned_lower(DEFAULT_EXPERIENCE_KEYWORDS),
            name_window: DEFAULT_NAME_WINDOW,
        }
    }
}

impl ExtractionConfig {
    /// Builds the extraction configuration from the environment, starting
    /// from the built-in defaults. `SKILL_VOCAB_PATH` points at a
    /// newline-delimited vocabulary file; the header and keyword sets are
    /// overridable as comma-separated lists.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(path) = std::env::var("SKILL_VOCAB_PATH") {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read skill vocabulary from '{path}'"))?;
            cfg.skill_vocab = raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_lowercase)
                .collect();
        }

        if let Some(list) = csv_env("SKILLS_HEADERS") {
            cfg.skills_headers = list;
        }
        if let Some(list) = csv_env("EDUCATION_HEADERS") {
            cfg.education_headers = list;
        }
        if let Some(list) = csv_env("SECTION_HEADERS") {
            cfg.section_headers = list;
        }
        if let Some(list) = csv_env("EXPERIENCE_KEYWORDS") {
            cfg.experience_keywords = list;
        }

        if let Ok(n) = std::env::var("NAME_WINDOW") {
            cfg.name_window = n
                .parse::<usize>()
                .context("NAME_WINDOW must be a non-negative integer")?;
        }

        Ok(cfg)
    }
}

fn to_owned_lower(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn csv_env(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocab_is_lowercase() {
        let cfg = ExtractionConfig::default();
        assert!(cfg.skill_vocab.iter().all(|s| s == &s.to_lowercase()));
        assert!(cfg.skill_vocab.contains(&"python".to_string()));
        assert!(cfg.skill_vocab.contains(&"sql".to_string()));
    }

    #[test]
    fn test_default_headers_cover_core_sections() {
        let cfg = ExtractionConfig::default();
        assert!(cfg.skills_headers.contains(&"skills".to_string()));
        assert!(cfg.education_headers.contains(&"education".to_string()));
        assert!(cfg.section_headers.contains(&"experience".to_string()));
    }

    #[test]
    fn test_default_name_window() {
        assert_eq!(ExtractionConfig::default().name_window, DEFAULT_NAME_WINDOW);
    }
}
