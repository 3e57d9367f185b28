//! Skill Normalizer: turns free-text skills and job titles into provider search terms.
//!
//! Pure functions, no I/O. Output feeds the search escalator.

use serde::Serialize;

/// Skill → provider technology slug. Exact lookup first, then first substring hit
/// in table order.
const TECHNOLOGY_SLUGS: &[(&str, &str)] = &[
    ("python", "python"),
    ("javascript", "javascript"),
    ("typescript", "typescript"),
    ("react", "react"),
    ("reactjs", "react"),
    ("next.js", "nextjs"),
    ("nextjs", "nextjs"),
    ("node.js", "nodejs"),
    ("nodejs", "nodejs"),
    ("express", "express"),
    ("express.js", "express"),
    ("tailwind", "tailwind-css"),
    ("tailwind css", "tailwind-css"),
    ("mongodb", "mongodb"),
    ("postgresql", "postgresql"),
    ("postgres", "postgresql"),
    ("prisma", "prisma"),
    ("jest", "jest"),
    ("git", "git"),
    ("docker", "docker"),
    ("kubernetes", "kubernetes"),
    ("aws", "aws"),
    ("github", "github"),
    ("github actions", "github-actions"),
    ("css", "css"),
    ("html", "html"),
    ("sql", "sql"),
    ("nosql", "nosql"),
    ("redux", "redux"),
    ("graphql", "graphql"),
    ("rest", "rest-api"),
    ("api", "api"),
    ("ui", "ui"),
    ("ux", "ux"),
    ("java", "java"),
    ("c#", "c-sharp"),
    ("csharp", "c-sharp"),
    ("c++", "cpp"),
    ("cpp", "cpp"),
    ("go", "golang"),
    ("golang", "golang"),
    ("php", "php"),
    ("ruby", "ruby"),
    ("rails", "ruby-on-rails"),
    ("ruby on rails", "ruby-on-rails"),
    ("scala", "scala"),
    ("rust", "rust"),
    ("swift", "swift"),
    ("kotlin", "kotlin"),
    ("flutter", "flutter"),
    ("dart", "dart"),
    ("react native", "react-native"),
    ("vue", "vue"),
    ("vue.js", "vue"),
    ("angular", "angular"),
    ("svelte", "svelte"),
    ("laravel", "laravel"),
    ("django", "django"),
    ("flask", "flask"),
    ("spring", "spring"),
    ("spring boot", "spring-boot"),
    ("asp.net", "asp-net"),
    ("asp", "asp-net"),
    ("dotnet", "dotnet"),
    (".net", "dotnet"),
    ("tensorflow", "tensorflow"),
    ("pytorch", "pytorch"),
    ("machine learning", "machine-learning"),
    ("ml", "machine-learning"),
    ("ai", "artificial-intelligence"),
    ("data science", "data-science"),
    ("data analysis", "data-analysis"),
    ("data analytics", "data-analytics"),
    ("data engineering", "data-engineering"),
    ("big data", "big-data"),
    ("hadoop", "hadoop"),
    ("spark", "spark"),
    ("kafka", "kafka"),
];

/// Seniority and filler words stripped from role titles (whole words only).
const ROLE_STOPWORDS: &[&str] = &[
    "senior", "junior", "lead", "staff", "principal", "head", "chief", "of", "the", "a", "an",
];

/// Keywords that make a skill usable as a weak job-title pattern.
const GENERIC_ROLE_KEYWORDS: &[&str] = &[
    "software",
    "developer",
    "engineer",
    "web",
    "frontend",
    "backend",
    "fullstack",
    "data",
    "devops",
    "cloud",
    "mobile",
    "design",
    "product",
    "project",
    "manager",
];

/// Normalized search inputs for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchTerms {
    /// Normalized, non-empty, deduplicated role titles.
    pub roles: Vec<String>,
    /// Sanitized generic skill terms; only used when `roles` is empty.
    pub generic_terms: Vec<String>,
    pub technologies: Vec<String>,
}

impl SearchTerms {
    pub fn build(skills: &[String], eligible_roles: &[String]) -> Self {
        let mut roles: Vec<String> = Vec::new();
        for role in eligible_roles {
            let normalized = normalize_role_title(role);
            if !normalized.is_empty() && !roles.contains(&normalized) {
                roles.push(normalized);
            }
        }

        let generic_terms = if roles.is_empty() {
            select_generic_terms(skills)
                .iter()
                .map(|term| sanitize_pattern(term))
                .filter(|term| !term.is_empty())
                .collect()
        } else {
            Vec::new()
        };

        Self {
            roles,
            generic_terms,
            technologies: map_to_technology_tokens(skills),
        }
    }
}

/// Maps skills to technology slugs, deduplicated in first-seen order.
/// Unmatched skills are dropped.
pub fn map_to_technology_tokens(terms: &[String]) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for term in terms {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }

        let slug = TECHNOLOGY_SLUGS
            .iter()
            .find(|(key, _)| *key == needle)
            .or_else(|| {
                TECHNOLOGY_SLUGS
                    .iter()
                    .find(|(key, _)| needle.contains(key) || key.contains(needle.as_str()))
            })
            .map(|(_, slug)| *slug);

        if let Some(slug) = slug {
            if !tokens.iter().any(|t| t == slug) {
                tokens.push(slug.to_string());
            }
        }
    }

    tokens
}

/// Lowercases, replaces non-word characters with spaces, drops stopwords and
/// collapses whitespace. Idempotent; empty input yields an empty string.
pub fn normalize_role_title(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !ROLE_STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps skills that mention a generic job/role keyword.
pub fn select_generic_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| {
            let lower = term.to_lowercase();
            GENERIC_ROLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .cloned()
        .collect()
}

/// Title-pattern form of a generic term: lowercase, punctuation removed.
fn sanitize_pattern(term: &str) -> String {
    term.to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
