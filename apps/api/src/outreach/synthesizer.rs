//! Outreach Synthesizer: composes one personalized message per (recipient, job).
//!
//! Phrase choice is a pure function of the recipient's address local part, so a
//! recipient sees the same wording on every run while different recipients
//! usually see different wording. No state is persisted.

use html_escape::encode_safe;

use crate::models::listing::JobListing;
use crate::models::outreach::{ApplicantProfile, OutreachMessage, Recipient};

/// Variants per section.
pub const BANK_SIZE: usize = 5;

/// Message sections in body order. The tag is appended to the local part before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Introduction,
    Qualifications,
    CompanyFit,
    Closing,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Introduction,
        Section::Qualifications,
        Section::CompanyFit,
        Section::Closing,
    ];

    fn tag(self) -> &'static str {
        match self {
            Section::Introduction => "1",
            Section::Qualifications => "2",
            Section::CompanyFit => "3",
            Section::Closing => "4",
        }
    }
}

/// 31-multiplier rolling hash over UTF-16 code units with 32-bit wraparound.
pub fn stable_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Bank index for a recipient and section.
pub fn select_index(local_part: &str, section: Section) -> usize {
    let hash = stable_hash(&format!("{local_part}{}", section.tag()));
    hash.unsigned_abs() as usize % BANK_SIZE
}

/// Values interpolated into phrase templates, already HTML-escaped.
struct PhraseContext {
    title: String,
    company: String,
    skills: Vec<String>,
}

impl PhraseContext {
    fn new(job: &JobListing, skills: &[String]) -> Self {
        let title = if job.title.trim().is_empty() {
            "the open position".to_string()
        } else {
            encode_safe(&job.title).into_owned()
        };
        let company = job
            .company
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| encode_safe(c).into_owned())
            .unwrap_or_else(|| "your company".to_string());
        let mut skills: Vec<String> = skills
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| encode_safe(s).into_owned())
            .collect();
        if skills.is_empty() {
            skills.push("software development".to_string());
        }
        Self {
            title,
            company,
            skills,
        }
    }

    /// First `n` skills joined with `sep`.
    fn skills(&self, n: usize, sep: &str) -> String {
        self.skills
            .iter()
            .take(n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

fn phrase(section: Section, index: usize, ctx: &PhraseContext) -> String {
    let PhraseContext { title, company, .. } = ctx;
    match (section, index) {
        (Section::Introduction, 0) => format!(
            "I am excited to submit my application for the {title} position at {company}."
        ),
        (Section::Introduction, 1) => format!(
            "I recently discovered the {title} opportunity at {company} and am eager to apply."
        ),
        (Section::Introduction, 2) => format!(
            "As a passionate professional with expertise in {}, I am interested in the {title} role at {company}.",
            ctx.skills(3, ", ")
        ),
        (Section::Introduction, 3) => format!(
            "I'm writing to express my interest in the {title} position at {company}."
        ),
        (Section::Introduction, _) => format!(
            "With my background in {}, I believe I would be an excellent fit for the {title} role at {company}.",
            ctx.skills(2, " and ")
        ),

        (Section::Qualifications, 0) => format!(
            "My experience with {} perfectly aligns with the requirements for this position.",
            ctx.skills(usize::MAX, ", ")
        ),
        (Section::Qualifications, 1) => format!(
            "Throughout my career, I've developed strong skills in {}, which would be valuable in this role.",
            ctx.skills(3, ", ")
        ),
        (Section::Qualifications, 2) => format!(
            "My proficiency in {} has prepared me to excel as a {title}.",
            ctx.skills(4, ", ")
        ),
        (Section::Qualifications, 3) => format!(
            "I bring extensive experience in {}, which I understand are key requirements for this position.",
            ctx.skills(3, ", ")
        ),
        (Section::Qualifications, _) => format!(
            "Having worked with {}, I am confident in my ability to make significant contributions to your team.",
            ctx.skills(4, ", ")
        ),

        (Section::CompanyFit, 0) => format!(
            "I am particularly drawn to {company} because of your innovative approach and industry reputation."
        ),
        (Section::CompanyFit, 1) => format!(
            "{company}'s mission and values resonate strongly with me, and I am excited about the opportunity to contribute to your success."
        ),
        (Section::CompanyFit, 2) => format!(
            "I have been following {company}'s growth and am impressed by your achievements in the industry."
        ),
        (Section::CompanyFit, 3) => format!(
            "What excites me most about {company} is your commitment to excellence and innovation."
        ),
        (Section::CompanyFit, _) => format!(
            "I believe my skills and experience align perfectly with {company}'s focus and goals."
        ),

        (Section::Closing, 0) => "I would welcome the opportunity to discuss how my background would make me a valuable addition to your team.".to_string(),
        (Section::Closing, 1) => format!(
            "I am excited about the possibility of bringing my skills to {company} and would appreciate the chance to speak with you further."
        ),
        (Section::Closing, 2) => "Thank you for considering my application. I look forward to the possibility of working together.".to_string(),
        (Section::Closing, 3) => "I am available for an interview at your convenience and look forward to discussing my qualifications further.".to_string(),
        (Section::Closing, _) => "I am eager to contribute my skills and expertise to your team and would welcome the chance to discuss this opportunity.".to_string(),
    }
}

/// Subject line shared by every message of a run.
pub fn subject_line(job: &JobListing, timestamp: &str) -> String {
    let title = if job.title.trim().is_empty() {
        "Open Position"
    } else {
        job.title.as_str()
    };
    format!("Application for {title} - {timestamp}")
}

/// Builds the message for one recipient/job pairing. Same inputs, same bytes.
pub fn compose_message(
    recipient: &Recipient,
    job: &JobListing,
    skills: &[String],
    applicant: &ApplicantProfile,
    timestamp: &str,
) -> OutreachMessage {
    let ctx = PhraseContext::new(job, skills);
    let paragraphs: Vec<String> = Section::ALL
        .iter()
        .map(|&section| {
            let index = select_index(recipient.local_part(), section);
            format!("    <p>{}</p>", phrase(section, index, &ctx))
        })
        .collect();

    let body_html = format!(
        r#"<html>
<body>
    <h2>Application for {title} at {company}</h2>

    <p>Dear Hiring Manager,</p>

{paragraphs}

    <p>Thank you for your time and consideration.</p>

    <p>Sincerely,<br>
    {name}<br>
    {email}<br>
    {phone}</p>

    <p><i>This email was sent at: {timestamp}</i></p>
</body>
</html>
"#,
        title = ctx.title,
        company = ctx.company,
        paragraphs = paragraphs.join("\n\n"),
        name = encode_safe(&applicant.name),
        email = encode_safe(&applicant.email),
        phone = encode_safe(&applicant.phone),
        timestamp = encode_safe(timestamp),
    );

    OutreachMessage {
        recipient: recipient.clone(),
        job: job.clone(),
        subject_line: subject_line(job, timestamp),
        body_html,
    }
}
