//! Static Fallback Generator: synthesizes listings from the company dataset when
//! every live search stage came back empty.
//!
//! Sampling takes an injected `fastrand::Rng` so callers can seed it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::models::company::CompanyRecord;
use crate::models::listing::JobListing;

/// Companies sampled per fallback run.
pub const FALLBACK_COMPANY_COUNT: usize = 10;

/// Synthetic ids start here so they never collide with provider ids.
pub const FALLBACK_ID_OFFSET: i64 = 1000;

/// Titles cycled through when neither a role nor an industry keyword applies.
pub const COMMON_TECH_TITLES: &[&str] = &[
    "Software Engineer",
    "Full Stack Developer",
    "Frontend Developer",
    "Backend Engineer",
    "Data Scientist",
    "Machine Learning Engineer",
    "Product Manager",
    "DevOps Engineer",
    "Mobile Developer",
    "UX/UI Designer",
];

/// Industry keyword → title, first hit wins.
const INDUSTRY_TITLES: &[(&[&str], &str)] = &[
    (&["ai", "machine learning"], "Machine Learning Engineer"),
    (&["data"], "Data Scientist"),
    (&["mobile"], "Mobile Developer"),
];

/// Read-only handle on the company CSV. Loaded fresh per invocation.
#[derive(Debug, Clone)]
pub struct CompanyDataset {
    path: PathBuf,
}

impl CompanyDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every well-formed row. A missing or unreadable file yields an empty
    /// list; malformed rows are skipped.
    pub fn load(&self) -> Vec<CompanyRecord> {
        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) => {
                warn!(
                    "Company dataset unavailable at {}: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for (row, result) in reader.deserialize::<CompanyRecord>().enumerate() {
            match result {
                Ok(record) if !record.name.is_empty() => records.push(record),
                Ok(_) => {}
                Err(e) => warn!("Skipping company dataset row {}: {}", row + 1, e),
            }
        }

        info!(
            "Loaded {} companies from {}",
            records.len(),
            self.path.display()
        );
        records
    }
}

/// Picks exactly `count` companies (or all of them when the dataset is smaller).
/// Every company mentioning a skill or role in its description or industry is
/// kept when they fit; the remainder is random backfill.
pub fn select_fallback_companies(
    dataset: &[CompanyRecord],
    skills: &[String],
    roles: &[String],
    count: usize,
    rng: &mut fastrand::Rng,
) -> Vec<CompanyRecord> {
    let needles: Vec<String> = skills
        .iter()
        .chain(roles)
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let (mut matched, mut others): (Vec<&CompanyRecord>, Vec<&CompanyRecord>) =
        dataset.iter().partition(|company| {
            let description = company.description.to_lowercase();
            let industry = company.industry.to_lowercase();
            needles
                .iter()
                .any(|n| description.contains(n.as_str()) || industry.contains(n.as_str()))
        });

    info!(
        "{} of {} companies match the candidate profile",
        matched.len(),
        dataset.len()
    );

    if matched.len() > count {
        rng.shuffle(&mut matched);
        matched.truncate(count);
    } else if matched.len() < count {
        rng.shuffle(&mut others);
        let missing = count - matched.len();
        matched.extend(others.into_iter().take(missing));
    }

    matched.into_iter().cloned().collect()
}

/// Turns companies into listings flagged as fallback-sourced.
pub fn synthesize_listings(
    companies: &[CompanyRecord],
    skills: &[String],
    roles: &[String],
) -> Vec<JobListing> {
    let today = Utc::now().date_naive().to_string();
    let skill_list = skills.join(", ");

    companies
        .iter()
        .enumerate()
        .map(|(index, company)| {
            let title = pick_title(index, company, roles);
            let description = format!(
                "{} is looking for a talented {} to join our team. {} We're looking for someone with experience in {} to help us build the future of {}.",
                company.name, title, company.description, skill_list, company.industry
            );
            let location = if company.location.is_empty() {
                "Remote".to_string()
            } else {
                company.location.clone()
            };

            JobListing {
                id: FALLBACK_ID_OFFSET + index as i64,
                title,
                description: Some(description),
                company: Some(company.name.clone()),
                url: Some(company.website.clone()).filter(|w| !w.is_empty()),
                posted_date: Some(today.clone()),
                location: Some(location),
                matched_skills: Vec::new(),
                matched_role: None,
                is_fallback_sourced: true,
            }
        })
        .collect()
}

/// Caller roles first (cycled), then industry keywords, then the common list.
fn pick_title(index: usize, company: &CompanyRecord, roles: &[String]) -> String {
    if !roles.is_empty() {
        return roles[index % roles.len()].clone();
    }

    let industry = company.industry.to_lowercase();
    INDUSTRY_TITLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| industry.contains(kw)))
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| COMMON_TECH_TITLES[index % COMMON_TECH_TITLES.len()].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn company(name: &str, description: &str, industry: &str) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            website: format!("https://{}.example", name.to_lowercase()),
            description: description.to_string(),
            industry: industry.to_string(),
            location: String::new(),
        }
    }

    fn dataset(n: usize) -> Vec<CompanyRecord> {
        (0..n)
            .map(|i| company(&format!("Co{i}"), "Developer tools", "B2B"))
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_backfills_to_count_keeping_all_matches() {
        let mut records = dataset(12);
        records[3] = company("PayCo", "Fintech payments rails", "Financial Services");
        records[9] = company("LedgerCo", "Accounting", "Fintech");

        for seed in 0..20 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let picked = select_fallback_companies(&records, &strings(&["fintech"]), &[], 10, &mut rng);
            assert_eq!(picked.len(), 10);
            assert!(picked.iter().any(|c| c.name == "PayCo"));
            assert!(picked.iter().any(|c| c.name == "LedgerCo"));
            let mut names: Vec<_> = picked.iter().map(|c| c.name.clone()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 10, "no company picked twice");
        }
    }

    #[test]
    fn test_samples_down_when_too_many_match() {
        let records: Vec<_> = (0..15)
            .map(|i| company(&format!("Ai{i}"), "Rust infrastructure", "Developer Tools"))
            .collect();
        let mut rng = fastrand::Rng::with_seed(7);
        let picked = select_fallback_companies(&records, &strings(&["Rust"]), &[], 10, &mut rng);
        assert_eq!(picked.len(), 10);
        assert!(picked.iter().all(|c| c.description.contains("Rust")));
    }

    #[test]
    fn test_small_dataset_returns_everything() {
        let mut rng = fastrand::Rng::with_seed(1);
        let picked = select_fallback_companies(&dataset(4), &strings(&["go"]), &[], 10, &mut rng);
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn test_role_match_counts() {
        let mut records = dataset(10);
        records[0] = company("Hire", "We hire every backend engineer we meet", "HR");
        let mut rng = fastrand::Rng::with_seed(3);
        let picked = select_fallback_companies(&records, &[], &strings(&["Backend Engineer"]), 1, &mut rng);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "Hire");
    }

    #[test]
    fn test_titles_cycle_through_roles() {
        let companies = dataset(3);
        let listings = synthesize_listings(&companies, &strings(&["Go"]), &strings(&["SRE", "Platform Engineer"]));
        let titles: Vec<_> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["SRE", "Platform Engineer", "SRE"]);
    }

    #[test]
    fn test_titles_from_industry_then_common_list() {
        let companies = vec![
            company("A", "x", "Machine Learning"),
            company("B", "x", "Big Data"),
            company("C", "x", "Mobile Gaming"),
            company("D", "x", "Logistics"),
        ];
        let listings = synthesize_listings(&companies, &[], &[]);
        assert_eq!(listings[0].title, "Machine Learning Engineer");
        assert_eq!(listings[1].title, "Data Scientist");
        assert_eq!(listings[2].title, "Mobile Developer");
        assert_eq!(listings[3].title, COMMON_TECH_TITLES[3]);
    }

    #[test]
    fn test_synthesized_listing_shape() {
        let companies = vec![company("Acme", "Builds rockets.", "Aerospace")];
        let listings = synthesize_listings(&companies, &strings(&["Python", "React"]), &[]);
        let listing = &listings[0];
        assert_eq!(listing.id, 1000);
        assert!(listing.is_fallback_sourced);
        assert_eq!(listing.company.as_deref(), Some("Acme"));
        assert_eq!(listing.location.as_deref(), Some("Remote"));
        let description = listing.description.as_deref().unwrap();
        assert!(description.starts_with("Acme is looking for a talented"));
        assert!(description.contains("Builds rockets."));
        assert!(description.contains("Python, React"));
        assert!(description.ends_with("the future of Aerospace."));
    }

    #[test]
    fn test_missing_dataset_yields_empty() {
        let dataset = CompanyDataset::new("/definitely/not/here/yc.csv");
        assert!(dataset.load().is_empty());
    }

    #[test]
    fn test_load_reads_named_columns_and_skips_bad_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Company Name,Website,Company Description,Industry,Founder Name,Location"
        )
        .unwrap();
        writeln!(file, "Acme,https://acme.example,Rockets,Aerospace,Wile,Mojave").unwrap();
        writeln!(file, ",https://blank.example,No name,None,Nobody,Nowhere").unwrap();
        writeln!(file, "Beta,https://beta.example,\"Data, lots of it\",Data,Ann,").unwrap();

        let records = CompanyDataset::new(file.path()).load();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Acme");
        assert_eq!(records[0].location, "Mojave");
        assert_eq!(records[1].description, "Data, lots of it");
        assert_eq!(records[1].location, "");
    }
}
