//! Match Annotator: tags listings with the candidate skills and role they match.

use crate::models::listing::{JobListing, GENERIC_SKILL_TAG};
use crate::search::normalizer::normalize_role_title;

/// Annotates every listing. `matched_skills` is never left empty.
pub fn annotate_listings(
    listings: Vec<JobListing>,
    skills: &[String],
    eligible_roles: &[String],
) -> Vec<JobListing> {
    // (normalized, original) in caller order; first original wins per normalized form
    let mut roles: Vec<(String, &str)> = Vec::new();
    for role in eligible_roles {
        let normalized = normalize_role_title(role);
        if !normalized.is_empty() && !roles.iter().any(|(n, _)| *n == normalized) {
            roles.push((normalized, role.as_str()));
        }
    }

    listings
        .into_iter()
        .map(|mut listing| {
            listing.matched_skills = match_skills(&listing, skills);
            listing.matched_role = match_role(&listing, &roles);
            listing
        })
        .collect()
}

fn match_skills(listing: &JobListing, skills: &[String]) -> Vec<String> {
    let title = listing.title.to_lowercase();
    let description = listing
        .description
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let matched: Vec<String> = skills
        .iter()
        .filter(|skill| {
            let needle = skill.to_lowercase();
            !needle.is_empty() && (title.contains(&needle) || description.contains(&needle))
        })
        .cloned()
        .collect();

    if matched.is_empty() {
        vec![GENERIC_SKILL_TAG.to_string()]
    } else {
        matched
    }
}

fn match_role(listing: &JobListing, roles: &[(String, &str)]) -> Option<String> {
    if listing.title.is_empty() {
        return None;
    }
    let title = listing.title.to_lowercase();
    roles
        .iter()
        .find(|(normalized, _)| title.contains(normalized.as_str()))
        .map(|(_, original)| original.to_string())
}
