use crate::models::{EnrichedUserRecord, UserRecord};

/// Computes the two derived columns for each record: `name_length` (character
/// count of `name`, 0 when empty) and `email_domain` (lowercased text after
/// the first `@`, absent when the email has no `@`). Pure and idempotent; the
/// input is left untouched.
pub fn derive(records: &[UserRecord]) -> Vec<EnrichedUserRecord> {
    records
        .iter()
        .map(|record| EnrichedUserRecord {
            base: record.clone(),
            name_length: record.name.chars().count() as i64,
            email_domain: email_domain(&record.email),
        })
        .collect()
}

fn email_domain(email: &str) -> Option<String> {
    email
        .split_once('@')
        .map(|(_, domain)| domain.to_lowercase())
}
