//! Exact-key duplicate merging across providers.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use alphaleads_core::Lead;

/// Lowercased `businessName_phone` with all whitespace removed.
///
/// No fuzzy matching: `"Acme Inc"` and `"Acme, Inc."` are distinct.
#[must_use]
pub fn dedup_key(lead: &Lead) -> String {
    format!(
        "{}_{}",
        lead.business_name,
        lead.phone.as_deref().unwrap_or_default()
    )
    .chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

/// Collapses records sharing a [`dedup_key`]. Input order decides which
/// provider wins.
///
/// The first-seen record is kept in place and absorbs each later duplicate:
/// its provenance entries are appended, blank contact and address fields are
/// filled, and confidence becomes the higher of the two.
#[must_use]
pub fn dedupe(leads: Vec<Lead>) -> Vec<Lead> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(leads.len());
    let mut unique: Vec<Lead> = Vec::with_capacity(leads.len());

    for lead in leads {
        match positions.entry(dedup_key(&lead)) {
            Entry::Occupied(slot) => absorb(&mut unique[*slot.get()], lead),
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(lead);
            }
        }
    }
    unique
}

fn absorb(winner: &mut Lead, loser: Lead) {
    for source in loser.sources {
        let known = winner
            .sources
            .iter()
            .any(|s| s.name == source.name && s.source_id == source.source_id);
        if !known {
            winner.sources.push(source);
        }
    }

    fill(&mut winner.contact_name, loser.contact_name);
    fill(&mut winner.email, loser.email);
    fill(&mut winner.website, loser.website);

    let address = &mut winner.address;
    fill(&mut address.street, loser.address.street);
    fill(&mut address.city, loser.address.city);
    fill(&mut address.state, loser.address.state);
    fill(&mut address.zip_code, loser.address.zip_code);
    fill(&mut address.country, loser.address.country);
    if address.coordinates.is_none() {
        address.coordinates = loser.address.coordinates;
    }

    winner.confidence = winner.confidence.max(loser.confidence);
    winner.touch();
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
        if let Some(value) = candidate.filter(|v| !v.trim().is_empty()) {
            *slot = Some(value);
        }
    }
}
