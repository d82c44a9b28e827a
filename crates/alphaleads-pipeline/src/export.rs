//! CSV rendering for lead exports.

use alphaleads_core::Lead;

const HEADERS: [&str; 12] = [
    "Business Name",
    "Contact Name",
    "Phone",
    "Email",
    "Website",
    "Address",
    "City",
    "State",
    "Industry",
    "Confidence",
    "Status",
    "Created At",
];

fn quoted(value: Option<&str>) -> String {
    format!("\"{}\"", value.unwrap_or_default().replace('"', "\"\""))
}

/// Renders leads as CSV with a header row. Text columns are always quoted;
/// confidence is a bare integer.
#[must_use]
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut rows = Vec::with_capacity(leads.len() + 1);
    rows.push(HEADERS.join(","));

    for lead in leads {
        let created_at = lead.created_at.to_rfc3339();
        let row = [
            quoted(Some(&lead.business_name)),
            quoted(lead.contact_name.as_deref()),
            quoted(lead.phone.as_deref()),
            quoted(lead.email.as_deref()),
            quoted(lead.website.as_deref()),
            quoted(lead.address.street.as_deref()),
            quoted(lead.address.city.as_deref()),
            quoted(lead.address.state.as_deref()),
            quoted(Some(lead.industry.as_str())),
            lead.confidence.to_string(),
            quoted(Some(lead.status.as_str())),
            quoted(Some(&created_at)),
        ];
        rows.push(row.join(","));
    }

    rows.join("\n")
}
