//! Plain-text rendering of an analysis for the terminal.

use bidscope::BidAnalysis;
use bidscope::export::product_fit_label;
use std::fmt::{self, Write};

const NOT_STATED: &str = "Not stated";

pub fn render(analysis: &BidAnalysis) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let details = &analysis.solicitation_details;
    let relevance = &analysis.relevance_analysis;
    let requirements = &analysis.key_requirements;
    let submission = &analysis.submission_instructions;

    writeln!(out, "== {} ==", details.title.as_deref().unwrap_or("Untitled solicitation"))?;
    writeln!(out, "Agency:         {}", or_not_stated(&details.agency))?;
    writeln!(
        out,
        "Relevant:       {}{}",
        yes_no(relevance.is_relevant),
        relevance.reason.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default()
    )?;
    writeln!(out, "Deadline:       {}", or_not_stated(&submission.deadline))?;
    writeln!(out, "Budget:         {}", or_not_stated(&analysis.financials.budget_range))?;
    writeln!(out, "Contract term:  {}", or_not_stated(&analysis.financials.contract_term))?;
    writeln!(
        out,
        "Contact:        {}",
        or_not_stated(&analysis.contact_and_compliance.point_of_contact)
    )?;

    let fit = &requirements.product_fit;
    writeln!(
        out,
        "Product fit:    {}{}; carried brand: {}",
        product_fit_label(fit.fit_type),
        fit.details.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default(),
        yes_no(fit.is_carried_brand)
    )?;

    if let Some(summary) = &details.summary {
        writeln!(out, "\n{}", summary)?;
    }

    writeln!(out, "\nLine items ({}):", requirements.line_items.len())?;
    for (index, item) in requirements.line_items.iter().enumerate() {
        write!(out, "  {}. {}", index + 1, item.name)?;
        if let Some(quantity) = &item.quantity {
            write!(out, " x {}", quantity)?;
        }
        if let Some(part) = &item.part_number {
            write!(out, " [{}]", part)?;
        }
        if let Some(description) = &item.description {
            write!(out, " - {}", description)?;
        }
        out.push('\n');
    }

    list(&mut out, "Eligibility", &requirements.eligibility)?;
    list(&mut out, "Objectives", &requirements.objectives)?;
    list(&mut out, "Formatting and delivery", &submission.formatting_and_delivery)?;
    list(
        &mut out,
        "Compliance requirements",
        &analysis.contact_and_compliance.compliance_requirements,
    )?;

    if !analysis.flags_for_human_review.is_empty() {
        writeln!(out, "\nFlags for human review:")?;
        for flag in &analysis.flags_for_human_review {
            writeln!(out, "  ! {}", flag)?;
        }
    }

    Ok(out)
}

fn list(out: &mut String, heading: &str, entries: &[String]) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{}:", heading)?;
    for entry in entries {
        writeln!(out, "  - {}", entry)?;
    }
    Ok(())
}

fn or_not_stated(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_STATED)
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "N/A",
    }
}
