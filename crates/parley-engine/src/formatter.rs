use crate::sequencer::RunReport;
use parley_common::formatter::format_outcome;
use parley_common::protocol::ReplyOutcome;

/// Human-readable summary of a run, one step per line.
pub fn format_report(outcome: &ReplyOutcome, report: &RunReport) -> String {
    let mut output = format!("Outcome: {}", format_outcome(outcome));

    let locator = &report.locator;
    match &locator.resolved_id {
        Some(id) => output.push_str(&format!(
            "\nTarget: {} ({})",
            id,
            if locator.is_nested_target {
                "nested reply"
            } else {
                "top-level comment"
            }
        )),
        None => output.push_str("\nTarget: none in URL"),
    }

    match (&report.strategy, &report.container) {
        (Some(strategy), Some(candidate)) => output.push_str(&format!(
            "\nContainer: {} via {} ({} candidate(s), exact: {}, depth: {})",
            candidate.container,
            strategy,
            report.candidate_count,
            candidate.is_exact_match,
            candidate.nesting_depth
        )),
        _ => output.push_str("\nContainer: not found"),
    }

    if let Some(scope) = &report.reply_scope {
        output.push_str(&format!("\nReply affordance: {}", scope.name()));
    }
    if let Some(input) = &report.input {
        output.push_str(&format!("\nInput: {}", input));
    }
    if let Some(author) = &report.author {
        output.push_str(&format!(
            "\nAuthor: {} ({})",
            author.name,
            author.heuristic.name()
        ));
    }
    if let Some(composition) = &report.composition {
        output.push_str(&format!(
            "\nInserted ({:?}, mention present: {}): {:?}",
            composition.mode, report.mention_already_present, composition.text
        ));
    }
    if let Some(file_input) = &report.attached_to {
        output.push_str(&format!("\nImages attached to: {}", file_input));
    }
    if let Some(submit) = &report.submit {
        output.push_str(&format!("\nSubmit: {:?}", submit));
    }

    let phases: Vec<String> = report.phases.iter().map(|p| p.to_string()).collect();
    output.push_str(&format!("\nPhases: {}", phases.join(" -> ")));
    output
}
