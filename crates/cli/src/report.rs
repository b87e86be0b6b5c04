//! Plain-text output for the terminal.

use crm_import_client::ImportOutcome;
use crm_import_core::summary::{BucketCounts, DecisionTally, ResolutionProgress};

pub fn print_buckets(counts: &BucketCounts) {
    println!("Validated {} row(s):", counts.total_rows);
    println!("  new        {:>6}", counts.new);
    println!("  duplicate  {:>6}", counts.duplicate);
    println!("  conflict   {:>6}", counts.conflict);
    println!("  invalid    {:>6}", counts.invalid);
}

pub fn print_review(progress: &ResolutionProgress, tally: &DecisionTally) {
    println!(
        "Resolved {}/{} row(s) ({}%)",
        progress.resolved,
        progress.required,
        progress.percent()
    );
    println!(
        "  skip {}, update {} ({} by default), keep first {}, incoming overrides {}",
        tally.skip, tally.update, tally.defaulted, tally.keep_first, tally.incoming_overrides
    );
}

pub fn print_outcome(outcome: &ImportOutcome) {
    println!("Import complete:");
    println!("  new contacts {:>6}", outcome.new_contacts);
    println!("  merged       {:>6}", outcome.merged);
    println!("  skipped      {:>6}", outcome.skipped);
    println!("  errors       {:>6}", outcome.errors.count());
}
