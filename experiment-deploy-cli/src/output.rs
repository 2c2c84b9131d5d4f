//! Console summaries printed after each command.

use colored::Colorize;
use experiment_deploy_core::naming::console_url;
use experiment_deploy_core::{
    BranchReport, DecommissionReport, GroupOutcome, ProvisionReport, ResourceGroup, StepOutcome,
};

const REGISTER_SNIPPET: &str = r#"
    import S3Upload from "./S3Upload";

    registerTask("S3Upload", S3Upload);
"#;

fn print_branch<T>(label: &str, branch: &BranchReport<T>, describe: impl Fn(&T) -> String) {
    match &branch.outcome {
        Ok(resources) => eprintln!("{} {}: {}", "OK".green().bold(), label, describe(resources)),
        Err(e) => {
            eprintln!("{} {}: {}", "FAILED".red().bold(), label, e);
            if branch.rollback.is_empty() {
                for resource in &branch.created {
                    eprintln!("    left in place: {}", resource);
                }
            }
            for step in &branch.rollback {
                match &step.result {
                    Ok(()) => eprintln!("    rolled back: {}", step.resource),
                    Err(e) => {
                        eprintln!("    {} {}: {}", "rollback failed:".red(), step.resource, e)
                    }
                }
            }
        }
    }
}

pub fn print_provision_report(report: &ProvisionReport) {
    eprintln!();
    print_branch("website", &report.website, |website| {
        format!("bucket {}", website.bucket)
    });
    print_branch("uploads", &report.uploads, |uploads| {
        format!(
            "bucket {}, identity pool {} ({}), role {}",
            uploads.bucket, uploads.identity_pool_name, uploads.identity_pool_id, uploads.role_name
        )
    });
    eprintln!();

    if report.uploads.is_success() {
        eprintln!(
            "You still need to register the upload component and add it to your \
             configuration to start logging:"
        );
        eprintln!("{}", REGISTER_SNIPPET.yellow());
    }

    if let Ok(website) = &report.website.outcome {
        eprintln!(
            "You can now deploy to s3 by running {}.",
            "npm run deploy".blue()
        );
        eprintln!(
            "Your experiment will be accessible from {}.",
            website.website_url.green()
        );
    }

    if let Ok(uploads) = &report.uploads.outcome {
        eprintln!(
            "You can view completed logs at {}.",
            console_url(&uploads.bucket).green()
        );
        eprintln!(
            "Or download them by running {}.",
            "npm run sync-data".blue()
        );
    }

    if report.is_success() {
        eprintln!("For deploying and downloading logs you must first install the aws-cli.");
    }
}

fn print_group(group: ResourceGroup, outcome: &GroupOutcome) {
    match outcome {
        GroupOutcome::Declined => {
            eprintln!("{} {}: not confirmed", "SKIPPED".yellow().bold(), group);
        }
        GroupOutcome::Attempted(steps) => {
            for step in steps {
                let status = match &step.outcome {
                    StepOutcome::Completed => "OK".green().bold(),
                    StepOutcome::Failed(_) => "FAILED".red().bold(),
                    StepOutcome::Skipped => "SKIPPED".yellow().bold(),
                };
                match &step.outcome {
                    StepOutcome::Failed(e) => {
                        eprintln!("{} {} {}: {}", status, step.action, step.resource, e);
                    }
                    _ => eprintln!("{} {} {}", status, step.action, step.resource),
                }
            }
        }
    }
}

pub fn print_decommission_report(report: &DecommissionReport) {
    eprintln!();
    print_group(ResourceGroup::Uploads, &report.uploads);
    print_group(ResourceGroup::Website, &report.website);
    eprintln!();
    if report.is_success() {
        eprintln!("Cleanup complete.");
    } else {
        eprintln!(
            "{}",
            "Cleanup finished with failures; the resources above may need manual removal.".red()
        );
    }
}
