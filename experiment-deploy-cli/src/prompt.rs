//! Terminal confirmation for destructive groups.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use experiment_deploy_core::{Confirmer, ResourceGroup};

pub struct TerminalConfirmer {
    assume_yes: bool,
}

impl TerminalConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, group: ResourceGroup) -> bool {
        eprintln!("{}", group.warning().red().bold());

        if self.assume_yes {
            eprintln!("Confirmed with --yes.");
            return true;
        }

        // never block on a pipe or a closed stdin
        if !atty::is(atty::Stream::Stdin) {
            let message = format!(
                "Not confirmed: stdin is not a terminal. Skipping the {group} resources; \
                 run interactively or pass --yes."
            );
            eprintln!("{}", message.yellow());
            return false;
        }

        eprint!("Continue? [y/N] ");
        let _ = io::stderr().flush();

        // the prompt is asked from inside the async decommission on a runtime worker
        tokio::task::block_in_place(read_answer)
    }
}

fn read_answer() -> bool {
    let mut answer = String::new();
    let read = io::stdin().lock().read_line(&mut answer);
    read.is_ok() && is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
