use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use unscroll_core::blocker::session::SubmitOutcome;
use unscroll_core::challenge::{BreathingPhase, Challenge};
use unscroll_core::{
    BlockerRuntime, ChallengeKind, ChallengeResponse, ChallengeSession, Config, Database,
    SessionPhase,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run the challenge flow for a target in the terminal
    Run {
        /// Target identifier
        target: String,
        /// Pin the session to one challenge kind
        #[arg(long)]
        kind: Option<KindArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Math,
    Typing,
    Reflection,
    Memory,
    Word,
    Breathing,
}

impl From<KindArg> for ChallengeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Math => ChallengeKind::Math,
            KindArg::Typing => ChallengeKind::Typing,
            KindArg::Reflection => ChallengeKind::Reflection,
            KindArg::Memory => ChallengeKind::Memory,
            KindArg::Word => ChallengeKind::Word,
            KindArg::Breathing => ChallengeKind::Breathing,
        }
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let SessionAction::Run { target, kind } = action;

    let config = Config::load()?;
    let granted_minutes = config.access.duration_minutes;
    let runtime = Arc::new(BlockerRuntime::new(Database::open()?, config));

    let mut session = match kind {
        Some(kind) => ChallengeSession::start_of_kind(runtime, &target, kind.into())?,
        None => ChallengeSession::start(runtime, &target)?,
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    loop {
        if session.phase() == SessionPhase::WaitingOut {
            countdown(&session);
            rt.block_on(session.run_wait());
        }

        if let Some(error) = session.last_error() {
            println!("  {error}");
        }
        println!(
            "\n[attempt {} | difficulty {}]",
            session.attempt_count() + 1,
            session.challenge().difficulty()
        );

        let Some(response) = prompt_response(session.challenge())? else {
            continue;
        };

        match session.submit(&response)? {
            SubmitOutcome::Solved => {
                println!("correct! {granted_minutes} minutes of access granted.");
                return Ok(());
            }
            SubmitOutcome::Retry { wait_seconds: 0 } => {}
            SubmitOutcome::Retry { wait_seconds } => {
                println!("wrong. next challenge in {wait_seconds}s.");
            }
            SubmitOutcome::Ignored => {}
        }
    }
}

fn countdown(session: &ChallengeSession) {
    let mut remaining = session.wait_remaining_seconds();
    while remaining > 0 {
        print!("\rwait {remaining}s before the next challenge...  ");
        let _ = io::stdout().flush();
        thread::sleep(Duration::from_secs(1));
        remaining = session.wait_remaining_seconds();
    }
    println!();
}

/// Show the challenge and read a response. `None` means unusable input;
/// ask again without judging.
fn prompt_response(challenge: &Challenge) -> io::Result<Option<ChallengeResponse>> {
    match challenge {
        Challenge::Math(c) => {
            println!("solve: {}", c.display_text);
            let line = read_line(&format!("{} ", c.prompt))?;
            match line.trim().parse::<i64>() {
                Ok(answer) => Ok(Some(ChallengeResponse::Math { answer })),
                Err(_) => {
                    println!("enter a whole number");
                    Ok(None)
                }
            }
        }
        Challenge::Typing(c) => {
            println!("type exactly:\n  {}", c.text_to_type);
            let text = read_line("> ")?;
            Ok(Some(ChallengeResponse::Typing {
                text: text.trim_end_matches(['\n', '\r']).to_string(),
            }))
        }
        Challenge::Reflection(c) => {
            println!("{} (at least {} words)", c.prompt, c.minimum_words);
            let text = read_line("> ")?;
            Ok(Some(ChallengeResponse::Reflection {
                text: text.trim().to_string(),
            }))
        }
        Challenge::Memory(c) => {
            let shown = c
                .sequence
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            println!("memorize: {shown}");
            thread::sleep(Duration::from_millis(c.display_time_ms));
            // Scroll the sequence out of easy view.
            print!("{}", "\n".repeat(40));
            let line = read_line("enter the sequence (space-separated): ")?;
            let parsed: Result<Vec<usize>, _> =
                line.split_whitespace().map(str::parse).collect();
            match parsed {
                Ok(sequence) if sequence.len() == c.sequence.len() => {
                    Ok(Some(ChallengeResponse::Memory { sequence }))
                }
                _ => {
                    println!("enter {} numbers", c.sequence.len());
                    Ok(None)
                }
            }
        }
        Challenge::Word(c) => {
            println!("unscramble: {}", c.scrambled_word);
            let answer = read_line("> ")?;
            Ok(Some(ChallengeResponse::Word {
                answer: answer.trim().to_string(),
            }))
        }
        Challenge::Breathing(c) => {
            println!(
                "breathing exercise: {} cycles of {}-{}-{}",
                c.cycles, c.inhale_seconds, c.hold_seconds, c.exhale_seconds
            );
            for cycle in 1..=c.cycles {
                println!("cycle {cycle}/{}", c.cycles);
                breathe(BreathingPhase::Inhale, c.inhale_seconds);
                breathe(BreathingPhase::Hold, c.hold_seconds);
                breathe(BreathingPhase::Exhale, c.exhale_seconds);
            }
            Ok(Some(ChallengeResponse::BreathingComplete))
        }
    }
}

fn breathe(phase: BreathingPhase, seconds: u32) {
    let label = match phase {
        BreathingPhase::Inhale => "inhale",
        BreathingPhase::Hold => "hold",
        BreathingPhase::Exhale => "exhale",
        BreathingPhase::Complete => return,
    };
    for remaining in (1..=seconds).rev() {
        print!("\r  {label} {remaining}s  ");
        let _ = io::stdout().flush();
        thread::sleep(Duration::from_secs(1));
    }
    println!();
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
