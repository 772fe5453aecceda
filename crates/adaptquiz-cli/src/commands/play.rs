//! The `adaptquiz play` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use adaptquiz_core::config::load_config_from;
use adaptquiz_core::session::SessionSnapshot;
use adaptquiz_core::{Session, SessionStatus};
use adaptquiz_runtime::{run_session, Command};

pub async fn execute(
    bank_path: PathBuf,
    category: String,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let budget = config.timer_budget_secs;
    let bank = super::load_bank(&bank_path)?;

    let mut session = match seed {
        Some(seed) => Session::seeded(bank, config, seed),
        None => Session::new(bank, config),
    };
    session.start(&category)?;
    println!(
        "{} question(s), {budget}s each. Type an option id to answer, 'h' for a hint, \
         Enter or 'n' for the next question, 'q' to quit.",
        session.total_questions()
    );

    let (tx, rx) = mpsc::channel(16);
    let driver = tokio::spawn(async move { run_session(&mut session, rx).await });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = 0;

    while let Some(snap) = snapshot(&tx).await {
        if snap.status != SessionStatus::InProgress {
            break;
        }
        if snap.question_number != shown {
            shown = snap.question_number;
            print_question(&snap);
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let Some(now) = snapshot(&tx).await else {
            break;
        };
        if now.question_number != shown {
            println!("Time's up!");
            continue;
        }

        match line.trim() {
            "q" => {
                let _ = tx.send(Command::End).await;
                break;
            }
            "h" => {
                let (reply, hint) = oneshot::channel();
                if tx.send(Command::Hint(reply)).await.is_err() {
                    break;
                }
                match hint.await.ok().flatten() {
                    Some(hint) => println!("Hint: {hint}"),
                    None => println!("No hint available for this question."),
                }
            }
            "" | "n" => {
                if tx.send(Command::Advance).await.is_err() {
                    break;
                }
            }
            option_id => {
                if now.selected_answer.is_some() {
                    println!("Already answered. Press Enter for the next question.");
                    continue;
                }
                if tx.send(Command::Answer(option_id.to_string())).await.is_err() {
                    break;
                }
                if let Some(after) = snapshot(&tx).await {
                    print_feedback(&now, &after);
                }
            }
        }
    }

    drop(tx);
    let summary = driver.await.context("session driver failed")?;
    match summary {
        Some(summary) => super::print_summary(&summary),
        None => println!("Session ended without a summary."),
    }

    Ok(())
}

async fn snapshot(tx: &mpsc::Sender<Command>) -> Option<SessionSnapshot> {
    let (reply, rx) = oneshot::channel();
    tx.send(Command::Snapshot(reply)).await.ok()?;
    rx.await.ok()
}

fn print_question(snap: &SessionSnapshot) {
    let Some(question) = &snap.question else {
        return;
    };
    println!(
        "\nQuestion {} of {} [{} | {}] XP {} | streak {}",
        snap.question_number,
        snap.total_questions,
        question.category,
        question.difficulty.label(),
        snap.xp,
        snap.streak
    );
    println!("{}", question.text);
    if let Some(url) = &question.image_url {
        println!("(image: {url})");
    }
    for option in &question.options {
        println!("  {}) {}", option.id, option.text);
    }
}

fn print_feedback(before: &SessionSnapshot, after: &SessionSnapshot) {
    let (Some(question), Some(selected)) = (&after.question, &after.selected_answer) else {
        println!("Unknown option.");
        return;
    };
    if question.is_correct(selected) {
        println!("Correct! +{} XP", after.xp.saturating_sub(before.xp));
    } else {
        let answer = question
            .correct_option()
            .map(|o| o.text.as_str())
            .unwrap_or_default();
        println!("Incorrect. The answer was: {answer}");
    }
    if !question.explanation.is_empty() {
        println!("{}", question.explanation);
    }
    println!("Press Enter for the next question.");
}
