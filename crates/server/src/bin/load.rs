//! Fires N concurrent errand-creation requests and reports the outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use errandlink_core::{observer_for, Answer, AttachmentRecord, ClientConfig, ErrandClient, Message};

/// Request count above which `--insane` is needed.
const MAX_SAFE_REQUESTS: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "errandlink-load", version, about = "Create errands concurrently against a backend")]
struct Args {
    /// Backend base URL
    #[arg(short = 'e', long, env = "ERRANDLINK_CLIENT__ENDPOINT")]
    endpoint: String,

    /// Bearer token
    #[arg(short = 't', long, env = "ERRANDLINK_CLIENT__TOKEN", hide_env_values = true)]
    token: String,

    /// Number of concurrent requests
    #[arg(short = 'c', long, default_value_t = 1)]
    concurrent: usize,

    /// Attach two small text files to every errand
    #[arg(short = 'a', long)]
    attachments: bool,

    /// Allow more than 50 requests
    #[arg(long)]
    insane: bool,

    /// Close created errands as this user id (-1 closes them as the system)
    #[arg(short = 'u', long, allow_negative_numbers = true)]
    close_user: Option<i64>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Log request and response bodies
    #[arg(long)]
    dump_wire: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Args::parse()).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let started = Instant::now();
    let total = if args.insane {
        args.concurrent
    } else {
        args.concurrent.min(MAX_SAFE_REQUESTS)
    };
    if total < args.concurrent {
        warn!(
            "Capping {} requests to {} (use --insane to lift the cap)",
            args.concurrent, total
        );
    }

    let config = ClientConfig {
        endpoint: args.endpoint.clone(),
        token: args.token.clone(),
        timeout_secs: args.timeout_secs,
        dump_wire: args.dump_wire,
    };
    let client = Arc::new(
        ErrandClient::new(&config)
            .context("Failed to create errand client")?
            .with_observer(observer_for(args.dump_wire)),
    );

    let mut tasks = JoinSet::new();
    for i in 1..=total {
        let client = Arc::clone(&client);
        let message = build_message(i, args.attachments)?;
        let answer = args.close_user.map(build_answer);
        tasks.spawn(async move {
            match client.create_errand(&message, answer.as_ref()).await {
                Ok(created) => {
                    info!("Rq #{} created errand {} ({})", i, created.id, created.resource_type);
                    true
                }
                Err(e) => {
                    error!("Rq #{} failed: {}", i, e);
                    false
                }
            }
        });
    }

    let deadline = overall_deadline(total);
    let (mut success, mut failed) = (0usize, 0usize);
    let collected = tokio::time::timeout(deadline, async {
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => success += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    error!("Request task aborted: {}", e);
                    failed += 1;
                }
            }
        }
    })
    .await;
    if collected.is_err() {
        warn!("Deadline of {:?} reached, abandoning outstanding requests", deadline);
        failed = total - success;
    }

    println!("Total #{}. Success #{}. Failed #{}", total, success, failed);
    println!("Total time passed: {:.3}", started.elapsed().as_secs_f64());
    Ok(())
}

/// One minute per request, never less than one minute.
fn overall_deadline(total: usize) -> Duration {
    let requests = u64::try_from(total.max(1)).unwrap_or(u64::MAX);
    Duration::from_secs(requests.saturating_mul(60))
}

fn build_message(i: usize, with_attachments: bool) -> Result<Message> {
    let now = Utc::now();
    let mut message = Message {
        message_id: format!("msgid_{}_{}", i, now.timestamp()),
        name: "Load Test".to_string(),
        from: format!("load.test.{}@example.com", i),
        subject: format!("Creating test errand via API #{}", i),
        body: format!("#{} Test message body at {}", i, now.to_rfc2822()),
        ..Message::default()
    };
    if with_attachments {
        message.attachments = vec![
            AttachmentRecord::from_reader(
                format!("tst1_{}.txt", i),
                "text/plain",
                &b"Apple Pen Pineapple Pen"[..],
            )?,
            AttachmentRecord::from_reader(format!("tst2_{}.txt", i), "text/plain", &b"Orange Juice!"[..])?,
        ];
    }
    Ok(message)
}

fn build_answer(user: i64) -> Answer {
    let subject = "This is subject for ANSWER";
    let body = "This is plain answer text";
    if user >= 0 {
        Answer::closed_by_user(subject, body, user.to_string())
    } else {
        Answer::closed_by_system(subject, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_short_flags() {
        let args = Args::try_parse_from([
            "errandlink-load", "-e", "http://h", "-t", "tok", "-c", "80", "-a", "-u", "-1",
        ])
        .unwrap();
        assert_eq!(args.endpoint, "http://h");
        assert_eq!(args.concurrent, 80);
        assert!(args.attachments);
        assert!(!args.insane);
        assert_eq!(args.close_user, Some(-1));
    }

    #[test]
    fn test_build_message_with_attachments() {
        let message = build_message(3, true).unwrap();
        assert!(message.message_id.starts_with("msgid_3_"));
        assert_eq!(message.attachments.len(), 2);
        assert_eq!(message.attachments[1].content().unwrap(), b"Orange Juice!");
        assert!(build_message(3, false).unwrap().attachments.is_empty());
    }

    #[test]
    fn test_overall_deadline() {
        assert_eq!(overall_deadline(0), Duration::from_secs(60));
        assert_eq!(overall_deadline(3), Duration::from_secs(180));
        assert_eq!(overall_deadline(usize::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_build_answer() {
        assert_eq!(build_answer(7).user_id.as_deref(), Some("7"));
        assert_eq!(build_answer(7).user_type.as_deref(), Some("CENTION"));
        assert_eq!(build_answer(-1).user_id, None);
    }
}
