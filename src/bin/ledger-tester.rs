//! Ledger Tester CLI Tool
//!
//! Interactive command-line tool for driving the rating book through the
//! call dispatcher, the way the host entry points would.
//!
//! Usage:
//!   cargo run --bin ledger-tester -- --help
//!   cargo run --bin ledger-tester add --sender alice.test --course course-1 --rate 4 --message "great"
//!   cargo run --bin ledger-tester call --sender alice.test --request '{"method":"listWrite","args":null,"timestamp":"2024-01-01T00:00:00Z"}'
//!   cargo run --bin ledger-tester run-scenario --scenario update-in-place
//!   cargo run --bin ledger-tester run-all-scenarios

use anyhow::Result;
use clap::{Parser, Subcommand};
use course_ledger::host::calls::{
    CallRequest, ADD_RATING_METHOD, CONVERT_DATA_METHOD, GET_AVERAGE_RATING_METHOD,
    GET_USER_RATING_METHOD, HAS_USER_RATED_METHOD, LIST_WRITE_METHOD,
};
use course_ledger::host::context::{AnonymousCallContext, StaticCallContext};
use course_ledger::host::dispatch::{CallDispatcher, CallHandler};
use course_ledger::metrics::MetricsCollector;
use course_ledger::store::book::RatingBook;
use course_ledger::store::ledger::InMemoryLedger;
use serde_json::json;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ledger-tester")]
#[command(about = "Interactive testing tool for the course-ledger call dispatch")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit or update a rating as the given sender
    Add {
        /// Sender principal the host attests
        #[arg(short, long)]
        sender: String,
        /// Course ID
        #[arg(short, long)]
        course: String,
        /// Rating value (truncated to an integer)
        #[arg(short, long)]
        rate: f64,
        /// Optional message
        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// Check whether a sender has rated a course
    HasRated {
        #[arg(short, long)]
        course: String,
        #[arg(short, long)]
        sender: String,
    },
    /// List all ratings for a course
    List {
        #[arg(short, long)]
        course: String,
    },
    /// Compute the average rating for a course
    Average {
        #[arg(short, long)]
        course: String,
    },
    /// Look up one sender's rating for a course
    Get {
        #[arg(short, long)]
        course: String,
        #[arg(short, long)]
        sender: String,
    },
    /// Dump the full rating sequence
    Dump,
    /// Dispatch a raw JSON-encoded call request
    Call {
        /// Sender principal (omit for anonymous queries)
        #[arg(long)]
        sender: Option<String>,
        /// JSON-encoded CallRequest
        #[arg(long)]
        request: String,
    },
    /// Run a predefined test scenario
    RunScenario {
        /// Scenario name (update-in-place, course-average, multi-course)
        #[arg(short, long)]
        scenario: String,
    },
    /// Run all test scenarios
    RunAllScenarios,
}

/// In-process test system: one book, dispatchers bound per sender
struct LedgerTester {
    book: Arc<RatingBook>,
    metrics: Arc<MetricsCollector>,
}

impl LedgerTester {
    fn new() -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        let book = Arc::new(RatingBook::new(Arc::new(InMemoryLedger::default())));
        Ok(Self { book, metrics })
    }

    fn dispatcher_for(&self, sender: &str) -> CallDispatcher {
        CallDispatcher::new(
            self.book.clone(),
            Arc::new(StaticCallContext::new(sender)),
            self.metrics.clone(),
        )
    }

    fn anonymous_dispatcher(&self) -> CallDispatcher {
        CallDispatcher::new(
            self.book.clone(),
            Arc::new(AnonymousCallContext),
            self.metrics.clone(),
        )
    }

    async fn dispatch(&self, sender: Option<&str>, request: CallRequest) -> Result<()> {
        let reply = match sender {
            Some(sender) => self.dispatcher_for(sender).handle_call(request).await?,
            None => self.anonymous_dispatcher().handle_call(request).await?,
        };

        match reply.result() {
            Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
            None => println!("{}", serde_json::to_string_pretty(&reply)?),
        }
        Ok(())
    }
}

/// Predefined scenarios exercising the documented call behavior
struct TestScenarios;

impl TestScenarios {
    /// Submit then update the same (sender, course) pair
    async fn update_in_place(tester: &LedgerTester) -> Result<bool> {
        let alice = tester.dispatcher_for("alice.test");

        let first = alice
            .handle_call(CallRequest::new(
                ADD_RATING_METHOD,
                json!({"courseId": "course-1", "rate": 4.0, "message": "great"}),
            ))
            .await?;
        let second = alice
            .handle_call(CallRequest::new(
                ADD_RATING_METHOD,
                json!({"courseId": "course-1", "rate": 5.0, "message": "even better"}),
            ))
            .await?;
        let average = alice
            .handle_call(CallRequest::new(
                GET_AVERAGE_RATING_METHOD,
                json!({"courseId": "course-1"}),
            ))
            .await?;

        let ok = first.result() == Some(&json!("Rating submitted successfully."))
            && second.result() == Some(&json!("Rating updated successfully."))
            && average.result() == Some(&json!(5.0));
        Ok(ok)
    }

    /// Average over several raters
    async fn course_average(tester: &LedgerTester) -> Result<bool> {
        for (sender, rate) in [("alice.test", 3.0), ("bob.test", 5.0)] {
            tester
                .dispatcher_for(sender)
                .handle_call(CallRequest::new(
                    ADD_RATING_METHOD,
                    json!({"courseId": "course-1", "rate": rate}),
                ))
                .await?;
        }

        let average = tester
            .anonymous_dispatcher()
            .handle_call(CallRequest::new(
                GET_AVERAGE_RATING_METHOD,
                json!({"courseId": "course-1"}),
            ))
            .await?;

        Ok(average.result() == Some(&json!(4.0)))
    }

    /// Per-course filtering across several courses
    async fn multi_course(tester: &LedgerTester) -> Result<bool> {
        let alice = tester.dispatcher_for("alice.test");
        for (course, rate) in [("course-1", 4.0), ("course-2", 2.0)] {
            alice
                .handle_call(CallRequest::new(
                    ADD_RATING_METHOD,
                    json!({"courseId": course, "rate": rate}),
                ))
                .await?;
        }

        let listing = tester
            .anonymous_dispatcher()
            .handle_call(CallRequest::new(
                CONVERT_DATA_METHOD,
                json!({"courseId": "course-1"}),
            ))
            .await?;

        let count = listing
            .result()
            .and_then(|r| r.as_array())
            .map(|records| records.len())
            .unwrap_or(0);
        Ok(count == 1)
    }
}

async fn run_scenario(tester: &LedgerTester, name: &str) -> Result<bool> {
    match name {
        "update-in-place" => TestScenarios::update_in_place(tester).await,
        "course-average" => TestScenarios::course_average(tester).await,
        "multi-course" => TestScenarios::multi_course(tester).await,
        _ => Err(anyhow::anyhow!(
            "Unknown scenario '{}'. Available: update-in-place, course-average, multi-course",
            name
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let tester = LedgerTester::new()?;

    match cli.command {
        Commands::Add {
            sender,
            course,
            rate,
            message,
        } => {
            tester
                .dispatch(
                    Some(&sender),
                    CallRequest::new(
                        ADD_RATING_METHOD,
                        json!({"courseId": course, "rate": rate, "message": message}),
                    ),
                )
                .await?;
        }

        Commands::HasRated { course, sender } => {
            tester
                .dispatch(
                    None,
                    CallRequest::new(
                        HAS_USER_RATED_METHOD,
                        json!({"courseId": course, "sender": sender}),
                    ),
                )
                .await?;
        }

        Commands::List { course } => {
            tester
                .dispatch(
                    None,
                    CallRequest::new(CONVERT_DATA_METHOD, json!({"courseId": course})),
                )
                .await?;
        }

        Commands::Average { course } => {
            tester
                .dispatch(
                    None,
                    CallRequest::new(GET_AVERAGE_RATING_METHOD, json!({"courseId": course})),
                )
                .await?;
        }

        Commands::Get { course, sender } => {
            tester
                .dispatch(
                    None,
                    CallRequest::new(
                        GET_USER_RATING_METHOD,
                        json!({"courseId": course, "sender": sender}),
                    ),
                )
                .await?;
        }

        Commands::Dump => {
            tester
                .dispatch(None, CallRequest::new(LIST_WRITE_METHOD, json!(null)))
                .await?;
        }

        Commands::Call { sender, request } => {
            let request: CallRequest = serde_json::from_str(&request)?;
            tester.dispatch(sender.as_deref(), request).await?;
        }

        Commands::RunScenario { scenario } => {
            println!("Running scenario: {}", scenario);
            match run_scenario(&tester, &scenario).await {
                Ok(true) => println!("Scenario completed successfully"),
                Ok(false) => {
                    println!("Scenario failed");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error running scenario: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::RunAllScenarios => {
            let scenarios = ["update-in-place", "course-average", "multi-course"];

            let mut passed = 0;
            let mut failed = 0;

            println!("Running all test scenarios...\n");

            for name in scenarios {
                // Fresh state per scenario
                let tester = LedgerTester::new()?;

                print!("Running '{}' scenario... ", name);
                match run_scenario(&tester, name).await {
                    Ok(true) => {
                        println!("PASSED");
                        passed += 1;
                    }
                    Ok(false) => {
                        println!("FAILED");
                        failed += 1;
                    }
                    Err(e) => {
                        println!("FAILED ({})", e);
                        failed += 1;
                    }
                }
            }

            println!("\nResults: {} passed, {} failed", passed, failed);
            if failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
