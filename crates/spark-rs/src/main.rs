//! `spark`: English practice and mock interviews from the terminal.

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use spark_rs::config::{SparkConfig, UploadsConfig};
use spark_rs::core::{
    AiSettingsPatch, AnswerOutcome, AppAction, ConversationService, InterviewFlow,
    InterviewService, SparkCoreError,
};
use spark_rs::files::FileProcessor;
use spark_rs::protocol::{
    ConversationMode, Difficulty, InterviewReport, InterviewSession, InterviewStatus, Message,
    MessageKind,
};
use spark_rs::{chat_client, init_logging, open_store, provider_registry};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Command-line options for the Spark client.
#[derive(Parser)]
#[command(name = "spark", version)]
struct Cli {
    /// Optional path to a spark.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Practice conversation with corrections and scores
    Practice(ChatArgs),
    /// Free conversation
    General(ChatArgs),
    /// Timed mock interview ending in a report
    Interview(InterviewArgs),
    /// Run the local chat proxy
    Serve {
        /// Address to bind, overriding the config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Inspect or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Args)]
struct ChatArgs {
    /// Documents to discuss (pdf, txt, doc, images)
    #[arg(long = "context")]
    context: Vec<PathBuf>,
    /// Resume to bring into the conversation
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Ask practice replies for a JSON envelope
    #[arg(long)]
    structured: bool,
}

#[derive(Args)]
struct InterviewArgs {
    /// Role slug, e.g. software-engineer
    #[arg(long)]
    role: String,
    /// Free-text role overriding the slug
    #[arg(long)]
    custom_role: Option<String>,
    /// easy, medium or hard
    #[arg(long, default_value = "medium")]
    difficulty: String,
    /// Resume file
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Minutes before the interview ends on its own
    #[arg(long)]
    time_limit: Option<u32>,
    /// Topic to stress
    #[arg(long)]
    focus: Option<String>,
    /// Extra context for question generation
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print current settings with the key masked
    Show,
    /// Switch provider; the model resets to the provider's first model
    SetProvider { provider: String },
    SetKey { key: String },
    SetModel { model: String },
}

type InputLines = Lines<BufReader<Stdin>>;

/// Entry point for the Spark CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Practice(args) => run_chat(&config, ConversationMode::Practice, args).await,
        Command::General(args) => run_chat(&config, ConversationMode::General, args).await,
        Command::Interview(args) => run_interview(&config, args).await,
        Command::Serve { bind } => {
            let mut proxy = config.proxy.clone();
            if let Some(bind) = bind {
                proxy.bind = bind;
            }
            spark_rs::server::serve(&proxy)
                .await
                .context("proxy server failed")
        }
        Command::Settings { action } => run_settings(&config, action),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SparkConfig> {
    if let Some(path) = path {
        return SparkConfig::load_from_path(path).context("failed to load config");
    }
    let cwd = std::env::current_dir().context("cwd")?;
    let layered = SparkConfig::load_layered(&cwd).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Read every file, report rejects one by one, and join the accepted text.
fn read_documents(uploads: &UploadsConfig, paths: &[PathBuf]) -> anyhow::Result<Option<String>> {
    if paths.is_empty() {
        return Ok(None);
    }
    let results = FileProcessor::new(uploads.clone()).process_batch(paths)?;
    let mut texts = Vec::new();
    for result in results {
        match result {
            Ok(file) => {
                println!("Attached {} ({} bytes)", file.name, file.size);
                texts.push(file.content);
            }
            Err(err) => eprintln!("Skipped: {err}"),
        }
    }
    Ok((!texts.is_empty()).then(|| texts.join("\n\n")))
}

async fn run_chat(
    config: &SparkConfig,
    mode: ConversationMode,
    args: ChatArgs,
) -> anyhow::Result<()> {
    let store = open_store(config);
    let client = chat_client(config, &store.settings().ai).map_err(|err| {
        anyhow::anyhow!(SparkCoreError::from(err).user_message())
    })?;
    let service = ConversationService::new(store, client).with_structured_replies(args.structured);
    service.set_context(read_documents(&config.uploads, &args.context)?);
    if let Some(path) = args.resume.as_ref() {
        let resume = FileProcessor::new(config.uploads.clone())
            .process_path(path)
            .context("resume rejected")?;
        println!("Attached resume {}", resume.name);
        service.set_resume(Some(resume.content));
    }

    let session_id = service.start(mode, None);
    println!("Started a {mode} session. Type /quit to finish.");
    let mut lines = stdin_lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        match service.send(session_id, line, MessageKind::Text).await {
            Ok(reply) => print_reply(&reply),
            Err(err) => eprintln!("{}", err.user_message()),
        }
    }
    service.end(session_id);

    if let Some(session) = service.store().session(session_id) {
        println!(
            "Session over: {} messages, {} corrections, average score {:.1}, {} min.",
            session.stats.total_messages,
            session.stats.corrections,
            session.stats.average_score,
            session.stats.duration_minutes
        );
    }
    Ok(())
}

fn print_reply(reply: &Message) {
    println!("\n{}", reply.content);
    let Some(meta) = reply.metadata.as_ref() else {
        return;
    };
    for correction in meta.corrections.iter().flatten() {
        println!("  correction: {correction}");
    }
    if let Some(score) = meta.score {
        println!("  score: {score}/10");
    }
    for suggestion in meta.suggestions.iter().flatten() {
        println!("  suggestion: {}", suggestion.trim());
    }
    println!();
}

async fn run_interview(config: &SparkConfig, args: InterviewArgs) -> anyhow::Result<()> {
    let store = open_store(config);
    let settings = store.settings().ai;
    let client = chat_client(config, &settings)
        .map_err(|err| anyhow::anyhow!(SparkCoreError::from(err).user_message()))?;
    let service = InterviewService::new(client)
        .with_question_count(config.interview.question_count)
        .with_settings(&settings);

    let time_limit = args
        .time_limit
        .unwrap_or(config.interview.time_limit_minutes);
    let mut session = InterviewSession::new(
        args.role,
        Difficulty::parse(&args.difficulty),
        time_limit,
    );
    session.custom_role = args.custom_role;
    session.stress_field = args.focus;
    session.additional_context = args.notes;
    if let Some(path) = args.resume.as_ref() {
        let resume = FileProcessor::new(config.uploads.clone())
            .process_path(path)
            .context("resume rejected")?;
        session.resume = Some(resume);
    }

    let mut flow = InterviewFlow::new(session);
    println!("Preparing questions...");
    service
        .start(&mut flow, &settings, Utc::now())
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;
    println!(
        "Interview for {} started: {} questions, {} minutes. Commands: /pause /resume /end",
        flow.session().role_text(),
        flow.session().questions.len(),
        time_limit
    );

    let mut lines = stdin_lines();
    let mut asked: Option<String> = None;
    while matches!(
        flow.status(),
        InterviewStatus::Active | InterviewStatus::Paused
    ) {
        if flow.status() == InterviewStatus::Active
            && let Some(question) = flow.current_question()
            && asked.as_deref() != Some(question.id.as_str())
        {
            println!("\n[{}] {}", question.category, question.question);
            asked = Some(question.id.clone());
        }

        let Some(line) = next_answer(&mut flow, &mut lines).await? else {
            break;
        };
        let now = Utc::now();
        match line.trim() {
            "" => continue,
            "/pause" => report_error(flow.pause(now)),
            "/resume" => report_error(flow.resume(now)),
            "/end" => report_error(flow.end(now)),
            answer => match service.submit_answer(&mut flow, answer, now).await {
                Ok(AnswerOutcome::Next(_)) => {
                    if let Some(previous) = flow.session().answered_questions().last() {
                        println!(
                            "  score: {}/10  {}",
                            previous.score.unwrap_or_default(),
                            previous.feedback.as_deref().unwrap_or_default()
                        );
                    }
                }
                Ok(AnswerOutcome::Finished) => println!("That was the last question."),
                Err(err) => eprintln!("{}", err.user_message()),
            },
        }
    }
    if flow.status() != InterviewStatus::Completed {
        report_error(flow.end(Utc::now()));
    }

    println!("Building your report...");
    let report = service.report(&flow, Utc::now()).await;
    print_report(&report);
    Ok(())
}

/// Next input line, or `None` once input closes or the countdown runs out.
async fn next_answer(
    flow: &mut InterviewFlow,
    lines: &mut InputLines,
) -> anyhow::Result<Option<String>> {
    if flow.status() == InterviewStatus::Paused {
        return Ok(lines.next_line().await?);
    }
    let remaining = flow.remaining(Utc::now()).to_std().unwrap_or_default();
    match tokio::time::timeout(remaining, lines.next_line()).await {
        Ok(line) => Ok(line?),
        Err(_) => {
            info!("countdown elapsed (session_id={})", flow.session().id);
            flow.expire_if_due(Utc::now());
            println!("\nTime is up.");
            Ok(None)
        }
    }
}

fn report_error(outcome: Result<(), SparkCoreError>) {
    if let Err(err) = outcome {
        warn!("interview action rejected (err={})", err);
        eprintln!("{}", err.user_message());
    }
}

fn print_report(report: &InterviewReport) {
    let details = &report.interview_details;
    println!("\n=== Interview report ({}) ===", report.id);
    if let Some(name) = report.candidate.name.as_deref() {
        println!("Candidate: {name}");
    }
    println!(
        "Date {}  Duration {}  Signal {:?}",
        details.date, details.duration, details.signal_strength
    );
    println!(
        "Overall score: {}/100  Decision: {}",
        report.overall_score, report.hiring_decision
    );
    println!("\n{}", report.feedback);
    for (label, items) in [
        ("Strengths", &report.narrative.strengths),
        ("Weaknesses", &report.narrative.weaknesses),
        ("Recommendations", &report.narrative.recommendations),
    ] {
        if !items.is_empty() {
            println!("\n{label}:");
            for item in items {
                println!("  - {item}");
            }
        }
    }
    match serde_json::to_string_pretty(report) {
        Ok(json) => debug!("report json: {}", json),
        Err(err) => warn!("failed to encode report: {}", err),
    }
}

fn run_settings(config: &SparkConfig, action: SettingsCommand) -> anyhow::Result<()> {
    let store = open_store(config);
    match action {
        SettingsCommand::Show => {
            let mut settings = store.settings();
            settings.ai.api_key = mask(&settings.ai.api_key);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommand::SetProvider { provider } => {
            let mut ai = store.settings().ai;
            provider_registry(config)
                .select_provider(&mut ai, &provider)
                .with_context(|| format!("cannot select provider {provider}"))?;
            store.dispatch(AppAction::UpdateAiSettings(AiSettingsPatch {
                provider: Some(ai.provider),
                model: Some(ai.model.clone()),
                ..AiSettingsPatch::default()
            }));
            println!("Provider set to {provider} (model {}).", ai.model);
        }
        SettingsCommand::SetKey { key } => {
            if key.trim().is_empty() {
                bail!("API key must not be empty");
            }
            store.dispatch(AppAction::UpdateAiSettings(AiSettingsPatch {
                api_key: Some(key),
                ..AiSettingsPatch::default()
            }));
            println!("API key saved.");
        }
        SettingsCommand::SetModel { model } => {
            let registry = provider_registry(config);
            let provider = store.settings().ai.provider;
            if let Some(spec) = registry.get(&provider)
                && !spec.supports_model(&model)
            {
                warn!("model not in provider catalogue (provider={}, model={})", provider, model);
            }
            store.dispatch(AppAction::UpdateAiSettings(AiSettingsPatch {
                model: Some(model.clone()),
                ..AiSettingsPatch::default()
            }));
            println!("Model set to {model}.");
        }
    }
    Ok(())
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}
