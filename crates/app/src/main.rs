use std::fmt;

use deen_core::Clock;
use deen_core::model::{Category, LessonId, QuizResult};
use services::{AppServices, ContentLoader, ContentSource, ProgressEvent, ShareService};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingOperand { name: &'static str },
    InvalidNumber { name: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    UnknownCategory(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingOperand { name } => write!(f, "missing operand: <{name}>"),
            ArgsError::InvalidNumber { name, raw } => {
                write!(f, "invalid {name} value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::UnknownCategory(raw) => write!(f, "unknown category: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  teendeen stats                                  show progress stats");
    eprintln!("  teendeen complete <lesson-id> <score> <total>   record a quiz attempt");
    eprintln!("  teendeen quest [--done]                         show (or finish) today's quest");
    eprintln!("  teendeen lessons [--search <q>] [--category <c>]");
    eprintln!("  teendeen share [--site-url <url>]               print the share message");
    eprintln!("  teendeen validate [--manifest <path>]           check a lesson manifest");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>       default sqlite://teendeen.sqlite3");
    eprintln!("  --lessons <path|url>    default data/lessons.json");
    eprintln!("  --quests <path|url>     default data/quests.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TEEN_DEEN_DB_URL, TEEN_DEEN_LESSONS, TEEN_DEEN_QUESTS");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stats,
    Complete,
    Quest,
    Lessons,
    Share,
    Validate,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stats" => Some(Self::Stats),
            "complete" => Some(Self::Complete),
            "quest" => Some(Self::Quest),
            "lessons" => Some(Self::Lessons),
            "share" => Some(Self::Share),
            "validate" => Some(Self::Validate),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    lessons_source: ContentSource,
    quests_source: ContentSource,
    // complete
    lesson_id: Option<LessonId>,
    score: Option<u32>,
    total: Option<u32>,
    // quest
    quest_done: bool,
    // lessons
    search: String,
    category: Category,
    // share
    site_url: String,
    // validate
    manifest_path: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TEEN_DEEN_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://teendeen.sqlite3".into(), normalize_sqlite_url);
        let mut lessons_raw = std::env::var("TEEN_DEEN_LESSONS")
            .unwrap_or_else(|_| "data/lessons.json".into());
        let mut quests_raw =
            std::env::var("TEEN_DEEN_QUESTS").unwrap_or_else(|_| "data/quests.json".into());

        let mut positionals: Vec<String> = Vec::new();
        let mut quest_done = false;
        let mut search = String::new();
        let mut category = Category::All;
        let mut site_url = "https://teendeen.app".to_owned();
        let mut manifest_path = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--lessons" => lessons_raw = require_value(args, "--lessons")?,
                "--quests" => quests_raw = require_value(args, "--quests")?,
                "--done" => quest_done = true,
                "--search" => search = require_value(args, "--search")?,
                "--category" => {
                    let value = require_value(args, "--category")?;
                    category = Category::parse(&value)
                        .ok_or(ArgsError::UnknownCategory(value))?;
                }
                "--site-url" => site_url = require_value(args, "--site-url")?,
                "--manifest" => manifest_path = Some(require_value(args, "--manifest")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        let mut positionals = positionals.into_iter();
        let lesson_id = positionals.next().map(LessonId::new);
        let score = positionals
            .next()
            .map(|raw| parse_number("score", &raw))
            .transpose()?;
        let total = positionals
            .next()
            .map(|raw| parse_number("total", &raw))
            .transpose()?;
        if let Some(extra) = positionals.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self {
            db_url,
            lessons_source: ContentSource::parse(&lessons_raw),
            quests_source: ContentSource::parse(&quests_raw),
            lesson_id,
            score,
            total,
            quest_done,
            search,
            category,
            site_url,
            manifest_path,
        })
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<u32, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidNumber {
        name,
        raw: raw.to_owned(),
    })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Print awards as the engines emit them, so a `complete` run shows what
/// it earned.
fn subscribe_printer(services: &AppServices) {
    services.hub().subscribe(|event| match event {
        ProgressEvent::XpGained {
            amount,
            total,
            reason,
        } => println!("+{amount} XP ({reason}) - total {total}"),
        ProgressEvent::StreakUpdated { current, best } => {
            println!("🔥 Streak: {current} day(s), best {best}");
        }
        ProgressEvent::BadgeEarned(badge) => {
            println!("{} Badge earned: {} - {}", badge.icon, badge.name, badge.description);
        }
        ProgressEvent::QuestCompleted { quest_id } => {
            println!("✓ Quest completed: {quest_id}");
        }
    });
}

fn print_stats(services: &AppServices) {
    let stats = services.progress().stats();
    println!("Lessons completed: {}", stats.completed_count);
    println!("XP: {} (level {})", stats.xp, stats.level);
    println!(
        "Streak: {} day(s), best {}",
        stats.streak_current, stats.streak_best
    );
    if stats.badges.is_empty() {
        println!("Badges: none yet");
    } else {
        println!("Badges:");
        for badge in &stats.badges {
            println!("  {} {} - {}", badge.icon, badge.name, badge.description);
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    argv.remove(0);

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // `validate` needs no storage at all; handle it before opening the db.
    if cmd == Command::Validate {
        let source = args
            .manifest_path
            .as_deref()
            .map_or_else(|| args.lessons_source.clone(), ContentSource::parse);
        let manifest = ContentLoader::new().manifest(&source).await?;
        println!(
            "manifest ok: version {}, {} lesson(s)",
            manifest.version,
            manifest.lessons.len()
        );
        return Ok(());
    }

    prepare_sqlite_file(&args.db_url)?;
    let mut services = AppServices::new_sqlite(
        &args.db_url,
        Clock::default_clock(),
        &args.lessons_source,
        &args.quests_source,
    )
    .await?;
    subscribe_printer(&services);

    match cmd {
        Command::Stats => print_stats(&services),
        Command::Complete => {
            let lesson_id = args
                .lesson_id
                .ok_or(ArgsError::MissingOperand { name: "lesson-id" })?;
            let score = args.score.ok_or(ArgsError::MissingOperand { name: "score" })?;
            let total = args.total.ok_or(ArgsError::MissingOperand { name: "total" })?;

            if services.lessons().find(&lesson_id).is_none() {
                eprintln!("warning: {lesson_id} is not in the manifest");
            }

            // record the attempt the way the quiz page does, then report it
            let result = QuizResult::new(score, total, Clock::default_clock().now())?;
            services
                .storage()
                .scores
                .record(&lesson_id, &result)
                .await?;
            let outcome = services
                .progress_mut()
                .complete_lesson(&lesson_id, score, total)
                .await;

            if outcome.newly_completed {
                println!("{lesson_id} completed for the first time");
            }
            println!(
                "result: {score}/{total} - {}",
                if outcome.perfect {
                    "perfect!"
                } else if outcome.passed {
                    "passed"
                } else {
                    "not passed"
                }
            );
            print_stats(&services);
        }
        Command::Quest => {
            let Some(quest) = services.quests().todays_quest().cloned() else {
                println!("No quests configured.");
                return Ok(());
            };
            let done = services.quests().is_completed_today(&quest.id);
            println!("🎯 Today's Deen Quest: {}", quest.text);
            println!("   [{}] {}", if done { "x" } else { " " }, quest.id);

            if args.quest_done && !done {
                services.quests_mut().mark_completed(&quest.id).await;
            } else if args.quest_done {
                println!("Already completed today.");
            }
        }
        Command::Lessons => {
            let completed: Vec<LessonId> =
                services.progress().record().completed_lessons().to_vec();
            let lessons = services.lessons().browse(&args.search, args.category);
            if lessons.is_empty() {
                println!("No lessons found.");
            }
            for lesson in lessons {
                let mark = if completed.contains(&lesson.id) { "✓" } else { " " };
                println!(
                    "{mark} {:>2}. {} ({} min) - {}",
                    lesson.number,
                    lesson.title,
                    lesson.minutes,
                    lesson.tags.join(", ")
                );
            }
        }
        Command::Share => match services.share().summary().await? {
            Some(summary) => {
                println!("{}", ShareService::message(&summary, &args.site_url));
            }
            None => println!("No quiz results yet - finish a lesson quiz first."),
        },
        Command::Validate => unreachable!("handled above"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
