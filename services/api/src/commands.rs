use crate::cli::CatalogArgs;
use crate::infra::load_service;
use chrono::{DateTime, Utc};
use clap::Args;
use soulscore::config::{AppConfig, ScoringConfig};
use soulscore::error::AppError;
use soulscore::scoring::{ScoreOutcome, ScoredResult};
use soulscore::{read_answers, AttemptImporter, AuxiliaryContext, CompositeProfile, Facet};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Quiz slug, e.g. love-language-receiving
    #[arg(long)]
    pub(crate) quiz: String,
    /// JSON file mapping question ids to option keys
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Print the raw outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Directory of quiz JSON files layered over the seeded catalog
    #[arg(long)]
    pub(crate) quiz_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ProfileArgs {
    /// CSV export of quiz attempts
    #[arg(long)]
    pub(crate) attempts: PathBuf,
    /// User whose attempts are aggregated
    #[arg(long)]
    pub(crate) user: String,
    /// Element supplied outside the quizzes; overrides the soul-connection element
    #[arg(long)]
    pub(crate) element: Option<String>,
    /// Print the profile as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Directory of quiz JSON files layered over the seeded catalog
    #[arg(long)]
    pub(crate) quiz_dir: Option<PathBuf>,
}

pub(crate) fn run_quizzes(args: CatalogArgs) -> Result<(), AppError> {
    let service = load_service(&scoring_config(args.quiz_dir)?)?;

    println!("Quiz catalog ({} quizzes)", service.catalog().len());
    for summary in service.quizzes() {
        println!(
            "- {} ({}): {} questions, {} required, {} mode, results: {}",
            summary.slug,
            summary.title,
            summary.question_count,
            summary.min_required,
            summary.resolution_mode.label(),
            summary.result_keys.join(", ")
        );
    }

    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        quiz,
        answers,
        json,
        quiz_dir,
    } = args;

    let service = load_service(&scoring_config(quiz_dir)?)?;
    let answers = read_answers(&answers)?;
    let outcome = service.score(&quiz, &answers)?;

    if json {
        let rendered = serde_json::to_string_pretty(&outcome).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    match &outcome {
        ScoreOutcome::Scored(result) => render_result(result),
        ScoreOutcome::Rejected(rejection) => println!("Not scored: {}", rejection.reason()),
    }

    Ok(())
}

pub(crate) fn run_profile(args: ProfileArgs) -> Result<(), AppError> {
    let ProfileArgs {
        attempts,
        user,
        element,
        json,
        quiz_dir,
    } = args;

    let service = load_service(&scoring_config(quiz_dir)?)?;
    let history = AttemptImporter::from_path(&attempts)?;
    let history = AttemptImporter::for_user(&history, &user);
    let context = AuxiliaryContext { element };
    let profile = service.profile_from_attempts(&history, &context);

    if json {
        let rendered = serde_json::to_string_pretty(&profile).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    let latest = describe_latest(history.iter().map(|attempt| attempt.created_at).max());
    println!(
        "Composite profile for {} ({} attempts, latest {})",
        user.trim(),
        history.len(),
        latest
    );
    render_profile(&profile);

    Ok(())
}

/// Environment scoring settings with `--quiz-dir` layered on top, as `serve` does.
fn scoring_config(quiz_dir: Option<PathBuf>) -> Result<ScoringConfig, AppError> {
    let config = AppConfig::load()?;
    Ok(with_quiz_dir(config.scoring, quiz_dir))
}

fn with_quiz_dir(mut config: ScoringConfig, quiz_dir: Option<PathBuf>) -> ScoringConfig {
    if let Some(dir) = quiz_dir {
        config.quiz_dir = Some(dir);
    }
    config
}

fn describe_latest(latest: Option<DateTime<Utc>>) -> String {
    latest
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn render_result(result: &ScoredResult) {
    println!("{} -> {}", result.quiz_slug, result.result_title);
    if !result.result_summary.is_empty() {
        println!("  {}", result.result_summary);
    }
    println!(
        "  Confidence {:.0}% ({} mode, settled by {:?})",
        result.confidence * 100.0,
        result.resolution_mode.label(),
        result.tie_break
    );
    println!("  Ranking:");
    for key in &result.order {
        let raw = result.totals_raw.get(key).copied().unwrap_or(0.0);
        let max = result.max_raw.get(key).copied().unwrap_or(0.0);
        let shown = result.result_totals.get(key).copied().unwrap_or(0.0);
        println!("    - {key}: {raw} of {max} (display {shown:.1})");
    }
    if let Some(axes) = &result.axes {
        println!("  Profile: {}", axes.summary);
    }
    if let Some(guidance) = &result.result_guidance {
        println!("  Guidance: {guidance}");
    }
}

fn render_profile(profile: &CompositeProfile) {
    println!("- Element: {}", profile.element.as_deref().unwrap_or("unknown"));
    println!("- Role: {}", facet_label(profile.role.as_ref()));
    println!("- Romantic: {}", facet_label(profile.romantic.as_ref()));
    println!("- Mystic: {}", facet_label(profile.mystic.as_ref()));
    println!(
        "- Apology style: {}",
        profile.notes.apology.as_deref().unwrap_or("unknown")
    );
    println!(
        "- Forgiveness style: {}",
        profile.notes.forgiveness.as_deref().unwrap_or("unknown")
    );
}

fn facet_label(facet: Option<&Facet>) -> &str {
    facet.map(|facet| facet.label.as_str()).unwrap_or("unknown")
}
