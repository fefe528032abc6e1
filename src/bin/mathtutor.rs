//! mathtutor CLI - formatting pipeline, problem browser and practice loop

use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
use mathtutor::auth::{FirebaseAuth, IdentityProvider};
use mathtutor::config::{AppConfig, ENV_DATA};
use mathtutor::data::import::{save_problems, ProblemImporter};
use mathtutor::practice::PracticeLoop;
use mathtutor::service::ChatClient;
use mathtutor::{
    Difficulty, GenerationMode, HtmlRenderer, MathTextPipeline, ProblemFilter, ProblemSet,
    Renderer, TerminalRenderer, TextGenerator, TutorSession,
};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathtutor")]
#[command(version)]
#[command(about = "Calculus practice tutor: math text formatting, problems and generated help", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Problem dataset (JSON), overrides the configured one
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Format problem-style text (reads stdin if no file is given)
    Render {
        input: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Format a generated solution line by line
    Solution {
        input: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// List problems, optionally filtered
    Problems {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print per-category and per-difficulty counts instead
        #[arg(long)]
        counts: bool,
    },

    /// Ask the generation service for a hint
    Hint {
        /// One-based position in the filtered list
        number: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Ask the generation service for a full solution
    Solve {
        /// One-based position in the filtered list
        number: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Interactive practice session
    Practice {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Identity provider account operations (password read from stdin)
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Build dataset records from exam-booklet text (or a PDF with the `pdf` feature)
    Import {
        input: PathBuf,

        /// Dataset file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Dataset to merge the imported problems into
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Skip problems numbered below this
        #[arg(long, default_value_t = 1)]
        start_problem: u64,

        /// Also write the first N problems of the output to `<output stem>_sample.json`
        #[arg(long)]
        sample: Option<usize>,
    },
}

#[cfg(feature = "cli")]
#[derive(clap::Args, Clone, Default)]
struct FilterArgs {
    /// Only problems in this category
    #[arg(long)]
    category: Option<String>,

    /// Only problems of this difficulty (easy, medium, hard)
    #[arg(long)]
    difficulty: Option<Difficulty>,
}

#[cfg(feature = "cli")]
impl From<FilterArgs> for ProblemFilter {
    fn from(args: FilterArgs) -> Self {
        ProblemFilter {
            category: args.category,
            difficulty: args.difficulty,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum AccountAction {
    /// Create an account
    SignUp { email: String },
    /// Sign in to an existing account
    SignIn { email: String },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Plain text with `$...$` math
    Plain,
    /// HTML fragments with math spans
    Html,
    /// Segment/line structure as JSON
    Json,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mathtutor=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let color = !cli.no_color && io::stdout().is_terminal();

    match cli.command {
        Commands::Render { input, format } => cmd_render(input.as_deref(), format, color),
        Commands::Solution { input, format } => cmd_solution(input.as_deref(), format, color),
        Commands::Problems { filter, counts } => {
            let problems = load_problems(cli.data.as_deref(), &config)?;
            cmd_problems(&problems, &filter.into(), counts)
        }
        Commands::Hint { number, filter } => {
            let problems = load_problems(cli.data.as_deref(), &config)?;
            cmd_generate(&problems, &filter.into(), number, GenerationMode::Hint, &config, color)
                .await
        }
        Commands::Solve { number, filter } => {
            let problems = load_problems(cli.data.as_deref(), &config)?;
            cmd_generate(
                &problems,
                &filter.into(),
                number,
                GenerationMode::Solution,
                &config,
                color,
            )
            .await
        }
        Commands::Practice { filter } => {
            let problems = load_problems(cli.data.as_deref(), &config)?;
            cmd_practice(problems, filter, &config, color).await
        }
        Commands::Account { action } => cmd_account(action, &config).await,
        Commands::Import {
            input,
            output,
            existing,
            start_problem,
            sample,
        } => cmd_import(&input, &output, existing.as_deref(), start_problem, sample),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn load_problems(data: Option<&Path>, config: &AppConfig) -> Result<ProblemSet> {
    let Some(path) = data.or(config.dataset.as_deref()) else {
        bail!("no problem dataset given (use --data or set {})", ENV_DATA);
    };
    Ok(ProblemSet::load(path)?)
}

fn cmd_render(input: Option<&Path>, format: OutputFormat, color: bool) -> Result<()> {
    let text = read_input(input)?;
    let segments = MathTextPipeline::new().render_math_text(&text);
    let output = match format {
        OutputFormat::Plain => TerminalRenderer::new(color).render_segments(&segments),
        OutputFormat::Html => HtmlRenderer::new().render_segments(&segments),
        OutputFormat::Json => serde_json::to_string_pretty(&segments)?,
    };
    println!("{}", output);
    Ok(())
}

fn cmd_solution(input: Option<&Path>, format: OutputFormat, color: bool) -> Result<()> {
    let text = read_input(input)?;
    let lines = MathTextPipeline::new().format_solution(&text);
    let output = match format {
        OutputFormat::Plain => TerminalRenderer::new(color).render_lines(&lines),
        OutputFormat::Html => HtmlRenderer::new().render_lines(&lines),
        OutputFormat::Json => serde_json::to_string_pretty(&lines)?,
    };
    println!("{}", output);
    Ok(())
}

fn cmd_problems(problems: &ProblemSet, filter: &ProblemFilter, counts: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if counts {
        writeln!(out, "Categories:")?;
        for (category, count) in problems.category_counts() {
            writeln!(out, "  {} ({})", category, count)?;
        }
        writeln!(out, "Difficulties:")?;
        for (difficulty, count) in problems.difficulty_counts() {
            writeln!(out, "  {} ({})", difficulty, count)?;
        }
        return Ok(());
    }

    let pipeline = MathTextPipeline::new();
    let renderer = TerminalRenderer::new(false);
    let matching = problems.filtered(filter);
    for (i, problem) in matching.iter().enumerate() {
        let text = renderer.render_segments(&pipeline.render_math_text(&problem.problem));
        let first_line = text.lines().next().unwrap_or_default();
        writeln!(
            out,
            "{:>3}. [{} · {}] {}",
            i + 1,
            problem.category,
            problem.difficulty,
            first_line
        )?;
    }
    writeln!(out, "{} of {} problems", matching.len(), problems.len())?;
    Ok(())
}

async fn cmd_generate(
    problems: &ProblemSet,
    filter: &ProblemFilter,
    number: usize,
    mode: GenerationMode,
    config: &AppConfig,
    color: bool,
) -> Result<()> {
    let matching = problems.filtered(filter);
    let Some(problem) = number.checked_sub(1).and_then(|i| matching.get(i)) else {
        bail!(
            "no problem {} in the current selection ({} matching)",
            number,
            matching.len()
        );
    };

    let client = ChatClient::new(&config.service)?;
    let text = client.generate(&problem.problem, mode).await?;

    let pipeline = MathTextPipeline::new();
    let renderer = TerminalRenderer::new(color);
    let output = match mode {
        GenerationMode::Hint => renderer.render_segments(&pipeline.render_math_text(&text)),
        GenerationMode::Solution => renderer.render_lines(&pipeline.format_solution(&text)),
    };
    println!("{}", output);
    Ok(())
}

async fn cmd_practice(
    problems: ProblemSet,
    filter: FilterArgs,
    config: &AppConfig,
    color: bool,
) -> Result<()> {
    let client = ChatClient::new(&config.service)?;
    let mut session = TutorSession::new(Arc::new(problems));
    if filter.category.is_some() {
        session.set_category(filter.category);
    }
    if filter.difficulty.is_some() {
        session.set_difficulty(filter.difficulty);
    }

    let practice = PracticeLoop::new(session, Arc::new(client), io::stdout())
        .with_renderer(TerminalRenderer::new(color));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = practice.run(stdin).await?;
    out.flush()?;
    Ok(())
}

async fn cmd_account(action: AccountAction, config: &AppConfig) -> Result<()> {
    let mut auth = FirebaseAuth::new(&config.auth)?;
    let mut password = String::new();
    io::stdin()
        .lock()
        .read_line(&mut password)
        .context("reading password from stdin")?;
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("empty password");
    }

    let user = match action {
        AccountAction::SignUp { email } => auth.sign_up(&email, password).await?,
        AccountAction::SignIn { email } => auth.sign_in(&email, password).await?,
    };
    println!("Signed in as {} ({})", user.display_label(), user.uid);
    Ok(())
}

fn read_booklet(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
    }

    #[cfg(feature = "pdf")]
    {
        Ok(mathtutor::data::import::extract_pdf_text(path)?)
    }
    #[cfg(not(feature = "pdf"))]
    {
        bail!(
            "{} is a PDF: rebuild with --features pdf or pass extracted text",
            path.display()
        )
    }
}

fn cmd_import(
    input: &Path,
    output: &Path,
    existing: Option<&Path>,
    start_problem: u64,
    sample: Option<usize>,
) -> Result<()> {
    let text = read_booklet(input)?;
    let importer = ProblemImporter::new().with_start_problem(start_problem);
    let outcome = importer.import(&text, existing)?;
    save_problems(&outcome.problems, output)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Imported {} new problems ({} refined); {} total written to {}",
        outcome.imported,
        outcome.refined,
        outcome.problems.len(),
        output.display()
    )?;
    let dataset = ProblemSet::new(outcome.problems);
    for (category, count) in dataset.category_counts() {
        writeln!(out, "  {} ({})", category, count)?;
    }

    if let Some(size) = sample {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "problems".to_string());
        let path = output.with_file_name(format!("{}_sample.json", stem));
        let first: Vec<_> = dataset.iter().take(size).cloned().collect();
        save_problems(&first, &path)?;
        writeln!(out, "Sample of {} written to {}", first.len(), path.display())?;
    }
    Ok(())
}
