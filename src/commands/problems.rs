// Problem browsing and the local solve loop: set up a directory, run the
// code against sample input, check it against the cached test cases and
// submit.

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use super::{decode, group_command};
use crate::api::{ProblemFilter, ProblemSummary, RunRequest, SubmitRequest, TestCase};
use crate::app::App;
use crate::router::CommandDescriptor;
use crate::ui::Table;
use crate::workspace::{self, Language};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProblemsCommand {
    /// List available problems
    List {
        /// Filter by difficulty
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Number of problems to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Search problems by keyword
    Search {
        /// Words to search for
        #[arg(required = true)]
        keyword: Vec<String>,
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Set up a problem in the current directory
    Set {
        /// Problem id
        id: u64,
        /// Language for the starter file (defaults to the configured one)
        #[arg(short, long, value_enum)]
        language: Option<Language>,
        /// Do not open the editor afterwards
        #[arg(long)]
        no_open: bool,
    },
    /// Run your code against an input file
    Run {
        #[arg(short, long, value_enum)]
        language: Option<Language>,
        /// Input file
        #[arg(short, long, default_value = "input.txt")]
        input: PathBuf,
    },
    /// Check your solution against the test cases and submit it
    Submit {
        /// Problem id (read from the directory name when omitted)
        id: Option<u64>,
        #[arg(short, long, value_enum)]
        language: Option<Language>,
        /// Submit even if some test cases fail
        #[arg(long)]
        force: bool,
    },
    /// Restore the starter template
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Bookmark a problem
    Bookmark {
        id: u64,
        /// Remove the bookmark instead
        #[arg(short, long)]
        remove: bool,
    },
    /// Open the discussion page of a problem
    Discuss { id: u64 },
}

pub fn group() -> CommandDescriptor<App> {
    CommandDescriptor::new(
        group_command::<ProblemsCommand>("problems", "Problem management commands"),
        |matches, app| run(decode(matches)?, app),
    )
}

pub fn run(cmd: ProblemsCommand, app: &mut App) -> Result<()> {
    match cmd {
        ProblemsCommand::List { difficulty, category, limit } => {
            let filter = filter(difficulty, category, limit);
            list(app, &filter)
        }
        ProblemsCommand::Search { keyword, difficulty, category, limit } => {
            let filter = filter(difficulty, category, limit);
            search(app, &keyword.join(" "), &filter)
        }
        ProblemsCommand::Set { id, language, no_open } => set(app, id, language, !no_open),
        ProblemsCommand::Run { language, input } => run_code(app, language, &input),
        ProblemsCommand::Submit { id, language, force } => submit(app, id, language, force),
        ProblemsCommand::Reset { force } => reset(app, force),
        ProblemsCommand::Bookmark { id, remove } => bookmark(app, id, remove),
        ProblemsCommand::Discuss { id } => discuss(app, id),
    }
}

fn filter(difficulty: Option<Difficulty>, category: Option<String>, limit: u32) -> ProblemFilter {
    ProblemFilter {
        difficulty: difficulty.map(|d| d.as_str().to_string()),
        category,
        status: None,
        limit,
    }
}

/// One row per problem; shared with `user my-problems`.
pub(crate) fn summary_table(problems: &[ProblemSummary]) -> Table {
    let mut table = Table::new(["ID", "Title", "Difficulty", "Category", "Status"]);
    for p in problems {
        let status = if p.solved {
            "✅ Solved"
        } else if p.attempted {
            "🔄 Attempted"
        } else {
            "⭕ Not Attempted"
        };
        table.row([p.id.to_string(), p.title.clone(), p.difficulty.clone(), p.category.clone(), status.to_string()]);
    }
    table
}

fn list(app: &mut App, filter: &ProblemFilter) -> Result<()> {
    let spinner = app.out.spinner("Fetching problems...");
    let result = app.api()?.list_problems(filter);
    spinner.finish();
    let problems = result.context("failed to fetch problems")?;

    if problems.is_empty() {
        app.out.info("No problems found matching your criteria.");
        return Ok(());
    }
    app.out.heading(&format!("📚 Problems ({})", problems.len()));
    app.out.table(&summary_table(&problems));
    app.out.line("");
    app.out.info("Use 'elitecode problems set <id>' to start solving a problem.");
    Ok(())
}

fn search(app: &mut App, keyword: &str, filter: &ProblemFilter) -> Result<()> {
    let spinner = app.out.spinner(&format!("Searching for '{keyword}'..."));
    let result = app.api()?.search_problems(keyword, filter);
    spinner.finish();
    let problems = result.context("search failed")?;

    if problems.is_empty() {
        app.out.info(&format!("No problems found for '{keyword}'."));
        return Ok(());
    }
    app.out.heading(&format!("🔍 Search results for '{keyword}' ({})", problems.len()));
    app.out.table(&summary_table(&problems));
    Ok(())
}

fn default_language(app: &App) -> Language {
    Language::from_name(&app.config().language).unwrap_or(Language::C)
}

fn set(app: &mut App, id: u64, language: Option<Language>, open: bool) -> Result<()> {
    let language = language.unwrap_or_else(|| default_language(app));

    let spinner = app.out.spinner(&format!("Fetching problem {id}..."));
    let problem = app.api()?.get_problem(id);
    let tests = app.api()?.test_cases(id);
    spinner.finish();
    let problem = problem.with_context(|| format!("failed to fetch problem {id}"))?;
    let tests = match tests {
        Ok(tests) => tests,
        Err(e) => {
            app.out.warn(&format!("Could not fetch test cases: {e}"));
            Vec::new()
        }
    };

    let dir = app.cwd().join(workspace::problem_dir_name(&problem));
    if dir.join(language.source_file()).exists() {
        bail!(
            "{} already exists; use 'elitecode problems reset' to start over",
            dir.join(language.source_file()).display()
        );
    }
    let source = workspace::scaffold(&dir, &problem, language, &tests)?;

    let cache = app.cache();
    cache.save_problem(&problem)?;
    cache.save_test_cases(problem.id, &tests)?;

    app.out.success(&format!("Problem {}: {} is ready", problem.id, problem.title));
    app.out.line(&format!("Directory: {}", dir.display()));
    app.out.line(&format!("Source file: {}", source.display()));
    app.out.line(&format!("Difficulty: {}", problem.difficulty));
    if !problem.tags.is_empty() {
        app.out.line(&format!("Tags: {}", problem.tags.join(", ")));
    }

    if open {
        let editor = app.config().editor.clone();
        if let Err(e) = Process::new(&editor).arg(&dir).spawn() {
            app.out.warn(&format!("Could not open {editor}: {e}"));
        }
    }
    Ok(())
}

/// Source file for `language`, or the first one found in `dir`.
fn locate_source(dir: &Path, language: Option<Language>) -> Result<(Language, PathBuf)> {
    let language = match language {
        Some(l) => l,
        None => workspace::detect_language(dir)?,
    };
    let path = dir.join(language.source_file());
    if !path.is_file() {
        bail!("{} not found", path.display());
    }
    Ok((language, path))
}

fn run_code(app: &mut App, language: Option<Language>, input: &Path) -> Result<()> {
    let (language, source) = locate_source(app.cwd(), language)?;
    let code = std::fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let input_path = app.cwd().join(input);
    let stdin = if input_path.is_file() {
        std::fs::read_to_string(&input_path)
            .with_context(|| format!("Failed to read {}", input_path.display()))?
    } else {
        debug!("{} not found, running with empty input", input_path.display());
        String::new()
    };
    let request = RunRequest {
        problem_id: workspace::problem_id_from_dir(app.cwd()).ok(),
        language: language.as_str(),
        code: &code,
        input: &stdin,
    };

    let spinner = app.out.spinner(&format!("Running {} code...", language));
    let result = app.api()?.run_code(&request);
    spinner.finish();
    let response = result.context("failed to run code")?;

    if !response.error.is_empty() {
        app.out.error("Execution failed");
        app.out.line(&response.error);
        bail!("program exited with an error");
    }
    app.out.heading("📤 Output:");
    app.out.line(response.output.trim_end());
    app.out.line("");
    app.out.info(&format!("⏱  Time: {:.3}s", response.time));
    Ok(())
}

/// Whether `actual` matches `expected`, ignoring surrounding whitespace.
pub fn output_matches(expected: &str, actual: &str) -> bool {
    expected.trim() == actual.trim()
}

fn submit(app: &mut App, id: Option<u64>, language: Option<Language>, force: bool) -> Result<()> {
    let id = match id {
        Some(id) => id,
        None => workspace::problem_id_from_dir(app.cwd())?,
    };
    let (language, source) = locate_source(app.cwd(), language)?;
    let code = std::fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let tests: Vec<TestCase> = match app.cache().test_cases(id) {
        Ok(tests) => tests,
        Err(e) => {
            debug!("{e:#}; fetching test cases from the server");
            let fetched = app.api()?.test_cases(id);
            fetched.with_context(|| format!("failed to fetch test cases for problem {id}"))?
        }
    };

    let mut failed = 0;
    for (n, case) in tests.iter().enumerate() {
        let request = RunRequest {
            problem_id: Some(id),
            language: language.as_str(),
            code: &code,
            input: &case.input,
        };
        let spinner = app.out.spinner(&format!("Running test case {}...", n + 1));
        let result = app.api()?.run_code(&request);
        spinner.finish();
        let response = result.with_context(|| format!("failed to run test case {}", n + 1))?;

        if response.error.is_empty() && output_matches(&case.expected_output, &response.output) {
            app.out.success(&format!("Test case {}: PASSED", n + 1));
            continue;
        }
        failed += 1;
        app.out.error(&format!("Test case {}: FAILED", n + 1));
        if !case.hidden {
            app.out.line(&format!("  Input:    {}", case.input.trim()));
            app.out.line(&format!("  Expected: {}", case.expected_output.trim()));
            if response.error.is_empty() {
                app.out.line(&format!("  Got:      {}", response.output.trim()));
            } else {
                app.out.line(&format!("  Error:    {}", response.error.trim()));
            }
        }
    }

    if failed > 0 && !force {
        app.out.warn(&format!(
            "{failed} of {} test cases failed; fix them or use --force to submit anyway",
            tests.len()
        ));
        return Ok(());
    }

    let spinner = app.out.spinner("Submitting solution...");
    let result = app.api()?.submit(&SubmitRequest {
        problem_id: id,
        language: language.as_str(),
        code: &code,
    });
    spinner.finish();
    let submission = result.context("submission failed")?;

    if submission.accepted {
        app.out.success("ACCEPTED");
    } else {
        app.out.error(&format!("REJECTED: {}", submission.status));
        if !submission.error_message.is_empty() {
            app.out.line(&submission.error_message);
        }
    }
    if !submission.execution_time.is_empty() {
        app.out.line(&format!("Execution time: {}", submission.execution_time));
    }
    if !submission.memory_usage.is_empty() {
        app.out.line(&format!("Memory usage: {}", submission.memory_usage));
    }
    Ok(())
}

fn reset(app: &mut App, force: bool) -> Result<()> {
    let files = workspace::source_files(app.cwd())?;
    if files.is_empty() {
        bail!("no source files found in {}", app.cwd().display());
    }
    if !force && !app.input.confirm("This will overwrite your code. Continue?", false)? {
        app.out.info("Reset cancelled.");
        return Ok(());
    }
    for file in &files {
        if let Some(language) = Language::from_path(file) {
            std::fs::write(file, language.blank_template())
                .with_context(|| format!("Failed to reset {}", file.display()))?;
        }
    }
    app.out.success(&format!("Reset {} file(s) to the starter template", files.len()));
    Ok(())
}

fn bookmark(app: &mut App, id: u64, remove: bool) -> Result<()> {
    if remove {
        let result = app.api()?.unbookmark(id);
        result.with_context(|| format!("failed to remove bookmark for problem {id}"))?;
        app.out.success(&format!("Bookmark removed for problem {id}"));
    } else {
        let result = app.api()?.bookmark(id);
        result.with_context(|| format!("failed to bookmark problem {id}"))?;
        app.out.success(&format!("Problem {id} bookmarked"));
    }
    Ok(())
}

fn browser_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(windows) {
        ("cmd", &["/C", "start"])
    } else {
        ("xdg-open", &[])
    }
}

fn discuss(app: &mut App, id: u64) -> Result<()> {
    let result = app.api()?.discussion_url(id);
    let url = result.with_context(|| format!("failed to fetch discussion for problem {id}"))?;

    app.out.info(&format!("💬 Discussion: {url}"));
    if app.out.is_interactive() {
        let (program, args) = browser_command();
        if let Err(e) = Process::new(program).args(args).arg(&url).spawn() {
            debug!("could not launch browser: {e}");
        }
    }
    Ok(())
}
