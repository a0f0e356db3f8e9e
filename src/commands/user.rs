// Progress reporting for the logged-in user.

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

use super::problems::summary_table;
use super::{decode, group_command};
use crate::api::{ProblemFilter, UserStats};
use crate::app::App;
use crate::router::CommandDescriptor;
use crate::ui::Table;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Solved,
    Attempted,
    Unsolved,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Solved => "solved",
            Status::Attempted => "attempted",
            Status::Unsolved => "unsolved",
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Show your statistics
    Stats,
    /// List problems you have solved or attempted
    MyProblems {
        /// Only show problems with this status
        #[arg(short, long, value_enum)]
        status: Option<Status>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

pub fn group() -> CommandDescriptor<App> {
    CommandDescriptor::new(
        group_command::<UserCommand>("user", "User profile and statistics"),
        |matches, app| run(decode(matches)?, app),
    )
}

pub fn run(cmd: UserCommand, app: &mut App) -> Result<()> {
    match cmd {
        UserCommand::Stats => stats(app),
        UserCommand::MyProblems { status, limit } => my_problems(app, status, limit),
    }
}

fn overview_table(stats: &UserStats) -> Table {
    let mut table = Table::new(["Metric", "Value"]);
    table.row(["Problems Solved".to_string(), stats.problems_solved.to_string()]);
    table.row(["Total Submissions".to_string(), stats.total_submissions.to_string()]);
    table.row(["Accuracy".to_string(), format!("{:.1}%", stats.accuracy)]);
    table.row(["Current Streak".to_string(), format!("{} days", stats.current_streak)]);
    table.row(["Longest Streak".to_string(), format!("{} days", stats.longest_streak)]);
    if let Some(last) = &stats.last_activity {
        table.row(["Last Activity".to_string(), last.clone()]);
    }
    table
}

fn difficulty_table(stats: &UserStats) -> Table {
    let mut table = Table::new(["Difficulty", "Solved", "Total", "Progress"]);
    for (name, b) in &stats.difficulty_breakdown {
        let pct = if b.total == 0 { 0.0 } else { f64::from(b.solved) * 100.0 / f64::from(b.total) };
        table.row([name.clone(), b.solved.to_string(), b.total.to_string(), format!("{pct:.1}%")]);
    }
    table
}

fn stats(app: &mut App) -> Result<()> {
    let spinner = app.out.spinner("Fetching your statistics...");
    let result = app.api()?.user_stats();
    spinner.finish();
    let stats = result.context("failed to fetch statistics")?;

    app.out.heading("📊 Your Statistics");
    app.out.table(&overview_table(&stats));

    let by_difficulty = difficulty_table(&stats);
    if !by_difficulty.is_empty() {
        app.out.line("");
        app.out.heading("By Difficulty");
        app.out.table(&by_difficulty);
    }

    if !stats.category_breakdown.is_empty() {
        let mut by_category = Table::new(["Category", "Solved"]);
        for (name, solved) in &stats.category_breakdown {
            by_category.row([name.clone(), solved.to_string()]);
        }
        app.out.line("");
        app.out.heading("By Category");
        app.out.table(&by_category);
    }
    Ok(())
}

fn my_problems(app: &mut App, status: Option<Status>, limit: u32) -> Result<()> {
    let filter = ProblemFilter {
        status: status.map(|s| s.as_str().to_string()),
        limit,
        ..Default::default()
    };
    let spinner = app.out.spinner("Fetching your problems...");
    let result = app.api()?.user_problems(&filter);
    spinner.finish();
    let problems = result.context("failed to fetch your problems")?;

    if problems.is_empty() {
        app.out.info("No problems found. Start with 'elitecode problems list'.");
        return Ok(());
    }
    app.out.heading(&format!("📝 Your Problems ({})", problems.len()));
    app.out.table(&summary_table(&problems));
    Ok(())
}
