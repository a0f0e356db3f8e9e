// `leaderboard`: global or per-problem rankings over a time range.

use anyhow::{Context, Result};
use clap::{Args, Command, ValueEnum};

use super::decode;
use crate::api::Ranking;
use crate::app::App;
use crate::router::CommandDescriptor;
use crate::ui::Table;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    All,
    Year,
    Month,
    Week,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::All => "all",
            TimeRange::Year => "year",
            TimeRange::Month => "month",
            TimeRange::Week => "week",
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardArgs {
    /// Time range
    #[arg(short, long, value_enum, default_value_t = TimeRange::All)]
    pub time: TimeRange,
    /// Show rankings for one problem
    #[arg(short, long, value_name = "ID")]
    pub problem: Option<u64>,
}

pub fn command() -> CommandDescriptor<App> {
    let cmd = Command::new("leaderboard").about("View global and problem-specific rankings");
    CommandDescriptor::new(LeaderboardArgs::augment_args(cmd), |matches, app| {
        run(decode(matches)?, app)
    })
}

/// Rank column with medals for the top three; the caller's own row is tagged.
pub fn ranking_table(rankings: &[Ranking], me: Option<&str>) -> Table {
    let mut table = Table::new(["Rank", "User", "Score", "Problems Solved", "Avg Time", "Avg Memory"]);
    for (i, r) in rankings.iter().enumerate() {
        let rank = match i {
            0 => format!("🥇 {}", i + 1),
            1 => format!("🥈 {}", i + 1),
            2 => format!("🥉 {}", i + 1),
            _ => (i + 1).to_string(),
        };
        let user = if me == Some(r.user_id.as_str()) {
            format!("{} (you)", r.username)
        } else {
            r.username.clone()
        };
        table.row([
            rank,
            user,
            format!("{:.0}", r.score),
            r.problems_solved.to_string(),
            format!("{:.1}ms", r.avg_time_ms()),
            format!("{:.2}MB", r.avg_memory_mb()),
        ]);
    }
    table
}

pub fn run(args: LeaderboardArgs, app: &mut App) -> Result<()> {
    let spinner = app.out.spinner("Fetching leaderboard...");
    let result = app.api()?.leaderboard(args.time.as_str(), args.problem);
    spinner.finish();
    let rankings = result.context("error getting rankings")?;

    match args.problem {
        Some(id) => {
            let problem = app.api()?.get_problem(id);
            let problem = problem.with_context(|| format!("error getting problem {id}"))?;
            app.out.heading(&format!("🏆 Leaderboard for {}", problem.title));
            app.out.line(&format!("Difficulty: {}", problem.difficulty));
            if !problem.tags.is_empty() {
                app.out.line(&format!("Tags: {}", problem.tags.join(", ")));
            }
        }
        None if args.time == TimeRange::All => app.out.heading("🏆 Global Leaderboard"),
        None => app.out.heading(&format!("🏆 Global Leaderboard ({})", args.time.as_str())),
    }

    if rankings.is_empty() {
        app.out.info("No rankings found.");
        return Ok(());
    }
    let me = app.config().user.as_ref().map(|u| u.id.clone());
    app.out.table(&ranking_table(&rankings, me.as_deref()));
    Ok(())
}
