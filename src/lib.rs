// Library root
// -----------
// The `elitecode` binary is a thin shell over this crate so the command
// tree, prompt flows and backend calls can be driven from tests.
//
// Module responsibilities:
// - `router`: command registry and argv dispatch with exit statuses.
// - `collector` / `validators`: ordered, validated interactive prompts.
// - `commands`: the `auth`, `problems`, `user`, `system` and `github` groups.
// - `api` / `github`: blocking HTTP clients for the backend and GitHub.
// - `config` / `cache` / `workspace`: files under `~/.elitecode` and the
//   per-problem working directory.
// - `ui` / `app`: terminal output and the per-run handler context.
// - `interrupt`: Ctrl-C restores the terminal and exits with the abort code.
pub mod api;
pub mod app;
pub mod cache;
pub mod collector;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod interrupt;
pub mod router;
pub mod ui;
pub mod validators;
pub mod workspace;
