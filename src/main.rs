// Entrypoint for the CLI application.
// - Keeps `main` small: build the command registry and hand argv to it.
// - The registry prints errors itself; `main` only forwards the exit code.

use crossterm::tty::IsTty;
use std::io;

use elitecode::app::App;
use elitecode::{commands, interrupt};

fn main() {
    interrupt::install();

    let mut registry = match commands::registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    registry.color(io::stderr().is_tty());

    let mut app = App::terminal();
    app.set_command_tree(registry.command());

    let status = registry.dispatch(
        std::env::args_os().skip(1),
        &mut app,
        &mut io::stdout(),
        &mut io::stderr(),
    );
    std::process::exit(status.code());
}
