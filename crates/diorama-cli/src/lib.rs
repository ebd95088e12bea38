//! CLI logic for the Diorama scenario runner.
//!
//! A scenario describes an initial diagram and a list of modeling steps.
//! The runner applies the steps and writes the resulting diagram tree.

pub mod error_adapter;
pub mod scenario;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::info;

use diorama::DioramaError;

use scenario::Scenario;

/// Run the Diorama CLI application
///
/// This function loads the scenario, applies every step and writes the
/// resulting diagram tree to the output file, or to stdout without one.
///
/// # Errors
///
/// Returns `DioramaError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed scenarios
/// - Modeling errors raised by a step
pub fn run(args: &Args) -> Result<(), DioramaError> {
    info!(input_path = args.input; "Running scenario");

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let scenario = Scenario::parse(&source)?;

    let mut modeling = scenario.build(&app_config)?;
    scenario.run(&mut modeling)?;

    let stack = modeling.command_stack();
    info!(
        steps = scenario.steps().len(),
        undo_depth = stack.undo_depth(),
        redo_depth = stack.redo_depth();
        "Scenario finished"
    );

    let tree = modeling.diagram().to_string();
    match &args.output {
        Some(output) => {
            fs::write(output, tree)?;
            info!(output_file = output; "Diagram written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(tree.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
