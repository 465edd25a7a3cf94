//! projgen's main application entry point and orchestration logic.
//! Handles command-line argument parsing, override collection, and dispatch
//! to direct generation or IDE template export.

use projgen::{
    cli::{classify_args, format_variables, get_args, Args},
    config::{load_overrides_file, load_overrides_from_stdin, merge_overrides, Overrides},
    diagnostics::{Diagnostics, Outcome, Report},
    error::{default_error_handler, Error, Result},
    ide::{export, ExportRequest, VsTemplateWriter},
    logger::init_logger,
    processor::{GenerateRequest, Generator},
    template::Template,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.log_level());

    match run(args) {
        Ok(Outcome::Fatal) => std::process::exit(1),
        Ok(_) => {}
        // Already reported through the logger.
        Err(Error::Fatal(_) | Error::Raised(_)) => std::process::exit(1),
        Err(err) => default_error_handler(err),
    }
}

/// Collects overrides; later sources win: file, then stdin, then pairs.
fn collect_overrides(args: &Args, pairs: Overrides) -> Result<Overrides> {
    let mut sources = Vec::new();
    if let Some(path) = &args.vars_file {
        sources.push(load_overrides_file(path)?);
    }
    if args.stdin {
        sources.push(load_overrides_from_stdin()?);
    }
    sources.push(pairs);
    Ok(merge_overrides(sources))
}

fn print_summary(report: &Report, destination: &std::path::Path, what: &str) {
    match report.outcome {
        Outcome::Success => {
            println!("{} completed successfully in {}.", what, destination.display())
        }
        Outcome::Partial => println!(
            "{} completed in {} with {} error(s).",
            what,
            destination.display(),
            report.errors().count()
        ),
        Outcome::Fatal => {}
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads and parses the template description
/// 2. Lists the variables when no destination was given
/// 3. Merges variable overrides from file, stdin and arguments
/// 4. Generates the project tree or exports an IDE template
fn run(args: Args) -> Result<Outcome> {
    let settings = args.settings();
    let mut sink = Diagnostics::from_settings(&settings);
    let template = Template::load(&args.template, &mut sink)?;

    let Some(destination) = args.destination.clone() else {
        print!("{}", format_variables(&template));
        return Ok(Outcome::Success);
    };

    let trailing = classify_args(&args.args)?;
    let overrides = collect_overrides(&args, trailing.overrides)?;

    if args.vs {
        if let Some(solution) = &trailing.solution {
            log::warn!(
                "Ignoring solution '{}' when exporting a template.",
                solution.display()
            );
        }
        let mut request = ExportRequest::new(&destination).with_language(args.lang);
        request.variables = overrides;
        let report = export(&VsTemplateWriter::new(), &template, &request, &settings);
        for file in &report.written {
            println!("Exported: '{}'", file.destination.display());
        }
        print_summary(&report, &destination, "Template export");
        return Ok(report.outcome);
    }

    let mut request = GenerateRequest::new(&destination).with_language(args.lang);
    request.variables = overrides;
    request.solution = trailing.solution;

    let mut generator = Generator::new(&template, settings);
    generator.on_file_written(|file| println!("Rendered: '{}'", file.destination.display()));
    let report = generator.generate(&request);
    for project in &report.projects {
        log::debug!("Generated project {}", project.display());
    }
    print_summary(&report, &destination, "Template generation");
    Ok(report.outcome)
}
