use std::fs;
use std::io::Write;
use std::rc::Rc;

use clap::ArgMatches;
use log::{info, warn, LevelFilter};
use serde::Serialize;
use serde_json::{json, Value};

use crate::color::{checker, CheckerResult, ColorDomain};
use crate::error::InstanceError;
use crate::graph::NodeId;
use crate::instance::ColoringProblem;
use crate::search::backjumping::SearchOutcome;
use crate::search::conflicts::ConflictPolicy;


/** parameters read from the command line */
#[derive(Debug)]
pub struct Params {
    /// instance name (file, random spec, or "australia")
    pub inst_name: String,
    /// problem to solve
    pub problem: Rc<ColoringProblem>,
    /// conflict log policy
    pub policy: ConflictPolicy,
    /// where to write the solution
    pub sol_file: Option<String>,
    /// where to write the performance statistics
    pub perf_file: Option<String>,
}

/** reads command line input and builds the problem to solve */
pub fn read_params(main_args:&ArgMatches) -> Result<Params, InstanceError> {
    let instance_type = main_args.value_of("type").unwrap_or("json");
    let colors = match main_args.value_of("colors") {
        None => None,
        Some(s) => Some(ColorDomain::parse(s)?),
    };
    let inst_filename = main_args.value_of("instance");
    let problem = match (instance_type, inst_filename) {
        ("json", None) => ColoringProblem::australia()?,
        ("json", Some(f)) => ColoringProblem::from_json_file(f)?,
        ("dimacs", Some(f)) => ColoringProblem::from_dimacs_file(f, default_domain(&colors)?)?,
        ("random", Some(spec)) => ColoringProblem::from_random_spec(spec, default_domain(&colors)?)?,
        ("dimacs", None) | ("random", None) => {
            return Err(InstanceError::MissingInstance(instance_type.to_string()));
        },
        (t, _) => return Err(InstanceError::UnknownType(t.to_string())),
    };
    // a color list on the command line replaces the domain of the instance
    let problem = match colors {
        Some(domain) => problem.with_domain(domain),
        None => problem,
    };
    let sol_file = main_args.value_of("solution").map(|e| {
        info!("printing solutions in: {}", e);
        e.to_string()
    });
    let perf_file = main_args.value_of("perf").map(|e| {
        info!("printing perfs in: {}", e);
        e.to_string()
    });
    let policy = if main_args.is_present("dedup") {
        ConflictPolicy::KeepMostRecent
    } else {
        ConflictPolicy::KeepDuplicates
    };
    Ok(Params {
        inst_name: inst_filename.unwrap_or("australia").to_string(),
        problem: Rc::new(problem),
        policy,
        sol_file,
        perf_file,
    })
}

/// colors given on the command line, or R,G,B
fn default_domain(colors:&Option<ColorDomain>) -> Result<ColorDomain, InstanceError> {
    match colors {
        Some(d) => Ok(d.clone()),
        None => ColorDomain::from_labels(&["R", "G", "B"]),
    }
}

/** configures the logger: plain messages on stdout, debug level if verbose */
pub fn configure_logging(verbose:bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "{}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

/** one line of an exported solution */
#[derive(Debug, Serialize)]
struct AssignedColor<'a> {
    node: NodeId,
    label: &'a str,
    color: &'a str,
}

/// JSON representation of an outcome
pub fn outcome_to_json(problem:&ColoringProblem, outcome:&SearchOutcome) -> Value {
    match outcome {
        SearchOutcome::Unsatisfiable => json!({ "satisfiable": false }),
        SearchOutcome::Satisfiable(coloring) => {
            let assignment:Vec<AssignedColor> = coloring.iter().map(|(v,c)| AssignedColor {
                node: *v,
                label: problem.graph().label(*v),
                color: problem.domain().label(*c),
            }).collect();
            json!({ "satisfiable": true, "assignment": assignment })
        }
    }
}

/// human-readable report: one `label: color` line per node in assignment order
pub fn format_outcome(problem:&ColoringProblem, outcome:&SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Unsatisfiable => "THIS CSP DOES NOT HAVE A VALID SOLUTION\n".to_string(),
        SearchOutcome::Satisfiable(coloring) => {
            let mut res = "SOLUTION FOUND\n".to_string();
            for (v,c) in coloring.iter() {
                res += format!("{}: {}\n", problem.graph().label(*v), problem.domain().label(*c)).as_str();
            }
            res
        }
    }
}

fn write_file(filename:&str, content:&str) -> Result<(), InstanceError> {
    fs::write(filename, content)
        .map_err(|source| InstanceError::Io { path:filename.to_string(), source })
}

/// exports search results to files
pub fn export_results(
    problem:&ColoringProblem,
    outcome:&SearchOutcome,
    stats:&Value,
    perf_file:Option<&str>,
    sol_file:Option<&str>,
) -> Result<(), InstanceError> {
    // export statistics
    if let Some(filename) = perf_file {
        write_file(filename, &serde_json::to_string(stats)?)?;
    }
    // export solution
    if let Some(filename) = sol_file {
        if let SearchOutcome::Satisfiable(coloring) = outcome {
            let checker_result = checker(problem.graph(), problem.domain(), coloring);
            if checker_result != CheckerResult::Ok {
                warn!("invalid solution (reason: {:?})", checker_result);
            }
        }
        write_file(filename, &serde_json::to_string_pretty(&outcome_to_json(problem, outcome))?)?;
    }
    Ok(())
}
