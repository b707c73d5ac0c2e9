use std::process;

use clap::{App, load_yaml};
use serde_json::json;

use csp_color::search::backjumping::{BackjumpingSolver, SearchOutcome};
use csp_color::util::{read_params, export_results, configure_logging, format_outcome};


/** solves a graph coloring CSP using a degree-ordered backjumping search */
pub fn main() {
    // parse arguments
    let yaml = load_yaml!("backjump_color.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    configure_logging(main_args.is_present("verbose"));
    let params = match read_params(&main_args) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    params.problem.display_statistics();

    // solve it
    let mut solver = BackjumpingSolver::with_policy(params.problem.clone(), params.policy);
    let outcome = solver.solve();
    let stats = solver.statistics();
    stats.display();
    println!("\n{}", format_outcome(&params.problem, &outcome));
    let satisfiable = matches!(outcome, SearchOutcome::Satisfiable(_));
    let perf = json!({
        "inst_name": params.inst_name,
        "satisfiable": satisfiable,
        "statistics": stats
    });

    // export results
    if let Err(e) = export_results(
        &params.problem, &outcome, &perf,
        params.perf_file.as_deref(), params.sol_file.as_deref()
    ) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
