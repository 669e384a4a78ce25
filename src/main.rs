use anyhow::{anyhow, Context, Result};
use clap::{arg, parser::ValueSource, ArgMatches, Command};
use serde::Serialize;
use std::{fs, path::PathBuf};
use store_routing::config::PlannerConfig;
use store_routing::instance::Instance;
use store_routing::models::DayType;
use store_routing::pipeline::Planner;
use store_routing::selection::Selection;
use tracing_subscriber::EnvFilter;

fn with_common_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(--instance <PATH> "Problem instance json file")
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        arg!(--config [PATH] "Planner configuration json file")
            .value_parser(clap::value_parser!(PathBuf)),
    )
}

fn with_planning_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(--day [DAY] "Day type: weekday or saturday")
            .default_value("weekday")
            .value_parser(clap::value_parser!(DayType)),
    )
    .arg(
        arg!(--"fleet-size" [N] "Maximum number of trucks")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(--capacity [UNITS] "Truck capacity in demand units")
            .value_parser(clap::value_parser!(f64)),
    )
    .arg(
        arg!(--"time-limit" [SECS] "Wall-clock limit for the MIP solve")
            .value_parser(clap::value_parser!(f64)),
    )
}

fn cli() -> Command {
    Command::new("store-routing")
        .about("Plans daily store deliveries and measures their cost risk")
        .arg_required_else_help(true)
        .subcommand(with_common_args(
            Command::new("generate").about("Builds the candidate route pool"),
        ))
        .subcommand(with_planning_args(with_common_args(
            Command::new("optimize")
                .about("Selects the cheapest set of routes for a day type")
                .arg(
                    arg!(--output [PATH] "Also write the selection to this file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )))
        .subcommand(with_planning_args(with_common_args(
            Command::new("simulate")
                .about("Runs the travel-time and demand risk simulations")
                .arg(
                    arg!(--selection [PATH] "Selection json from a previous optimize run")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(--seed [SEED] "Random seed").value_parser(clap::value_parser!(u64)))
                .arg(
                    arg!(--trials [N] "Number of Monte Carlo trials")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("generate", sub_m)) => generate(sub_m),
        Some(("optimize", sub_m)) => optimize(sub_m),
        Some(("simulate", sub_m)) => simulate(sub_m),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load(sub_m: &ArgMatches) -> Result<(Instance, PlannerConfig)> {
    let path = sub_m
        .get_one::<PathBuf>("instance")
        .ok_or_else(|| anyhow!("--instance is required"))?;
    let instance = Instance::from_path(path)
        .with_context(|| format!("Failed to load instance {}", path.display()))?;

    let mut config = match sub_m.get_one::<PathBuf>("config") {
        Some(p) => PlannerConfig::from_path(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => PlannerConfig::default(),
    };
    apply_overrides(&mut config, sub_m);
    config.validate()?;
    Ok((instance, config))
}

fn apply_overrides(config: &mut PlannerConfig, sub_m: &ArgMatches) {
    // Not every subcommand defines every flag.
    fn flag<T: Clone + Send + Sync + 'static>(sub_m: &ArgMatches, id: &str) -> Option<T> {
        sub_m.try_get_one::<T>(id).ok().flatten().cloned()
    }
    if let Some(n) = flag::<usize>(sub_m, "fleet-size") {
        config.fleet.fleet_size = n;
    }
    if let Some(c) = flag::<f64>(sub_m, "capacity") {
        config.fleet.vehicle_capacity = c;
    }
    if let Some(t) = flag::<f64>(sub_m, "time-limit") {
        config.solver.time_limit_secs = Some(t);
    }
    if let Some(s) = flag::<u64>(sub_m, "seed") {
        config.simulation.seed = s;
    }
    if let Some(n) = flag::<usize>(sub_m, "trials") {
        config.simulation.trials = n;
    }
}

fn day(sub_m: &ArgMatches) -> DayType {
    sub_m.get_one::<DayType>("day").copied().unwrap_or(DayType::Weekday)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn generate(sub_m: &ArgMatches) -> Result<()> {
    let (instance, config) = load(sub_m)?;
    let pool = Planner::new(config)?.generate(&instance)?;
    print_json(&pool)
}

fn optimize(sub_m: &ArgMatches) -> Result<()> {
    let (instance, config) = load(sub_m)?;
    let selection = Planner::new(config)?
        .optimize(&instance, day(sub_m))?
        .into_selection()?;

    if let Some(path) = sub_m.get_one::<PathBuf>("output") {
        fs::write(path, serde_json::to_string_pretty(&selection)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    print_json(&selection)
}

fn simulate(sub_m: &ArgMatches) -> Result<()> {
    let (instance, config) = load(sub_m)?;
    let planner = Planner::new(config)?;

    let selection: Selection = match sub_m.get_one::<PathBuf>("selection") {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let selection: Selection = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse selection {}", path.display()))?;
            selection
                .validate(&instance.matrix)
                .with_context(|| format!("Selection {} does not match the instance", path.display()))?;
            if sub_m.value_source("day") == Some(ValueSource::CommandLine) && selection.day != day(sub_m) {
                return Err(anyhow!(
                    "Selection {} was planned for {}, but --day is {}",
                    path.display(),
                    selection.day,
                    day(sub_m)
                ));
            }
            selection
        }
        None => planner.optimize(&instance, day(sub_m))?.into_selection()?,
    };

    print_json(&planner.simulate(&instance, &selection)?)
}
