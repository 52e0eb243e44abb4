use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use log::{info, warn};

use mdvrp::{
    ga::{
        initialization::InitializationKind, mutations::MutationKind, parent_selection::SelectionKind, Config,
        GaError, Population,
    },
    parse,
    solution::SolutionReport,
    termination::Termination,
};

/// Solve a multi-depot vehicle routing problem with a genetic algorithm
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// The problem instance, in the Cordeau format
    #[clap(parse(from_os_str))]
    instance: PathBuf,
    /// Solution file whose first value is the best known duration. The search stops once a valid solution reaches it.
    #[clap(long, parse(from_os_str))]
    benchmark: Option<PathBuf>,
    /// JSON file with the algorithm configuration. Options given on the command line take precedence.
    #[clap(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Maximum number of generations
    #[clap(long, default_value_t = 1000)]
    generations: usize,
    /// Maximum running time in seconds
    #[clap(long)]
    timeout: Option<u64>,
    /// Stop after this many seconds without improvement
    #[clap(long)]
    stale: Option<u64>,
    /// Directory to write the final solution to
    #[clap(long, parse(from_os_str), default_value = "solutions")]
    output: PathBuf,
    /// Write the solution as JSON rather than the text layout
    #[clap(long)]
    json: bool,

    #[clap(long)]
    population_size: Option<usize>,
    #[clap(long)]
    crossover_rate: Option<f64>,
    #[clap(long)]
    mutation_rate: Option<f64>,
    #[clap(long, arg_enum)]
    selection: Option<SelectionKind>,
    #[clap(long)]
    tournament_size: Option<usize>,
    #[clap(long)]
    child_pairs: Option<usize>,
    #[clap(long)]
    parents_to_save: Option<usize>,
    #[clap(long)]
    duration_penalty_rate: Option<f64>,
    #[clap(long)]
    load_penalty_rate: Option<f64>,
    /// Number of segments a route is cut into during crossover
    #[clap(long)]
    k: Option<usize>,
    /// Exclude each generation's parents from the elites
    #[clap(long)]
    no_elitism: bool,
    #[clap(long, arg_enum)]
    mutation: Option<MutationKind>,
    /// Constructive heuristic for the initial population
    #[clap(long, arg_enum)]
    initialization: Option<InitializationKind>,
    #[clap(long)]
    initial_attempts: Option<usize>,
    #[clap(long)]
    seed: Option<u64>,
}

impl Args {
    fn load_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config: Config = match &self.config {
            Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
            None => Config::default(),
        };

        macro_rules! overwrite {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }

        overwrite!(
            population_size,
            crossover_rate,
            mutation_rate,
            selection,
            tournament_size,
            child_pairs,
            parents_to_save,
            duration_penalty_rate,
            load_penalty_rate,
            k,
            mutation,
            initialization,
            initial_attempts
        );

        if self.no_elitism {
            config.elitism = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }

    fn termination(&self) -> Result<Termination, Box<dyn std::error::Error>> {
        let mut termination = Termination::Generations(self.generations);

        if let Some(path) = &self.benchmark {
            let target = parse::read_benchmark(path)?;
            info!("Benchmark: {:.2}", target);
            termination = termination.or(Termination::Benchmark(target));
        }
        if let Some(seconds) = self.timeout {
            termination = termination.or(Termination::timeout(Duration::from_secs(seconds)));
        }
        if let Some(seconds) = self.stale {
            termination = termination.or(Termination::no_improvement(Duration::from_secs(seconds)));
        }

        Ok(termination)
    }
}

fn write_report(
    report: &SolutionReport,
    instance: &Path,
    directory: &Path,
    json: bool,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(directory)?;

    let stem = instance
        .file_stem()
        .map_or_else(|| "solution".into(), |s| s.to_string_lossy());
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let extension = if json { "json" } else { "txt" };
    let path = directory.join(format!("{}-{}.{}", stem, timestamp, extension));

    if json {
        serde_json::to_writer_pretty(File::create(&path)?, report)?;
    } else {
        fs::write(&path, report.to_string())?;
    }

    Ok(path)
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.load_config()?;
    let mut termination = args.termination()?;

    let problem = Arc::new(parse::read_instance(&args.instance)?);
    info!(
        "Loaded {} with {} depots, {} customers and {} vehicles",
        args.instance.display(),
        problem.depots().len(),
        problem.customers().len(),
        problem.vehicle_count()
    );
    info!("Terminating on {}", termination);

    let mut population = Population::from_config(problem, config)?;

    loop {
        population.tick()?;
        let alpha = population.alpha_individual().ok_or(GaError::EmptyPopulation)?;
        if termination.should_terminate(population.generation(), alpha) {
            break;
        }
    }

    let alpha = population.alpha_individual().ok_or(GaError::EmptyPopulation)?;
    if !alpha.is_valid() {
        warn!("The best solution breaks capacity or duration limits");
    }

    let report = alpha.report();
    info!(
        "Finished after {} generations with duration {:.2}",
        population.generation(),
        report.duration
    );
    println!("{}", report);

    let path = write_report(&report, &args.instance, &args.output, args.json)?;
    info!("Solution written to {}", path.display());

    Ok(())
}
