use anyhow::Context;
use calcplot::calculator::{self, ArithmeticOp, CalculatorRequest};
use calcplot::graph::{self, GraphRequest};
use calcplot::population::{self, ChoroplethRenderer, ColorMode, ColumnRoles, JsonChoroplethRenderer};
use calcplot::{logging, ChartFormat, Config, Error};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// calcplot - calculator, function plotter and population map data
#[derive(Parser)]
#[command(name = "calcplot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Elementary calculator, restricted function plotter and population share tables")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter (RUST_LOG takes precedence)
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, subtract, multiply or divide two numbers
    Arith {
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        a: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        b: f64,
        #[arg(long, value_enum, default_value_t = OpArg::Add)]
        op: OpArg,
    },
    /// Raise a base to an exponent
    Pow {
        #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
        base: f64,
        #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
        exponent: f64,
    },
    /// Logarithm of a value in a given base
    Log {
        /// Must be greater than 0
        #[arg(long, default_value_t = 8.0, allow_negative_numbers = true)]
        value: f64,
        /// Must be greater than 0 and not equal to 1
        #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
        base: f64,
    },
    /// Remainder of a modulo n
    Mod {
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        a: i64,
        /// Positive modulus
        #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
        n: i64,
    },
    /// Test whether a ≡ b (mod n)
    Congruent {
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        a: i64,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        b: i64,
        /// Positive modulus
        #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
        n: i64,
    },
    /// Sample a function of x and write the line chart data
    Graph {
        /// Expression in x, e.g. "sin(x) * x**2"
        expression: String,
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,
        #[arg(long)]
        samples: Option<usize>,
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Write to a file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Build choropleth data from a population CSV
    Population {
        /// CSV file with a header row
        csv: PathBuf,
        /// Year to show, defaults to the latest selectable year
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_enum, default_value_t = ModeArg::Share)]
        mode: ModeArg,
        #[arg(long)]
        country_column: Option<String>,
        #[arg(long)]
        year_column: Option<String>,
        #[arg(long)]
        population_column: Option<String>,
        /// Print the selectable years and exit
        #[arg(long)]
        list_years: bool,
        /// Write to a file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OpArg {
    Add,
    Sub,
    Mul,
    Div,
}

impl From<OpArg> for ArithmeticOp {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Add => ArithmeticOp::Add,
            OpArg::Sub => ArithmeticOp::Sub,
            OpArg::Mul => ArithmeticOp::Mul,
            OpArg::Div => ArithmeticOp::Div,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ChartFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ChartFormat::Json,
            FormatArg::Csv => ChartFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Percentage of the year's total
    Share,
    /// Population bins
    Binned,
}

impl From<ModeArg> for ColorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Share => ColorMode::Share,
            ModeArg::Binned => ColorMode::Binned,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    logging::init(cli.log.as_deref().unwrap_or(&config.log.filter));

    // Each command is one request; its errors end here as a message.
    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn output(path: Option<&Path>) -> Result<Box<dyn Write>, Error> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                Error::DataFormatError(format!("cannot create {}: {}", path.display(), err))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn run(command: Commands, config: &Config) -> Result<(), Error> {
    let request = match command {
        Commands::Arith { a, b, op } => CalculatorRequest::Arithmetic { a, b, op: op.into() },
        Commands::Pow { base, exponent } => CalculatorRequest::Power { base, exponent },
        Commands::Log { value, base } => CalculatorRequest::Logarithm { value, base },
        Commands::Mod { a, n } => CalculatorRequest::Remainder { a, n },
        Commands::Congruent { a, b, n } => CalculatorRequest::Congruence { a, b, n },
        Commands::Graph {
            expression,
            min,
            max,
            samples,
            format,
            output: path,
        } => {
            let mut request = GraphRequest::new(expression, &config.graph);
            request.min = min.unwrap_or(request.min);
            request.max = max.unwrap_or(request.max);
            request.samples = samples.unwrap_or(request.samples);

            let format = ChartFormat::from(format);
            graph::plot_to(&request, &config.graph, || {
                Ok(format.emitter(output(path.as_deref())?))
            })?;
            return Ok(());
        }
        Commands::Population {
            csv,
            year,
            mode,
            country_column,
            year_column,
            population_column,
            list_years,
            output: path,
        } => {
            let defaults = ColumnRoles::from_config(&config.population);
            let roles = ColumnRoles {
                country: country_column.unwrap_or(defaults.country),
                year: year_column.unwrap_or(defaults.year),
                population: population_column.unwrap_or(defaults.population),
            };
            return run_population(&csv, &roles, year, mode.into(), list_years, path.as_deref(), config);
        }
    };

    let outcome = calculator::execute(&request)?;
    if outcome.is_positive() {
        println!("{}", outcome);
    } else {
        eprintln!("{}", outcome);
    }
    Ok(())
}

fn run_population(
    csv: &Path,
    roles: &ColumnRoles,
    year: Option<i32>,
    mode: ColorMode,
    list_years: bool,
    path: Option<&Path>,
    config: &Config,
) -> Result<(), Error> {
    let allowed = &config.population.allowed_years;
    let records = population::load_csv_path(csv, roles)?;
    let years = population::selectable_years(&records, allowed);

    if list_years {
        for year in &years {
            println!("{}", year);
        }
        return Ok(());
    }

    let year = match year.or_else(|| years.iter().next_back().copied()) {
        Some(year) => year,
        None => {
            return Err(Error::DataFormatError(
                "the data has no rows for any selectable year".into(),
            ))
        }
    };
    let data = population::build_choropleth(&records, year, mode, allowed)?;
    JsonChoroplethRenderer::new(output(path)?).render(&data)
}
