use std::{
    io::{BufRead, IsTerminal, Write},
    path::PathBuf,
};

use clap::Parser;
use miette::{IntoDiagnostic, LabeledSpan, Report};
use tracing_subscriber::EnvFilter;
use vector_calc::{
    evaluate, lexer::Lexer, perform_assignment, plot, scope::Scope, SymbolTable, Vector,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Input {
    /// A file with one expression or assignment per line. Without this or
    /// --eval, lines are read from standard input.
    filename: Option<PathBuf>,

    /// An expression or assignment to run before the file. May be repeated.
    #[clap(short, long = "eval", value_name = "EXPR")]
    eval: Vec<String>,

    /// Debug the lexer, printing out each token. Does not evaluate anything.
    #[clap(long, default_value = "false")]
    debug_lexer: bool,

    /// After running all inputs, sample the named function.
    #[clap(long, value_name = "NAME")]
    plot: Option<String>,

    /// Start of the sampled range.
    #[clap(long, default_value_t = -10.0, allow_negative_numbers = true)]
    from: f64,

    /// End of the sampled range.
    #[clap(long, default_value_t = 10.0, allow_negative_numbers = true)]
    to: f64,

    /// Number of samples.
    #[clap(long, default_value_t = 41)]
    samples: usize,

    /// After running all inputs, print the variable and function tables.
    #[clap(long, default_value = "false")]
    list: bool,

    /// Log what the evaluator is doing.
    #[clap(short, long, default_value = "false")]
    verbose: bool,
}

fn main() -> miette::Result<()> {
    let input = Input::parse();
    init_logging(input.verbose);

    let mut lines = input.eval.clone();
    if let Some(filename) = &input.filename {
        let source = std::fs::read_to_string(filename).into_diagnostic()?;
        lines.extend(source.lines().map(str::to_string));
    }

    let mut session = Session::new(input.debug_lexer);
    if lines.is_empty() && input.filename.is_none() {
        session.run_interactive()?;
    } else {
        for line in &lines {
            session.run_line(line, &mut std::io::stdout()).into_diagnostic()?;
        }
    }

    if let Some(name) = &input.plot {
        run_plot(&session.symbols, name, input.from, input.to, input.samples)?;
    }
    if input.list {
        print_tables(&session.symbols);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{filter::LevelFilter, fmt::Layer, prelude::*};

    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(Layer::new().with_writer(std::io::stderr).with_filter(filter))
        .init();
}

struct Session {
    symbols: SymbolTable,
    last_result: Option<Vector>,
    debug_lexer: bool,
}

impl Session {
    fn new(debug_lexer: bool) -> Self {
        Self {
            symbols: SymbolTable::new(),
            last_result: None,
            debug_lexer,
        }
    }

    fn run_interactive(&mut self) -> miette::Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let prompt = stdin.is_terminal();

        loop {
            if prompt {
                write!(stdout, "> ").into_diagnostic()?;
                stdout.flush().into_diagnostic()?;
            }

            let mut line = String::new();
            if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
                return Ok(());
            }
            self.run_line(line.trim_end_matches(['\r', '\n']), &mut stdout)
                .into_diagnostic()?;
        }
    }

    /// Runs one line. Every line counts as finished, so assignments commit.
    /// A variable assignment shows the stored value, a function definition
    /// shows itself.
    fn run_line(&mut self, line: &str, out: &mut impl Write) -> std::io::Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        // Assignment diagnostics point into the right-hand side.
        let source = line.split_once('=').map_or(line, |(_, rhs)| rhs);
        if self.debug_lexer {
            run_debug_lexer(source);
            return Ok(());
        }

        let result = match line.split_once('=') {
            Some((target, _)) => perform_assignment(&mut self.symbols, &format!("{line}\n"))
                .map(|_| self.committed(target)),
            None => evaluate(&self.symbols, line).map(Shown::Value),
        };

        match result {
            Ok(Shown::Value(value)) => {
                writeln!(out, "{}", value)?;
                self.last_result = Some(value);
            }
            Ok(Shown::Definition(description)) => writeln!(out, "{}", description)?,
            Err(e) => {
                eprintln!("{:?}", Report::new(e).with_source_code(source.to_string()));
                if let Some(last) = &self.last_result {
                    writeln!(out, "{} (last good result)", last)?;
                }
            }
        }

        Ok(())
    }

    /// What a successful assignment to `target` left in the table.
    fn committed(&self, target: &str) -> Shown {
        let name = target.split('(').next().unwrap_or_default().trim();
        let function = self.symbols.function(name).filter(|_| target.contains('('));
        match (function, self.symbols.variable(name)) {
            (Some(function), _) => Shown::Definition(function.description().to_string()),
            (None, Some(value)) => Shown::Value(value.clone()),
            (None, None) => Shown::Definition(name.to_string()),
        }
    }
}

enum Shown {
    Value(Vector),
    Definition(String),
}

fn run_debug_lexer(source: &str) {
    for lexeme in Lexer::new(source) {
        match lexeme {
            Ok(l) => {
                let diag = miette::miette!(
                    labels = vec![LabeledSpan::at(l.span.start..l.span.end, format!("{:?}", l.token))],
                    severity = miette::Severity::Advice,
                    "found a token",
                )
                .with_source_code(source.to_string());
                eprintln!("{:?}", diag);
            }
            Err(e) => {
                eprintln!("{:?}", Report::new(e).with_source_code(source.to_string()));
                return;
            }
        }
    }
}

fn run_plot(symbols: &SymbolTable, name: &str, from: f64, to: f64, count: usize) -> miette::Result<()> {
    let function = symbols
        .function(name)
        .ok_or_else(|| miette::miette!("no function named '{}'", name))?;

    for sample in plot::sample(name, function, symbols, from..=to, count) {
        match sample.y {
            Some(y) => println!("{}\t{}", sample.x, y),
            None => println!("{}\tnull", sample.x),
        }
    }

    Ok(())
}

fn print_tables(symbols: &SymbolTable) {
    println!("Variables");
    for (name, value) in symbols.variables() {
        println!("  {} = {}", name, value);
    }

    println!("Functions");
    for (_, function) in symbols.functions() {
        println!("  {}", function.description());
    }
}
