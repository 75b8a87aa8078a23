extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use assembler::Program;

/// Extension given to the output file when `-o` is not used.
const OUTPUT_EXTENSION: &str = "hack";

// Exit codes, one per failure the user can tell apart.
const EXIT_INPUT: i32 = 1;
const EXIT_ASSEMBLY: i32 = 2;
const EXIT_CREATE: i32 = 3;
const EXIT_WRITE: i32 = 4;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tOutfile: {}\n\tInfile: {}",
        level_for(args.occurrences_of("verbose")),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap()
    );

    let ipath = Path::new(args.value_of("INPUT").unwrap());

    let ifile = match File::open(&ipath) {
        Err(err) => {
            error!("fatal: unable to open input file `{}`: {}", ipath.display(), err);
            std::process::exit(EXIT_INPUT);
        },
        Ok(file) => file,
    };

    // Assemble fully before touching the output so a failed run leaves nothing behind.
    let program = match assembler::assemble(ifile) {
        Err(err) => {
            error!("fatal: {}: {}", ipath.display(), err);
            std::process::exit(EXIT_ASSEMBLY);
        },
        Ok(program) => program,
    };

    if args.is_present("print-debug") {
        print_listing(&program);
    }

    let opath = output_path(ipath, args.value_of("output"));

    let ofile = match File::create(&opath) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", opath.display(), err);
            std::process::exit(EXIT_CREATE);
        },
        Ok(file) => file,
    };

    if let Err(err) = write_program(&program, BufWriter::new(ofile)) {
        error!("fatal: unable to write to output file `{}`: {}", opath.display(), err);
        std::process::exit(EXIT_WRITE);
    }

    info!("wrote {} word(s) to `{}`", program.instructions.len(), opath.display());
}

/// `-o` wins; otherwise the input path with its extension swapped for `.hack`.
fn output_path(input: &Path, output: Option<&str>) -> PathBuf {
    match output {
        Some(filename) => PathBuf::from(filename),
        None => input.with_extension(OUTPUT_EXTENSION),
    }
}

/// Writes one 16-character binary word per line.
fn write_program<W: Write>(program: &Program, mut out: W) -> std::io::Result<()> {
    for ins in program.instructions.iter() {
        writeln!(out, "{}", ins)?;
    }
    out.flush()
}

fn print_listing(program: &Program) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, (ins, src)) in program.instructions.iter().zip(program.listing.iter()).enumerate() {
        grid.add(Cell::from(format!("{:5}:", idx)));
        grid.add(Cell::from((if ins.is_compute() { "C" } else { "A" }).to_string()));
        grid.add(Cell::from(src.clone()));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(format!("{}", ins)));
    }

    println!("{}", grid.fit_into_columns(5));

    let symbols = program.symbols.resolved();
    if symbols.is_empty() {
        return;
    }

    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (name, symbol) in symbols {
        grid.add(Cell::from(name.to_string()));
        grid.add(Cell::from(format!("{:?}", symbol)));
    }

    println!("{}", grid.fit_into_columns(2));
}

fn process_arguments() -> ArgMatches<'static> {
    cli().get_matches()
}

fn cli() -> App<'static, 'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write output to an outfile (default: INPUT with a .hack extension)"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .long("show")
            .takes_value(false)
            .help("prints the listing and symbol table alongside the assembly to STDOUT"))
}

fn level_for(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level_for(verbosity))
        .chain(std::io::stdout())
        .apply().ok();
}
