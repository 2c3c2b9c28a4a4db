
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::ffi::{OsStr, OsString};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use vmt::translator::codegen::CodeWriter;
use vmt::translator::parser;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Debug: {}\n\tOutfile: {}\n\tInput: {}",
        match args.occurrences_of("verbose") {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.is_present("print-debug"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap()
    );

    let input = Path::new(args.value_of("INPUT").unwrap());

    // A .vm file is translated alone; a directory contributes every .vm
    // file directly inside it.
    let sources = match discover_sources(input) {
        Err(err) => {
            error!("fatal: unable to read input `{}`: {}", input.display(), err);
            std::process::exit(1);
        },
        Ok(sources) => sources,
    };
    if sources.is_empty() {
        error!("fatal: no .vm files found at `{}`", input.display());
        std::process::exit(1);
    }

    let opath = output_path(&args, input);

    let mut writer = CodeWriter::new();
    let mut listing: Vec<String> = Vec::new();
    let mut rows: Vec<(String, String, usize)> = Vec::new();

    listing.extend(writer.write_bootstrap());

    for path in &sources {
        let module = match path.file_stem().and_then(OsStr::to_str) {
            Some(stem) => stem.to_string(),
            None => {
                error!("fatal: `{}` has no usable file stem", path.display());
                std::process::exit(1);
            },
        };
        writer.set_module(&module);
        info!("translating module {} from `{}`", module, path.display());

        let source = match fs::read_to_string(path) {
            Err(err) => {
                error!("fatal: unable to read input file `{}`: {}", path.display(), err);
                std::process::exit(1);
            },
            Ok(source) => source,
        };

        for (num, line) in source.lines().enumerate() {
            let command = match parser::parse_line(line) {
                Err(err) => {
                    error!("{}:{}: {}", path.display(), num + 1, err);
                    std::process::exit(1);
                },
                Ok(None) => continue,
                Ok(Some(command)) => command,
            };

            let block = match writer.write(&command) {
                Err(err) => {
                    error!("{}:{}: {}", path.display(), num + 1, err);
                    std::process::exit(1);
                },
                Ok(block) => block,
            };

            if args.is_present("print-debug") {
                rows.push((format!("{}:{}:", module, num + 1), command.to_string(), block.len()));
            }
            listing.extend(block);
        }
    }

    if args.is_present("print-debug") {
        let mut grid = Grid::new(GridOptions {
            filling:     Filling::Spaces(1),
            direction:   Direction::LeftToRight,
        });

        for (pos, command, size) in rows.iter() {
            grid.add(Cell::from(pos.clone()));
            grid.add(Cell::from(command.clone()));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(format!("{} instructions", size)));
        }

        println!("{}", grid.fit_into_columns(4));
    }

    let mut ofile = match File::create(&opath) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", opath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    for instruction in listing.iter() {
        if let Err(err) = writeln!(ofile, "{}", instruction) {
            error!("fatal: unable to write to output file `{}`: {}", opath.display(), err);
            std::process::exit(1);
        }
    }
}

fn discover_sources(input: &Path) -> std::io::Result<Vec<PathBuf>> {
    if input.is_file() {
        if is_vm_file(input) {
            return Ok(vec![input.to_path_buf()]);
        }
        return Ok(vec![]);
    }

    let mut sources: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_vm_file(path))
        .collect();
    // Name order keeps the output deterministic across runs.
    sources.sort();
    Ok(sources)
}

fn is_vm_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("vm"))
        .unwrap_or(false)
}

fn output_path(args: &ArgMatches, input: &Path) -> PathBuf {
    if let Some(filename) = args.value_of("output") {
        return PathBuf::from(filename);
    }

    if input.is_dir() {
        let mut name = input
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from("out"));
        name.push(".asm");
        input.join(name)
    } else {
        input.with_extension("asm")
    }
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input .vm file or directory of .vm files")
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
            .help("write output to an outfile"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints a per-command translation summary to STDOUT"))
        .get_matches()
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
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stdout())
        .apply().ok();
}
