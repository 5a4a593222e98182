use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitCode};

use envline::{EnvLoader, TargetEnv};
use tracing::level_filters::LevelFilter;

const USAGE: &str = "usage: envline [-f FILE]... [-v] [--] COMMAND [ARGS...]";

/// Parsed command line: env files to load and the command to run with them.
#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    files: Vec<PathBuf>,
    verbose: bool,
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self, String> {
        let mut args = args.into_iter();
        let mut files = Vec::new();
        let mut verbose = false;

        let program = loop {
            let Some(arg) = args.next() else {
                return Err("no command given".to_owned());
            };
            match arg.to_str() {
                Some("-f" | "--file") => {
                    let file = args.next().ok_or("`--file` needs a path")?;
                    files.push(PathBuf::from(file));
                }
                Some("-v" | "--verbose") => verbose = true,
                Some("--") => break args.next().ok_or("no command given")?,
                Some(flag) if flag.starts_with('-') => {
                    return Err(format!("unknown flag `{flag}`"));
                }
                _ => break arg,
            }
        };

        Ok(Self {
            files,
            verbose,
            program,
            args: args.collect(),
        })
    }
}

fn main() -> ExitCode {
    let invocation = match Invocation::parse(std::env::args_os().skip(1)) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("envline: {message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if invocation.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        })
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let mut loader = EnvLoader::new()
        .paths(&invocation.files)
        .target(TargetEnv::memory());
    if let Err(err) = loader.load() {
        eprintln!("envline: {err}");
        return ExitCode::FAILURE;
    }
    let loaded = loader.into_target().into_memory().unwrap_or_default();

    let status = Command::new(&invocation.program)
        .args(&invocation.args)
        .envs(loaded)
        .status();
    match status {
        Ok(status) => status
            .code()
            .and_then(|code| u8::try_from(code).ok())
            .map_or(ExitCode::FAILURE, ExitCode::from),
        Err(err) => {
            eprintln!(
                "envline: cannot run `{}`: {err}",
                invocation.program.to_string_lossy()
            );
            ExitCode::FAILURE
        }
    }
}
