use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use csvmesh_core::convert::error_chain;
use csvmesh_core::{ConversionReport, ConversionTask};

use crate::args::CliArgs;
use crate::error::AppError;

/// How often the worker's completion channel is polled.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How often a "still converting" status line is logged.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(2);

/// Run the command line front-end and map the outcome to an exit code.
pub fn run(args: CliArgs) -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();
    log::debug!("csv2fbx v{} (core v{})", crate::VERSION, csvmesh_core::VERSION);

    match execute(args) {
        Ok(report) => {
            log::info!(
                "Wrote {} ({} bytes, {} vertices, {} triangles)",
                report.output.display(),
                report.bytes_written,
                report.vertex_count,
                report.triangle_count
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Error converting CSV to FBX: {}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}

/// Resolve options, run the conversion on a worker thread and wait for it.
pub fn execute(args: CliArgs) -> Result<ConversionReport, AppError> {
    let options = args.into_options()?;
    log::info!(
        "Converting {} -> {} ({:?})",
        options.input.display(),
        options.output.display(),
        options.format
    );

    let mut task = ConversionTask::spawn(options).map_err(AppError::Spawn)?;
    let started = Instant::now();
    let mut last_status = started;

    loop {
        if let Some(result) = task.try_result() {
            log::debug!("conversion finished in {:.2?}", started.elapsed());
            return Ok(result?);
        }
        if last_status.elapsed() >= STATUS_INTERVAL {
            log::info!("Still converting ({:.0?} elapsed)", started.elapsed());
            last_status = Instant::now();
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use csvmesh_core::ConvertError;
    use std::fs;

    fn args(list: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("csv2fbx").chain(list.iter().copied())).unwrap()
    }

    #[test]
    fn execute_writes_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("tri.csv");
        fs::write(&input, "h\n0,0,0,0,0\n1,0,1,0,0\n2,0,0,1,0\n").unwrap();

        let report = execute(args(&[
            input.to_str().unwrap(),
            "--no-normal",
            "--no-uv0",
            "--binary",
        ]))
        .unwrap();

        assert_eq!(report.output, dir.path().join("tri.fbx"));
        assert_eq!(report.triangle_count, 1);
        assert!(report.output.exists());
    }

    #[test]
    fn execute_reports_conversion_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("missing.csv");

        let err = execute(args(&[input.to_str().unwrap()])).unwrap_err();

        assert!(matches!(err, AppError::Convert(ConvertError::Table(_))));
        assert!(!dir.path().join("missing.fbx").exists());
    }
}
