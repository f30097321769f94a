use std::io::{BufRead, Read};

use tracing::info;

use crate::cli::args::{ExecArgs, InvokeArgs, OutputFormat};
use crate::error::{PyletError, Result};
use crate::executor::{ExecutionResult, ScriptExecutor};
use crate::handler::{self, RequestContext};

/// Handle one invocation event and print the response envelope
pub fn invoke(args: InvokeArgs, format: OutputFormat) -> Result<()> {
    let event = load_event(&args)?;
    let response = handler::handle(&event, &RequestContext::default());
    print_response(&response, format)
}

/// Execute a script given inline or from a file
pub fn exec(args: ExecArgs, format: OutputFormat) -> Result<()> {
    let script = resolve_script(args)?;
    let result = ScriptExecutor::new().execute(&script);
    print_response(&result, format)
}

/// Sequential event loop: one JSON event per input line, one envelope per
/// output line. Events are handled strictly one at a time, so no two
/// executions ever overlap within one process.
pub fn serve() -> Result<()> {
    info!("Serving events from stdin");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(event) => handler::handle(&event, &RequestContext::default()),
            Err(e) => ExecutionResult::Failure {
                message: format!("malformed event: {}", e),
            },
        };
        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(())
}

/// Read the invocation event from the given file, or stdin if none was given.
fn load_event(args: &InvokeArgs) -> Result<serde_json::Value> {
    let raw = match &args.event {
        Some(path) => {
            if !path.exists() {
                return Err(PyletError::EventNotFound {
                    path: path.display().to_string(),
                });
            }
            std::fs::read_to_string(path)?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    serde_json::from_str(&raw).map_err(|e| PyletError::MalformedEvent(e.to_string()))
}

/// Pick the script source: inline text wins over --file.
fn resolve_script(args: ExecArgs) -> Result<String> {
    match (args.script, args.file) {
        (Some(script), _) => Ok(script),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Err(PyletError::ScriptMissing),
    }
}

fn print_response(result: &ExecutionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
        OutputFormat::Text => match result {
            ExecutionResult::Success { output } => print!("{}", output),
            ExecutionResult::Failure { message } => eprintln!("error: {}", message),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_load_event_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"script": "print(1)"}}"#).unwrap();

        let args = InvokeArgs {
            event: Some(file.path().to_path_buf()),
        };
        let event = load_event(&args).unwrap();
        assert_eq!(event["script"], "print(1)");
    }

    #[test]
    fn test_load_event_missing_file() {
        let args = InvokeArgs {
            event: Some(PathBuf::from("/no/such/event.json")),
        };
        assert!(matches!(
            load_event(&args),
            Err(PyletError::EventNotFound { .. })
        ));
    }

    #[test]
    fn test_load_event_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let args = InvokeArgs {
            event: Some(file.path().to_path_buf()),
        };
        assert!(matches!(
            load_event(&args),
            Err(PyletError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_resolve_script_prefers_inline() {
        let args = ExecArgs {
            script: Some("print('inline')".to_string()),
            file: None,
        };
        assert_eq!(resolve_script(args).unwrap(), "print('inline')");
    }

    #[test]
    fn test_resolve_script_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "print('from file')").unwrap();

        let args = ExecArgs {
            script: None,
            file: Some(file.path().to_path_buf()),
        };
        assert_eq!(resolve_script(args).unwrap(), "print('from file')");
    }

    #[test]
    fn test_resolve_script_requires_a_source() {
        let args = ExecArgs {
            script: None,
            file: None,
        };
        assert!(matches!(resolve_script(args), Err(PyletError::ScriptMissing)));
    }
}
