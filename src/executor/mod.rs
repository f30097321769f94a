mod output;

pub use output::OutputBuffer;

use std::panic::{catch_unwind, AssertUnwindSafe};

use rustpython_vm::{
    builtins::PyBaseExceptionRef, compiler::Mode, function::FuncArgs, AsObject, Interpreter,
    PyObjectRef, PyResult, Settings, VirtualMachine,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of one script run.
///
/// This is the only value that crosses the system boundary back to the
/// caller; it serializes directly to the wire envelope:
///
/// ```json
/// { "status": "success", "result": "<captured stdout>" }
/// { "status": "error",   "error_message": "<failure description>" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ExecutionResult {
    #[serde(rename = "success")]
    Success {
        #[serde(rename = "result")]
        output: String,
    },
    #[serde(rename = "error")]
    Failure {
        #[serde(rename = "error_message")]
        message: String,
    },
}

/// Runs one untrusted Python script to completion and reports its stdout
/// text or its failure.
///
/// No fault escapes [`ScriptExecutor::execute`]: syntax errors, runtime
/// exceptions, recursion-depth errors and even panics inside the embedded VM
/// all come back as [`ExecutionResult::Failure`].
///
/// Provides no sandboxing beyond the fresh scope. The script runs with the
/// host process's privileges, with no time or memory bound; a non-terminating
/// script blocks the invocation indefinitely.
#[derive(Debug, Default)]
pub struct ScriptExecutor;

impl ScriptExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute `script` against a fresh, empty binding scope.
    ///
    /// Every invocation gets its own interpreter and its own output sink, so
    /// nothing (bound names, partial output, the replaced `sys.stdout`) can
    /// leak between runs, and the host process stdout is never redirected.
    pub fn execute(&self, script: &str) -> ExecutionResult {
        debug!(script_len = script.len(), "Executing script");

        let outcome = catch_unwind(AssertUnwindSafe(|| run_script(script)));

        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!("Embedded interpreter panicked during execution");
                ExecutionResult::Failure {
                    message: "internal interpreter fault".to_string(),
                }
            }
        }
    }
}

/// One full interpreter lifecycle: build VM, install the output sink,
/// compile, run, collect.
fn run_script(script: &str) -> ExecutionResult {
    let sink = OutputBuffer::new();

    let interpreter = Interpreter::with_init(Settings::default(), |vm| {
        // Native (Rust-implemented) stdlib modules: math, _json, re, etc.
        vm.add_native_modules(rustpython_stdlib::get_module_inits());
    });

    interpreter.enter(|vm| {
        install_output_sink(vm, sink.clone());

        // Compile first so syntax errors are reported before any statement runs.
        let code = match vm.compile(script, Mode::Exec, "<script>".to_owned()) {
            Ok(code) => code,
            Err(err) => {
                debug!(error = %err, "Script failed to compile");
                return ExecutionResult::Failure {
                    message: err.to_string(),
                };
            }
        };

        let scope = vm.new_scope_with_builtins();
        match vm.run_code_obj(code, scope) {
            Ok(_) => ExecutionResult::Success {
                output: sink.contents(),
            },
            Err(exc) => {
                let message = describe_exception(vm, &exc);
                debug!(error = %message, "Script raised an exception");
                // Partial output is discarded on fault; only the message goes back.
                ExecutionResult::Failure { message }
            }
        }
    })
}

/// Point the throwaway VM's `sys.stdout` at the per-invocation sink.
///
/// `print()` resolves to `sys.stdout.write(...)`, so a namespace object with
/// a `write`/`flush` pair is all the capture needs. Only this VM's stdout is
/// replaced; the host channel is untouched on every exit path.
fn install_output_sink(vm: &VirtualMachine, sink: OutputBuffer) {
    let write_fn = vm.new_function(
        "write",
        move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            let chunk: String = args
                .args
                .first()
                .and_then(|obj| obj.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();
            sink.push(&chunk);
            Ok(vm.ctx.new_int(chunk.len()).into())
        },
    );

    let flush_fn = vm.new_function(
        "flush",
        move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> { Ok(vm.ctx.none()) },
    );

    // A module works as a plain writable namespace.
    let writer = vm.new_module("<stdout>", vm.ctx.new_dict(), None);
    let _ = writer.set_attr("write", write_fn, vm);
    let _ = writer.set_attr("flush", flush_fn, vm);
    // Some scripts probe these before writing.
    let _ = writer.set_attr("closed", vm.ctx.new_bool(false), vm);
    let _ = writer.set_attr("encoding", vm.ctx.new_str("utf-8"), vm);

    let _ = vm.sys_module.set_attr("stdout", writer, vm);
}

/// Turn a Python exception into the human-readable message the caller sees.
///
/// Mirrors Python's `str(e)`: "division by zero", "name 'x' is not defined".
/// Total: a message-less exception (e.g. `raise Exception()`) still yields a
/// non-empty description.
fn describe_exception(vm: &VirtualMachine, exc: &PyBaseExceptionRef) -> String {
    let message = exc
        .as_object()
        .str(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default();

    if message.is_empty() {
        "unhandled Python exception".to_string()
    } else {
        message
    }
}
