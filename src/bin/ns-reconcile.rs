#![deny(unsafe_code)]

use std::{env, process::ExitCode};

#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    cli::run(env::args_os())
}

#[cfg(test)]
mod tests {
    use std::process::{Command, Stdio};

    #[test]
    fn binary_name_matches_cargo_package() {
        assert_eq!(env!("CARGO_BIN_NAME"), "ns-reconcile");
    }

    #[test]
    fn help_flag_does_not_panic() {
        // Smoke-checks that the binary links and clap's generated --help
        // path runs to completion under the real process entry point,
        // not just `cli::run` in-process.
        let output = Command::new(env!("CARGO_BIN_EXE_ns-reconcile")).arg("--help").stdout(Stdio::piped()).stderr(Stdio::piped()).output().expect("failed to run ns-reconcile --help");
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("Namespace scanner"));
    }
}
