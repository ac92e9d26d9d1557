//! Hands a generated program to an ns-3 source tree and runs it.
//!
//! The program is copied into `<ns3_dir>/scratch/` and started through the
//! tree's `ns3` driver script, which builds and runs it. The engine output is
//! captured to a log file next to the other artifacts.

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::assembler::AssemblyStage;

/// An ns-3 source tree.
#[derive(Debug, Clone)]
pub struct Ns3Runner {
    /// Root of the ns-3 tree, the directory holding the `ns3` script.
    pub ns3_dir: PathBuf,
}

/// The error type for [`Ns3Runner::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("'{}' is not an ns-3 source tree (no ns3 script found)", .0.display())]
    MissingNs3Dir(PathBuf),

    #[error("ns-3 exited with {status}, see {}", .log_path.display())]
    EngineFailed { status: ExitStatus, log_path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Ns3Runner {
    pub fn new(ns3_dir: impl Into<PathBuf>) -> Self {
        Ns3Runner { ns3_dir: ns3_dir.into() }
    }

    /// Path the program named `name` is copied to.
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.ns3_dir.join("scratch").join(format!("{}.cc", name))
    }

    /// Copy `program` into the scratch directory, run it, and write the
    /// combined engine output to `log_path`.
    ///
    /// Returns the final stage of the scenario, which is always
    /// [`AssemblyStage::Destroyed`] on success.
    pub fn run(&self, name: &str, program: &Path, log_path: &Path) -> Result<AssemblyStage, RunnerError> {
        if !self.ns3_dir.join("ns3").is_file() {
            return Err(RunnerError::MissingNs3Dir(self.ns3_dir.clone()));
        }

        let scratch = self.scratch_path(name);
        if let Some(parent) = scratch.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(program, &scratch)?;
        info!("Copied {:?} to {:?}", program, scratch);

        // Canonicalize since the driver must run from inside the tree.
        let ns3_dir = fs::canonicalize(&self.ns3_dir)?;
        info!("Starting ns-3: ./ns3 run scratch/{}", name);
        let output = Command::new(ns3_dir.join("ns3"))
            .arg("run")
            .arg(format!("scratch/{}", name))
            .current_dir(&ns3_dir)
            .output()?;

        let mut log = output.stdout;
        log.extend_from_slice(&output.stderr);
        fs::write(log_path, &log)?;

        if !output.status.success() {
            warn!("ns-3 run of '{}' failed with {}", name, output.status);
            return Err(RunnerError::EngineFailed { status: output.status, log_path: log_path.to_path_buf() });
        }

        info!("Simulation '{}' finished, output in {:?}", name, log_path);
        Ok(AssemblyStage::Destroyed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tree_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Ns3Runner::new(dir.path());
        let program = dir.path().join("campus.cc");
        fs::write(&program, "int main() { return 0; }").unwrap();

        let err = runner.run("campus", &program, &dir.path().join("run.log")).unwrap_err();
        assert!(matches!(err, RunnerError::MissingNs3Dir(_)));
        assert!(!runner.scratch_path("campus").exists());
    }

    #[test]
    fn test_scratch_path() {
        let runner = Ns3Runner::new("/opt/ns-3-dev");
        assert_eq!(runner.scratch_path("campus"), PathBuf::from("/opt/ns-3-dev/scratch/campus.cc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_stub_driver() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let driver = dir.path().join("ns3");
        fs::write(&driver, "#!/bin/sh\necho \"ran $2\"\n").unwrap();
        fs::set_permissions(&driver, fs::Permissions::from_mode(0o755)).unwrap();

        let program = dir.path().join("echo.cc");
        fs::write(&program, "// program").unwrap();
        let log_path = dir.path().join("run.log");

        let runner = Ns3Runner::new(dir.path());
        let stage = runner.run("echo", &program, &log_path).unwrap();
        assert_eq!(stage, AssemblyStage::Destroyed);
        assert!(runner.scratch_path("echo").is_file());
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "ran scratch/echo\n");
    }
}
