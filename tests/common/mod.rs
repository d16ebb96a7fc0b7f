// SPDX-License-Identifier: AGPL-3.0-or-later

// Shared helpers: a throwaway workspace with a scripted stand-in for
// commit-check, and a way to run the action binary against it.
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn summary_path(&self) -> PathBuf {
        self.path().join("step-summary.md")
    }

    pub fn result_path(&self) -> PathBuf {
        self.path().join("result.txt")
    }

    pub fn summary(&self) -> String {
        std::fs::read_to_string(self.summary_path()).unwrap_or_default()
    }

    /// Install a checker that prints `output` and exits with `exit_code`
    #[cfg(unix)]
    pub fn checker(&self, output: &str, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let output_path = self.path().join("checker-output.txt");
        std::fs::write(&output_path, output).expect("write checker output");

        let script = self.path().join("commit-check");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$@\" > '{}'\ncat '{}'\nexit {}\n",
                self.path().join("checker-args.txt").display(),
                output_path.display(),
                exit_code
            ),
        )
        .expect("write checker script");
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    /// Arguments the scripted checker was called with
    pub fn checker_args(&self) -> String {
        std::fs::read_to_string(self.path().join("checker-args.txt"))
            .unwrap_or_default()
            .trim_end()
            .to_string()
    }

    /// The action binary with a clean environment pointed at this workspace
    pub fn action(&self, checker: &Path) -> Command {
        let mut cmd = Command::cargo_bin("commit-check-action").expect("binary built");
        cmd.env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("GITHUB_STEP_SUMMARY", self.summary_path())
            .current_dir(self.path())
            .arg("--checker")
            .arg(checker)
            .arg("--result-file")
            .arg(self.result_path());
        cmd
    }
}
