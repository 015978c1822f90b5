//! The setup sequence: create, activate, upgrade pip, install the manifest.
//!
//! Steps run strictly in order and the first failure ends the run. Nothing is
//! retried or rolled back; a re-run simply reattempts every step, which the
//! venv and pip tools tolerate on an existing environment.

use std::path::Path;
use std::time::{Duration, Instant};

use envsetup_core::config::SetupConfig;
use envsetup_core::observability;

use crate::command::{CommandRunner, ToolCommand, ToolStatus};
use crate::error::{Result, SetupError};
use crate::info_log;
use crate::interpreter::{resolve_interpreter, Interpreter};
use crate::layout::{ActiveEnv, EnvLayout};
use crate::manifest::Manifest;
use crate::steps::Step;

/// A step that completed.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: Step,
    pub duration: Duration,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub env: ActiveEnv,
    pub manifest: Manifest,
    pub steps: Vec<StepOutcome>,
}

impl SetupReport {
    /// One line per completed step with its wall time, then the install count.
    pub fn summary(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .steps
            .iter()
            .map(|o| {
                format!(
                    "[{}/{}] {} {:.1}s",
                    o.step.index(),
                    Step::ALL.len(),
                    o.step,
                    o.duration.as_secs_f64()
                )
            })
            .collect();
        lines.push(format!(
            "{} requirement(s) from {} into {}",
            self.manifest.requirements().count(),
            self.manifest.path.display(),
            self.env.root.display()
        ));
        lines
    }

    pub fn log_summary(&self) {
        for line in self.summary() {
            info_log!("{}", line);
        }
    }
}

/// What a step would do, for `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub step: Step,
    pub action: String,
}

/// `<python> -m venv <env_dir>`
pub fn create_command(interpreter: &Interpreter, env_dir: &Path) -> ToolCommand {
    ToolCommand::new(&interpreter.program)
        .args(interpreter.args.iter().cloned())
        .args(["-m", "venv"])
        .arg(env_dir)
}

/// `<env python> -m pip install --upgrade pip`
pub fn upgrade_command(env_python: &Path) -> ToolCommand {
    ToolCommand::new(env_python).args(["-m", "pip", "install", "--upgrade", "pip"])
}

/// `<env python> -m pip install -r <manifest>`
pub fn install_command(env_python: &Path, manifest: &Path) -> ToolCommand {
    ToolCommand::new(env_python)
        .args(["-m", "pip", "install", "-r"])
        .arg(manifest)
}

fn millis(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}

pub struct SetupRunner<R> {
    config: SetupConfig,
    runner: R,
}

impl<R: CommandRunner> SetupRunner<R> {
    pub fn new(config: SetupConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    /// Run all four steps, stopping at the first failure.
    pub fn run(&self) -> Result<SetupReport> {
        let started = Instant::now();
        observability::audit_setup_started(
            &self.config.env_dir.to_string_lossy(),
            &self.config.manifest.to_string_lossy(),
            &self.config.python,
        );

        let result = self.run_steps();

        let exit_code = result.as_ref().map_or_else(SetupError::exit_code, |_| 0);
        observability::audit_setup_finished(exit_code, millis(started.elapsed()));
        if result.is_ok() {
            info_log!(
                "Environment ready at {} ({:.1}s)",
                self.config.env_dir.display(),
                started.elapsed().as_secs_f64()
            );
        }
        result
    }

    fn run_steps(&self) -> Result<SetupReport> {
        let mut steps = Vec::with_capacity(Step::ALL.len());
        self.timed(Step::CreateEnvironment, &mut steps, || self.create_environment())?;
        let env = self.timed(Step::ActivateEnvironment, &mut steps, || {
            self.activate_environment()
        })?;
        self.timed(Step::UpgradeInstaller, &mut steps, || self.upgrade_installer(&env))?;
        let manifest = self.timed(Step::InstallDependencies, &mut steps, || {
            self.install_dependencies(&env)
        })?;
        Ok(SetupReport {
            env,
            manifest,
            steps,
        })
    }

    fn timed<T>(
        &self,
        step: Step,
        outcomes: &mut Vec<StepOutcome>,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        info_log!("[{}/{}] {}", step.index(), Step::ALL.len(), step);
        let started = Instant::now();
        let result = f();
        let duration = started.elapsed();

        match &result {
            Ok(_) => {
                observability::audit_step_finished(step.name(), step.index(), 0, millis(duration));
                outcomes.push(StepOutcome { step, duration });
            }
            Err(e) => {
                observability::audit_step_finished(
                    step.name(),
                    step.index(),
                    e.exit_code(),
                    millis(duration),
                );
                tracing::debug!("[{}] stopped: {}", step, e);
            }
        }
        result
    }

    fn exec(&self, step: Step, cmd: &ToolCommand) -> Result<()> {
        let status = self
            .runner
            .run(step, cmd)
            .map_err(|source| SetupError::Spawn {
                step,
                program: cmd.program_display(),
                source,
            })?;
        match status {
            ToolStatus::Success | ToolStatus::Exited(0) => Ok(()),
            ToolStatus::Exited(code) => Err(SetupError::CommandFailed {
                step,
                program: cmd.program_display(),
                code,
            }),
            ToolStatus::Signaled(signal) => Err(SetupError::Terminated {
                step,
                program: cmd.program_display(),
                signal,
            }),
        }
    }

    fn create_environment(&self) -> Result<()> {
        let interpreter = resolve_interpreter(&self.config.python)?;
        self.exec(
            Step::CreateEnvironment,
            &create_command(&interpreter, &self.config.env_dir),
        )
    }

    fn activate_environment(&self) -> Result<ActiveEnv> {
        let env = EnvLayout::new(&self.config.env_dir).activate()?;
        tracing::debug!("Using {}", env.python.display());
        Ok(env)
    }

    fn upgrade_installer(&self, env: &ActiveEnv) -> Result<()> {
        self.exec(Step::UpgradeInstaller, &upgrade_command(&env.python))
    }

    fn install_dependencies(&self, env: &ActiveEnv) -> Result<Manifest> {
        // Checked here so a missing manifest is reported as such, not as whatever pip prints.
        let manifest = Manifest::load(&self.config.manifest)?;
        info_log!(
            "Installing {} requirement(s) from {}",
            manifest.requirements().count(),
            manifest.path.display()
        );
        self.exec(
            Step::InstallDependencies,
            &install_command(&env.python, &self.config.manifest),
        )?;
        Ok(manifest)
    }

    /// Describe the run without executing anything. Resolves the host
    /// interpreter, so an unavailable version fails here too.
    pub fn plan(&self) -> Result<Vec<PlannedStep>> {
        let interpreter = resolve_interpreter(&self.config.python)?;
        let env_python = EnvLayout::new(&self.config.env_dir).expected_python();
        Ok(vec![
            PlannedStep {
                step: Step::CreateEnvironment,
                action: create_command(&interpreter, &self.config.env_dir).to_string(),
            },
            PlannedStep {
                step: Step::ActivateEnvironment,
                action: format!("use {}", env_python.display()),
            },
            PlannedStep {
                step: Step::UpgradeInstaller,
                action: upgrade_command(&env_python).to_string(),
            },
            PlannedStep {
                step: Step::InstallDependencies,
                action: install_command(&env_python, &self.config.manifest).to_string(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PYVENV_CFG;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    /// Records every invocation; `python -m venv` lays out a fake environment.
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<(Step, ToolCommand)>>,
        statuses: HashMap<Step, ToolStatus>,
        unstartable: Option<Step>,
        skip_layout: bool,
    }

    impl FakeRunner {
        fn failing(step: Step, status: ToolStatus) -> Self {
            Self {
                statuses: HashMap::from([(step, status)]),
                ..Default::default()
            }
        }

        fn steps(&self) -> Vec<Step> {
            self.calls.borrow().iter().map(|(s, _)| *s).collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, step: Step, cmd: &ToolCommand) -> std::io::Result<ToolStatus> {
            self.calls.borrow_mut().push((step, cmd.clone()));
            if self.unstartable == Some(step) {
                return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
            }
            let status = self.statuses.get(&step).copied().unwrap_or(ToolStatus::Success);
            if step == Step::CreateEnvironment && status == ToolStatus::Success && !self.skip_layout {
                let root = PathBuf::from(cmd.args.last().expect("env dir arg"));
                fs::create_dir_all(root.join("bin"))?;
                fs::write(root.join(PYVENV_CFG), "home = /usr/bin\n")?;
                fs::write(root.join("bin").join("python"), "")?;
            }
            Ok(status)
        }
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        config: SetupConfig,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let python = tmp.path().join("host-python");
        fs::write(&python, "").unwrap();
        let manifest = tmp.path().join("requirements.txt");
        fs::write(&manifest, "requests==2.31.0\n").unwrap();
        let config = SetupConfig {
            env_dir: tmp.path().join("venv"),
            manifest,
            python: python.to_string_lossy().to_string(),
        };
        Fixture { _tmp: tmp, config }
    }

    #[test]
    fn test_success_runs_every_step_in_order() {
        let fx = fixture();
        let fake = FakeRunner::default();
        let report = SetupRunner::new(fx.config.clone(), &fake).run().unwrap();

        assert_eq!(
            fake.steps(),
            vec![
                Step::CreateEnvironment,
                Step::UpgradeInstaller,
                Step::InstallDependencies
            ]
        );
        let reported: Vec<Step> = report.steps.iter().map(|o| o.step).collect();
        assert_eq!(reported, Step::ALL.to_vec());

        let calls = fake.calls.borrow();
        let env_python = fx.config.env_dir.join("bin").join("python");
        assert_eq!(calls[0].1, create_command(&Interpreter::new(&fx.config.python), &fx.config.env_dir));
        assert_eq!(calls[1].1, upgrade_command(&env_python));
        assert_eq!(calls[2].1, install_command(&env_python, &fx.config.manifest));
        assert_eq!(report.env.python, env_python);
    }

    #[test]
    fn test_report_summary_lists_steps_and_requirements() {
        let fx = fixture();
        let fake = FakeRunner::default();
        let report = SetupRunner::new(fx.config.clone(), &fake).run().unwrap();

        let summary = report.summary();
        assert_eq!(summary.len(), Step::ALL.len() + 1);
        assert!(summary[0].starts_with("[1/4] create-environment "));
        assert!(summary[3].starts_with("[4/4] install-dependencies "));
        assert!(summary.iter().take(4).all(|l| l.ends_with('s')));
        assert!(summary[4].starts_with("1 requirement(s) from "));
        assert!(summary[4].ends_with(&fx.config.env_dir.display().to_string()));
    }

    #[test]
    fn test_pinned_manifest_is_passed_to_installer() {
        let fx = fixture();
        let fake = FakeRunner::default();
        let report = SetupRunner::new(fx.config.clone(), &fake).run().unwrap();

        let req = report.manifest.requirements().next().unwrap();
        assert_eq!(req.name, "requests");
        assert_eq!(req.constraint.as_deref(), Some("==2.31.0"));

        let calls = fake.calls.borrow();
        let (_, install) = calls.last().unwrap();
        let args: Vec<_> = install.args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(&args[..4], &["-m", "pip", "install", "-r"]);
        assert_eq!(PathBuf::from(&args[4]), fx.config.manifest);
    }

    #[test]
    fn test_failing_tool_stops_sequence_with_its_status() {
        let cases = [
            (Step::CreateEnvironment, 3, 1),
            (Step::UpgradeInstaller, 2, 2),
            (Step::InstallDependencies, 1, 3),
        ];
        for (failing, code, expected_calls) in cases {
            let fx = fixture();
            let fake = FakeRunner::failing(failing, ToolStatus::Exited(code));
            let err = SetupRunner::new(fx.config.clone(), &fake).run().unwrap_err();

            assert_eq!(err.step(), failing);
            assert_eq!(err.exit_code(), code);
            assert!(err.reported_by_tool());
            let steps = fake.steps();
            assert_eq!(steps.len(), expected_calls, "failing at {failing}");
            assert_eq!(*steps.last().unwrap(), failing);
        }
    }

    #[test]
    fn test_unavailable_interpreter_fails_before_any_tool() {
        let mut fx = fixture();
        fx.config.python = fx
            .config
            .env_dir
            .with_file_name("missing")
            .join("python3.11")
            .to_string_lossy()
            .to_string();
        let fake = FakeRunner::default();
        let err = SetupRunner::new(fx.config.clone(), &fake).run().unwrap_err();

        assert!(matches!(err, SetupError::InterpreterNotFound { .. }));
        assert_eq!(err.exit_code(), 127);
        assert!(fake.steps().is_empty());
        assert!(!fx.config.env_dir.exists());
    }

    #[test]
    fn test_malformed_environment_stops_at_activation() {
        let fx = fixture();
        let fake = FakeRunner {
            skip_layout: true,
            ..Default::default()
        };
        let err = SetupRunner::new(fx.config.clone(), &fake).run().unwrap_err();

        assert!(matches!(err, SetupError::MalformedEnvironment { .. }));
        assert_eq!(err.step(), Step::ActivateEnvironment);
        assert_eq!(fake.steps(), vec![Step::CreateEnvironment]);
    }

    #[test]
    fn test_missing_manifest_never_invokes_install() {
        let fx = fixture();
        fs::remove_file(&fx.config.manifest).unwrap();
        let fake = FakeRunner::default();
        let err = SetupRunner::new(fx.config.clone(), &fake).run().unwrap_err();

        assert!(matches!(err, SetupError::ManifestMissing { .. }));
        assert_ne!(err.exit_code(), 0);
        assert_eq!(
            fake.steps(),
            vec![Step::CreateEnvironment, Step::UpgradeInstaller]
        );
    }

    #[test]
    fn test_signal_and_spawn_failures() {
        let fx = fixture();
        let fake = FakeRunner::failing(Step::UpgradeInstaller, ToolStatus::Signaled(2));
        let err = SetupRunner::new(fx.config.clone(), &fake).run().unwrap_err();
        assert_eq!(err.exit_code(), 130);
        assert_eq!(fake.steps().len(), 2);

        let fx = fixture();
        let fake = FakeRunner {
            unstartable: Some(Step::InstallDependencies),
            ..Default::default()
        };
        let err = SetupRunner::new(fx.config.clone(), &fake).run().unwrap_err();
        assert!(matches!(err, SetupError::Spawn { step: Step::InstallDependencies, .. }));
        assert_eq!(err.exit_code(), 126);
        assert!(!err.reported_by_tool());
    }

    #[test]
    fn test_rerun_on_existing_environment_succeeds() {
        let fx = fixture();
        let fake = FakeRunner::default();
        let runner = SetupRunner::new(fx.config.clone(), &fake);
        runner.run().unwrap();
        runner.run().unwrap();
        assert_eq!(fake.steps().len(), 6);
    }

    #[test]
    fn test_plan_describes_without_running() {
        let fx = fixture();
        let fake = FakeRunner::default();
        let plan = SetupRunner::new(fx.config.clone(), &fake).plan().unwrap();

        let steps: Vec<Step> = plan.iter().map(|p| p.step).collect();
        assert_eq!(steps, Step::ALL.to_vec());
        assert!(plan[0].action.ends_with(&format!("-m venv {}", fx.config.env_dir.display())));
        assert!(plan[2].action.contains("-m pip install --upgrade pip"));
        assert!(plan[3].action.contains("-m pip install -r"));
        assert!(fake.steps().is_empty());
        assert!(!fx.config.env_dir.exists());
    }
}
