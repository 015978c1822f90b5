//! The four setup operations, in execution order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// `python -m venv <dir>`
    CreateEnvironment,
    /// Resolve the environment's interpreter by full path
    ActivateEnvironment,
    /// `<env>/bin/python -m pip install --upgrade pip`
    UpgradeInstaller,
    /// `<env>/bin/python -m pip install -r <manifest>`
    InstallDependencies,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::CreateEnvironment,
        Step::ActivateEnvironment,
        Step::UpgradeInstaller,
        Step::InstallDependencies,
    ];

    /// 1-based position in the sequence.
    pub fn index(self) -> usize {
        match self {
            Step::CreateEnvironment => 1,
            Step::ActivateEnvironment => 2,
            Step::UpgradeInstaller => 3,
            Step::InstallDependencies => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::CreateEnvironment => "create-environment",
            Step::ActivateEnvironment => "activate-environment",
            Step::UpgradeInstaller => "upgrade-installer",
            Step::InstallDependencies => "install-dependencies",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
